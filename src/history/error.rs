use std::io;

use thiserror::Error;

use crate::core::stream::StreamKey;
use crate::history::line::SessionId;

/// Failures surfaced by ledger operations.
///
/// `UnknownSession` and `ConcurrentRewrite` indicate a bug in the caller (a stale identifier or
/// unserialized rewrites); they are returned immediately and never retried.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("unknown interactive session {0}")]
    UnknownSession(SessionId),

    #[error("interactive write for {requested} rejected: {active} is already rewriting this stream")]
    ConcurrentRewrite {
        active: SessionId,
        requested: SessionId,
    },

    #[error("stream {0} was released from its registry")]
    Released(StreamKey),

    #[error("stream write failed: {0}")]
    Io(#[from] io::Error),
}

impl HistoryError {
    pub fn is_concurrent_rewrite(&self) -> bool {
        matches!(self, Self::ConcurrentRewrite { .. })
    }
}

impl From<HistoryError> for io::Error {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::Io(source) => source,
            other => io::Error::other(other),
        }
    }
}
