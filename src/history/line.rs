//! Log lines, session identifiers, and the pure history update step.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::text::ends_with_eol;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of an interactive session.
///
/// Minted only by `begin_interactive_session`; unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn mint() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// One tracked terminal line.
///
/// `session` is `None` for plain output and for lines whose session has ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub session: Option<SessionId>,
    pub content: String,
}

impl LogLine {
    pub fn new(session: Option<SessionId>, content: impl Into<String>) -> Self {
        Self {
            session,
            content: content.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        ends_with_eol(&self.content)
    }
}

/// Splits `text` after each `\n`. A terminal newline does not produce a trailing empty segment,
/// and empty input produces no segments.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive('\n')
}

/// Merges `text` into `history`.
///
/// If the last entry is not a completed line, the first segment is appended to it (keeping that
/// entry's tag); every other segment becomes a new entry tagged `session`.
pub fn append_to_history(history: &mut Vec<LogLine>, session: Option<SessionId>, text: &str) {
    for segment in split_lines(text) {
        match history.last_mut() {
            Some(last) if !last.is_complete() => last.content.push_str(segment),
            _ => history.push(LogLine::new(session, segment)),
        }
    }
}
