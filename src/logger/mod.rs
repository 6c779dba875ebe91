//! Thin logger facade: levels, heading/prefix styling, filtering, pipes.
//!
//! The facade only formats strings; every byte reaches the terminal through the ledger.

pub mod debug_namespace;
pub mod levels;
pub mod log;
pub mod pipe;
pub mod style;

use std::io;

use thiserror::Error;

use crate::history::HistoryError;

pub use debug_namespace::{is_debug_namespace, DebugNamespaces};
pub use levels::{default_levels, LevelDescriptor, LevelUpdate};
pub use log::{Logger, LoggerOptions, LoggerStyles};
pub use pipe::LogPipe;
pub use style::{Color, Style};

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unsupported log level \"{0}\"")]
    UnknownLevel(String),

    #[error(transparent)]
    History(#[from] HistoryError),
}

impl From<LoggerError> for io::Error {
    fn from(err: LoggerError) -> Self {
        match err {
            LoggerError::History(source) => source.into(),
            other => io::Error::other(other),
        }
    }
}
