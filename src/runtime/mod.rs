//! Runtime orchestration: background refresh of interactive sessions.

pub mod interactive;

pub use interactive::{InteractiveOptions, InteractiveSession, DEFAULT_REFRESH_INTERVAL};
