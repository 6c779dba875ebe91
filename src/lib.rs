//! Terminal output coordinator for CLI tools.
//!
//! Plain log lines and in-place interactive lines (progress bars, spinners, live status) share
//! one stream without corrupting each other: every line written while an interactive session is
//! active is recorded in a per-stream ledger, and a session redraws itself by moving the cursor
//! up to its first line, rewriting, and replaying whatever other writers emitted below it.
//!
//! Invariant: single output gate. Bytes reach a bound stream only through
//! `core::output::OutputGate::flush(..)`, called from [`StreamHandle`].
//!
//! # Public API Overview
//! - Bind streams with a [`StreamRegistry`] and write through a [`LogHistory`].
//! - Run live lines with [`InteractiveSession`] (or [`Logger::create_interactive`]).
//! - Render them with [`Spinner`], [`ProgressBar`] and [`Timer`].
//! - Emit leveled, styled messages with [`Logger`].

pub mod config;
pub mod logging;

pub mod core;
pub mod history;
pub mod logger;
pub mod runtime;
pub mod widgets;

/// Environment configuration.
pub use crate::config::EnvConfig;

/// Stream identities and sinks.
pub use crate::core::stream::{open_stream, SharedSink, StreamKey, StreamSink};

/// Terminal output commands.
pub use crate::core::output::{OutputGate, TerminalCmd};

/// ANSI-aware text helpers.
pub use crate::core::text::{ends_with_eol, strip_ansi, visible_width};

/// Ledger, handles, and the interactive rewrite protocol.
pub use crate::history::{
    append_to_history, split_lines, HistoryError, LogHistory, LogLine, SessionId, StreamHandle,
    StreamRegistry, StreamWriter,
};

/// Background refresh.
pub use crate::runtime::{InteractiveOptions, InteractiveSession, DEFAULT_REFRESH_INTERVAL};

/// Render helpers.
pub use crate::widgets::{
    format_duration, ProgressBar, ProgressBarOptions, ProgressSymbols, Spinner, SpinnerStyle,
    Timer, WidgetError,
};

/// Logger facade.
pub use crate::logger::{
    default_levels, is_debug_namespace, Color, DebugNamespaces, LevelDescriptor, LevelUpdate,
    LogPipe, Logger, LoggerError, LoggerOptions, LoggerStyles, Style,
};
