//! Diagnostics logging for the crate itself.
//!
//! Diagnostics go to a file, never to a bound stream: anything written to a tracked stream
//! would land in its history and be replayed by the next rewrite.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive read from the environment; defaults to `tape_log=debug`.
pub const TRACE_FILTER_ENV: &str = "TAPE_LOG_TRACE";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(TRACE_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("tape_log=debug"))
}

/// Subscriber writing plain (uncolored) events to `log_file`.
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let fmt_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .with_thread_names(true)
        .with_target(false);

    tracing_subscriber::registry().with(fmt_layer).with(env_filter())
}

/// Installs the global diagnostics subscriber writing to `path`.
///
/// Returns `Ok(false)` if a global subscriber was already installed.
pub fn init_tracing(path: &Path) -> io::Result<bool> {
    let log_file = File::create(path)?;
    Ok(build_subscriber(log_file).try_init().is_ok())
}
