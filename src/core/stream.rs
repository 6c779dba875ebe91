//! Physical output streams and their identities.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Boxed sink owned by a bound stream handle.
pub type StreamSink = Box<dyn Write + Send>;

/// Identity of a physical output stream.
///
/// Two ledgers bound with equal keys share one history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamKey {
    Stdout,
    Stderr,
    /// Discards everything written to it.
    Null,
    /// Caller-provided stream, identified by name.
    Named(String),
}

impl StreamKey {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl Default for StreamKey {
    fn default() -> Self {
        Self::Stderr
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
            Self::Null => f.write_str("null"),
            Self::Named(name) => write!(f, "named:{name}"),
        }
    }
}

/// Opens the default sink for a key.
///
/// `Named` keys have no process-level default and discard output unless they were bound with an
/// explicit opener.
pub fn open_stream(key: &StreamKey) -> StreamSink {
    match key {
        StreamKey::Stdout => Box::new(io::stdout()),
        StreamKey::Stderr => Box::new(io::stderr()),
        StreamKey::Null | StreamKey::Named(_) => Box::new(io::sink()),
    }
}

/// In-memory sink whose clones observe the same buffer.
///
/// Records the exact bytes that reached the "terminal" and how many write calls were made. Can be
/// switched into a failing mode to exercise error propagation.
#[derive(Debug, Clone, Default)]
pub struct SharedSink {
    inner: Arc<SharedSinkState>,
}

#[derive(Debug, Default)]
struct SharedSinkState {
    bytes: Mutex<Vec<u8>>,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let bytes = self
            .inner
            .bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// When enabled, every write and flush fails with `BrokenPipe`.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    pub fn boxed(&self) -> StreamSink {
        Box::new(self.clone())
    }

    fn check(&self) -> io::Result<()> {
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        }
        Ok(())
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check()?;
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        self.inner
            .bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::{open_stream, SharedSink, StreamKey};
    use std::io::Write;

    #[test]
    fn clones_share_one_buffer() {
        let sink = SharedSink::new();
        let mut writer = sink.clone();
        writer.write_all(b"abc").expect("write");
        assert_eq!(sink.contents(), "abc");
        assert_eq!(sink.write_count(), 1);
    }

    #[test]
    fn failing_sink_reports_broken_pipe() {
        let sink = SharedSink::new();
        sink.set_failing(true);
        let err = sink.clone().write(b"x").expect_err("must fail");
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
        assert_eq!(sink.write_count(), 0);
    }

    #[test]
    fn null_and_unbound_named_streams_discard() {
        let mut null = open_stream(&StreamKey::Null);
        assert_eq!(null.write(b"dropped").expect("sink"), 7);
        let mut named = open_stream(&StreamKey::named("build"));
        assert!(named.write_all(b"dropped").is_ok());
        assert_eq!(StreamKey::named("build").to_string(), "named:build");
    }
}
