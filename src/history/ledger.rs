//! Per-consumer ledger bound to a shared stream handle.

use std::io;
use std::sync::Arc;

use crate::core::stream::StreamKey;
use crate::history::error::HistoryError;
use crate::history::handle::StreamHandle;
use crate::history::line::{LogLine, SessionId};
use crate::history::registry::StreamRegistry;

/// Write surface for one consumer (a logger, a session driver).
///
/// Cloning is cheap; clones share the bound handle until one of them is rebound with
/// [`LogHistory::set_stream`].
#[derive(Debug, Clone)]
pub struct LogHistory {
    handle: Arc<StreamHandle>,
}

impl LogHistory {
    pub fn new(registry: &StreamRegistry, key: StreamKey) -> Self {
        Self {
            handle: registry.bind(key),
        }
    }

    pub fn from_handle(handle: Arc<StreamHandle>) -> Self {
        Self { handle }
    }

    /// Rebinds this ledger to another stream. Other clones keep their binding.
    pub fn set_stream(&mut self, registry: &StreamRegistry, key: StreamKey) {
        self.handle = registry.bind(key);
    }

    pub fn handle(&self) -> &Arc<StreamHandle> {
        &self.handle
    }

    pub fn stream_key(&self) -> &StreamKey {
        self.handle.key()
    }

    pub fn begin_interactive_session(&self) -> SessionId {
        self.handle.begin_interactive_session()
    }

    pub fn end_interactive_session(&self, id: SessionId) -> Result<(), HistoryError> {
        self.handle.end_interactive_session(id)
    }

    pub fn has_interactive_session(&self, id: SessionId) -> bool {
        self.handle.has_interactive_session(id)
    }

    /// See [`StreamHandle::do_interactive_write`].
    pub fn do_interactive_write<F>(&self, id: SessionId, render: F) -> Result<(), HistoryError>
    where
        F: FnOnce() -> Result<(), HistoryError>,
    {
        self.handle.do_interactive_write(id, render)
    }

    /// See [`StreamHandle::do_interactive_write_when_idle`].
    pub fn do_interactive_write_when_idle<F>(
        &self,
        id: SessionId,
        render: F,
    ) -> Result<(), HistoryError>
    where
        F: FnOnce() -> Result<(), HistoryError>,
    {
        self.handle.do_interactive_write_when_idle(id, render)
    }

    /// The only sanctioned way to put content on the bound stream.
    pub fn write(&self, content: &str) -> Result<(), HistoryError> {
        self.handle.write(content)
    }

    /// `io::Write` adapter for code that expects a plain writer.
    pub fn writer(&self) -> StreamWriter {
        StreamWriter {
            handle: Arc::clone(&self.handle),
        }
    }

    pub fn history(&self) -> Vec<LogLine> {
        self.handle.history()
    }
}

/// Plain writer over a bound stream.
///
/// Bytes are recorded as untagged lines and passed through unchanged.
#[derive(Debug, Clone)]
pub struct StreamWriter {
    handle: Arc<StreamHandle>,
}

impl io::Write for StreamWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.handle.write_plain(&text)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.handle.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::LogHistory;
    use crate::core::stream::{SharedSink, StreamKey};
    use crate::history::line::LogLine;
    use crate::history::registry::StreamRegistry;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::sync::Arc;

    #[test]
    fn ledgers_on_one_stream_share_history() {
        let registry = StreamRegistry::new();
        let sink = SharedSink::new();
        registry.bind_with(StreamKey::named("tty"), || sink.boxed());

        let logger = LogHistory::new(&registry, StreamKey::named("tty"));
        let bar = LogHistory::new(&registry, StreamKey::named("tty"));
        assert!(Arc::ptr_eq(logger.handle(), bar.handle()));

        let id = bar.begin_interactive_session();
        logger.write("plain\n").expect("write");
        assert!(logger.has_interactive_session(id));
        assert_eq!(bar.history(), vec![LogLine::new(None, "plain\n")]);
    }

    #[test]
    fn set_stream_rebinds_only_that_ledger() {
        let registry = StreamRegistry::new();
        let mut first = LogHistory::new(&registry, StreamKey::Null);
        let second = first.clone();
        first.set_stream(&registry, StreamKey::named("other"));
        assert_eq!(first.stream_key(), &StreamKey::named("other"));
        assert_eq!(second.stream_key(), &StreamKey::Null);
    }

    #[test]
    fn writer_records_untagged_lines() {
        let registry = StreamRegistry::new();
        let sink = SharedSink::new();
        let ledger = LogHistory::from_handle(
            registry.bind_with(StreamKey::named("tty"), || sink.boxed()),
        );
        let id = ledger.begin_interactive_session();

        let mut writer = ledger.writer();
        writeln!(writer, "child output").expect("write");
        writer.flush().expect("flush");

        assert_eq!(ledger.history(), vec![LogLine::new(None, "child output\n")]);
        assert_eq!(sink.contents(), "child output\n");
        ledger.end_interactive_session(id).expect("end");
    }
}
