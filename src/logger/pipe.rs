//! Line-oriented `io::Write` that forwards each line to a log function.
//!
//! Useful for piping a child process's output through a logger.

use std::fmt;
use std::io;

pub struct LogPipe<F>
where
    F: FnMut(&str) -> io::Result<()>,
{
    log_fn: F,
    pending: Vec<u8>,
}

impl<F> fmt::Debug for LogPipe<F>
where
    F: FnMut(&str) -> io::Result<()>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogPipe")
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl<F> LogPipe<F>
where
    F: FnMut(&str) -> io::Result<()>,
{
    pub fn new(log_fn: F) -> Self {
        Self {
            log_fn,
            pending: Vec::new(),
        }
    }

    fn emit(&mut self, mut line: Vec<u8>) -> io::Result<()> {
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        let text = String::from_utf8_lossy(&line);
        (self.log_fn)(&text)
    }
}

impl<F> io::Write for LogPipe<F>
where
    F: FnMut(&str) -> io::Result<()>,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|byte| *byte == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            self.emit(line)?;
        }
        Ok(buf.len())
    }

    /// Logs a pending partial line, if any.
    fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let line = std::mem::take(&mut self.pending);
        self.emit(line)
    }
}

impl<F> Drop for LogPipe<F>
where
    F: FnMut(&str) -> io::Result<()>,
{
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}
