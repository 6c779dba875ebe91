//! Typed terminal output commands and a single output gate.
//!
//! Invariant: every cursor-control sequence the ledger emits is produced here, and all bytes
//! reaching a bound stream flow through `OutputGate::flush(..)`.

use std::borrow::Cow;
use std::io::{self, Write};

pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const SHOW_CURSOR: &str = "\x1b[?25h";
pub const ERASE_LINE: &str = "\r\x1b[2K";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCmd {
    /// Raw text (may contain SGR styling) to be written verbatim.
    Bytes(String),

    /// Cursor visibility.
    HideCursor,
    ShowCursor,

    /// Relative vertical movement. A zero count emits nothing.
    MoveUp(usize),
    MoveDown(usize),

    /// Erase the whole current line and return to column 0.
    EraseLine,
}

impl TerminalCmd {
    pub fn bytes(data: impl Into<String>) -> Self {
        Self::Bytes(data.into())
    }

    /// Escape sequence (or literal text) for this command.
    pub fn encode(&self) -> Cow<'_, str> {
        match self {
            Self::Bytes(data) => Cow::Borrowed(data.as_str()),
            Self::HideCursor => Cow::Borrowed(HIDE_CURSOR),
            Self::ShowCursor => Cow::Borrowed(SHOW_CURSOR),
            Self::MoveUp(0) | Self::MoveDown(0) => Cow::Borrowed(""),
            Self::MoveUp(n) => Cow::Owned(format!("\x1b[{n}A")),
            Self::MoveDown(n) => Cow::Owned(format!("\x1b[{n}B")),
            Self::EraseLine => Cow::Borrowed(ERASE_LINE),
        }
    }
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TerminalCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TerminalCmd) {
        self.cmds.push(cmd);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Concatenated encoding of the buffered commands, without draining them.
    pub fn to_bytes(&self) -> String {
        self.cmds.iter().map(TerminalCmd::encode).collect()
    }

    /// Flush buffered commands to the sink.
    ///
    /// The buffer is drained even when the sink rejects a write; the first error is returned
    /// unchanged.
    pub fn flush<W: Write + ?Sized>(&mut self, sink: &mut W) -> io::Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        let data = self.to_bytes();
        self.cmds.clear();
        if !data.is_empty() {
            sink.write_all(data.as_bytes())?;
        }
        sink.flush()
    }
}
