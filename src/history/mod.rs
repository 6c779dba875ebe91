//! Line history ledger and interactive rewrite protocol.
//!
//! Every write to a bound stream is recorded (while an interactive session is active) so that a
//! session can erase and redraw its own lines in place, then replay any lines other writers
//! emitted below it.

pub mod error;
pub mod handle;
pub mod ledger;
pub mod line;
pub mod registry;

pub use error::HistoryError;
pub use handle::StreamHandle;
pub use ledger::{LogHistory, StreamWriter};
pub use line::{append_to_history, split_lines, LogLine, SessionId};
pub use registry::StreamRegistry;
