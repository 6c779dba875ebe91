//! Text helpers (escape recognition, line terminators, width).
//!
//! Pure string-in/value-out helpers shared by the ledger and the widgets.

pub mod ansi;
pub mod width;

pub use ansi::{ends_with_eol, strip_ansi};
pub use width::visible_width;
