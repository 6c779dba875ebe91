//! String-producing widgets used as interactive render callbacks.

pub mod progress_bar;
pub mod spinner;
pub mod timer;

use thiserror::Error;

pub use progress_bar::{ProgressBar, ProgressBarOptions, ProgressSymbols};
pub use spinner::{Spinner, SpinnerStyle};
pub use timer::{format_duration, Timer};

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("unknown spinner style \"{0}\"")]
    UnknownSpinner(String),

    #[error("progress bar symbol `{name}` must be a single cell wide, got {value:?}")]
    InvalidSymbol { name: &'static str, value: String },
}
