//! Spinner widget.
//!
//! Frames are chosen from the time elapsed since creation, so the spinner animates at its own
//! rate no matter how often it is rendered.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::widgets::WidgetError;

const DOTS_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const LINE_FRAMES: [&str; 4] = ["-", "\\", "|", "/"];
const ARC_FRAMES: [&str; 6] = ["◜", "◠", "◝", "◞", "◡", "◟"];

pub type SpinnerColorFn = Box<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpinnerStyle {
    #[default]
    Dots,
    Line,
    Arc,
}

impl SpinnerStyle {
    pub fn frames(self) -> &'static [&'static str] {
        match self {
            Self::Dots => &DOTS_FRAMES,
            Self::Line => &LINE_FRAMES,
            Self::Arc => &ARC_FRAMES,
        }
    }

    pub fn interval(self) -> Duration {
        match self {
            Self::Dots => Duration::from_millis(80),
            Self::Line => Duration::from_millis(130),
            Self::Arc => Duration::from_millis(100),
        }
    }
}

impl FromStr for SpinnerStyle {
    type Err = WidgetError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "dots" => Ok(Self::Dots),
            "line" => Ok(Self::Line),
            "arc" => Ok(Self::Arc),
            other => Err(WidgetError::UnknownSpinner(other.to_string())),
        }
    }
}

pub struct Spinner {
    style: SpinnerStyle,
    started: Instant,
    color_fn: Option<SpinnerColorFn>,
}

impl fmt::Debug for Spinner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spinner")
            .field("style", &self.style)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new(SpinnerStyle::default())
    }
}

impl Spinner {
    pub fn new(style: SpinnerStyle) -> Self {
        Self {
            style,
            started: Instant::now(),
            color_fn: None,
        }
    }

    pub fn with_color(mut self, color_fn: SpinnerColorFn) -> Self {
        self.color_fn = Some(color_fn);
        self
    }

    pub fn style(&self) -> SpinnerStyle {
        self.style
    }

    /// Frame shown after `elapsed`.
    pub fn frame_at(&self, elapsed: Duration) -> &'static str {
        let frames = self.style.frames();
        let step = elapsed.as_millis() / self.style.interval().as_millis().max(1);
        frames[(step % frames.len() as u128) as usize]
    }

    pub fn current_frame(&self) -> &'static str {
        self.frame_at(self.started.elapsed())
    }
}

impl fmt::Display for Spinner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.current_frame();
        match self.color_fn.as_ref() {
            Some(color) => f.write_str(&color(frame)),
            None => f.write_str(frame),
        }
    }
}
