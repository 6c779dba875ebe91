//! Progress bar widget.
//!
//! Format tokens: `:bar`, `:percentage`, `:elapsed`, `:remaining`. Each token is replaced at its
//! first occurrence.

use std::fmt;
use std::time::{Duration, Instant};

use crate::core::text::visible_width;
use crate::widgets::timer::format_duration;
use crate::widgets::WidgetError;

pub type ProgressFn = Box<dyn Fn() -> f64 + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSymbols {
    pub head: String,
    pub tail: String,
    pub complete: String,
    pub complete_head: String,
    pub incomplete: String,
}

impl Default for ProgressSymbols {
    fn default() -> Self {
        Self {
            head: "[".to_string(),
            tail: "]".to_string(),
            complete: "=".to_string(),
            complete_head: ">".to_string(),
            incomplete: "-".to_string(),
        }
    }
}

impl ProgressSymbols {
    fn validate(&self) -> Result<(), WidgetError> {
        let symbols = [
            ("head", &self.head),
            ("tail", &self.tail),
            ("complete", &self.complete),
            ("complete_head", &self.complete_head),
            ("incomplete", &self.incomplete),
        ];
        for (name, value) in symbols {
            if visible_width(value) > 1 {
                return Err(WidgetError::InvalidSymbol {
                    name,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ProgressBarOptions {
    pub format: String,
    /// Cells between head and tail.
    pub width: usize,
    pub symbols: ProgressSymbols,
}

impl Default for ProgressBarOptions {
    fn default() -> Self {
        Self {
            format: ":bar :percentage".to_string(),
            width: 12,
            symbols: ProgressSymbols::default(),
        }
    }
}

pub struct ProgressBar {
    options: ProgressBarOptions,
    progress: ProgressFn,
    started: Instant,
}

impl fmt::Debug for ProgressBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressBar")
            .field("options", &self.options)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl ProgressBar {
    /// `progress` is polled on every render and clamped to `[0, 1]`.
    pub fn new(options: ProgressBarOptions, progress: ProgressFn) -> Result<Self, WidgetError> {
        options.symbols.validate()?;
        Ok(Self {
            options,
            progress,
            started: Instant::now(),
        })
    }

    pub fn progress(&self) -> f64 {
        let value = (self.progress)();
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, 1.0)
    }

    /// `[====>-------]` style bar for `progress` in `[0, 1]`.
    pub fn render_bar(&self, progress: f64) -> String {
        let symbols = &self.options.symbols;
        let width = self.options.width;
        let complete = ((progress * width as f64).round() as usize).min(width);

        let mut bar = String::with_capacity(width + 2);
        bar.push_str(&symbols.head);
        for cell in 0..complete {
            if cell + 1 == complete && progress < 1.0 {
                bar.push_str(&symbols.complete_head);
            } else {
                bar.push_str(&symbols.complete);
            }
        }
        for _ in complete..width {
            bar.push_str(&symbols.incomplete);
        }
        bar.push_str(&symbols.tail);
        bar
    }

    /// Estimated time left, `None` until any progress has been made.
    pub fn remaining(&self, progress: f64, elapsed: Duration) -> Option<Duration> {
        if progress <= 0.0 {
            return None;
        }
        let total = elapsed.as_secs_f64() / progress;
        Duration::try_from_secs_f64(total - elapsed.as_secs_f64()).ok()
    }

    pub fn render(&self) -> String {
        let progress = self.progress();
        let elapsed = self.started.elapsed();
        let mut output = self.options.format.clone();

        if output.contains(":bar") {
            output = output.replacen(":bar", &self.render_bar(progress), 1);
        }
        if output.contains(":elapsed") {
            output = output.replacen(":elapsed", &format_duration(elapsed), 1);
        }
        if output.contains(":remaining") {
            let remaining = self
                .remaining(progress, elapsed)
                .map(format_duration)
                .unwrap_or_default();
            output = output.replacen(":remaining", &remaining, 1);
        }
        if output.contains(":percentage") {
            let percent = (progress * 100.0).round() as u32;
            output = output.replacen(":percentage", &format!("{percent}%"), 1);
        }
        output
    }
}

impl fmt::Display for ProgressBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::{ProgressBar, ProgressBarOptions, ProgressSymbols};
    use crate::widgets::WidgetError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn fixed(value: f64) -> ProgressBar {
        ProgressBar::new(ProgressBarOptions::default(), Box::new(move || value)).expect("valid")
    }

    #[test]
    fn renders_default_format() {
        assert_eq!(fixed(0.0).render(), "[------------] 0%");
        assert_eq!(fixed(0.25).render(), "[==>---------] 25%");
        assert_eq!(fixed(1.0).render(), "[============] 100%");
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(fixed(-3.0).render(), "[------------] 0%");
        assert_eq!(fixed(7.0).render(), "[============] 100%");
        assert_eq!(fixed(f64::NAN).progress(), 0.0);
    }

    #[test]
    fn bar_width_is_fixed_at_half_cells() {
        let bar = fixed(0.125);
        assert_eq!(bar.render_bar(0.125).chars().count(), 14);
    }

    #[test]
    fn progress_fn_is_polled_each_render() {
        let bits = Arc::new(AtomicU64::new(0.5f64.to_bits()));
        let source = Arc::clone(&bits);
        let bar = ProgressBar::new(
            ProgressBarOptions {
                format: ":percentage".to_string(),
                ..ProgressBarOptions::default()
            },
            Box::new(move || f64::from_bits(source.load(Ordering::SeqCst))),
        )
        .expect("valid");
        assert_eq!(bar.to_string(), "50%");
        bits.store(0.75f64.to_bits(), Ordering::SeqCst);
        assert_eq!(bar.to_string(), "75%");
    }

    #[test]
    fn remaining_needs_progress() {
        let bar = fixed(0.5);
        assert_eq!(bar.remaining(0.0, Duration::from_secs(4)), None);
        assert_eq!(
            bar.remaining(0.5, Duration::from_secs(4)),
            Some(Duration::from_secs(4))
        );
    }

    #[test]
    fn wide_symbols_are_rejected() {
        let options = ProgressBarOptions {
            symbols: ProgressSymbols {
                complete: "==".to_string(),
                ..ProgressSymbols::default()
            },
            ..ProgressBarOptions::default()
        };
        let err = ProgressBar::new(options, Box::new(|| 0.0)).expect_err("invalid");
        assert!(matches!(err, WidgetError::InvalidSymbol { name: "complete", .. }));
    }
}
