//! Logger facade over a [`LogHistory`].
//!
//! Formats messages as `[heading ]label [prefix ]message`, filters by level, and writes every
//! message through the ledger so it coexists with interactive lines on the same stream.

use std::collections::BTreeMap;
use std::io;
use std::time::Duration;

use crate::config::EnvConfig;
use crate::core::stream::StreamKey;
use crate::history::{LogHistory, StreamRegistry};
use crate::logger::debug_namespace::DebugNamespaces;
use crate::logger::levels::{default_levels, LevelDescriptor, LevelUpdate, SILENT};
use crate::logger::pipe::LogPipe;
use crate::logger::style::{palette, Style};
use crate::logger::LoggerError;
use crate::logging;
use crate::runtime::interactive::{InteractiveOptions, InteractiveSession, DEFAULT_REFRESH_INTERVAL};

const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Clone, Default)]
pub struct LoggerOptions {
    pub heading: Option<String>,
    /// Initial level name; `LOG_LEVEL` takes precedence when it names a known level.
    pub level: Option<String>,
    pub stream: StreamKey,
    /// Force styling on or off; defaults to on unless `TAPE_LOG_NO_COLOR=1`.
    pub color: Option<bool>,
    /// Refresh interval for interactive sessions created by this logger.
    pub refresh_interval: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerStyles {
    pub heading: Style,
    pub prefix: Style,
}

impl Default for LoggerStyles {
    fn default() -> Self {
        Self {
            heading: Style::fg(palette::GHOST_WHITE),
            prefix: Style::fg(palette::FUCHSIA),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Logger {
    history: LogHistory,
    heading: Option<String>,
    level: String,
    levels: BTreeMap<String, LevelDescriptor>,
    styles: LoggerStyles,
    color: bool,
    debug: DebugNamespaces,
    refresh_interval: Duration,
}

impl Logger {
    /// Creates a logger writing to `options.stream` in `registry`.
    pub fn new(registry: &StreamRegistry, options: LoggerOptions) -> Result<Self, LoggerError> {
        let history = LogHistory::new(registry, options.stream.clone());
        Self::with_history(history, options)
    }

    /// Creates a logger writing through an existing ledger; `options.stream` is ignored.
    pub fn with_history(history: LogHistory, options: LoggerOptions) -> Result<Self, LoggerError> {
        Self::with_config(history, options, EnvConfig::from_env())
    }

    pub(crate) fn with_config(
        history: LogHistory,
        options: LoggerOptions,
        config: EnvConfig,
    ) -> Result<Self, LoggerError> {
        if let Some(path) = config.trace_file.as_deref() {
            if let Err(err) = logging::init_tracing(path) {
                tracing::warn!(path = %path.display(), "diagnostics disabled: {err}");
            }
        }

        let levels = default_levels();
        let debug = config
            .debug_namespaces
            .as_deref()
            .map(DebugNamespaces::parse)
            .unwrap_or_default();
        let heading_debugged = options
            .heading
            .as_deref()
            .is_some_and(|heading| debug.matches(heading));

        let level = match config.log_level {
            Some(env_level) if levels.contains_key(&env_level) => env_level,
            _ if heading_debugged => "silly".to_string(),
            _ => match options.level {
                Some(level) if levels.contains_key(&level) => level,
                Some(level) => return Err(LoggerError::UnknownLevel(level)),
                None => DEFAULT_LEVEL.to_string(),
            },
        };

        Ok(Self {
            history,
            heading: options.heading,
            level,
            levels,
            styles: LoggerStyles::default(),
            color: options.color.unwrap_or(!config.no_color),
            debug,
            refresh_interval: options
                .refresh_interval
                .or(config.refresh_interval)
                .unwrap_or(DEFAULT_REFRESH_INTERVAL),
        })
    }

    pub fn history(&self) -> &LogHistory {
        &self.history
    }

    pub fn set_stream(&mut self, registry: &StreamRegistry, key: StreamKey) {
        self.history.set_stream(registry, key);
    }

    /// Current level name and value.
    pub fn get_level(&self) -> (&str, i64) {
        let value = self
            .levels
            .get(&self.level)
            .map_or(SILENT, |descriptor| descriptor.level);
        (self.level.as_str(), value)
    }

    pub fn get_levels(&self) -> BTreeMap<String, i64> {
        self.levels
            .iter()
            .map(|(name, descriptor)| (name.clone(), descriptor.level))
            .collect()
    }

    pub fn set_level(&mut self, name: &str) -> Result<(), LoggerError> {
        if !self.levels.contains_key(name) {
            return Err(LoggerError::UnknownLevel(name.to_string()));
        }
        self.level = name.to_string();
        Ok(())
    }

    /// Whether a message at `name` would currently be emitted.
    pub fn is_level_at_least(&self, name: &str) -> bool {
        let (_, current) = self.get_level();
        match self.levels.get(name) {
            Some(descriptor) => {
                current != SILENT && descriptor.level != SILENT && descriptor.level <= current
            }
            None => false,
        }
    }

    pub fn set_heading(&mut self, heading: Option<String>, style: Option<Style>) {
        self.heading = heading;
        if let Some(style) = style {
            self.styles.heading = style;
        }
    }

    pub fn set_prefix_style(&mut self, style: Style) {
        self.styles.prefix = style;
    }

    pub fn set_color(&mut self, enabled: bool) {
        self.color = enabled;
    }

    pub fn add_level(&mut self, name: impl Into<String>, descriptor: LevelDescriptor) {
        self.levels.insert(name.into(), descriptor);
    }

    pub fn update_level(&mut self, name: &str, update: LevelUpdate) -> Result<(), LoggerError> {
        let descriptor = self
            .levels
            .get_mut(name)
            .ok_or_else(|| LoggerError::UnknownLevel(name.to_string()))?;
        update.apply(descriptor);
        Ok(())
    }

    pub fn is_debug_enabled(&self, namespace: &str) -> bool {
        self.debug.matches(namespace)
    }

    fn paint(&self, style: Option<&Style>, text: &str) -> String {
        match style {
            Some(style) if self.color => style.paint(text),
            _ => text.to_string(),
        }
    }

    /// Formats `message` at `level` without writing it. Every line of a multi-line message gets
    /// the full header.
    pub fn format(
        &self,
        level: &str,
        prefix: Option<&str>,
        message: &str,
    ) -> Result<String, LoggerError> {
        let descriptor = self
            .levels
            .get(level)
            .ok_or_else(|| LoggerError::UnknownLevel(level.to_string()))?;

        let mut header = Vec::with_capacity(3);
        if let Some(heading) = self.heading.as_deref().filter(|h| !h.is_empty()) {
            header.push(self.paint(Some(&self.styles.heading), heading));
        }
        if !descriptor.label.is_empty() {
            header.push(self.paint(descriptor.style.as_ref(), &descriptor.label));
        }
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            header.push(self.paint(Some(&self.styles.prefix), prefix));
        }
        let header = header.join(" ");

        let mut out = String::new();
        for line in message.split('\n') {
            if !header.is_empty() {
                out.push_str(&header);
                if !line.is_empty() {
                    out.push(' ');
                }
            }
            out.push_str(line);
            out.push('\n');
        }
        Ok(out)
    }

    pub fn log_prefixed(
        &self,
        level: &str,
        prefix: Option<&str>,
        message: &str,
    ) -> Result<(), LoggerError> {
        if !self.levels.contains_key(level) {
            return Err(LoggerError::UnknownLevel(level.to_string()));
        }
        if !self.is_level_at_least(level) {
            return Ok(());
        }
        let formatted = self.format(level, prefix, message)?;
        self.history.write(&formatted)?;
        Ok(())
    }

    pub fn log(&self, level: &str, message: &str) -> Result<(), LoggerError> {
        self.log_prefixed(level, None, message)
    }

    pub fn error(&self, message: &str) -> Result<(), LoggerError> {
        self.log("error", message)
    }

    pub fn warn(&self, message: &str) -> Result<(), LoggerError> {
        self.log("warn", message)
    }

    pub fn notice(&self, message: &str) -> Result<(), LoggerError> {
        self.log("notice", message)
    }

    pub fn http(&self, message: &str) -> Result<(), LoggerError> {
        self.log("http", message)
    }

    pub fn timing(&self, message: &str) -> Result<(), LoggerError> {
        self.log("timing", message)
    }

    pub fn info(&self, message: &str) -> Result<(), LoggerError> {
        self.log("info", message)
    }

    pub fn verbose(&self, message: &str) -> Result<(), LoggerError> {
        self.log("verbose", message)
    }

    pub fn debug(&self, message: &str) -> Result<(), LoggerError> {
        self.log("debug", message)
    }

    pub fn silly(&self, message: &str) -> Result<(), LoggerError> {
        self.log("silly", message)
    }

    /// Starts a live line on this logger's stream, redrawn with `render()` until ended.
    pub fn create_interactive<R>(&self, render: R) -> Result<InteractiveSession, LoggerError>
    where
        R: Fn() -> String + Send + Sync + 'static,
    {
        let options = InteractiveOptions::default().with_interval(self.refresh_interval);
        Ok(InteractiveSession::start(self.history.clone(), options, render)?)
    }

    /// Writer that logs each line written to it at `level`.
    pub fn pipe(&self, level: &str) -> LogPipe<impl FnMut(&str) -> io::Result<()> + '_> {
        let level = level.to_string();
        LogPipe::new(move |line: &str| self.log(&level, line).map_err(io::Error::from))
    }
}
