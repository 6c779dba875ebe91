//! Log level table.
//!
//! Higher values are more verbose; a message is emitted when its level is at or below the
//! logger's current level. `silent` sits below everything and suppresses all output.

use std::collections::BTreeMap;

use crate::logger::style::{palette, Style};

pub const SILENT: i64 = i64::MIN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDescriptor {
    pub level: i64,
    pub label: String,
    pub style: Option<Style>,
}

impl LevelDescriptor {
    pub fn new(level: i64, label: impl Into<String>) -> Self {
        Self {
            level,
            label: label.into(),
            style: None,
        }
    }

    pub fn styled(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }
}

/// Partial update applied by `Logger::update_level`.
#[derive(Debug, Clone, Default)]
pub struct LevelUpdate {
    pub level: Option<i64>,
    pub label: Option<String>,
    pub style: Option<Style>,
}

impl LevelUpdate {
    pub(crate) fn apply(self, descriptor: &mut LevelDescriptor) {
        if let Some(level) = self.level {
            descriptor.level = level;
        }
        if let Some(label) = self.label {
            descriptor.label = label;
        }
        if let Some(style) = self.style {
            descriptor.style = Some(style);
        }
    }
}

pub fn default_levels() -> BTreeMap<String, LevelDescriptor> {
    let table = [
        ("silent", LevelDescriptor::new(SILENT, "")),
        (
            "error",
            LevelDescriptor::new(1000, "ERR!")
                .styled(Style::fg(palette::ORANGE_RED).on(palette::BLACK)),
        ),
        (
            "warn",
            LevelDescriptor::new(2000, "WARN").styled(Style::fg(palette::BLACK).on(palette::GOLD)),
        ),
        (
            "notice",
            LevelDescriptor::new(3000, "notice")
                .styled(Style::fg(palette::ORANGE).on(palette::BLACK)),
        ),
        (
            "http",
            LevelDescriptor::new(4000, "http").styled(Style::fg(palette::LIGHT_SEA_GREEN)),
        ),
        (
            "timing",
            LevelDescriptor::new(5000, "timing").styled(Style::fg(palette::DODGER_BLUE)),
        ),
        (
            "info",
            LevelDescriptor::new(6000, "info").styled(Style::fg(palette::MEDIUM_SEA_GREEN)),
        ),
        (
            "verbose",
            LevelDescriptor::new(7000, "verb")
                .styled(Style::fg(palette::ROYAL_BLUE).on(palette::BLACK)),
        ),
        (
            "debug",
            LevelDescriptor::new(8000, "debug").styled(Style::fg(palette::GRAY)),
        ),
        (
            "silly",
            LevelDescriptor::new(9001, "sill")
                .styled(Style::fg(palette::BLACK).on(palette::GAINSBORO)),
        ),
    ];
    table
        .into_iter()
        .map(|(name, descriptor)| (name.to_string(), descriptor))
        .collect()
}
