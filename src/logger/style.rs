//! SGR styling for logger tokens.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Rgb(u8, u8, u8),
    /// 256-color palette index.
    Ansi(u8),
}

impl Color {
    fn sgr(self, background: bool) -> String {
        let base = if background { 48 } else { 38 };
        match self {
            Self::Rgb(r, g, b) => format!("{base};2;{r};{g};{b}"),
            Self::Ansi(index) => format!("{base};5;{index}"),
        }
    }
}

/// Named colors used by the default theme.
pub mod palette {
    use super::Color;

    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const GRAY: Color = Color::Rgb(128, 128, 128);
    pub const GAINSBORO: Color = Color::Rgb(220, 220, 220);
    pub const GHOST_WHITE: Color = Color::Rgb(248, 248, 255);
    pub const ORANGE_RED: Color = Color::Rgb(255, 69, 0);
    pub const GOLD: Color = Color::Rgb(255, 215, 0);
    pub const ORANGE: Color = Color::Rgb(255, 165, 0);
    pub const LIGHT_SEA_GREEN: Color = Color::Rgb(32, 178, 170);
    pub const DODGER_BLUE: Color = Color::Rgb(30, 144, 255);
    pub const MEDIUM_SEA_GREEN: Color = Color::Rgb(60, 179, 113);
    pub const ROYAL_BLUE: Color = Color::Rgb(65, 105, 225);
    pub const FUCHSIA: Color = Color::Rgb(255, 0, 255);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Style {
    pub const fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            bg: None,
            bold: false,
        }
    }

    pub const fn on(mut self, background: Color) -> Self {
        self.bg = Some(background);
        self
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn is_plain(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && !self.bold
    }

    /// Wraps `text` in SGR codes followed by a reset. Empty text and plain styles pass through.
    pub fn paint(&self, text: &str) -> String {
        if text.is_empty() || self.is_plain() {
            return text.to_string();
        }
        let mut codes = Vec::with_capacity(3);
        if self.bold {
            codes.push("1".to_string());
        }
        if let Some(fg) = self.fg {
            codes.push(fg.sgr(false));
        }
        if let Some(bg) = self.bg {
            codes.push(bg.sgr(true));
        }
        format!("\x1b[{}m{text}\x1b[0m", codes.join(";"))
    }
}
