//! Semantic color palette for verdicts.

use owo_colors::{OwoColorize, Style};

pub fn valid_style() -> Style {
    Style::new().green().bold()
}

pub fn invalid_style() -> Style {
    Style::new().red().bold()
}

pub fn warning_style() -> Style {
    Style::new().yellow()
}

pub fn muted_style() -> Style {
    Style::new().dimmed()
}

pub fn header_style() -> Style {
    Style::new().bold()
}

/// SQL text and file paths.
pub fn code_style() -> Style {
    Style::new().blue()
}

/// Applies the palette to anything printable, unless colors are off.
pub trait SemanticStyle: Sized {
    fn valid(&self) -> String;
    fn invalid(&self) -> String;
    fn warning(&self) -> String;
    fn muted(&self) -> String;
    fn header(&self) -> String;
    fn code(&self) -> String;
}

fn styled<T: std::fmt::Display>(value: &T, style: Style) -> String {
    if super::no_color() {
        value.to_string()
    } else {
        value.style(style).to_string()
    }
}

impl<T: std::fmt::Display> SemanticStyle for T {
    fn valid(&self) -> String {
        styled(self, valid_style())
    }

    fn invalid(&self) -> String {
        styled(self, invalid_style())
    }

    fn warning(&self) -> String {
        styled(self, warning_style())
    }

    fn muted(&self) -> String {
        styled(self, muted_style())
    }

    fn header(&self) -> String {
        styled(self, header_style())
    }

    fn code(&self) -> String {
        styled(self, code_style())
    }
}
