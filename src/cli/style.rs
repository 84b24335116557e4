//! Terminal styling helpers
//!
//! Colors are emitted unconditionally; output goes through `anstream`, which
//! strips them when the stream is not a terminal.

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;
use std::fmt::Display;

/// Semantic text styles
pub trait Stylize: Display {
    /// Values the user cares about (titles, URLs, ids)
    fn accent(&self) -> String {
        self.to_string().cyan().to_string()
    }

    /// Secondary information
    fn muted(&self) -> String {
        self.to_string().dimmed().to_string()
    }

    /// Headings
    fn emphasis(&self) -> String {
        self.to_string().bold().to_string()
    }

    /// Error text
    fn danger(&self) -> String {
        self.to_string().red().to_string()
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Green check mark
pub fn check() -> String {
    "✓".green().to_string()
}

/// Red cross
pub fn cross() -> String {
    "✗".red().to_string()
}

/// Style for indeterminate spinners
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Style for the upload bar
pub fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{bar:30.cyan/blue} {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
}
