//! Terminal styles for progress output.
//!
//! Code refers to styles by what they mean (a success line, a file heading),
//! never by colour, so the palette can change in one place. `console` drops
//! the colours on its own when stdout is not a terminal.

use console::Style;
use once_cell::sync::Lazy;

pub struct Styles {
    pub heading: Style,
    pub muted: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub index: Style,
    pub title: Style,
}

pub static STYLES: Lazy<Styles> = Lazy::new(|| Styles {
    heading: Style::new().bold(),
    muted: Style::new().color256(245),
    success: Style::new().green(),
    warning: Style::new().yellow().bold(),
    error: Style::new().red().bold(),
    index: Style::new().color256(178),
    title: Style::new().cyan(),
});
