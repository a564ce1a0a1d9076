//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Kind;

// Native Color::Blue is used for general tasks

/// Used for personal tasks
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Used for work tasks
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Used for destructive confirmations and errors
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);

pub fn kind_color(kind: Kind) -> Color {
    match kind {
        Kind::General => Color::Blue,
        Kind::Personal => DARK_GREEN,
        Kind::Work => GOLD,
    }
}

/// Readable foreground on top of `bg`.
pub fn text_on(bg: Color) -> Color {
    match bg {
        GOLD => Color::Rgb(20, 20, 20),
        _ => Color::White,
    }
}
