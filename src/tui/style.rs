//! Color constants for the TUI.

use ratatui::style::Color;

/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;
/// "No data" notices.
pub const INFO: Color = Color::Cyan;
/// Device gauge under normal load.
pub const GAUGE_PRIMARY: Color = Color::Blue;
/// Acknowledged alerts.
pub const MUTED: Color = Color::DarkGray;

/// Maps a display variant (`success` / `warning` / `danger`) to a color.
pub fn variant_color(variant: &str) -> Color {
    match variant {
        "success" => Color::Green,
        "warning" => Color::Yellow,
        "danger" => Color::Red,
        _ => Color::Gray,
    }
}
