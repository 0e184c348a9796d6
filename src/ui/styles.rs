//! Theme-aware styling for the lyric display.
//!
//! A content version may carry an accent color and a background variant;
//! both map onto terminal styles here, with the same fallbacks the web
//! rendering used (white accent on a near-black background).

use crate::content::{BackgroundVariant, Theme};
use ratatui::style::{Color, Modifier, Style};

pub struct LyricStyles {
    pub before: Style,
    pub current: Style,
    pub after: Style,
    pub header: Style,
    pub hint: Style,
    pub accent: Color,
    pub background: Color,
}

impl LyricStyles {
    pub fn from_theme(theme: Option<&Theme>) -> Self {
        let accent = theme
            .and_then(|t| t.accent_color.as_deref())
            .and_then(parse_hex_color)
            .unwrap_or(Color::White);
        let variant = theme
            .and_then(|t| t.background_variant)
            .unwrap_or(BackgroundVariant::Dark);
        let (background, body, dim) = match variant {
            BackgroundVariant::Dark => (Color::Rgb(17, 17, 17), Color::White, Color::DarkGray),
            BackgroundVariant::Light => (Color::Rgb(250, 250, 250), Color::Black, Color::Gray),
            BackgroundVariant::Neon => (Color::Rgb(8, 8, 24), Color::White, Color::Magenta),
        };
        Self {
            before: Style::default()
                .fg(dim)
                .add_modifier(Modifier::ITALIC | Modifier::DIM),
            current: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            after: Style::default().fg(body),
            header: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            hint: Style::default().fg(dim),
            accent,
            background,
        }
    }
}

/// Parse `#rrggbb` (hash optional) into an RGB color.
pub fn parse_hex_color(raw: &str) -> Option<Color> {
    let hex = raw.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}
