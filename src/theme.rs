//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const ONEDARK_BLOCKS: [Color; 6] = [
    Color::Rgb(0x98, 0xC3, 0x79),
    Color::Rgb(0xE5, 0xC0, 0x7B),
    Color::Rgb(0xE0, 0x6C, 0x75),
    Color::Rgb(0x61, 0xAF, 0xEF),
    Color::Rgb(0xC6, 0x78, 0xDD),
    Color::Rgb(0x56, 0xB6, 0xC2),
];

const HIGH_CONTRAST_BLOCKS: [Color; 6] = [
    Color::Rgb(0x00, 0xFF, 0x00),
    Color::Rgb(0xFF, 0xFF, 0x00),
    Color::Rgb(0xFF, 0x00, 0x00),
    Color::Rgb(0x00, 0x88, 0xFF),
    Color::Rgb(0xFF, 0x00, 0xFF),
    Color::Rgb(0x00, 0xFF, 0xFF),
];

// Tol's bright scheme, safe for the common colour-vision deficiencies.
const COLORBLIND_BLOCKS: [Color; 6] = [
    Color::Rgb(0x00, 0x77, 0xBB),
    Color::Rgb(0xEE, 0x77, 0x33),
    Color::Rgb(0x00, 0x99, 0x88),
    Color::Rgb(0xCC, 0x33, 0x11),
    Color::Rgb(0xEE, 0x33, 0x77),
    Color::Rgb(0xBB, 0xBB, 0x00),
];

/// Block palette and UI colours.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Tower block colours, cycled by placement order.
    pub blocks: [Color; 6],
    /// Sky behind the tower.
    pub bg: Color,
    /// Borders.
    pub div_line: Color,
    /// Text (score, stats).
    pub main_fg: Color,
    /// Titles and labels.
    pub title: Color,
    /// Hints and the off-axis outline.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark()
    }
}

impl Theme {
    pub fn onedark() -> Self {
        Self {
            blocks: ONEDARK_BLOCKS,
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Missing path means One Dark; `palette` then overrides the block colours.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) => Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?)),
            None => Self::onedark(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => self.blocks = HIGH_CONTRAST_BLOCKS,
            crate::Palette::Colorblind => self.blocks = COLORBLIND_BLOCKS,
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let base = Self::onedark();
        Self {
            blocks: [
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(base.blocks[0]),
                get("title").or_else(|| get("cpu_mid")).unwrap_or(base.blocks[1]),
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(base.blocks[2]),
                get("cpu_box").unwrap_or(base.blocks[3]),
                get("net_box").unwrap_or(base.blocks[4]),
                get("hi_fg").or_else(|| get("proc_misc")).unwrap_or(base.blocks[5]),
            ],
            bg: get("meter_bg").unwrap_or(base.bg),
            div_line: get("div_line").unwrap_or(base.div_line),
            main_fg: get("main_fg").unwrap_or(base.main_fg),
            title: get("title").unwrap_or(base.title),
            inactive_fg: get("inactive_fg").unwrap_or(base.inactive_fg),
        }
    }

    /// Colour for a palette index handed out by the tower.
    #[inline]
    pub fn block_color(&self, index: usize) -> Color {
        self.blocks[index % self.blocks.len()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB".
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>, scale: u8| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .map(|v| v * scale)
            .ok_or_else(|| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2, 1)?, channel(2..4, 1)?, channel(4..6, 1)?),
        3 => (channel(0..1, 17)?, channel(1..2, 17)?, channel(2..3, 17)?),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}
