//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::Palette;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// One Dark values, used when a theme file lacks a key.
const GREEN: Color = rgb(0x98C379);
const BLUE: Color = rgb(0x61AFEF);
const STOPPER: Color = rgb(0xE06C75);
const HOLE: Color = rgb(0x21252B);
const BG: Color = rgb(0x31353F);
const DIV_LINE: Color = rgb(0x3F444F);
const MAIN_FG: Color = rgb(0xABB2BF);
const TITLE: Color = rgb(0xE5C07B);
const INACTIVE_FG: Color = rgb(0x5C6370);

/// Board and UI colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Tokens that belong in the hole.
    pub green: Color,
    /// Tokens that must stay out of it.
    pub blue: Color,
    pub stopper: Color,
    pub hole: Color,
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (level, tilts).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text: key hints, unselected menu entries.
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
        Self::onedark_default()
    }
}

impl Theme {
    pub fn onedark_default() -> Self {
        Self {
            green: GREEN,
            blue: BLUE,
            stopper: STOPPER,
            hole: HOLE,
            bg: BG,
            div_line: DIV_LINE,
            main_fg: MAIN_FG,
            title: TITLE,
            inactive_fg: INACTIVE_FG,
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// No path, or a path that does not exist, gives the One Dark defaults.
    /// `palette` then overrides the token colours for high contrast or colour blindness.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => {
                let s = std::fs::read_to_string(p)?;
                Self::from_map(&parse_theme_file(&s))
            }
            Some(p) => {
                log::warn!("theme {} not found, using defaults", p.display());
                Self::onedark_default()
            }
            None => Self::onedark_default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.green = rgb(0x00FF00);
                self.blue = rgb(0x0088FF);
                self.stopper = rgb(0xFFFFFF);
                self.hole = rgb(0x000000);
            }
            Palette::Colorblind => {
                // Orange/blue instead of green/blue; stoppers neutral grey.
                self.green = rgb(0xEE7733);
                self.blue = rgb(0x0077BB);
                self.stopper = rgb(0xBBBBBB);
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        Self {
            green: get("mem_box").or_else(|| get("cpu_start")).unwrap_or(GREEN),
            blue: get("cpu_box").unwrap_or(BLUE),
            stopper: get("cpu_end")
                .or_else(|| get("temp_end"))
                .unwrap_or(STOPPER),
            hole: get("main_bg").unwrap_or(HOLE),
            bg: get("meter_bg").unwrap_or(BG),
            div_line: get("div_line").unwrap_or(DIV_LINE),
            main_fg: get("main_fg").unwrap_or(MAIN_FG),
            title: get("title").unwrap_or(TITLE),
            inactive_fg: get("inactive_fg").unwrap_or(INACTIVE_FG),
        }
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
        let Some((key, rest)) = stripped.split_once(']') else {
            continue;
        };
        let Some((_, value)) = rest.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !value.is_empty() {
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    if !s.is_ascii() {
        return Err(invalid());
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    match s.len() {
        6 => Ok(Color::Rgb(
            channel(&s[0..2])?,
            channel(&s[2..4])?,
            channel(&s[4..6])?,
        )),
        3 => Ok(Color::Rgb(
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        )),
        _ => Err(invalid()),
    }
}
