use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Named palette entry offered to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaletteColor {
    pub hex: &'static str,
    pub name: &'static str,
}

const fn entry(hex: &'static str, name: &'static str) -> PaletteColor {
    PaletteColor { hex, name }
}

pub const PALETTE: [PaletteColor; 24] = [
    entry("#FF0000", "red"),
    entry("#FFA500", "orange"),
    entry("#FFFF00", "yellow"),
    entry("#008000", "green"),
    entry("#0000FF", "blue"),
    entry("#800080", "purple"),
    entry("#FFC0CB", "pink"),
    entry("#A52A2A", "brown"),
    entry("#FFFFFF", "white"),
    entry("#000000", "black"),
    entry("#808080", "gray"),
    entry("#FFD700", "gold"),
    entry("#00FFFF", "cyan"),
    entry("#FF00FF", "magenta"),
    entry("#008080", "teal"),
    entry("#800000", "maroon"),
    entry("#FF4500", "orange-red"),
    entry("#9ACD32", "yellow-green"),
    entry("#4B0082", "indigo"),
    entry("#F0E68C", "khaki"),
    entry("#E6E6FA", "lavender"),
    entry("#D2691E", "chocolate"),
    entry("#B0C4DE", "light-steel-blue"),
    entry("#32CD32", "lime-green"),
];

/// Normalized `#RRGGBB` color (uppercase hex)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    /// Parse `#RGB` or `#RRGGBB`, case-insensitive.
    pub fn parse(raw: &str) -> Result<Self, ColorError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ColorError::Empty);
        }

        let digits = raw
            .strip_prefix('#')
            .ok_or_else(|| ColorError::InvalidHex(raw.to_string()))?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(raw.to_string()));
        }

        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_string(),
            _ => return Err(ColorError::InvalidHex(raw.to_string())),
        };

        Ok(Color(format!("#{}", expanded.to_ascii_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_palette(&self) -> bool {
        PALETTE.iter().any(|p| p.hex == self.0)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Color validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    Empty,
    InvalidHex(String),
    NotInPalette(String),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::Empty => write!(f, "color is required"),
            ColorError::InvalidHex(s) => {
                write!(f, "invalid color '{}': expected #RGB or #RRGGBB", s)
            }
            ColorError::NotInPalette(s) => write!(f, "color '{}' is not in the palette", s),
        }
    }
}

impl std::error::Error for ColorError {}
