// Canvas store
//
// Authoritative pixel map. One pixel per coordinate, last write wins, no history.

mod color;

pub use color::{Color, ColorError, PaletteColor, PALETTE};

use crate::config::CanvasConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

#[cfg(test)]
mod tests;

/// A placed pixel as rendered by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pixel {
    pub x: i64,
    pub y: i64,
    pub color: Color,
}

/// Stored cell with audit fields
#[derive(Debug, Clone)]
struct Cell {
    color: Color,
    last_writer: String,
    placed_at: DateTime<Utc>,
}

/// Holds the current color of every painted coordinate.
///
/// The store does no authorization; budget checks happen before `apply`.
pub struct CanvasStore {
    width: u32,
    height: u32,
    palette_only: bool,
    cells: HashMap<(i64, i64), Cell>,
}

impl CanvasStore {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            palette_only: config.palette_only,
            cells: HashMap::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    /// Parse a client color under this canvas's color policy.
    pub fn validate_color(&self, raw: &str) -> Result<Color, ColorError> {
        let color = Color::parse(raw)?;
        if self.palette_only && !color.is_palette() {
            return Err(ColorError::NotInPalette(color.to_string()));
        }
        Ok(color)
    }

    /// Write a pixel, replacing whatever was at the coordinate.
    ///
    /// Out-of-bounds writes are logged and ignored; returns whether the write
    /// landed.
    pub fn apply(&mut self, pixel: Pixel, writer: &str) -> bool {
        if !self.contains(pixel.x, pixel.y) {
            warn!(
                x = pixel.x,
                y = pixel.y,
                writer = %writer,
                "Ignoring out-of-bounds pixel"
            );
            return false;
        }

        self.cells.insert(
            (pixel.x, pixel.y),
            Cell {
                color: pixel.color,
                last_writer: writer.to_string(),
                placed_at: Utc::now(),
            },
        );
        true
    }

    pub fn get(&self, x: i64, y: i64) -> Option<Pixel> {
        self.cells.get(&(x, y)).map(|cell| Pixel {
            x,
            y,
            color: cell.color.clone(),
        })
    }

    /// Who last painted a coordinate, and when
    pub fn last_writer(&self, x: i64, y: i64) -> Option<(&str, DateTime<Utc>)> {
        self.cells
            .get(&(x, y))
            .map(|cell| (cell.last_writer.as_str(), cell.placed_at))
    }

    /// All painted pixels, row-major.
    pub fn snapshot(&self) -> Vec<Pixel> {
        let mut pixels: Vec<Pixel> = self
            .cells
            .iter()
            .map(|(&(x, y), cell)| Pixel {
                x,
                y,
                color: cell.color.clone(),
            })
            .collect();
        pixels.sort_by_key(|p| (p.y, p.x));
        pixels
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
