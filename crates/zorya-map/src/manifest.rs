//! Tile manifest parsing.
//!
//! A manifest is plain text, one tile per line, tab-separated:
//! `name\tX\tY\tZ\twidth\theight`. The numeric fields are written as decimal
//! floating-point literals by the map exporter and are truncated to integers
//! here.

use crate::{Error, Result};

/// One tile placement.
///
/// `name` links the tile to a texture file; resolving that link is the
/// caller's concern. Coordinates are world units with the X axis increasing
/// upward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Texture name.
    pub name: String,
    /// World X coordinate (vertical extent, increasing upward).
    pub x: i32,
    /// World Y coordinate (unused by compositing).
    pub y: i32,
    /// World Z coordinate (horizontal extent).
    pub z: i32,
    /// Tile width in pixels.
    pub width: i32,
    /// Tile height in pixels.
    pub height: i32,
}

impl Tile {
    /// Parse a tile from one manifest line.
    pub fn parse(line: &str) -> Result<Self> {
        let mut fields = line.split('\t');

        let name = match fields.next() {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => return Err(Error::InvalidTileLine(line.to_string())),
        };

        Ok(Self {
            name,
            x: parse_coord(fields.next(), line)?,
            y: parse_coord(fields.next(), line)?,
            z: parse_coord(fields.next(), line)?,
            width: parse_coord(fields.next(), line)?,
            height: parse_coord(fields.next(), line)?,
        })
    }
}

/// Parse one numeric field, truncating fractional values toward zero.
fn parse_coord(field: Option<&str>, line: &str) -> Result<i32> {
    let text = field.ok_or_else(|| Error::InvalidTileLine(line.to_string()))?;
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| Error::InvalidTileLine(line.to_string()))?;
    Ok(value as i32)
}

/// A named map: an ordered list of tiles.
///
/// Tile order is file order. It carries no compositing semantics beyond
/// last-writer-wins overlap resolution.
#[derive(Debug, Clone)]
pub struct Map {
    name: String,
    tiles: Vec<Tile>,
}

impl Map {
    /// Create a map from already-parsed tiles.
    pub fn new(name: impl Into<String>, tiles: Vec<Tile>) -> Self {
        Self {
            name: name.into(),
            tiles,
        }
    }

    /// Parse a map from manifest text, skipping blank lines.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self> {
        let tiles = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(Tile::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(name, tiles))
    }

    /// Map name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tiles, in file order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Check if the map has no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Drop tiles that fail a predicate (e.g. tiles whose texture file is
    /// missing on disk). A map shrunk to zero tiles should be discarded by
    /// the caller.
    pub fn retain_tiles<F: FnMut(&Tile) -> bool>(&mut self, predicate: F) {
        self.tiles.retain(predicate);
    }
}
