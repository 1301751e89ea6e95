//! Zorya - game map texture decoding and compositing library.
//!
//! This crate provides a unified interface to the Zorya library ecosystem
//! for turning per-tile DDS textures and placement manifests into composite
//! map images.
//!
//! # Crates
//!
//! - [`zorya_common`] - Common utilities (binary reading, raster buffers)
//! - [`zorya_dds`] - DDS container codec (parse, decompress, encode)
//! - [`zorya_map`] - Tile manifests, compositing and parallel rendering
//!
//! # Example
//!
//! ```no_run
//! use zorya::prelude::*;
//! use std::collections::HashMap;
//!
//! // Decode a tile texture
//! let data = std::fs::read("tiles/hill_03.dds")?;
//! let image = decode(&data)?;
//!
//! // Compose a map from its manifest
//! let manifest = std::fs::read_to_string("maps/region.txt")?;
//! let map = Map::parse("region", &manifest)?;
//!
//! let mut textures = HashMap::new();
//! textures.insert("hill_03".to_string(), image.base().clone());
//!
//! let canvas = compose(&map, &textures)?;
//! println!("canvas: {}x{}", canvas.width(), canvas.height());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use zorya_common as common;
pub use zorya_dds as dds;
pub use zorya_map as map;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use zorya_common::{BinaryReader, Raster};
    pub use zorya_dds::{decode, encode, CompressionMode, DecodedImage, MipChain};
    pub use zorya_map::{compose, Concurrency, Map, MapRenderer, RasterSource, RenderStats, Tile};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
