//! Map tile model and compositing.
//!
//! A map is an ordered list of tile placements parsed from a tab-separated
//! manifest. Each tile names a texture; given a resolver from name to
//! decoded raster, the compositor computes the map's bounding rectangle and
//! blits every tile into one canvas. The renderer runs maps across parallel
//! workers, one map per worker.
//!
//! # Example
//!
//! ```
//! use zorya_map::{compose, Map};
//! use zorya_common::Raster;
//! use std::collections::HashMap;
//!
//! let map = Map::parse("region", "hill\t0\t0\t0\t4\t4\n")?;
//!
//! let mut textures = HashMap::new();
//! textures.insert("hill".to_string(), Raster::new(4, 4));
//!
//! let canvas = compose(&map, &textures)?;
//! assert_eq!(canvas.width(), 4);
//! # Ok::<(), zorya_map::Error>(())
//! ```

mod composite;
mod error;
mod manifest;
mod render;

pub use composite::{compose, RasterSource};
pub use error::{Error, Result};
pub use manifest::{Map, Tile};
pub use render::{Concurrency, MapRenderer, RenderStats};
