//! Error types for map compositing.

use thiserror::Error;

/// Errors that can occur when composing maps.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed tile manifest line.
    #[error("invalid tile line: {0:?}")]
    InvalidTileLine(String),

    /// Composite requested on a map with no tiles.
    #[error("map {0:?} has no tiles")]
    EmptyMap(String),

    /// A tile's texture could not be resolved.
    #[error("map {map:?}: no texture for tile {tile:?}")]
    MissingTexture { map: String, tile: String },

    /// Worker pool construction failed.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

/// Result type for map operations.
pub type Result<T> = std::result::Result<T, Error>;
