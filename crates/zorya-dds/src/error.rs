//! Error types for DDS handling.

use thiserror::Error;

use crate::header::{CompressionMode, FourCC};

/// Errors that can occur when working with DDS files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] zorya_common::Error),

    /// Invalid DDS magic.
    #[error("invalid DDS magic: expected 'DDS ', got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Invalid DDS header.
    #[error("invalid DDS header: {0}")]
    InvalidHeader(String),

    /// Recognized but unimplemented four-character code.
    #[error("unsupported compression format: {0}")]
    UnsupportedFourCc(FourCC),

    /// Uncompressed format with an unsupported bit depth.
    #[error("unsupported uncompressed bit count: {0}")]
    UnsupportedBitCount(u32),

    /// Encode requested with a target that is not a linear format.
    #[error("unsupported encode target: {0:?} (only uncompressed formats can be written)")]
    UnsupportedEncodeTarget(CompressionMode),

    /// Payload truncation that destroys the base mip level.
    #[error("corrupt texture data: {0}")]
    CorruptData(String),
}

/// Result type for DDS operations.
pub type Result<T> = std::result::Result<T, Error>;
