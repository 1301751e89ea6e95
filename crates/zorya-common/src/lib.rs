//! Common utilities for Zorya.
//!
//! This crate provides foundational types used across all Zorya crates:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices
//! - [`Raster`] - A flat ARGB pixel buffer with explicit dimensions

mod error;
mod raster;
mod reader;

pub use error::{Error, Result};
pub use raster::Raster;
pub use reader::BinaryReader;
