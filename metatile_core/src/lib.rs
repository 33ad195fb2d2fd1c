//! Tile math and key derivation for metatile-cleaner.
//!
//! - [`TileCoord`], [`TileBBox`] and [`GeoBBox`] describe tiles and areas.
//! - [`TileEnumeration`] lazily lists every tile of a pyramid.
//! - [`StorageKey`] maps a tile of a build to its object key.

pub mod types;
pub use types::*;
