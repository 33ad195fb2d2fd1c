//! Three-dimensional tile coordinates in a Web Mercator pyramid
//!
//! This module provides the [`TileCoord`] type for addressing one metatile in a
//! slippy-map tile pyramid. It includes methods for:
//! - Creating and validating tile coordinates
//! - Projecting geographic coordinates onto the tile grid
//! - Flipping between north-origin (XYZ) and south-origin (TMS) row numbering
//!
//! # Examples
//!
//! ```
//! use metatile_core::TileCoord;
//!
//! let coord = TileCoord::new(5, 6, 7).unwrap();
//! assert_eq!(coord.level, 5);
//! assert_eq!(coord.x, 6);
//! assert_eq!(coord.y, 7);
//!
//! // Berlin at zoom 10
//! let coord = TileCoord::from_geo(13.404954, 52.520008, 10).unwrap();
//! assert_eq!((coord.x, coord.y), (550, 335));
//! ```

use anyhow::{Context, Result, ensure};
use std::{
	f64::consts::PI,
	fmt::{self, Debug},
};

/// The highest zoom level whose tile indices still fit into `u32`.
pub const MAX_LEVEL: u8 = 31;

/// A tile coordinate in a Web Mercator tile pyramid, with zoom level, x and y indices.
#[derive(Eq, PartialEq, Clone, Hash, Copy)]
pub struct TileCoord {
	/// The zoom level of the tile.
	pub level: u8,
	/// The x index (column) of the tile.
	pub x: u32,
	/// The y index (row) of the tile.
	pub y: u32,
}

impl TileCoord {
	/// Create a new `TileCoord` at the given zoom `level` and tile indices `x`, `y`.
	///
	/// # Errors
	/// Returns an error if `level` > 31 or if `x`/`y` are outside `[0, 2^level)`.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= MAX_LEVEL, "level ({level}) must be <= {MAX_LEVEL}");
		let max = 1u64 << level;
		ensure!(u64::from(x) < max, "x ({x}) out of bounds for level {level}");
		ensure!(u64::from(y) < max, "y ({y}) out of bounds for level {level}");
		Ok(TileCoord { level, x, y })
	}

	/// Create a `TileCoord` from geographic coordinates (longitude, latitude) at a given zoom level.
	///
	/// Uses the spherical Web Mercator projection. Latitudes beyond the Mercator
	/// limit (±85.0511°) and the east edge at 180° are clamped onto the grid, so
	/// the poles map to the first and last row.
	///
	/// # Arguments
	///
	/// * `x` - Longitude in degrees, range `[-180, 180]`
	/// * `y` - Latitude in degrees, range `[-90, 90]`
	/// * `z` - Zoom level, range `[0, 31]`
	///
	/// # Errors
	///
	/// Returns an error if coordinates are out of valid ranges.
	pub fn from_geo(x: f64, y: f64, z: u8) -> Result<TileCoord> {
		ensure!(z <= MAX_LEVEL, "z ({z}) must be <= {MAX_LEVEL}");
		ensure!(x >= -180., "x ({x}) must be >= -180");
		ensure!(x <= 180., "x ({x}) must be <= 180");
		ensure!(y >= -90., "y ({y}) must be >= -90");
		ensure!(y <= 90., "y ({y}) must be <= 90");

		let zoom: f64 = 2.0f64.powi(i32::from(z));
		let tx = zoom * (x / 360.0 + 0.5);
		let ty = zoom * (0.5 - 0.5 * (y * PI / 360.0 + PI / 4.0).tan().ln() / PI);

		// At exactly ±90° the projection diverges to ±inf (or NaN); `max`/`min` clamp both.
		let clamp = |v: f64| -> f64 { v.min(zoom - 1.0).max(0.0).floor() };

		TileCoord::new(z, clamp(tx) as u32, clamp(ty) as u32)
			.with_context(|| format!("Failed to convert geo coordinates ({x}, {y}, {z}) to TileCoord"))
	}

	/// Largest valid x or y index at this coordinate's level (`2^level - 1`).
	#[must_use]
	pub fn max_value(&self) -> u32 {
		((1u64 << self.level) - 1) as u32
	}

	/// Flip the y coordinate between north-origin and south-origin numbering.
	///
	/// # Examples
	///
	/// ```
	/// use metatile_core::TileCoord;
	///
	/// let mut coord = TileCoord::new(3, 1, 2).unwrap();
	/// coord.flip_y();
	/// assert_eq!(coord.y, 5); // 7 (max) - 2 = 5
	/// ```
	pub fn flip_y(&mut self) {
		self.y = self.max_value() - self.y;
	}

	/// Unprefixed object path `"{z}/{x}/{y}.zip"` of this metatile.
	#[must_use]
	pub fn as_path(&self) -> String {
		format!("{}/{}/{}.zip", self.level, self.x, self.y)
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!("TileCoord({}, [{}, {}])", &self.level, &self.x, &self.y))
	}
}

/// Lexicographic ordering: first by zoom `level`, then `y`, then `x`.
impl PartialOrd for TileCoord {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for TileCoord {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		(self.level, self.y, self.x).cmp(&(other.level, other.y, other.x))
	}
}
