//! Tile-aligned bounding boxes for a single zoom level.
//!
//! A `TileBBox` describes a **rectangular region of Web‑Mercator tiles** at a
//! specific zoom level `z`. Coordinates are zero-based and inclusive on the
//! maximum side: `(x_min, y_min, x_max, y_max)`.
//!
//! ## Conventions
//! - Zoom level `z` is in the range `0..=31`.
//! - Tile coordinate range per axis is `0..=(2^z − 1)`.
//! - Y increases **downwards** (XYZ style, row 0 is the northernmost row)
//!   unless the bbox was flipped with [`TileBBox::flip_y`].
//!
//! ## Examples
//! ```
//! # use metatile_core::{GeoBBox, TileBBox};
//! let bb = TileBBox::from_geo(2, &GeoBBox::world()).unwrap();
//! assert_eq!(bb.as_array(), [0, 0, 3, 3]);
//! assert_eq!(bb.count_tiles(), 16);
//! ```

use crate::{GeoBBox, MAX_LEVEL, TileCoord};
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use std::fmt;

/// Keeps boxes that end exactly on a tile edge from pulling in the neighbouring tile.
const EDGE_EPSILON: f64 = 1e-10;

/// A rectangular, non-empty region of tiles at a specific zoom level.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct TileBBox {
	/// Zoom level of the bounding box.
	pub level: u8,
	x_min: u32,
	y_min: u32,
	x_max: u32,
	y_max: u32,
}

impl TileBBox {
	/// Creates a new `TileBBox` from inclusive minimum and maximum tile indices.
	///
	/// # Errors
	///
	/// - If `level` > 31.
	/// - If any coordinate exceeds the maximum allowed by the zoom level.
	/// - If `x_min > x_max` or `y_min > y_max`.
	pub fn from_min_and_max(level: u8, x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Result<TileBBox> {
		ensure!(level <= MAX_LEVEL, "level ({level}) must be <= {MAX_LEVEL}");

		let max = max_index(level);

		ensure!(x_min <= x_max, "x_min ({x_min}) must be <= x_max ({x_max})");
		ensure!(y_min <= y_max, "y_min ({y_min}) must be <= y_max ({y_max})");
		ensure!(x_max <= max, "x_max ({x_max}) must be <= max ({max})");
		ensure!(y_max <= max, "y_max ({y_max}) must be <= max ({max})");

		Ok(TileBBox {
			level,
			x_min,
			y_min,
			x_max,
			y_max,
		})
	}

	/// Computes the range of tiles at `level` that intersect the geographic `bbox`.
	///
	/// The north-west and south-east corners are projected to tile indices; the
	/// result is the inclusive range between them, clamped to the grid. Latitudes
	/// beyond the Mercator limit fall into the first or last row.
	///
	/// # Example
	/// ```
	/// # use metatile_core::{GeoBBox, TileBBox};
	/// let bbox = GeoBBox::new(8.0653, 51.3563, 12.3528, 52.2564).unwrap();
	/// let bb = TileBBox::from_geo(9, &bbox).unwrap();
	/// assert_eq!(bb.as_array(), [267, 168, 273, 170]);
	/// ```
	pub fn from_geo(level: u8, bbox: &GeoBBox) -> Result<TileBBox> {
		ensure!(level <= MAX_LEVEL, "level ({level}) must be <= {MAX_LEVEL}");

		let west = (bbox.x_min + EDGE_EPSILON).min(bbox.x_max);
		let east = (bbox.x_max - EDGE_EPSILON).max(west);
		let north = (bbox.y_max - EDGE_EPSILON).max(bbox.y_min);
		let south = (bbox.y_min + EDGE_EPSILON).min(north);

		let nw = TileCoord::from_geo(west, north, level)?;
		let se = TileCoord::from_geo(east, south, level)?;

		Self::from_min_and_max(level, nw.x, nw.y, se.x.max(nw.x), se.y.max(nw.y))
			.with_context(|| format!("Failed to convert {bbox:?} to TileBBox at level {level}"))
	}

	/// Minimum x‑tile (column) coordinate.
	#[must_use]
	#[inline]
	pub fn x_min(&self) -> u32 {
		self.x_min
	}

	/// Minimum y‑tile (row) coordinate.
	#[must_use]
	#[inline]
	pub fn y_min(&self) -> u32 {
		self.y_min
	}

	/// Maximum x‑tile (column) coordinate, inclusive.
	#[must_use]
	#[inline]
	pub fn x_max(&self) -> u32 {
		self.x_max
	}

	/// Maximum y‑tile (row) coordinate, inclusive.
	#[must_use]
	#[inline]
	pub fn y_max(&self) -> u32 {
		self.y_max
	}

	/// Number of columns.
	#[must_use]
	pub fn width(&self) -> u32 {
		self.x_max - self.x_min + 1
	}

	/// Number of rows.
	#[must_use]
	pub fn height(&self) -> u32 {
		self.y_max - self.y_min + 1
	}

	/// Total number of tiles inside the bbox.
	#[must_use]
	pub fn count_tiles(&self) -> u64 {
		u64::from(self.width()) * u64::from(self.height())
	}

	/// Whether the bbox covers the whole level.
	#[must_use]
	pub fn is_full(&self) -> bool {
		let max = max_index(self.level);
		self.x_min == 0 && self.y_min == 0 && self.x_max == max && self.y_max == max
	}

	/// Whether `coord` lies inside the bbox (same level required).
	#[must_use]
	pub fn contains(&self, coord: &TileCoord) -> bool {
		coord.level == self.level
			&& coord.x >= self.x_min
			&& coord.x <= self.x_max
			&& coord.y >= self.y_min
			&& coord.y <= self.y_max
	}

	/// `[x_min, y_min, x_max, y_max]`.
	#[must_use]
	pub fn as_array(&self) -> [u32; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	/// Mirrors the bbox vertically, switching between north-origin and south-origin rows.
	pub fn flip_y(&mut self) {
		let max = max_index(self.level);
		(self.y_min, self.y_max) = (max - self.y_max, max - self.y_min);
	}

	/// Returns an iterator over all tile coordinates within the bounding box.
	///
	/// The iteration is in row-major order: for each row, every column.
	pub fn iter_coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
		self.into_iter_coords()
	}

	/// Consumes the bounding box and returns an iterator over all tile coordinates within it.
	pub fn into_iter_coords(self) -> impl Iterator<Item = TileCoord> {
		let y_range = self.y_min..=self.y_max;
		let x_range = self.x_min..=self.x_max;
		y_range.cartesian_product(x_range).map(move |(y, x)| TileCoord {
			level: self.level,
			x,
			y,
		})
	}
}

fn max_index(level: u8) -> u32 {
	((1u64 << level) - 1) as u32
}

impl fmt::Debug for TileBBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}: [{},{},{},{}] ({})",
			self.level,
			self.x_min,
			self.y_min,
			self.x_max,
			self.y_max,
			self.count_tiles()
		)
	}
}
