//! Enumeration of every metatile covering a geographic area over several zoom levels.
//!
//! A [`TileEnumeration`] is the description of one run: the area, the levels
//! and the row convention. It is cheap to clone, and iterating it is lazy and
//! restartable: calling [`TileEnumeration::iter_coords`] twice yields the same
//! sequence.
//!
//! ```
//! use metatile_core::{GeoBBox, TileEnumeration};
//!
//! let enumeration = TileEnumeration::from_range(GeoBBox::world(), 0, 2, false).unwrap();
//! assert_eq!(enumeration.count_tiles().unwrap(), 1 + 4 + 16);
//!
//! let first: Vec<String> = enumeration.iter_coords().unwrap().take(3).map(|c| c.as_path()).collect();
//! assert_eq!(first, ["0/0/0.zip", "1/0/0.zip", "1/1/0.zip"]);
//! ```

use crate::{GeoBBox, MAX_LEVEL, TileBBox, TileCoord};
use anyhow::{Result, ensure};

#[derive(Clone, Debug, PartialEq)]
pub struct TileEnumeration {
	pub bounds: GeoBBox,
	/// Levels in emission order.
	pub levels: Vec<u8>,
	/// Number rows from the south (TMS) instead of from the north (XYZ).
	pub inverted_y: bool,
}

impl TileEnumeration {
	pub fn new(bounds: GeoBBox, levels: Vec<u8>, inverted_y: bool) -> Result<TileEnumeration> {
		for level in &levels {
			ensure!(*level <= MAX_LEVEL, "level ({level}) must be <= {MAX_LEVEL}");
		}
		Ok(TileEnumeration {
			bounds,
			levels,
			inverted_y,
		})
	}

	/// Every level from `min_level` to `max_level`, ascending.
	pub fn from_range(bounds: GeoBBox, min_level: u8, max_level: u8, inverted_y: bool) -> Result<TileEnumeration> {
		ensure!(
			min_level <= max_level,
			"min level ({min_level}) must be <= max level ({max_level})"
		);
		TileEnumeration::new(bounds, (min_level..=max_level).collect(), inverted_y)
	}

	/// The tile range covering the bounds at a single `level`, already flipped if `inverted_y` is set.
	pub fn bbox_at(&self, level: u8) -> Result<TileBBox> {
		let mut bbox = TileBBox::from_geo(level, &self.bounds)?;
		if self.inverted_y {
			bbox.flip_y();
		}
		Ok(bbox)
	}

	/// Resolves the tile range of every level.
	pub fn bboxes(&self) -> Result<Vec<TileBBox>> {
		self.levels.iter().map(|level| self.bbox_at(*level)).collect()
	}

	/// Lazily yields every tile, level by level in the configured order.
	///
	/// All levels are validated before the first tile is produced, so the
	/// iterator itself cannot fail halfway through.
	pub fn iter_coords(&self) -> Result<impl Iterator<Item = TileCoord> + Send + use<>> {
		let bboxes = self.bboxes()?;
		Ok(bboxes.into_iter().flat_map(TileBBox::into_iter_coords))
	}

	/// Total number of tiles [`iter_coords`](Self::iter_coords) will produce.
	pub fn count_tiles(&self) -> Result<u64> {
		Ok(self.bboxes()?.iter().map(TileBBox::count_tiles).sum())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::collections::HashSet;

	#[rstest]
	#[case(0, 0, 1)]
	#[case(0, 1, 5)]
	#[case(0, 3, 85)]
	#[case(2, 4, 16 + 64 + 256)]
	fn world_counts(#[case] min: u8, #[case] max: u8, #[case] expected: u64) -> Result<()> {
		let e = TileEnumeration::from_range(GeoBBox::world(), min, max, false)?;
		assert_eq!(e.count_tiles()?, expected);
		assert_eq!(e.iter_coords()?.count() as u64, expected);
		Ok(())
	}

	#[test]
	fn levels_are_emitted_in_order_without_dedup() -> Result<()> {
		let e = TileEnumeration::from_range(GeoBBox::world(), 0, 4, false)?;
		let levels: Vec<u8> = e.iter_coords()?.map(|c| c.level).collect();
		assert!(levels.windows(2).all(|w| w[0] <= w[1]));

		let distinct: HashSet<TileCoord> = e.iter_coords()?.collect();
		assert_eq!(distinct.len() as u64, e.count_tiles()?);
		Ok(())
	}

	#[test]
	fn explicit_level_order_is_kept() -> Result<()> {
		let e = TileEnumeration::new(GeoBBox::world(), vec![2, 0, 1], false)?;
		let levels: Vec<u8> = e.iter_coords()?.map(|c| c.level).collect();
		assert_eq!(levels[..16], [2; 16]);
		assert_eq!(levels[16..], [0, 1, 1, 1, 1]);
		Ok(())
	}

	#[test]
	fn enumeration_is_deterministic() -> Result<()> {
		let bounds = GeoBBox::new(5.8, 47.2, 15.1, 55.1)?;
		let e = TileEnumeration::from_range(bounds, 3, 9, false)?;
		let a: Vec<TileCoord> = e.iter_coords()?.collect();
		let b: Vec<TileCoord> = e.clone().iter_coords()?.collect();
		assert_eq!(a, b);
		assert!(!a.is_empty());
		Ok(())
	}

	#[test]
	fn inverted_y_flips_rows_only() -> Result<()> {
		let bounds = GeoBBox::new(5.8, 47.2, 15.1, 55.1)?;
		let xyz = TileEnumeration::from_range(bounds, 6, 6, false)?;
		let tms = TileEnumeration::from_range(bounds, 6, 6, true)?;

		let mut flipped: Vec<TileCoord> = xyz
			.iter_coords()?
			.map(|mut c| {
				c.flip_y();
				c
			})
			.collect();
		let mut inverted: Vec<TileCoord> = tms.iter_coords()?.collect();
		flipped.sort();
		inverted.sort();
		assert_eq!(flipped, inverted);
		assert_eq!(xyz.count_tiles()?, tms.count_tiles()?);
		Ok(())
	}

	#[test]
	fn north_origin_puts_the_north_in_row_zero() -> Result<()> {
		let north = GeoBBox::new(-180.0, 0.0, 180.0, 90.0)?;
		let xyz = TileEnumeration::from_range(north, 1, 1, false)?;
		assert!(xyz.iter_coords()?.all(|c| c.y == 0));
		let tms = TileEnumeration::from_range(north, 1, 1, true)?;
		assert!(tms.iter_coords()?.all(|c| c.y == 1));
		Ok(())
	}

	#[test]
	fn invalid_levels_are_rejected() {
		assert!(TileEnumeration::from_range(GeoBBox::world(), 3, 2, false).is_err());
		assert!(TileEnumeration::from_range(GeoBBox::world(), 0, 32, false).is_err());
		assert!(TileEnumeration::new(GeoBBox::world(), vec![40], false).is_err());
	}
}
