use anyhow::{Context, Result, bail, ensure};
use std::{fmt::Debug, str::FromStr};

/// A geographical bounding box (`GeoBBox`) represents a rectangular area on a map
/// defined by its minimum and maximum longitude (x) and latitude (y) coordinates.
///
/// The bounding box is defined by four `f64` values in degrees:
/// - `x_min` (west): Minimum longitude.
/// - `y_min` (south): Minimum latitude.
/// - `x_max` (east): Maximum longitude.
/// - `y_max` (north): Maximum latitude.
///
/// Boxes crossing the antimeridian (west > east) are rejected.
///
/// # Examples
///
/// ```
/// use metatile_core::GeoBBox;
///
/// let bbox = GeoBBox::new(-10.0, -5.0, 10.0, 5.0).unwrap();
/// assert_eq!(bbox.as_array(), [-10.0, -5.0, 10.0, 5.0]);
///
/// let bbox: GeoBBox = "13.08,52.33,13.76,52.68".parse().unwrap();
/// assert_eq!(bbox.as_array(), [13.08, 52.33, 13.76, 52.68]);
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl GeoBBox {
	/// Creates a new `GeoBBox` from `west, south, east, north`.
	///
	/// # Errors
	/// Returns an error if a value is outside the WGS84 range or if a minimum exceeds its maximum.
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		}
		.checked()
	}

	/// The whole world, `-180, -90, 180, 90`.
	#[must_use]
	pub fn world() -> GeoBBox {
		GeoBBox {
			x_min: -180.0,
			y_min: -90.0,
			x_max: 180.0,
			y_max: 90.0,
		}
	}

	/// Returns the bounding box as a fixed‑size array `[west, south, east, north]`.
	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	fn checked(self) -> Result<Self> {
		ensure!(self.x_min >= -180., "x_min ({}) must be >= -180", self.x_min);
		ensure!(self.y_min >= -90., "y_min ({}) must be >= -90", self.y_min);
		ensure!(self.x_max <= 180., "x_max ({}) must be <= 180", self.x_max);
		ensure!(self.y_max <= 90., "y_max ({}) must be <= 90", self.y_max);
		ensure!(
			self.x_min <= self.x_max,
			"x_min ({}) must be <= x_max ({})",
			self.x_min,
			self.x_max
		);
		ensure!(
			self.y_min <= self.y_max,
			"y_min ({}) must be <= y_max ({})",
			self.y_min,
			self.y_max
		);
		Ok(self)
	}
}

impl Default for GeoBBox {
	fn default() -> Self {
		GeoBBox::world()
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"GeoBBox({}, {}, {}, {})",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}

impl TryFrom<Vec<f64>> for GeoBBox {
	type Error = anyhow::Error;

	/// Builds a `GeoBBox` from exactly four values `[west, south, east, north]`.
	fn try_from(input: Vec<f64>) -> Result<Self> {
		ensure!(
			input.len() == 4,
			"GeoBBox must have 4 elements (x_min, y_min, x_max, y_max), got {}",
			input.len()
		);
		GeoBBox::new(input[0], input[1], input[2], input[3])
			.with_context(|| format!("Failed to convert {input:?} to GeoBBox"))
	}
}

impl FromStr for GeoBBox {
	type Err = anyhow::Error;

	/// Parses four numbers separated by commas, semicolons or spaces.
	fn from_str(s: &str) -> Result<Self> {
		log::trace!("parsing bbox argument: {s:?}");
		let mut values = Vec::with_capacity(4);
		for part in s.split(&[' ', ',', ';']).filter(|p| !p.is_empty()) {
			match part.parse::<f64>() {
				Ok(v) => values.push(v),
				Err(_) => bail!("bbox value {part:?} is not a number"),
			}
		}
		ensure!(
			values.len() == 4,
			"bbox must contain exactly 4 numbers, but instead got: {s:?}"
		);
		GeoBBox::try_from(values)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn creation_and_accessors() {
		let bbox = GeoBBox::new(-10.0, -5.0, 10.0, 5.0).unwrap();
		assert_eq!(bbox.x_min, -10.0);
		assert_eq!(bbox.y_min, -5.0);
		assert_eq!(bbox.x_max, 10.0);
		assert_eq!(bbox.y_max, 5.0);
		assert_eq!(format!("{bbox:?}"), "GeoBBox(-10, -5, 10, 5)");
	}

	#[test]
	fn world_is_the_default() {
		assert_eq!(GeoBBox::default().as_array(), [-180.0, -90.0, 180.0, 90.0]);
		assert!(GeoBBox::world().checked().is_ok());
	}

	#[rstest]
	#[case(-181.0, 0.0, 0.0, 1.0)]
	#[case(0.0, -91.0, 1.0, 1.0)]
	#[case(0.0, 0.0, 181.0, 1.0)]
	#[case(0.0, 0.0, 1.0, 91.0)]
	#[case(10.0, 0.0, -10.0, 1.0)] // antimeridian crossing
	#[case(0.0, 10.0, 1.0, -10.0)]
	fn new_rejects_invalid_boxes(#[case] w: f64, #[case] s: f64, #[case] e: f64, #[case] n: f64) {
		assert!(GeoBBox::new(w, s, e, n).is_err());
	}

	#[rstest]
	#[case("-180,-90,180,90", [-180.0, -90.0, 180.0, 90.0])]
	#[case("1 2 3 4", [1.0, 2.0, 3.0, 4.0])]
	#[case("1;2;3;4", [1.0, 2.0, 3.0, 4.0])]
	#[case(" 8.0, 51.0 ,9.5,  52 ", [8.0, 51.0, 9.5, 52.0])]
	fn parse_valid(#[case] input: &str, #[case] expected: [f64; 4]) {
		let bbox: GeoBBox = input.parse().unwrap();
		assert_eq!(bbox.as_array(), expected);
	}

	#[rstest]
	#[case("1,2,3")]
	#[case("1,2,3,4,5")]
	#[case("a,2,3,4")]
	#[case("3,2,1,4")]
	fn parse_invalid(#[case] input: &str) {
		assert!(input.parse::<GeoBBox>().is_err());
	}

	#[test]
	fn try_from_vec_checks_length() {
		assert!(GeoBBox::try_from(vec![-10.0, -5.0, 10.0]).is_err());
		let bbox = GeoBBox::try_from(vec![-10.0, -5.0, 10.0, 5.0]).unwrap();
		assert_eq!(bbox.as_array(), [-10.0, -5.0, 10.0, 5.0]);
	}
}
