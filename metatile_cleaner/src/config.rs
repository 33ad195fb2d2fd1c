//! Settings of a cleanup run.

use crate::{queue::DEFAULT_QUEUE_SIZE, store::MAX_DELETE_KEYS};
use anyhow::{Result, ensure};
use metatile_core::{GeoBBox, MAX_LEVEL, TileEnumeration};
use std::{sync::Arc, time::Duration};

pub const DEFAULT_CONCURRENCY: usize = 32;
pub const DEFAULT_MAX_ZOOM: u8 = 13;

#[derive(Clone, Debug)]
pub struct CleanerConfig {
	/// Build whose metatiles are deleted.
	pub build_id: String,
	pub bucket: String,
	/// Number of delete workers.
	pub concurrency: usize,
	pub min_zoom: u8,
	pub max_zoom: u8,
	pub bounds: GeoBBox,
	/// Use south-origin (TMS) row numbering.
	pub inverted_y: bool,
	/// Keys per delete request.
	pub batch_size: usize,
	/// Capacity of the tile queue between producer and workers.
	pub queue_size: usize,
	/// Interval between progress lines.
	pub report_interval: Duration,
}

impl CleanerConfig {
	pub fn new(build_id: &str, bucket: &str) -> CleanerConfig {
		CleanerConfig {
			build_id: build_id.to_string(),
			bucket: bucket.to_string(),
			..CleanerConfig::default()
		}
	}

	pub fn arc(self) -> Arc<Self> {
		Arc::new(self)
	}

	/// Checks the settings before any work starts.
	pub fn validate(&self) -> Result<()> {
		ensure!(!self.build_id.is_empty(), "Specify build-id");
		ensure!(
			self.build_id != "." && self.build_id != ".." && !self.build_id.contains(['/', '\\']),
			"build-id {:?} must be a single path segment",
			self.build_id
		);
		ensure!(!self.bucket.is_empty(), "Specify bucket");
		ensure!(self.concurrency > 0, "concurrency must be at least 1");
		ensure!(
			self.max_zoom <= MAX_LEVEL,
			"max zoom ({}) must be <= {MAX_LEVEL}",
			self.max_zoom
		);
		ensure!(
			self.min_zoom <= self.max_zoom,
			"min zoom ({}) must be <= max zoom ({})",
			self.min_zoom,
			self.max_zoom
		);
		ensure!(
			(1..=MAX_DELETE_KEYS).contains(&self.batch_size),
			"batch size ({}) must be between 1 and {MAX_DELETE_KEYS}",
			self.batch_size
		);
		ensure!(self.queue_size > 0, "queue size must be at least 1");
		ensure!(!self.report_interval.is_zero(), "report interval must not be zero");
		Ok(())
	}

	/// The tiles of this run: every level from `min_zoom` to `max_zoom` inside `bounds`.
	pub fn enumeration(&self) -> Result<TileEnumeration> {
		TileEnumeration::from_range(self.bounds, self.min_zoom, self.max_zoom, self.inverted_y)
	}
}

impl Default for CleanerConfig {
	fn default() -> Self {
		CleanerConfig {
			build_id: String::new(),
			bucket: String::new(),
			concurrency: DEFAULT_CONCURRENCY,
			min_zoom: 0,
			max_zoom: DEFAULT_MAX_ZOOM,
			bounds: GeoBBox::world(),
			inverted_y: false,
			batch_size: MAX_DELETE_KEYS,
			queue_size: DEFAULT_QUEUE_SIZE,
			report_interval: Duration::from_secs(1),
		}
	}
}
