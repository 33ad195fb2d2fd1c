//! Run-wide deletion counters shared by every delete worker.
//!
//! ```
//! use metatile_cleaner::stats::RunStatistics;
//!
//! let stats = RunStatistics::new_arc();
//! stats.add(480, 20);
//! assert_eq!(stats.snapshot().progress_line(), "Deleted 480 objects (20 errors)");
//! ```

use std::{
	fmt,
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
};

/// Deleted and failed object counts, updated concurrently with atomic adds.
#[derive(Debug, Default)]
pub struct RunStatistics {
	deleted: AtomicU64,
	errors: AtomicU64,
}

impl RunStatistics {
	pub fn new_arc() -> Arc<RunStatistics> {
		Arc::new(RunStatistics::default())
	}

	/// Adds the result of one delete call.
	pub fn add(&self, deleted: u64, errors: u64) {
		self.deleted.fetch_add(deleted, Ordering::Relaxed);
		self.errors.fetch_add(errors, Ordering::Relaxed);
	}

	pub fn deleted(&self) -> u64 {
		self.deleted.load(Ordering::Relaxed)
	}

	pub fn errors(&self) -> u64 {
		self.errors.load(Ordering::Relaxed)
	}

	pub fn snapshot(&self) -> StatsSnapshot {
		StatsSnapshot {
			deleted: self.deleted(),
			errors: self.errors(),
		}
	}
}

/// A point-in-time copy of [`RunStatistics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
	pub deleted: u64,
	pub errors: u64,
}

impl StatsSnapshot {
	/// Number of keys the store has answered for, successfully or not.
	pub fn processed(&self) -> u64 {
		self.deleted + self.errors
	}

	/// Periodic progress line.
	pub fn progress_line(&self) -> String {
		format!("Deleted {} objects ({} errors)", self.deleted, self.errors)
	}

	/// Final summary line.
	pub fn summary_line(&self) -> String {
		format!("Done. Deleted {} metatiles with {} errors.", self.deleted, self.errors)
	}
}

impl fmt::Display for StatsSnapshot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.progress_line())
	}
}
