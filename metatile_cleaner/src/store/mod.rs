//! Object stores the delete workers talk to.
//!
//! A store only has to do one thing: delete up to
//! [`max_keys_per_request`](ObjectStoreTrait::max_keys_per_request) keys of a
//! bucket in one call and say which of them failed.
//!
//! - `Err(_)` from [`delete_objects`](ObjectStoreTrait::delete_objects) is a
//!   call-level failure (unknown bucket, denied access, broken connection).
//!   The pipeline treats it as fatal.
//! - Keys that could not be deleted inside an otherwise successful call are
//!   listed in [`DeleteOutcome::errors`] and only counted.
//!
//! Implementations:
//! - [`DirectoryStore`]: buckets are directories below a root directory.
//! - [`DryRunStore`]: deletes nothing and reports success.
//! - [`MockStore`]: records calls and fails on demand, for tests.

mod directory;
mod dry_run;
mod mock;

pub use directory::DirectoryStore;
pub use dry_run::DryRunStore;
pub use mock::MockStore;

use anyhow::Result;
use async_trait::async_trait;
use metatile_core::StorageKey;
use std::{fmt, path::Path, sync::Arc};

/// Most keys a single delete request may carry.
pub const MAX_DELETE_KEYS: usize = 500;

/// One key the store refused to delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyError {
	pub key: String,
	pub code: String,
	pub message: String,
}

impl fmt::Display for KeyError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {} ({})", self.key, self.message, self.code)
	}
}

/// Result of a successful delete call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
	pub deleted: u64,
	pub errors: Vec<KeyError>,
}

impl DeleteOutcome {
	pub fn error_count(&self) -> u64 {
		self.errors.len() as u64
	}
}

#[async_trait]
pub trait ObjectStoreTrait: fmt::Debug + Send + Sync {
	/// Short human readable description, used in log messages.
	fn name(&self) -> &str;

	fn max_keys_per_request(&self) -> usize {
		MAX_DELETE_KEYS
	}

	/// Deletes `keys` from `bucket` in one request.
	async fn delete_objects(&self, bucket: &str, keys: &[StorageKey]) -> Result<DeleteOutcome>;
}

/// Opens the store a run should use: a [`DryRunStore`] if `dry_run` is set,
/// otherwise a [`DirectoryStore`] rooted at `root`.
pub fn get_store(root: &Path, dry_run: bool) -> Result<Arc<dyn ObjectStoreTrait>> {
	if dry_run {
		return Ok(Arc::new(DryRunStore::new()));
	}
	Ok(Arc::new(DirectoryStore::open(root)?))
}
