//! Per-worker batching of storage keys into delete requests.
//!
//! Every delete worker owns one [`BatchDeleter`]. Keys are appended to a
//! private [`DeleteBatch`]; as soon as it holds `max_batch_size` keys it is
//! sent to the store in a single request and a fresh batch is started. The
//! trailing partial batch is sent by [`BatchDeleter::finish`].
//!
//! A failed request is returned as an error and ends the run. Keys the store
//! reports as undeletable are only counted; if one request reports more than
//! [`SAMPLE_ERROR_THRESHOLD`] of them, the first one is logged.

use crate::{
	stats::RunStatistics,
	store::{DeleteOutcome, ObjectStoreTrait},
};
use anyhow::{Context, Result, ensure};
use metatile_core::StorageKey;
use std::sync::Arc;

/// Per-request key error count above which a sample error is logged.
pub const SAMPLE_ERROR_THRESHOLD: usize = 10;

/// Keys waiting to be deleted from one bucket.
#[derive(Debug)]
pub struct DeleteBatch {
	bucket: Arc<str>,
	keys: Vec<StorageKey>,
}

impl DeleteBatch {
	pub fn new(bucket: Arc<str>, capacity: usize) -> DeleteBatch {
		DeleteBatch {
			bucket,
			keys: Vec::with_capacity(capacity),
		}
	}

	pub fn push(&mut self, key: StorageKey) {
		self.keys.push(key);
	}

	pub fn len(&self) -> usize {
		self.keys.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	pub fn bucket(&self) -> &str {
		&self.bucket
	}

	pub fn keys(&self) -> &[StorageKey] {
		&self.keys
	}
}

pub struct BatchDeleter {
	store: Arc<dyn ObjectStoreTrait>,
	stats: Arc<RunStatistics>,
	bucket: Arc<str>,
	max_batch_size: usize,
	batch: Option<DeleteBatch>,
}

impl BatchDeleter {
	/// # Errors
	/// Fails if `max_batch_size` is 0 or larger than the store accepts per request.
	pub fn new(
		store: Arc<dyn ObjectStoreTrait>,
		stats: Arc<RunStatistics>,
		bucket: Arc<str>,
		max_batch_size: usize,
	) -> Result<BatchDeleter> {
		ensure!(max_batch_size > 0, "batch size must be at least 1");
		ensure!(
			max_batch_size <= store.max_keys_per_request(),
			"batch size ({max_batch_size}) exceeds the {} keys {} accepts per request",
			store.max_keys_per_request(),
			store.name()
		);
		Ok(BatchDeleter {
			store,
			stats,
			bucket,
			max_batch_size,
			batch: None,
		})
	}

	/// Number of keys waiting in the current batch.
	pub fn pending(&self) -> usize {
		self.batch.as_ref().map_or(0, DeleteBatch::len)
	}

	/// Adds `key` to the batch and sends the batch once it is full.
	pub async fn accumulate(&mut self, key: StorageKey) -> Result<()> {
		let batch = self
			.batch
			.get_or_insert_with(|| DeleteBatch::new(self.bucket.clone(), self.max_batch_size));
		batch.push(key);

		if batch.len() >= self.max_batch_size {
			self.flush().await?;
		}
		Ok(())
	}

	/// Sends the current batch, if it has any keys, and starts over with an empty one.
	///
	/// The batch is discarded whether or not the request succeeds.
	pub async fn flush(&mut self) -> Result<DeleteOutcome> {
		let Some(batch) = self.batch.take() else {
			return Ok(DeleteOutcome::default());
		};
		if batch.is_empty() {
			return Ok(DeleteOutcome::default());
		}

		let outcome = self
			.store
			.delete_objects(batch.bucket(), batch.keys())
			.await
			.with_context(|| format!("Couldn't delete {} objects from bucket {:?}", batch.len(), batch.bucket()))?;

		if outcome.errors.len() > SAMPLE_ERROR_THRESHOLD {
			log::warn!(
				"{} of {} deletes failed, sample error: {}",
				outcome.errors.len(),
				batch.len(),
				outcome.errors[0]
			);
		}

		self.stats.add(outcome.deleted, outcome.error_count());
		Ok(outcome)
	}

	/// Sends the trailing partial batch.
	pub async fn finish(mut self) -> Result<()> {
		self.flush().await?;
		Ok(())
	}
}
