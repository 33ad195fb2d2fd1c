//! Mock store for testing.
//!
//! The `MockStore` remembers every delete call it receives and can be told to
//! fail a specific call outright, to report specific keys as undeletable, or
//! to take a while for each call.
//!
//! ```rust
//! use metatile_cleaner::store::{MockStore, ObjectStoreTrait};
//! use metatile_core::{StorageKey, TileCoord};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MockStore::new().fail_on_call(1);
//!     let key = StorageKey::new("abc123", &TileCoord::new(0, 0, 0).unwrap());
//!
//!     assert!(store.delete_objects("tiles", &[key.clone()]).await.is_ok());
//!     assert!(store.delete_objects("tiles", &[key]).await.is_err());
//!     assert_eq!(store.call_count(), 2);
//! }
//! ```

use super::{DeleteOutcome, KeyError, MAX_DELETE_KEYS, ObjectStoreTrait};
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use metatile_core::StorageKey;
use std::{
	collections::HashSet,
	sync::{Mutex, MutexGuard, PoisonError},
	time::Duration,
};

#[derive(Debug, Default)]
pub struct MockStore {
	calls: Mutex<Vec<(String, Vec<String>)>>,
	fail_on_call: Option<usize>,
	failing_keys: HashSet<String>,
	max_keys: Option<usize>,
	delay: Option<Duration>,
}

impl MockStore {
	pub fn new() -> MockStore {
		MockStore::default()
	}

	/// Makes the call with the zero-based index `index` fail with a call-level error.
	pub fn fail_on_call(mut self, index: usize) -> MockStore {
		self.fail_on_call = Some(index);
		self
	}

	/// Reports these keys as per-key errors whenever they are part of a call.
	pub fn with_failing_keys<I, K>(mut self, keys: I) -> MockStore
	where
		I: IntoIterator<Item = K>,
		K: Into<String>,
	{
		self.failing_keys.extend(keys.into_iter().map(Into::into));
		self
	}

	pub fn with_max_keys(mut self, max_keys: usize) -> MockStore {
		self.max_keys = Some(max_keys);
		self
	}

	/// Sleeps this long inside every call.
	pub fn with_delay(mut self, delay: Duration) -> MockStore {
		self.delay = Some(delay);
		self
	}

	fn lock_calls(&self) -> MutexGuard<'_, Vec<(String, Vec<String>)>> {
		self.calls.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Every call received so far as `(bucket, keys)`, including failed ones.
	pub fn calls(&self) -> Vec<(String, Vec<String>)> {
		self.lock_calls().clone()
	}

	pub fn call_count(&self) -> usize {
		self.lock_calls().len()
	}

	/// Sizes of all calls in the order they arrived.
	pub fn batch_sizes(&self) -> Vec<usize> {
		self.lock_calls().iter().map(|(_, keys)| keys.len()).collect()
	}

	/// All keys of all calls.
	pub fn requested_keys(&self) -> Vec<String> {
		self.lock_calls().iter().flat_map(|(_, keys)| keys.clone()).collect()
	}
}

#[async_trait]
impl ObjectStoreTrait for MockStore {
	fn name(&self) -> &str {
		"mock"
	}

	fn max_keys_per_request(&self) -> usize {
		self.max_keys.unwrap_or(MAX_DELETE_KEYS)
	}

	async fn delete_objects(&self, bucket: &str, keys: &[StorageKey]) -> Result<DeleteOutcome> {
		if keys.len() > self.max_keys_per_request() {
			bail!("MalformedXML: {} keys exceed the limit of {}", keys.len(), self.max_keys_per_request());
		}

		let index = {
			let mut calls = self.lock_calls();
			calls.push((bucket.to_string(), keys.iter().map(|k| k.to_string()).collect()));
			calls.len() - 1
		};

		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}

		if self.fail_on_call == Some(index) {
			return Err(anyhow!("AccessDenied: mock store rejected call {index}"));
		}

		let mut outcome = DeleteOutcome::default();
		for key in keys {
			if self.failing_keys.contains(key.as_str()) {
				outcome.errors.push(KeyError {
					key: key.to_string(),
					code: "InternalError".to_string(),
					message: "mock store could not delete the key".to_string(),
				});
			} else {
				outcome.deleted += 1;
			}
		}
		Ok(outcome)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use metatile_core::TileCoord;

	fn keys(n: u32) -> Vec<StorageKey> {
		(0..n)
			.map(|x| StorageKey::new("abc", &TileCoord::new(10, x, 0).unwrap()))
			.collect()
	}

	#[tokio::test]
	async fn records_calls() -> Result<()> {
		let store = MockStore::new();
		store.delete_objects("a", &keys(3)).await?;
		store.delete_objects("b", &keys(1)).await?;
		assert_eq!(store.batch_sizes(), vec![3, 1]);
		assert_eq!(store.calls()[1].0, "b");
		assert_eq!(store.requested_keys().len(), 4);
		Ok(())
	}

	#[tokio::test]
	async fn failing_keys_are_reported_per_key() -> Result<()> {
		let all = keys(4);
		let store = MockStore::new().with_failing_keys([all[1].to_string(), all[3].to_string()]);
		let outcome = store.delete_objects("a", &all).await?;
		assert_eq!(outcome.deleted, 2);
		assert_eq!(outcome.error_count(), 2);
		assert_eq!(outcome.errors[0].key, all[1].as_str());
		Ok(())
	}

	#[tokio::test]
	async fn rejects_oversized_requests() {
		let store = MockStore::new().with_max_keys(2);
		assert!(store.delete_objects("a", &keys(3)).await.is_err());
		assert_eq!(store.call_count(), 0);
	}
}
