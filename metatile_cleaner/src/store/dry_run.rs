use super::{DeleteOutcome, ObjectStoreTrait};
use anyhow::Result;
use async_trait::async_trait;
use metatile_core::StorageKey;

/// Deletes nothing and reports every key as deleted.
///
/// Useful to check the enumeration and the key format before touching a real bucket;
/// run with `-vvv` to see every key.
#[derive(Debug, Default)]
pub struct DryRunStore {}

impl DryRunStore {
	pub fn new() -> DryRunStore {
		DryRunStore {}
	}
}

#[async_trait]
impl ObjectStoreTrait for DryRunStore {
	fn name(&self) -> &str {
		"dry run"
	}

	async fn delete_objects(&self, bucket: &str, keys: &[StorageKey]) -> Result<DeleteOutcome> {
		for key in keys {
			log::trace!("would delete {bucket}/{key}");
		}
		Ok(DeleteOutcome {
			deleted: keys.len() as u64,
			errors: Vec::new(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use metatile_core::TileCoord;

	#[tokio::test]
	async fn reports_everything_as_deleted() -> Result<()> {
		let keys: Vec<StorageKey> = (0..4)
			.map(|x| StorageKey::new("b", &TileCoord::new(2, x, 0).unwrap()))
			.collect();
		let outcome = DryRunStore::new().delete_objects("tiles", &keys).await?;
		assert_eq!(outcome.deleted, 4);
		assert!(outcome.errors.is_empty());
		Ok(())
	}
}
