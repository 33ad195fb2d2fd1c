//! A store backed by a local directory tree.
//!
//! ## Directory Structure
//! ```text
//! <root>/<bucket>/<hash5>/<build_id>/<z>/<x>/<y>.zip
//! ```
//!
//! A bucket is a directory directly below the root; an object is a file below
//! its bucket. This mirrors a synced copy of a bucket and is what the end to
//! end tests run against.
//!
//! Deleting a file that does not exist counts as deleted, like in an object
//! store. A missing bucket fails the whole call. Keys that would leave their
//! bucket are refused one by one.

use super::{DeleteOutcome, KeyError, ObjectStoreTrait};
use anyhow::{Result, bail, ensure};
use async_trait::async_trait;
use metatile_core::StorageKey;
use std::{
	io::ErrorKind,
	path::{Component, Path, PathBuf},
};

#[derive(Debug)]
pub struct DirectoryStore {
	root: PathBuf,
	name: String,
}

impl DirectoryStore {
	pub fn open(root: &Path) -> Result<DirectoryStore> {
		ensure!(root.is_dir(), "store root {root:?} is not a directory");
		Ok(DirectoryStore {
			root: root.to_path_buf(),
			name: format!("directory {}", root.display()),
		})
	}

	async fn bucket_path(&self, bucket: &str) -> Result<PathBuf> {
		ensure!(
			!bucket.is_empty() && bucket != "." && bucket != ".." && !bucket.contains(['/', '\\']),
			"invalid bucket name {bucket:?}"
		);
		let path = self.root.join(bucket);
		match tokio::fs::metadata(&path).await {
			Ok(meta) if meta.is_dir() => Ok(path),
			Ok(_) => bail!("bucket {bucket:?} in {:?} is not a directory", self.root),
			Err(e) if e.kind() == ErrorKind::NotFound => bail!("bucket {bucket:?} does not exist in {:?}", self.root),
			Err(e) => bail!("could not open bucket {bucket:?} in {:?}: {e}", self.root),
		}
	}
}

#[async_trait]
impl ObjectStoreTrait for DirectoryStore {
	fn name(&self) -> &str {
		&self.name
	}

	async fn delete_objects(&self, bucket: &str, keys: &[StorageKey]) -> Result<DeleteOutcome> {
		let bucket_path = self.bucket_path(bucket).await?;

		let mut outcome = DeleteOutcome::default();
		for key in keys {
			if !stays_inside_bucket(key.as_str()) {
				outcome.errors.push(KeyError {
					key: key.to_string(),
					code: "InvalidKey".to_string(),
					message: "key points outside of the bucket".to_string(),
				});
				continue;
			}
			match tokio::fs::remove_file(bucket_path.join(key.as_str())).await {
				Ok(()) => outcome.deleted += 1,
				Err(e) if e.kind() == ErrorKind::NotFound => outcome.deleted += 1,
				Err(e) => outcome.errors.push(KeyError {
					key: key.to_string(),
					code: format!("{:?}", e.kind()),
					message: e.to_string(),
				}),
			}
		}
		Ok(outcome)
	}
}

fn stays_inside_bucket(key: &str) -> bool {
	!key.contains('\\') && Path::new(key).components().all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use metatile_core::TileCoord;
	use rstest::rstest;
	use std::fs;

	fn key(z: u8, x: u32, y: u32) -> StorageKey {
		StorageKey::new("abc123", &TileCoord::new(z, x, y).unwrap())
	}

	fn touch(path: &Path) {
		fs::create_dir_all(path.parent().unwrap()).unwrap();
		fs::write(path, b"PK").unwrap();
	}

	#[tokio::test]
	async fn deletes_files_and_ignores_missing_ones() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let bucket = dir.path().join("tiles");
		let present = key(1, 0, 0);
		let absent = key(1, 1, 0);
		let other_build = StorageKey::new("zzz999", &TileCoord::new(1, 0, 0)?);
		touch(&bucket.join(present.as_str()));
		touch(&bucket.join(other_build.as_str()));

		let store = DirectoryStore::open(dir.path())?;
		let outcome = store.delete_objects("tiles", &[present.clone(), absent]).await?;

		assert_eq!(outcome, DeleteOutcome { deleted: 2, errors: vec![] });
		assert!(!bucket.join(present.as_str()).exists());
		assert!(bucket.join(other_build.as_str()).exists());
		Ok(())
	}

	#[tokio::test]
	async fn undeletable_key_is_a_key_error() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let bucket = dir.path().join("tiles");
		let blocked = key(0, 0, 0);
		// a non-empty directory where the file should be cannot be removed with remove_file
		touch(&bucket.join(blocked.as_str()).join("inner"));

		let store = DirectoryStore::open(dir.path())?;
		let outcome = store.delete_objects("tiles", &[blocked.clone(), key(1, 1, 1)]).await?;

		assert_eq!(outcome.deleted, 1);
		assert_eq!(outcome.errors.len(), 1);
		assert_eq!(outcome.errors[0].key, blocked.as_str());
		Ok(())
	}

	#[tokio::test]
	async fn missing_bucket_fails_the_call() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let store = DirectoryStore::open(dir.path())?;
		let err = store.delete_objects("nope", &[key(0, 0, 0)]).await.unwrap_err();
		assert!(err.to_string().contains("does not exist"), "{err}");
		Ok(())
	}

	#[tokio::test]
	async fn bucket_names_cannot_escape_the_root() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let store = DirectoryStore::open(dir.path())?;
		for bucket in ["", ".", "..", "a/b", "a\\b"] {
			assert!(store.delete_objects(bucket, &[key(0, 0, 0)]).await.is_err(), "{bucket:?}");
		}
		Ok(())
	}

	#[tokio::test]
	async fn keys_cannot_escape_the_bucket() -> Result<()> {
		let dir = tempfile::tempdir()?;
		let bucket = dir.path().join("tiles");
		let escaping = StorageKey::new("../..", &TileCoord::new(0, 0, 0)?);
		fs::create_dir_all(bucket.join(escaping.shard_prefix()))?;
		let outside = dir.path().join("0/0/0.zip");
		touch(&outside);

		let store = DirectoryStore::open(dir.path())?;
		let outcome = store.delete_objects("tiles", &[escaping.clone(), key(1, 0, 0)]).await?;

		assert_eq!(outcome.deleted, 1);
		assert_eq!(outcome.errors.len(), 1);
		assert_eq!(outcome.errors[0].key, escaping.as_str());
		assert_eq!(outcome.errors[0].code, "InvalidKey");
		assert!(outside.exists());
		Ok(())
	}

	#[rstest]
	#[case("df4c9/abc123/0/0/0.zip", true)]
	#[case("df4c9/../0/0/0.zip", false)]
	#[case("df4c9/./0/0/0.zip", false)]
	#[case("/etc/passwd", false)]
	#[case("df4c9\\..\\0.zip", false)]
	fn key_paths(#[case] key: &str, #[case] inside: bool) {
		assert_eq!(stays_inside_bucket(key), inside);
	}

	#[test]
	fn open_requires_a_directory() {
		let dir = tempfile::tempdir().unwrap();
		assert!(DirectoryStore::open(&dir.path().join("missing")).is_err());
		let file = dir.path().join("file");
		fs::write(&file, b"").unwrap();
		assert!(DirectoryStore::open(&file).is_err());
	}
}
