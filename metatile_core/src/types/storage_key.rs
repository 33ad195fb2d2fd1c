//! Object keys of stored metatiles.
//!
//! Every metatile of a build is stored under
//!
//! ```text
//! <hash5>/<build_id>/<z>/<x>/<y>.zip
//! ```
//!
//! where `<hash5>` is the first five lowercase hex characters of the MD5 digest
//! of `"<z>/<x>/<y>.zip"`. The prefix spreads keys over the store's partitions
//! and, since it ignores the build id, a tile shards identically in every build.
//!
//! ```
//! use metatile_core::{StorageKey, TileCoord};
//!
//! let key = StorageKey::new("abc123", &TileCoord::new(0, 0, 0).unwrap());
//! assert_eq!(key.as_str(), "df4c9/abc123/0/0/0.zip");
//! assert_eq!(key.shard_prefix(), "df4c9");
//! ```

use crate::TileCoord;
use md5::{Digest, Md5};
use std::fmt;

/// Number of hex characters of the digest used as shard prefix.
pub const SHARD_PREFIX_LEN: usize = 5;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
	/// Derives the key of `coord` in build `build_id`.
	#[must_use]
	pub fn new(build_id: &str, coord: &TileCoord) -> StorageKey {
		let path = coord.as_path();
		let prefix = shard_prefix(&path);
		StorageKey(format!("{prefix}/{build_id}/{path}"))
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The hash-derived first path segment.
	#[must_use]
	pub fn shard_prefix(&self) -> &str {
		&self.0[..SHARD_PREFIX_LEN]
	}

	#[must_use]
	pub fn into_string(self) -> String {
		self.0
	}
}

fn shard_prefix(path: &str) -> String {
	let digest = Md5::digest(path.as_bytes());
	let mut hex = format!("{digest:x}");
	hex.truncate(SHARD_PREFIX_LEN);
	hex
}

impl fmt::Display for StorageKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl fmt::Debug for StorageKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "StorageKey({})", self.0)
	}
}

impl AsRef<str> for StorageKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<StorageKey> for String {
	fn from(key: StorageKey) -> Self {
		key.0
	}
}
