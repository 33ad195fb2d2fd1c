//! Bulk deletion of the metatiles of one build from an object store.
//!
//! Every metatile of a build lives under a key derived from its tile
//! coordinate (see [`metatile_core::StorageKey`]). A [`pipeline::CleanupPipeline`]
//! enumerates all tiles of a zoom range, turns them into keys and deletes them
//! in batches through an [`store::ObjectStoreTrait`], using many workers at once.
//!
//! ```rust
//! use metatile_cleaner::{config::CleanerConfig, pipeline::CleanupPipeline, stats::RunStatistics, store::MockStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CleanerConfig {
//!         max_zoom: 1,
//!         ..CleanerConfig::new("abc123", "tiles")
//!     };
//!     let store = Arc::new(MockStore::new());
//!     let snapshot = CleanupPipeline::new(config.arc(), store.clone(), RunStatistics::new_arc())
//!         .run()
//!         .await?;
//!
//!     assert_eq!(snapshot.deleted, 5);
//!     assert_eq!(store.requested_keys().len(), 5);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod pipeline;
pub mod queue;
pub mod stats;
pub mod store;

pub use metatile_core as core;
