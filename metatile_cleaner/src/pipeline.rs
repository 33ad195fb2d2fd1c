//! The cleanup run: one tile producer, many delete workers, one progress reporter.
//!
//! ```text
//!  TileEnumeration ──▶ producer ──▶ [ bounded tile queue ] ──▶ worker 1 ──▶ store
//!                                                         ├──▶ worker 2 ──▶ store
//!                                                         └──▶ worker N ──▶ store
//!                                   RunStatistics ◀── workers, ──▶ reporter (every second)
//! ```
//!
//! The producer walks the levels in ascending order and blocks while the queue
//! is full. Each worker turns tiles into storage keys and deletes them in
//! batches. When the producer is done it drops its sender, the workers drain
//! the queue, send their last partial batch and return.
//!
//! The first failing delete request ends the run: every other task is aborted,
//! no further requests are started, and [`CleanupPipeline::run`] returns the
//! error together with the counts collected until then.

use crate::{
	batch::BatchDeleter,
	config::CleanerConfig,
	queue::{TileReceiver, TileSender, tile_queue},
	stats::{RunStatistics, StatsSnapshot},
	store::ObjectStoreTrait,
};
use anyhow::{Context, Result};
use metatile_core::{StorageKey, TileEnumeration};
use std::{sync::Arc, time::Duration};
use tokio::{
	task::{JoinHandle, JoinSet},
	time::MissedTickBehavior,
};

pub struct CleanupPipeline {
	config: Arc<CleanerConfig>,
	store: Arc<dyn ObjectStoreTrait>,
	stats: Arc<RunStatistics>,
}

impl CleanupPipeline {
	pub fn new(config: Arc<CleanerConfig>, store: Arc<dyn ObjectStoreTrait>, stats: Arc<RunStatistics>) -> Self {
		CleanupPipeline { config, store, stats }
	}

	/// Deletes every metatile of the configured build and returns the final counts.
	///
	/// Consumes the pipeline, a run happens exactly once.
	pub async fn run(self) -> Result<StatsSnapshot> {
		let config = &self.config;
		config.validate()?;

		let enumeration = config.enumeration()?;
		log::info!(
			"Deleting {} metatiles of build {:?} (zoom {}..={}) from bucket {:?} in {}",
			enumeration.count_tiles()?,
			config.build_id,
			config.min_zoom,
			config.max_zoom,
			config.bucket,
			self.store.name()
		);

		let (sender, receiver) = tile_queue(config.queue_size)?;

		let mut workers = JoinSet::new();
		let build_id: Arc<str> = Arc::from(config.build_id.as_str());
		let bucket: Arc<str> = Arc::from(config.bucket.as_str());
		for _ in 0..config.concurrency {
			let deleter = BatchDeleter::new(
				self.store.clone(),
				self.stats.clone(),
				bucket.clone(),
				config.batch_size,
			)?;
			workers.spawn(delete_worker(receiver.clone(), deleter, build_id.clone()));
		}
		drop(receiver);
		log::info!("Starting {} delete workers", config.concurrency);

		let producer = tokio::spawn(produce_tiles(enumeration, sender));
		log::info!("Started tiles generator source");

		let reporter = tokio::spawn(report_progress(self.stats.clone(), config.report_interval));

		let result = wait_for_completion(producer, workers).await;
		reporter.abort();

		let snapshot = self.stats.snapshot();
		match result {
			Ok(()) => {
				log::info!("{}", snapshot.summary_line());
				Ok(snapshot)
			}
			Err(err) => {
				log::error!("{err:#}");
				log::error!(
					"Aborted. Deleted {} metatiles with {} errors before the failure.",
					snapshot.deleted,
					snapshot.errors
				);
				Err(err)
			}
		}
	}
}

/// Pushes every tile of the enumeration into the queue, one level after the other.
async fn produce_tiles(enumeration: TileEnumeration, sender: TileSender) -> Result<()> {
	for level in &enumeration.levels {
		let bbox = enumeration.bbox_at(*level)?;
		log::debug!("enumerating level {level}: {bbox:?}");
		for coord in bbox.into_iter_coords() {
			sender.send(coord).await?;
		}
	}
	log::debug!("all tiles enumerated, closing the queue");
	Ok(())
}

async fn delete_worker(receiver: TileReceiver, mut deleter: BatchDeleter, build_id: Arc<str>) -> Result<()> {
	while let Some(coord) = receiver.recv().await {
		deleter.accumulate(StorageKey::new(&build_id, &coord)).await?;
	}
	deleter.finish().await
}

async fn report_progress(stats: Arc<RunStatistics>, period: Duration) {
	let mut interval = tokio::time::interval(period);
	interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
	// the first tick completes immediately
	interval.tick().await;
	loop {
		interval.tick().await;
		log::info!("{}", stats.snapshot().progress_line());
	}
}

/// Waits for the workers and then the producer. On the first error everything
/// still running is aborted; the remaining workers are gone when this returns.
async fn wait_for_completion(producer: JoinHandle<Result<()>>, mut workers: JoinSet<Result<()>>) -> Result<()> {
	while let Some(joined) = workers.join_next().await {
		let outcome = joined.context("delete worker panicked").and_then(|result| result);
		if let Err(err) = outcome {
			producer.abort();
			workers.shutdown().await;
			return Err(err);
		}
	}
	log::debug!("all delete workers finished");

	producer.await.context("tile producer panicked")?
}
