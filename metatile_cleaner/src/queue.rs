//! Bounded hand-off of tile coordinates from the producer to the delete workers.
//!
//! The queue holds at most `capacity` coordinates. [`TileSender::send`] waits
//! while it is full, so the producer never runs further ahead of the workers
//! than that and never drops a tile. [`TileReceiver`] is cloneable; every clone
//! pulls from the same queue and gets `None` once the sender is dropped and all
//! queued coordinates have been taken.

use anyhow::{Result, ensure};
use metatile_core::TileCoord;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Default queue capacity.
pub const DEFAULT_QUEUE_SIZE: usize = 10_000;

/// Creates a queue that holds at most `capacity` coordinates.
pub fn tile_queue(capacity: usize) -> Result<(TileSender, TileReceiver)> {
	ensure!(capacity > 0, "queue capacity must be at least 1");
	let (sender, receiver) = mpsc::channel(capacity);
	Ok((
		TileSender { inner: sender },
		TileReceiver {
			inner: Arc::new(Mutex::new(receiver)),
		},
	))
}

/// Producing end. Dropping it closes the queue.
#[derive(Debug)]
pub struct TileSender {
	inner: mpsc::Sender<TileCoord>,
}

impl TileSender {
	/// Enqueues `coord`, waiting for free space while the queue is full.
	///
	/// Fails only if every receiver is gone.
	pub async fn send(&self, coord: TileCoord) -> Result<()> {
		self
			.inner
			.send(coord)
			.await
			.map_err(|e| anyhow::anyhow!("tile queue closed, could not enqueue {:?}", e.0))
	}

	/// Number of queued coordinates.
	pub fn len(&self) -> usize {
		self.inner.max_capacity() - self.inner.capacity()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Consuming end, shared by all workers.
#[derive(Clone, Debug)]
pub struct TileReceiver {
	inner: Arc<Mutex<mpsc::Receiver<TileCoord>>>,
}

impl TileReceiver {
	/// Takes the next coordinate, waiting while the queue is empty but still open.
	pub async fn recv(&self) -> Option<TileCoord> {
		self.inner.lock().await.recv().await
	}
}
