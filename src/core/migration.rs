use std::future::Future;
use tarpc::context;
use log::{info, warn, debug, error};
use super::{
	calculate_hash,
	data_store::Key,
	ring::{Digest, Transfer, in_arc},
	error::*
};
use crate::rpc::CacheServiceClient;

/// Outcome of one migration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
	// copied to the new owner and deleted from the old one
	pub moved: usize,
	// gone from the old owner before it could be copied
	pub skipped: usize,
	// some rpc failed; the key stays where it was
	pub failed: usize
}

/// Keys whose digest falls in the arc (start, end]
pub fn keys_in_arc(keys: Vec<Key>, start: Digest, end: Digest) -> Vec<Key> {
	keys.into_iter()
		.filter(|k| in_arc(calculate_hash(k.as_bytes()), start, end))
		.collect()
}

/// Best-effort move of one arc between two nodes.
/// No lock is held while data moves; every key is handled independently.
pub struct Migration {
	transfer: Transfer<CacheServiceClient>
}

impl Migration {
	pub fn new(transfer: Transfer<CacheServiceClient>) -> Self {
		Migration { transfer }
	}

	/// Run in the background once `after` resolves.
	/// `guard` is released once the migration finishes.
	pub fn spawn<F, G>(self, after: F, guard: G) -> MigrationHandle
	where
		F: Future<Output = ()> + Send + 'static,
		G: Send + 'static
	{
		let handle = tokio::spawn(async move {
			after.await;
			let result = self.run().await;
			drop(guard);
			if let Err(e) = result.as_ref() {
				error!("migration aborted: {}", e);
			}
			result
		});
		MigrationHandle { handle }
	}

	pub async fn run(self) -> CacheResult<MigrationReport> {
		let t = &self.transfer;
		info!("{}: migrating arc ({}, {}] to {}", t.from.node, t.pred, t.end, t.to.node);

		let keys = t.from.client.list_keys_rpc(context::current()).await?;
		let total = keys.len();
		let mut report = MigrationReport::default();
		for key in keys_in_arc(keys, t.pred, t.end) {
			match self.move_key(&key).await {
				Ok(true) => report.moved += 1,
				Ok(false) => report.skipped += 1,
				Err(e) => {
					error!("{}: fail to migrate key {:?} to {}: {}", t.from.node, key, t.to.node, e);
					report.failed += 1;
				}
			};
		}

		info!(
			"{}: migration to {} done ({} keys scanned): {:?}",
			t.from.node, t.to.node, total, report
		);
		Ok(report)
	}

	// Returns false if there was nothing to move
	async fn move_key(&self, key: &Key) -> CacheResult<bool> {
		let t = &self.transfer;
		let ctx = context::current();

		let value = match t.from.client.get_rpc(ctx, key.clone()).await? {
			Some(v) => v,
			None => {
				debug!("{}: key {:?} evicted before migration", t.from.node, key);
				return Ok(false);
			}
		};
		if !t.to.client.set_rpc(ctx, key.clone(), value).await? {
			warn!("{}: key {:?} rejected", t.to.node, key);
			return Ok(false);
		}
		t.from.client.delete_rpc(ctx, key.clone()).await?;
		Ok(true)
	}
}

/// Completion signal of a background migration.
/// Dropping it leaves the migration running detached.
pub struct MigrationHandle {
	handle: tokio::task::JoinHandle<CacheResult<MigrationReport>>
}

impl MigrationHandle {
	/// Wait for the migration to finish
	pub async fn wait(self) -> CacheResult<MigrationReport> {
		self.handle.await?
	}
}
