use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, oneshot};
use tarpc::{
	context,
	tokio_serde::formats::Bincode,
	server::Channel
};
use futures::{future, prelude::*};
use log::{info, warn, debug, error};
use super::{
	construct_node,
	Node,
	config::*,
	data_store::{Key, Value},
	ring::{HashRing, NodeHandle, Transfer},
	migration::{Migration, MigrationHandle},
	error::*
};
use crate::{
	client::setup_client,
	rpc::*,
	server::ServerManager
};

type Handle = NodeHandle<CacheServiceClient>;
// Fires (or is dropped) when the last queued migration finishes
type QueueTail = Option<oneshot::Receiver<()>>;

/// Routes requests to cache nodes over a consistent hash ring.
/// Holds no cache data itself.
#[derive(Clone)]
pub struct Coordinator {
	config: Config,
	ring: Arc<RwLock<HashRing<CacheServiceClient>>>,
	// Serializes membership changes and the order their migrations run in.
	// Only held while the ring is updated.
	membership: Arc<Mutex<QueueTail>>
}

impl Coordinator {
	pub fn new(config: Config) -> Self {
		Coordinator {
			config,
			ring: Arc::new(RwLock::new(HashRing::new())),
			membership: Arc::new(Mutex::new(None))
		}
	}

	/// Seed the ring with initial nodes without moving any data
	pub async fn bootstrap(&self, addrs: &[String]) -> CacheResult<()> {
		let _guard = self.membership.lock().await;
		for addr in addrs {
			let (node, client) = connect(addr).await?;
			self.ring.write().unwrap().add_node(node.clone(), client)?;
			info!("coordinator: {} on the ring", node);
		}
		Ok(())
	}

	// Copy the owner out so no lock is held across rpc calls
	fn resolve(&self, key: &str) -> CacheResult<Handle> {
		self.ring.read().unwrap().resolve_owner(key)
	}

	/// Node currently owning a key
	pub fn owner(&self, key: &str) -> CacheResult<Node> {
		Ok(self.resolve(key)?.node)
	}

	/// Nodes in ring order
	pub fn nodes(&self) -> Vec<Node> {
		self.ring.read().unwrap().nodes()
	}

	/// Get a key from its owner.
	/// A key not yet migrated to its new owner reads as a miss.
	pub async fn get(&self, key: &str) -> CacheResult<Option<Value>> {
		let owner = self.resolve(key)?;
		let value = owner.client.get_rpc(context::current(), key.to_string()).await?;
		debug!("coordinator: get {:?} from {}: {}", key, owner.node, if value.is_some() { "hit" } else { "miss" });
		Ok(value)
	}

	pub async fn set(&self, key: Key, value: Value) -> CacheResult<bool> {
		let owner = self.resolve(&key)?;
		debug!("coordinator: set {:?} on {}", key, owner.node);
		Ok(owner.client.set_rpc(context::current(), key, value).await?)
	}

	pub async fn delete(&self, key: &str) -> CacheResult<bool> {
		let owner = self.resolve(key)?;
		debug!("coordinator: delete {:?} on {}", key, owner.node);
		Ok(owner.client.delete_rpc(context::current(), key.to_string()).await?)
	}

	/// Put a new node on the ring.
	/// Returns once the ring is updated; the arc it takes over
	/// is migrated in the background (None if the ring was empty).
	/// Migrations run one at a time, in the order the ring changed.
	pub async fn add_node(&self, addr: &str) -> CacheResult<Option<MigrationHandle>> {
		let mut tail = self.membership.lock().await;
		let (node, client) = connect(addr).await?;
		let transfer = self.ring.write().unwrap().add_node(node.clone(), client)?;
		info!("coordinator: {} joined the ring", node);
		Ok(transfer.map(|t| enqueue_migration(&mut tail, t)))
	}

	/// Take a node off the ring and drain its arc into the successor.
	/// The node process itself keeps running.
	pub async fn remove_node(&self, addr: &str) -> CacheResult<Option<MigrationHandle>> {
		let mut tail = self.membership.lock().await;
		let (removed, transfer) = self.ring.write().unwrap().remove_node(addr)?;
		info!("coordinator: {} left the ring", removed.node);
		if transfer.is_none() {
			warn!("coordinator: last node removed, its data is dropped");
		}
		Ok(transfer.map(|t| enqueue_migration(&mut tail, t)))
	}

	/// Start the coordinator rpc server
	pub async fn start(&self, addr: &str) -> CacheResult<ServerManager> {
		// channel used to shutdown (true means shutdown)
		let (tx, rx) = tokio::sync::watch::channel(false);

		let mut listener = tarpc::serde_transport::tcp::listen(addr, Bincode::default).await?;
		let server = self.clone();
		let mut listener_rx = rx.clone();
		let listener_handle = tokio::spawn(async move {
			listener.config_mut().max_frame_length(usize::MAX);
			let listener_fut = listener
				.filter_map(|r| future::ready(r.ok()))
				.map(tarpc::server::BaseChannel::with_defaults)
				.map(|channel| async {
					channel.execute(server.clone().serve()).await;
				})
				.buffer_unordered(server.config.max_connections as usize)
				.for_each(|_| async {});

			tokio::select! {
				_ = listener_fut => {
					warn!("coordinator: listener terminated");
				},
				_ = listener_rx.changed() => {
					debug!("coordinator: listener stopped gracefully");
				}
			};
		});

		info!("coordinator: listening at {}", addr);
		Ok(ServerManager::new(vec![listener_handle], tx))
	}
}

async fn connect(addr: &str) -> CacheResult<(Node, CacheServiceClient)> {
	let node = construct_node(addr);
	debug!("coordinator: connecting to {}", node);
	let client = setup_client(addr).await?;
	Ok((node, client))
}

// Chain a migration after the previously queued one.
// A transfer's source may still be receiving its data from the one before.
fn enqueue_migration(tail: &mut QueueTail, transfer: Transfer<CacheServiceClient>) -> MigrationHandle {
	let (done, next) = oneshot::channel::<()>();
	let prev = tail.replace(next);
	let after = async move {
		if let Some(prev) = prev {
			// an error only means the sender was dropped, i.e. it finished
			let _ = prev.await;
		}
	};
	Migration::new(transfer).spawn(after, done)
}

#[tarpc::server]
impl CoordinatorService for Coordinator {
	async fn get_rpc(self, _: context::Context, key: Key) -> Result<Option<Value>, String> {
		self.get(&key).await.map_err(|e| {
			error!("coordinator: get_rpc failed: {}", e);
			e.to_string()
		})
	}

	async fn set_rpc(self, _: context::Context, key: Key, value: Value) -> bool {
		match self.set(key, value).await {
			Ok(stored) => stored,
			Err(e) => {
				error!("coordinator: set_rpc failed: {}", e);
				false
			}
		}
	}

	async fn delete_rpc(self, _: context::Context, key: Key) -> Result<bool, String> {
		self.delete(&key).await.map_err(|e| {
			error!("coordinator: delete_rpc failed: {}", e);
			e.to_string()
		})
	}

	// Returns once the ring is updated; the migration handle is dropped
	// and data moves detached
	async fn add_node_rpc(self, _: context::Context, addr: String) -> Result<(), String> {
		self.add_node(&addr).await
			.map(|_| ())
			.map_err(|e| e.to_string())
	}

	async fn remove_node_rpc(self, _: context::Context, addr: String) -> Result<(), String> {
		self.remove_node(&addr).await
			.map(|_| ())
			.map_err(|e| e.to_string())
	}

	async fn list_nodes_rpc(self, _: context::Context) -> Vec<Node> {
		self.nodes()
	}
}
