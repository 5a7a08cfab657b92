use tarpc::{
	context,
	tokio_serde::formats::Bincode,
	server::Channel
};
use serde::{Serialize, Deserialize};
use futures::{future, prelude::*};
use log::{info, warn, debug};
use super::{
	ring::Digest,
	config::*,
	data_store::*,
	error::*
};
use crate::{rpc::*, server::ServerManager};

// Data part of the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
	pub id: Digest,
	pub addr: String
}

impl std::fmt::Display for Node {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Node({}, {})", self.id, self.addr)
	}
}

/// A cache node serving one LRU store over RPC.
/// It knows nothing about the ring or other nodes.
#[derive(Clone)]
pub struct CacheNode {
	node: Node,
	store: DataStore,
	config: Config
}

impl CacheNode {
	pub fn new(node: Node, config: Config) -> Self {
		assert!(config.capacity != 0, "capacity equal to 0");

		CacheNode {
			node,
			store: DataStore::new(config.capacity),
			config
		}
	}

	pub fn store(&self) -> &DataStore {
		&self.store
	}

	/// Start the server
	/// Returns if the listener starts
	pub async fn start(&self) -> CacheResult<ServerManager> {
		// channel used to shutdown (true means shutdown)
		let (tx, rx) = tokio::sync::watch::channel(false);

		let mut listener = tarpc::serde_transport::tcp::listen(&self.node.addr, Bincode::default).await?;
		let server = self.clone();
		let mut listener_rx = rx.clone();
		// Listen for rpc call
		let listener_handle = tokio::spawn(async move {
			listener.config_mut().max_frame_length(usize::MAX);
			let listener_fut = listener
				.filter_map(|r| future::ready(r.ok()))
				.map(tarpc::server::BaseChannel::with_defaults)
				.map(|channel| async {
					// Clone a new server to share the store in Arc
					channel.execute(server.clone().serve()).await;
				})
				.buffer_unordered(server.config.max_connections as usize)
				.for_each(|_| async {});

			debug!("{}: listening", server.node);

			tokio::select! {
				_ = listener_fut => {
					warn!("{}: listener terminated", server.node);
				},
				_ = listener_rx.changed() => {
					debug!("{}: listener stopped gracefully", server.node);
				}
			};
		});

		info!("{}: listening at {} (capacity {})", self.node, self.node.addr, self.config.capacity);
		Ok(ServerManager::new(vec![listener_handle], tx))
	}
}

#[tarpc::server]
impl CacheService for CacheNode {
	async fn get_rpc(self, _: context::Context, key: Key) -> Option<Value> {
		debug!("{}: get_rpc {:?}", self.node, key);
		self.store.get(&key)
	}

	async fn set_rpc(self, _: context::Context, key: Key, value: Value) -> bool {
		debug!("{}: set_rpc {:?}", self.node, key);
		self.store.set(key, value)
	}

	async fn delete_rpc(self, _: context::Context, key: Key) -> bool {
		debug!("{}: delete_rpc {:?}", self.node, key);
		self.store.delete(&key)
	}

	async fn list_keys_rpc(self, _: context::Context) -> Vec<Key> {
		let keys = self.store.list_keys();
		debug!("{}: list_keys_rpc returns {} keys", self.node, keys.len());
		keys
	}
}
