use crate::core::{
	Node,
	data_store::{Key, Value}
};

/// Served by every cache node against its local store
#[tarpc::service]
pub trait CacheService {
	// None on a miss
	async fn get_rpc(key: Key) -> Option<Value>;
	async fn set_rpc(key: Key, value: Value) -> bool;
	// true iff the key existed
	async fn delete_rpc(key: Key) -> bool;
	async fn list_keys_rpc() -> Vec<Key>;
}

/// Served by the coordinator, routing each key to its owner on the ring
#[tarpc::service]
pub trait CoordinatorService {
	async fn get_rpc(key: Key) -> Result<Option<Value>, String>;
	async fn set_rpc(key: Key, value: Value) -> bool;
	async fn delete_rpc(key: Key) -> Result<bool, String>;

	// Membership changes return once the ring is updated;
	// data moves in the background
	async fn add_node_rpc(addr: String) -> Result<(), String>;
	async fn remove_node_rpc(addr: String) -> Result<(), String>;
	async fn list_nodes_rpc() -> Vec<Node>;
}
