use std::sync::{Arc, RwLock};
use log::debug;

pub use super::lru::{Key, Value};
use super::lru::LruCache;

pub trait KVStore {
	fn get(&self, key: &str) -> Option<Value>;
	fn set(&self, key: Key, value: Value) -> bool;
	fn delete(&self, key: &str) -> bool;
	fn list_keys(&self) -> Vec<Key>;
}

/// Thread-safe bounded LRU data store
#[derive(Clone)]
pub struct DataStore {
	data: Arc<RwLock<LruCache>>
}

impl DataStore {
	pub fn new(capacity: usize) -> Self {
		DataStore {
			data: Arc::new(RwLock::new(LruCache::new(capacity)))
		}
	}

	pub fn len(&self) -> usize {
		self.data.read().unwrap().len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.read().unwrap().is_empty()
	}
}

impl KVStore for DataStore {
	// A hit reorders the recency list, so even reads need the write lock
	fn get(&self, key: &str) -> Option<Value> {
		let mut data = self.data.write().unwrap();
		let value = data.get(key).cloned();
		debug!("get {:?}: {}", key, if value.is_some() { "hit" } else { "miss" });
		value
	}

	/**
	 * Set a key
	 * Overwrites an existing entry or inserts a new one,
	 * evicting the least recently used entry when full.
	 */
	fn set(&self, key: Key, value: Value) -> bool {
		debug!("set {:?}", key);
		let evicted = self.data.write().unwrap().set(key, value);
		if let Some(k) = evicted {
			debug!("evicted {:?}", k);
		}
		true
	}

	fn delete(&self, key: &str) -> bool {
		let removed = self.data.write().unwrap().delete(key);
		debug!("delete {:?}: {}", key, if removed { "removed" } else { "not found" });
		removed
	}

	fn list_keys(&self) -> Vec<Key> {
		self.data.read().unwrap().keys()
	}
}
