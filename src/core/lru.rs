//! Bounded LRU map backed by a slot arena.
//!
//! The recency list is doubly linked through slot indices instead of
//! pointers: `front` is the most recently used slot, `back` the least.
//! Slots freed by eviction or deletion are reused by later inserts, so a
//! full cache does not allocate per operation.

use std::{
	collections::HashMap,
	mem
};

pub type Key = String;
pub type Value = String;

struct Slot {
	key: Key,
	value: Value,
	prev: Option<usize>,
	next: Option<usize>
}

pub struct LruCache {
	capacity: usize,
	slots: Vec<Slot>,
	// indices of vacant slots
	free: Vec<usize>,
	index: HashMap<Key, usize>,
	front: Option<usize>,
	back: Option<usize>
}

impl LruCache {
	pub fn new(capacity: usize) -> Self {
		assert!(capacity != 0, "capacity equal to 0");

		LruCache {
			capacity,
			slots: Vec::with_capacity(capacity),
			free: Vec::new(),
			index: HashMap::with_capacity(capacity),
			front: None,
			back: None
		}
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}

	/// Look up a key and mark it as most recently used
	pub fn get(&mut self, key: &str) -> Option<&Value> {
		let i = *self.index.get(key)?;
		self.move_to_front(i);
		Some(&self.slots[i].value)
	}

	/// Insert or overwrite a key, making it the most recently used.
	/// Returns the key evicted to make room, if any.
	pub fn set(&mut self, key: Key, value: Value) -> Option<Key> {
		if let Some(&i) = self.index.get(&key) {
			self.slots[i].value = value;
			self.move_to_front(i);
			return None;
		}

		let evicted = if self.len() >= self.capacity {
			self.evict_lru().map(|(k, _)| k)
		} else {
			None
		};

		let slot = Slot {
			key: key.clone(),
			value,
			prev: None,
			next: None
		};
		let i = match self.free.pop() {
			Some(i) => {
				self.slots[i] = slot;
				i
			},
			None => {
				self.slots.push(slot);
				self.slots.len() - 1
			}
		};
		self.push_front(i);
		self.index.insert(key, i);
		evicted
	}

	/// Remove a key; returns whether it was present
	pub fn delete(&mut self, key: &str) -> bool {
		match self.index.remove(key) {
			Some(i) => {
				self.release(i);
				true
			},
			None => false
		}
	}

	/// All resident keys, in no particular order
	pub fn keys(&self) -> Vec<Key> {
		self.index.keys().cloned().collect()
	}

	/// Entries from most to least recently used
	pub fn iter(&self) -> Iter<'_> {
		Iter {
			cache: self,
			cursor: self.front
		}
	}

	/// Unlink the least recently used entry and return it
	pub fn evict_lru(&mut self) -> Option<(Key, Value)> {
		let i = self.back?;
		let key = mem::take(&mut self.slots[i].key);
		self.index.remove(&key);
		let value = self.release(i);
		Some((key, value))
	}

	// Unlink slot i, put it on the free list and hand back its value
	fn release(&mut self, i: usize) -> Value {
		self.unlink(i);
		self.free.push(i);
		let slot = &mut self.slots[i];
		slot.key.clear();
		mem::take(&mut slot.value)
	}

	fn move_to_front(&mut self, i: usize) {
		if self.front == Some(i) {
			return;
		}
		self.unlink(i);
		self.push_front(i);
	}

	fn unlink(&mut self, i: usize) {
		let (prev, next) = (self.slots[i].prev, self.slots[i].next);
		match prev {
			Some(p) => self.slots[p].next = next,
			None => self.front = next
		};
		match next {
			Some(n) => self.slots[n].prev = prev,
			None => self.back = prev
		};
		self.slots[i].prev = None;
		self.slots[i].next = None;
	}

	fn push_front(&mut self, i: usize) {
		self.slots[i].prev = None;
		self.slots[i].next = self.front;
		match self.front {
			Some(f) => self.slots[f].prev = Some(i),
			None => self.back = Some(i)
		};
		self.front = Some(i);
	}
}

pub struct Iter<'a> {
	cache: &'a LruCache,
	cursor: Option<usize>
}

impl<'a> Iterator for Iter<'a> {
	type Item = (&'a Key, &'a Value);

	fn next(&mut self) -> Option<Self::Item> {
		let cache: &'a LruCache = self.cache;
		let slot = &cache.slots[self.cursor?];
		self.cursor = slot.next;
		Some((&slot.key, &slot.value))
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn recency(cache: &LruCache) -> Vec<&str> {
		cache.iter().map(|(k, _)| k.as_str()).collect()
	}

	#[test]
	fn test_get_set_round_trip() {
		let mut cache = LruCache::new(4);
		assert_eq!(cache.get("a"), None);
		assert_eq!(cache.set("a".to_string(), "1".to_string()), None);
		assert_eq!(cache.get("a").map(String::as_str), Some("1"));

		// overwrite keeps size and promotes
		cache.set("b".to_string(), "2".to_string());
		cache.set("a".to_string(), "3".to_string());
		assert_eq!(cache.len(), 2);
		assert_eq!(cache.get("a").map(String::as_str), Some("3"));
		assert_eq!(recency(&cache), vec!["a", "b"]);
	}

	#[test]
	fn test_capacity_invariant() {
		let mut cache = LruCache::new(3);
		for i in 0..20 {
			cache.set(format!("k{}", i % 7), i.to_string());
			assert!(cache.len() <= cache.capacity());
		}
		assert_eq!(cache.len(), 3);
		// arena never grows beyond capacity
		assert_eq!(cache.slots.len(), 3);
	}

	#[test]
	fn test_eviction_order() {
		let mut cache = LruCache::new(3);
		cache.set("a".to_string(), "1".to_string());
		cache.set("b".to_string(), "2".to_string());
		cache.set("c".to_string(), "3".to_string());

		// touching "a" makes "b" the least recently used
		cache.get("a");
		assert_eq!(cache.set("d".to_string(), "4".to_string()), Some("b".to_string()));
		assert_eq!(cache.get("b"), None);
		assert_eq!(recency(&cache), vec!["d", "a", "c"]);

		// overwriting "c" promotes it, so "a" goes next
		assert_eq!(cache.set("c".to_string(), "5".to_string()), None);
		assert_eq!(cache.set("e".to_string(), "6".to_string()), Some("a".to_string()));
		assert_eq!(recency(&cache), vec!["e", "c", "d"]);
	}

	#[test]
	fn test_delete() {
		let mut cache = LruCache::new(3);
		assert!(!cache.delete("a"));
		assert!(cache.is_empty());

		cache.set("a".to_string(), "1".to_string());
		cache.set("b".to_string(), "2".to_string());
		cache.set("c".to_string(), "3".to_string());
		// unlink from the middle, front and back
		assert!(cache.delete("b"));
		assert!(!cache.delete("b"));
		assert_eq!(recency(&cache), vec!["c", "a"]);
		assert!(cache.delete("c"));
		assert_eq!(recency(&cache), vec!["a"]);
		assert!(cache.delete("a"));
		assert!(cache.is_empty());
		assert_eq!(cache.iter().count(), 0);

		// freed slots are reused
		cache.set("x".to_string(), "1".to_string());
		cache.set("y".to_string(), "2".to_string());
		assert_eq!(cache.slots.len(), 3);
		assert_eq!(recency(&cache), vec!["y", "x"]);
	}

	#[test]
	fn test_evict_lru() {
		let mut cache = LruCache::new(2);
		assert_eq!(cache.evict_lru(), None);
		cache.set("a".to_string(), "1".to_string());
		cache.set("b".to_string(), "2".to_string());
		assert_eq!(cache.evict_lru(), Some(("a".to_string(), "1".to_string())));
		assert_eq!(cache.evict_lru(), Some(("b".to_string(), "2".to_string())));
		assert_eq!(cache.evict_lru(), None);
		assert!(cache.is_empty());
	}

	#[test]
	fn test_keys() {
		let mut cache = LruCache::new(2);
		cache.set("a".to_string(), "1".to_string());
		cache.set("b".to_string(), "2".to_string());
		cache.set("c".to_string(), "3".to_string());
		let mut keys = cache.keys();
		keys.sort();
		assert_eq!(keys, vec!["b".to_string(), "c".to_string()]);
	}

	#[test]
	#[should_panic]
	fn test_zero_capacity() {
		LruCache::new(0);
	}
}
