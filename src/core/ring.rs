use std::collections::HashMap;
use super::{
	Node,
	calculate_hash,
	error::{
		*,
		CacheError::*
	}
};

pub type Digest = u32;

// Strictly in range: id in (start, end)
pub fn in_range(id: Digest, start: Digest, end: Digest) -> bool {
	if end > start {
		// (start, id, end)
		id > start && id < end
	}
	else {
		// end <= start
		// case 1: (start, id, end + MAX_VAL)
		// case 2: (start, id + MAX_VAL, end + MAX_VAL)
		id > start || id < end
	}
}

// Arc owned by end: id in (start, end]
// start == end covers the whole ring
pub fn in_arc(id: Digest, start: Digest, end: Digest) -> bool {
	in_range(id, start, end) || id == end
}

/// A node on the ring together with the client used to reach it
#[derive(Debug, Clone)]
pub struct NodeHandle<C> {
	pub node: Node,
	pub client: C
}

/// Ownership of the arc (pred, end] passes from `from` to `to`
#[derive(Debug, Clone)]
pub struct Transfer<C> {
	pub pred: Digest,
	pub end: Digest,
	pub from: NodeHandle<C>,
	pub to: NodeHandle<C>
}

/// Consistent hash ring with one position per node
#[derive(Debug)]
pub struct HashRing<C> {
	// sorted ascending
	positions: Vec<Digest>,
	nodes: HashMap<Digest, NodeHandle<C>>
}

impl<C: Clone> Default for HashRing<C> {
	fn default() -> Self {
		Self::new()
	}
}

impl<C: Clone> HashRing<C> {
	pub fn new() -> Self {
		HashRing {
			positions: Vec::new(),
			nodes: HashMap::new()
		}
	}

	pub fn len(&self) -> usize {
		self.positions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.positions.is_empty()
	}

	/// Nodes in ring order
	pub fn nodes(&self) -> Vec<Node> {
		self.positions.iter()
			.map(|p| self.nodes[p].node.clone())
			.collect()
	}

	// Index of the first position >= id, wrapping to 0
	fn successor_index(&self, id: Digest) -> usize {
		let idx = self.positions.partition_point(|&p| p < id);
		if idx == self.positions.len() { 0 } else { idx }
	}

	fn predecessor_index(&self, idx: usize) -> usize {
		if idx == 0 { self.positions.len() - 1 } else { idx - 1 }
	}

	/// Node owning the given ring position
	pub fn owner_of(&self, id: Digest) -> CacheResult<NodeHandle<C>> {
		if self.is_empty() {
			return Err(EmptyRing);
		}
		let pos = self.positions[self.successor_index(id)];
		Ok(self.nodes[&pos].clone())
	}

	pub fn resolve_owner(&self, key: &str) -> CacheResult<NodeHandle<C>> {
		self.owner_of(calculate_hash(key.as_bytes()))
	}

	/// Insert a node.
	/// Returns the arc the new node takes over,
	/// or None if the ring was empty.
	pub fn add_node(&mut self, node: Node, client: C) -> CacheResult<Option<Transfer<C>>> {
		if let Some(h) = self.nodes.get(&node.id) {
			return Err(PositionTaken {
				position: node.id,
				node: h.node.clone()
			});
		}

		let old_owner = self.owner_of(node.id).ok();
		let idx = self.positions.partition_point(|&p| p < node.id);
		self.positions.insert(idx, node.id);
		let handle = NodeHandle { node, client };
		self.nodes.insert(handle.node.id, handle.clone());

		Ok(old_owner.map(|from| Transfer {
			pred: self.positions[self.predecessor_index(idx)],
			end: handle.node.id,
			from,
			to: handle
		}))
	}

	/// Remove a node by address.
	/// Returns the removed node and the arc its successor inherits
	/// (None if it was the last node). No data is moved here.
	pub fn remove_node(&mut self, addr: &str) -> CacheResult<(NodeHandle<C>, Option<Transfer<C>>)> {
		let id = match self.nodes.values().find(|h| h.node.addr == addr) {
			Some(h) => h.node.id,
			None => return Err(UnknownNode(addr.to_string()))
		};
		let idx = self.positions.partition_point(|&p| p < id);
		self.positions.remove(idx);
		let removed = match self.nodes.remove(&id) {
			Some(h) => h,
			None => return Err(UnknownNode(addr.to_string()))
		};

		if self.is_empty() {
			return Ok((removed, None));
		}
		let succ_idx = self.successor_index(id);
		let transfer = Transfer {
			pred: self.positions[self.predecessor_index(succ_idx)],
			end: id,
			from: removed.clone(),
			to: self.nodes[&self.positions[succ_idx]].clone()
		};
		Ok((removed, Some(transfer)))
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: Digest) -> Node {
		Node {
			id,
			addr: format!("localhost:{}", 9000 + id)
		}
	}

	fn ring(ids: &[Digest]) -> HashRing<()> {
		let mut r = HashRing::new();
		for &id in ids {
			r.add_node(node(id), ()).unwrap();
		}
		r
	}

	#[test]
	fn test_in_arc() {
		assert!(in_arc(65, 50, 70));
		assert!(in_arc(70, 50, 70));
		assert!(!in_arc(50, 50, 70));
		assert!(!in_arc(45, 50, 70));
		// wrapping arc (90, 5]
		assert!(in_arc(95, 90, 5));
		assert!(in_arc(3, 90, 5));
		assert!(in_arc(0, 90, 5));
		assert!(in_arc(Digest::MAX, 90, 5));
		assert!(!in_arc(7, 90, 5));
		assert!(!in_arc(90, 90, 5));
		// whole ring
		assert!(in_arc(0, 10, 10));
		assert!(in_arc(10, 10, 10));
		assert!(in_arc(11, 10, 10));
	}

	#[test]
	fn test_empty_ring() {
		let mut r = ring(&[]);
		assert!(matches!(r.owner_of(0), Err(EmptyRing)));
		assert!(matches!(r.resolve_owner("a"), Err(EmptyRing)));
		assert!(matches!(r.remove_node("localhost:9000"), Err(UnknownNode(_))));
		// the first node takes over nothing
		assert!(r.add_node(node(10), ()).unwrap().is_none());
	}

	#[test]
	fn test_single_node() {
		let r = ring(&[42]);
		for id in [0, 41, 42, 43, Digest::MAX] {
			assert_eq!(r.owner_of(id).unwrap().node.id, 42);
		}
		assert_eq!(r.resolve_owner("any key").unwrap().node.id, 42);
	}

	#[test]
	fn test_ownership() {
		let r = ring(&[90, 10, 50]);
		assert_eq!(r.nodes().iter().map(|n| n.id).collect::<Vec<_>>(), vec![10, 50, 90]);
		assert_eq!(r.owner_of(45).unwrap().node.id, 50);
		assert_eq!(r.owner_of(50).unwrap().node.id, 50);
		assert_eq!(r.owner_of(51).unwrap().node.id, 90);
		assert_eq!(r.owner_of(5).unwrap().node.id, 10);
		// wraparound past the largest position
		assert_eq!(r.owner_of(95).unwrap().node.id, 10);
		assert_eq!(r.owner_of(Digest::MAX).unwrap().node.id, 10);

		// deterministic for a fixed snapshot
		let a = r.resolve_owner("some key").unwrap().node.id;
		for _ in 0..10 {
			assert_eq!(r.resolve_owner("some key").unwrap().node.id, a);
		}
	}

	#[test]
	fn test_add_node_transfer() {
		let mut r = ring(&[10, 50, 90]);
		let t = r.add_node(node(70), ()).unwrap().unwrap();
		assert_eq!(t.pred, 50);
		assert_eq!(t.end, 70);
		assert_eq!(t.from.node.id, 90);
		assert_eq!(t.to.node.id, 70);

		assert_eq!(r.owner_of(65).unwrap().node.id, 70);
		assert_eq!(r.owner_of(45).unwrap().node.id, 50);
		assert_eq!(r.owner_of(80).unwrap().node.id, 90);
		assert_eq!(r.owner_of(95).unwrap().node.id, 10);

		// new smallest position splits the wrapping arc
		let t = r.add_node(node(5), ()).unwrap().unwrap();
		assert_eq!(t.pred, 90);
		assert_eq!(t.from.node.id, 10);
		assert_eq!(r.owner_of(95).unwrap().node.id, 5);
		assert_eq!(r.owner_of(7).unwrap().node.id, 10);

		// new largest position
		let t = r.add_node(node(99), ()).unwrap().unwrap();
		assert_eq!(t.pred, 90);
		assert_eq!(t.from.node.id, 5);
		assert_eq!(r.owner_of(95).unwrap().node.id, 99);
	}

	#[test]
	fn test_second_node_transfer() {
		let mut r = ring(&[50]);
		let t = r.add_node(node(20), ()).unwrap().unwrap();
		// arc (50, 20] wraps
		assert_eq!(t.pred, 50);
		assert_eq!(t.from.node.id, 50);
		assert!(in_arc(60, t.pred, t.end));
		assert!(in_arc(20, t.pred, t.end));
		assert!(!in_arc(30, t.pred, t.end));
	}

	#[test]
	fn test_position_taken() {
		let mut r = ring(&[10]);
		let other = Node {
			id: 10,
			addr: "elsewhere:1".to_string()
		};
		assert!(matches!(r.add_node(other, ()), Err(PositionTaken { position: 10, .. })));
		assert_eq!(r.len(), 1);
	}

	#[test]
	fn test_remove_node() {
		let mut r = ring(&[10, 50, 90]);
		let (removed, t) = r.remove_node("localhost:9050").unwrap();
		assert_eq!(removed.node.id, 50);
		let t = t.unwrap();
		assert_eq!((t.pred, t.end), (10, 50));
		assert_eq!(t.from.node.id, 50);
		assert_eq!(t.to.node.id, 90);
		assert_eq!(r.owner_of(45).unwrap().node.id, 90);

		// removing the largest position hands its arc to the smallest
		let (_, t) = r.remove_node("localhost:9090").unwrap();
		let t = t.unwrap();
		assert_eq!((t.pred, t.end), (10, 90));
		assert_eq!(t.to.node.id, 10);

		let (_, t) = r.remove_node("localhost:9010").unwrap();
		assert!(t.is_none());
		assert!(r.is_empty());
	}
}
