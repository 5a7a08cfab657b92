#![allow(dead_code)]

use ring_cache::{
	core::{
		config::*,
		ring::{Digest, in_arc},
		CacheNode,
		calculate_hash,
		construct_node
	},
	client::setup_client,
	rpc::CacheServiceClient,
	server::ServerManager
};
use rand::Rng;

pub fn init_logger() {
	let _ = env_logger::builder().is_test(true).try_init();
}

/// Start a cache node and connect a client to it
pub async fn start_node(addr: &str, capacity: usize) -> anyhow::Result<(ServerManager, CacheServiceClient)> {
	let config = Config {
		capacity,
		..Config::default()
	};
	let s = CacheNode::new(construct_node(addr), config);
	let manager = s.start().await?;
	let client = setup_client(addr).await?;
	Ok((manager, client))
}

// Generate key whose digest is in range (start, end]
pub fn generate_key_in_range<T: Rng>(rng: &mut T, start: Digest, end: Digest) -> String {
	loop {
		let key = format!("key-{}", rng.gen::<u64>());
		if in_arc(calculate_hash(key.as_bytes()), start, end) {
			return key;
		}
	}
}

// Largest position below id among ids (wrapping)
pub fn predecessor(ids: &[Digest], id: Digest) -> Digest {
	ids.iter().copied().filter(|&p| p < id).max()
		.or_else(|| ids.iter().copied().max())
		.unwrap()
}
