pub mod node;
pub mod ring;
pub mod config;
pub mod lru;
pub mod data_store;
pub mod migration;
pub mod coordinator;
pub mod error;

pub use node::*;
pub use config::*;
pub use error::*;
pub use coordinator::Coordinator;

use sha2::{Sha256, Digest as _};
use self::ring::Digest;

/// Map arbitrary bytes onto the 2^32 ring
/// (SHA-256 read as a big-endian integer, mod 2^32)
pub fn calculate_hash(data: &[u8]) -> Digest {
	let digest = Sha256::digest(data);
	let n = digest.len();
	Digest::from_be_bytes([digest[n - 4], digest[n - 3], digest[n - 2], digest[n - 1]])
}

pub fn construct_node(addr: &str) -> Node {
	Node {
		addr: addr.to_string(),
		id: calculate_hash(addr.as_bytes())
	}
}
