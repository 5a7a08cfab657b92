use std::default::Default;

#[derive(Clone)]
pub struct Config {
	/// max number of entries held by a cache node
	pub capacity: usize,
	/// max number of concurrent connections buffered
	pub max_connections: u64
}

impl Default for Config {
	fn default() -> Self {
		Self {
			capacity: 100,
			max_connections: 16
		}
	}
}
