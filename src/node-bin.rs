use ring_cache::core::{
	self,
	config::*,
	CacheNode
};
use clap::Parser;

#[derive(Parser)]
struct Args {
	/// Local addr to bind (<host>:<port>)
	addr: String,

	/// Max number of entries held before evicting
	#[clap(short, long, default_value_t = 100)]
	capacity: usize
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::init();
	let args = Args::parse();

	let node = core::construct_node(&args.addr);
	let config = Config {
		capacity: args.capacity,
		..Config::default()
	};
	let s = CacheNode::new(node, config);
	let manager = s.start().await?;
	manager.wait().await?;
	Ok(())
}
