use ring_cache::core::{
	config::*,
	Coordinator
};
use clap::Parser;

#[derive(Parser)]
struct Args {
	/// Local addr to bind (<host>:<port>)
	addr: String,

	/// Cache node to put on the ring at startup (<host>:<port>), repeatable
	#[clap(short, long)]
	node: Vec<String>
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::init();
	let args = Args::parse();

	let coordinator = Coordinator::new(Config::default());
	coordinator.bootstrap(&args.node).await?;
	let manager = coordinator.start(&args.addr).await?;
	manager.wait().await?;
	Ok(())
}
