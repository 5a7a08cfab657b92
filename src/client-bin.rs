use ring_cache::{
	client::setup_coordinator_client,
	rpc::CoordinatorServiceClient
};
use tarpc::context;
use clap::Parser;
use inquire::{Text, CustomUserError};
use anyhow::anyhow;

#[derive(Parser)]
struct Args {
	/// Coordinator addr to connect to (<host>:<port>)
	addr: String,
}

const COMMANDS: [&str; 6] = [
	"get",
	"set",
	"delete",
	"add-node",
	"remove-node",
	"nodes"
];

fn suggest_command(v: &str) -> Result<Vec<String>, CustomUserError> {
	let mut result = Vec::new();
	for command in COMMANDS {
		if !v.is_empty() && command.starts_with(v) {
			result.push(command.to_string());
		}
	}
	Ok(result)
}

fn complete_command(v: &str) -> Result<Option<String>, CustomUserError> {
	let result = suggest_command(v)?;
	let command = if !result.is_empty() {
		Some(result[0].clone() + " ")
	}
	else {
		None
	};
	Ok(command)
}

async fn execute_command(client: &CoordinatorServiceClient, command: &str) -> anyhow::Result<()> {
	// execute command
	let words: Vec<_> = command.split_whitespace().collect();
	if words.is_empty() {
		return Err(anyhow!("invalid command"));
	}

	let ctx = context::current();
	match words[0] {
		"get" => {
			if words.len() != 2 {
				return Err(anyhow!("get: invalid number of arguments"));
			}
			match client.get_rpc(ctx, words[1].to_string()).await?.map_err(|e| anyhow!(e))? {
				Some(v) => println!("{}", v),
				None => return Err(anyhow!("get: key doesn't exist"))
			};
		},
		"set" => {
			if words.len() < 3 {
				return Err(anyhow!("set: invalid number of arguments"));
			}
			// value may contain spaces
			let value = words[2..].join(" ");
			if !client.set_rpc(ctx, words[1].to_string(), value).await? {
				return Err(anyhow!("set: failed to set"));
			}
		},
		"delete" => {
			if words.len() != 2 {
				return Err(anyhow!("delete: invalid number of arguments"));
			}
			if !client.delete_rpc(ctx, words[1].to_string()).await?.map_err(|e| anyhow!(e))? {
				return Err(anyhow!("delete: key doesn't exist"));
			}
		},
		"add-node" => {
			if words.len() != 2 {
				return Err(anyhow!("add-node: invalid number of arguments"));
			}
			client.add_node_rpc(ctx, words[1].to_string()).await?.map_err(|e| anyhow!(e))?;
			println!("node addition started");
		},
		"remove-node" => {
			if words.len() != 2 {
				return Err(anyhow!("remove-node: invalid number of arguments"));
			}
			client.remove_node_rpc(ctx, words[1].to_string()).await?.map_err(|e| anyhow!(e))?;
			println!("node removal started");
		},
		"nodes" => {
			for node in client.list_nodes_rpc(ctx).await? {
				println!("{}", node);
			}
		},
		_ => {
			return Err(anyhow!("invalid command"));
		}
	};
	Ok(())
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::init();
	let args = Args::parse();
	let client = setup_coordinator_client(&args.addr).await?;

	loop {
		let command = Text::new("")
			.with_suggester(&suggest_command)
			.with_completer(&complete_command)
			.prompt()?;

		match execute_command(&client, &command).await {
			Ok(_) => (),
			Err(e) => println!("Error: {}", e)
		};
	}
}
