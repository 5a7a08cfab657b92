use thiserror::Error;
use std::result::Result;
use super::{ring::Digest, Node};

#[derive(Error, Debug)]
pub enum CacheError {
	#[error("Hash ring has no nodes")]
	EmptyRing,
	#[error("Ring position {position} already taken by {node}")]
	PositionTaken {
		position: Digest,
		node: Node
	},
	#[error("Node {0} is not on the ring")]
	UnknownNode(String),
	#[error("RPC error: {0}")]
	RpcError(#[from] tarpc::client::RpcError),
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
	#[error("Task failed: {0}")]
	JoinError(#[from] tokio::task::JoinError),
	#[error("Fail to send shutdown signal")]
	ShutdownError(#[from] tokio::sync::watch::error::SendError<bool>)
}

pub type CacheResult<T> = Result<T, CacheError>;
