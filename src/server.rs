use crate::core::error::*;
use futures::future;
use tokio::{sync::watch, task::JoinHandle};

/// Handle to the tasks of a running server.
/// Dropping it drops the shutdown sender, which stops the listener too.
pub struct ServerManager {
	handle: future::JoinAll<JoinHandle<()>>,
	tx: watch::Sender<bool>
}

impl ServerManager {
	pub fn new(tasks: Vec<JoinHandle<()>>, tx: watch::Sender<bool>) -> Self {
		ServerManager {
			handle: future::join_all(tasks),
			tx
		}
	}

	/// Wait for every server task to terminate
	pub async fn wait(self) -> CacheResult<()> {
		for result in self.handle.await {
			result?;
		}
		Ok(())
	}

	/// Signal shutdown and wait for the tasks
	pub async fn stop(self) -> CacheResult<()> {
		self.tx.send(true)?;
		self.wait().await
	}
}
