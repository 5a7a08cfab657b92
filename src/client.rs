use crate::{
	core::error::*,
	rpc::{CacheServiceClient, CoordinatorServiceClient}
};

use tarpc::tokio_serde::formats::Bincode;

pub async fn setup_client(addr: &str) -> CacheResult<CacheServiceClient> {
	let transport = tarpc::serde_transport::tcp::connect(addr, Bincode::default).await?;
	Ok(CacheServiceClient::new(tarpc::client::Config::default(), transport).spawn())
}

pub async fn setup_coordinator_client(addr: &str) -> CacheResult<CoordinatorServiceClient> {
	let transport = tarpc::serde_transport::tcp::connect(addr, Bincode::default).await?;
	Ok(CoordinatorServiceClient::new(tarpc::client::Config::default(), transport).spawn())
}
