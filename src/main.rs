use chain_logistics_connect::config::AppConfig;
use chain_logistics_connect::contract::{ContractClient, ContractError};
use chain_logistics_connect::network::{ConfigError, NetworkSelector};
use chain_logistics_connect::rpc::{RpcError, SorobanRpcClient};
use chain_logistics_connect::tracking::{Metadata, ProductDetails, TrackingEventType};
use chain_logistics_connect::utils::{format_timestamp, shorten_public_key};
use chain_logistics_connect::wallet::{
	RemoteSignerProvider, WalletConnectionManager, WalletError, WalletStatus,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum AppError {
	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Rpc(#[from] RpcError),

	#[error(transparent)]
	Wallet(#[from] WalletError),

	#[error(transparent)]
	Contract(#[from] ContractError),

	#[error("Wallet connection failed: {0}")]
	NotConnected(String),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new("info,chain_logistics_connect=debug")),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	if let Err(e) = run().await {
		error!("{}", e);
		std::process::exit(1);
	}
}

async fn run() -> Result<(), AppError> {
	let config = AppConfig::from_env()?;
	let product_name = std::env::args()
		.nth(1)
		.unwrap_or_else(|| "Demo product".to_string());

	let selector = NetworkSelector::global();
	selector.set(config.network);
	info!("Using {} ({})", config.network, config.network.passphrase());

	let rpc = Arc::new(SorobanRpcClient::new(config.rpc_timeout)?);
	let signer = Arc::new(RemoteSignerProvider::new(
		config.signer_url.clone(),
		config.rpc_timeout,
	)?);
	let wallet = Arc::new(WalletConnectionManager::new(signer, selector.clone()));

	let client = ContractClient::new(config.contract_config()?, rpc, wallet.clone())
		.bound_to(selector.clone());
	info!("Created contract client for {}", client.config().contract_id());

	if !client.ping().await? {
		warn!("RPC endpoint {} reports unhealthy", client.config().rpc_url());
	}

	let state = wallet.connect().await;
	if state.status() != WalletStatus::Connected {
		return Err(AppError::NotConnected(
			state.error().unwrap_or("unknown error").to_string(),
		));
	}
	if let Some(account) = state.account() {
		info!("Signing as {}", shorten_public_key(&account.public_key, 4));
	}

	let details = ProductDetails::generated(product_name)
		.with_origin("Warehouse A")
		.with_category("demo");
	let product_id = client.register_product(details).await?;

	let mut metadata = Metadata::new();
	metadata.insert("location".to_string(), json!("Warehouse A"));
	client
		.append_event(&product_id, TrackingEventType::Checkpoint, metadata)
		.await?;

	let history = client.get_history(&product_id).await?;
	for event in &history {
		info!(
			"{} {} {}",
			format_timestamp(event.timestamp),
			event.event_type,
			serde_json::to_string(&event.metadata).unwrap_or_default()
		);
	}

	wallet.disconnect().await;
	Ok(())
}
