mod common;

use chain_logistics_connect::contract::{ContractClient, ContractError};
use chain_logistics_connect::network::{Network, NetworkSelector};
use chain_logistics_connect::tracking::ProductDetails;
use chain_logistics_connect::wallet::{WalletConnectionManager, WalletStatus};
use common::{ACCOUNT, CONTRACT_ID, MemoryLedger, ScriptedWallet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[tokio::test]
async fn concurrent_connects_share_one_handshake() {
	let gate = Arc::new(Notify::new());
	let provider = ScriptedWallet::gated(ACCOUNT, gate.clone());
	let wallet = Arc::new(WalletConnectionManager::new(
		provider.clone(),
		NetworkSelector::new(Network::Testnet),
	));

	let mut rx = wallet.subscribe();
	let first = tokio::spawn({
		let wallet = wallet.clone();
		async move { wallet.connect().await }
	});
	rx.wait_for(|s| s.status() == WalletStatus::Connecting)
		.await
		.unwrap();

	let second = tokio::spawn({
		let wallet = wallet.clone();
		async move { wallet.connect().await }
	});
	assert_eq!(second.await.unwrap().status(), WalletStatus::Connecting);

	gate.notify_one();
	let state = first.await.unwrap();
	assert_eq!(state.status(), WalletStatus::Connected);
	assert_eq!(state.account().unwrap().public_key, ACCOUNT);
	assert_eq!(provider.connects(), 1);
}

#[tokio::test]
async fn connect_survives_a_caller_that_stops_waiting() {
	let gate = Arc::new(Notify::new());
	let provider = ScriptedWallet::gated(ACCOUNT, gate.clone());
	let wallet = WalletConnectionManager::new(provider.clone(), NetworkSelector::default());

	let gave_up = tokio::time::timeout(Duration::from_millis(20), wallet.connect()).await;
	assert!(gave_up.is_err());

	let mut rx = wallet.subscribe();
	gate.notify_one();
	rx.wait_for(|s| s.status() == WalletStatus::Connected)
		.await
		.unwrap();

	let state = wallet.connect().await;
	assert_eq!(state.status(), WalletStatus::Connected);
	assert_eq!(state.account().unwrap().public_key, ACCOUNT);
	assert_eq!(provider.connects(), 1);
}

#[tokio::test]
async fn rejected_connection_is_retried_only_on_request() {
	let provider = ScriptedWallet::rejecting("user closed the prompt");
	let wallet = WalletConnectionManager::new(provider.clone(), NetworkSelector::default());

	let state = wallet.connect().await;
	assert_eq!(state.status(), WalletStatus::Error);
	assert!(state.error().unwrap().contains("user closed the prompt"));
	assert!(state.account().is_none());
	assert_eq!(provider.connects(), 1);

	let state = wallet.disconnect().await;
	assert_eq!(state.status(), WalletStatus::Disconnected);
	assert!(state.error().is_none());
	assert_eq!(provider.connects(), 1);

	wallet.connect().await;
	assert_eq!(provider.connects(), 2);
}

#[tokio::test]
async fn disconnect_revokes_signing_for_clients() {
	let selector = NetworkSelector::new(Network::Testnet);
	let ledger = MemoryLedger::new();
	let wallet = Arc::new(WalletConnectionManager::new(
		ScriptedWallet::approving(ACCOUNT),
		selector.clone(),
	));
	let client =
		ContractClient::for_active_network(&selector, CONTRACT_ID, ledger.clone(), wallet.clone())
			.unwrap();

	wallet.connect().await;
	client
		.register_product(ProductDetails::new("P1"))
		.await
		.unwrap();

	wallet.disconnect().await;
	let err = client
		.register_product(ProductDetails::new("P2"))
		.await
		.unwrap_err();
	assert!(matches!(err, ContractError::NotConnected));
	assert_eq!(ledger.submissions(), 1);
}

#[tokio::test]
async fn selector_changes_reach_subscribers() {
	let selector = NetworkSelector::new(Network::Testnet);
	let mut rx = selector.subscribe();

	let previous = selector.set(Network::Futurenet);
	assert_eq!(previous, Network::Testnet);

	rx.changed().await.unwrap();
	assert_eq!(*rx.borrow_and_update(), Network::Futurenet);
	assert_eq!(selector.clone().active(), Network::Futurenet);
}
