#![allow(dead_code)]

use async_trait::async_trait;
use chain_logistics_connect::contract::{
	CONTRACT_EVENT_NOT_FOUND, CONTRACT_INVALID_INPUT, CONTRACT_PRODUCT_ALREADY_EXISTS,
	CONTRACT_PRODUCT_NOT_FOUND, ContractCall, ContractClient, ContractClientConfig, ContractTransport,
	Invocation, Origin, ProductRecord, SubmissionReceipt, TransportError, contract_error_name,
};
use chain_logistics_connect::network::{Network, NetworkSelector};
use chain_logistics_connect::tracking::ProductId;
use chain_logistics_connect::wallet::{
	SignedEnvelope, WalletAccount, WalletConnectionManager, WalletError, WalletProvider,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const CONTRACT_ID: &str = "CTRACKING";
pub const ACCOUNT: &str = "GABCDEFGHIJKLMNOPQRSTUVWXYZ234567ABCDEFGHIJKLMNOPQRSTUV";

#[derive(Default)]
struct LedgerState {
	products: BTreeMap<ProductId, ProductRecord>,
	product_events: HashMap<ProductId, Vec<u64>>,
	events: Vec<Value>,
}

/// In-memory stand-in for the tracking contract.
#[derive(Default)]
pub struct MemoryLedger {
	state: Mutex<LedgerState>,
	rpc_urls: Mutex<Vec<String>>,
	queries: AtomicUsize,
	submissions: AtomicUsize,
	gate: Mutex<Option<Arc<Notify>>>,
	entered: Notify,
}

fn contract_error(code: u32) -> TransportError {
	TransportError::Contract {
		code,
		message: format!("HostError: Error(Contract, #{}) {}", code, contract_error_name(code)),
	}
}

fn arg<T: DeserializeOwned>(args: &Value, key: &str) -> Result<T, TransportError> {
	args.get(key)
		.cloned()
		.and_then(|v| serde_json::from_value(v).ok())
		.ok_or_else(|| contract_error(CONTRACT_INVALID_INPUT))
}

impl MemoryLedger {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Hold every subsequent submission until the returned handle is notified.
	pub fn hold_submissions(&self) -> Arc<Notify> {
		let gate = Arc::new(Notify::new());
		*self.gate.lock().unwrap() = Some(gate.clone());
		gate
	}

	/// Resolves once a held submission has reached the ledger.
	pub async fn submission_entered(&self) {
		self.entered.notified().await;
	}

	pub fn rpc_urls(&self) -> Vec<String> {
		self.rpc_urls.lock().unwrap().clone()
	}

	pub fn queries(&self) -> usize {
		self.queries.load(Ordering::SeqCst)
	}

	pub fn submissions(&self) -> usize {
		self.submissions.load(Ordering::SeqCst)
	}

	/// Append a raw event record, bypassing the contract's checks.
	pub fn inject_event(&self, product_id: &str, record: Value) {
		let mut state = self.state.lock().unwrap();
		let event_id = state.events.len() as u64;
		state.events.push(record);
		state
			.product_events
			.entry(ProductId::new(product_id))
			.or_default()
			.push(event_id);
	}

	fn apply(&self, call: &ContractCall) -> Result<Value, TransportError> {
		let mut state = self.state.lock().unwrap();
		match call.function.as_str() {
			"register_product" => {
				let id: ProductId = arg(&call.args, "id")?;
				if state.products.contains_key(&id) {
					return Err(contract_error(CONTRACT_PRODUCT_ALREADY_EXISTS));
				}
				let record = ProductRecord {
					id: id.clone(),
					name: arg(&call.args, "name")?,
					description: arg(&call.args, "description")?,
					origin: Origin {
						location: arg(&call.args, "origin_location")?,
					},
					owner: arg(&call.args, "owner")?,
					created_at: arg(&call.args, "created_at")?,
					active: true,
					category: arg(&call.args, "category")?,
					tags: arg(&call.args, "tags")?,
					custom: arg(&call.args, "custom")?,
				};
				state.products.insert(id.clone(), record);
				state.product_events.insert(id.clone(), Vec::new());
				Ok(json!(id))
			}
			"add_tracking_event" => {
				let id: ProductId = arg(&call.args, "product_id")?;
				if !state.products.contains_key(&id) {
					return Err(contract_error(CONTRACT_PRODUCT_NOT_FOUND));
				}
				let event_id = state.events.len() as u64;
				state.events.push(json!({
					"event_id": event_id,
					"product_id": id,
					"event_type": arg::<String>(&call.args, "event_type")?,
					"timestamp": arg::<u64>(&call.args, "timestamp")?,
					"metadata": arg::<Value>(&call.args, "metadata")?,
					"actor": arg::<String>(&call.args, "actor")?,
				}));
				state.product_events.entry(id).or_default().push(event_id);
				Ok(json!(event_id))
			}
			"get_product" => {
				let id: ProductId = arg(&call.args, "id")?;
				let record = state
					.products
					.get(&id)
					.ok_or_else(|| contract_error(CONTRACT_PRODUCT_NOT_FOUND))?;
				Ok(serde_json::to_value(record).unwrap())
			}
			"get_product_event_ids" => {
				let id: ProductId = arg(&call.args, "id")?;
				let ids = state
					.product_events
					.get(&id)
					.ok_or_else(|| contract_error(CONTRACT_PRODUCT_NOT_FOUND))?;
				Ok(json!(ids))
			}
			"get_event" => {
				let event_id: usize = arg(&call.args, "event_id")?;
				state
					.events
					.get(event_id)
					.cloned()
					.ok_or_else(|| contract_error(CONTRACT_EVENT_NOT_FOUND))
			}
			_ => Err(contract_error(CONTRACT_INVALID_INPUT)),
		}
	}
}

#[async_trait]
impl ContractTransport for MemoryLedger {
	async fn query(&self, rpc_url: &str, call: &ContractCall) -> Result<Value, TransportError> {
		self.queries.fetch_add(1, Ordering::SeqCst);
		self.rpc_urls.lock().unwrap().push(rpc_url.to_string());
		self.apply(call)
	}

	async fn submit(
		&self,
		rpc_url: &str,
		envelope: &SignedEnvelope,
	) -> Result<SubmissionReceipt, TransportError> {
		self.submissions.fetch_add(1, Ordering::SeqCst);
		self.rpc_urls.lock().unwrap().push(rpc_url.to_string());

		let gate = self.gate.lock().unwrap().clone();
		if let Some(gate) = gate {
			self.entered.notify_one();
			gate.notified().await;
		}

		let bytes = hex::decode(&envelope.envelope).unwrap();
		let invocation = Invocation::from_bytes(&bytes).unwrap();
		assert_eq!(invocation.source, envelope.signer);
		let value = self.apply(&invocation.call)?;

		Ok(SubmissionReceipt {
			tx_hash: format!("tx-{}", self.submissions()),
			ledger: Some(self.submissions() as u64),
			return_value: Some(value),
		})
	}

	async fn health(&self, rpc_url: &str) -> Result<bool, TransportError> {
		self.rpc_urls.lock().unwrap().push(rpc_url.to_string());
		Ok(true)
	}
}

/// Wallet that answers every handshake with a fixed outcome.
pub struct ScriptedWallet {
	outcome: Result<String, String>,
	pub connects: AtomicUsize,
	gate: Option<Arc<Notify>>,
}

impl ScriptedWallet {
	pub fn approving(public_key: &str) -> Arc<Self> {
		Arc::new(Self {
			outcome: Ok(public_key.to_string()),
			connects: AtomicUsize::new(0),
			gate: None,
		})
	}

	pub fn rejecting(reason: &str) -> Arc<Self> {
		Arc::new(Self {
			outcome: Err(reason.to_string()),
			connects: AtomicUsize::new(0),
			gate: None,
		})
	}

	/// Approving wallet whose handshake waits for `gate`.
	pub fn gated(public_key: &str, gate: Arc<Notify>) -> Arc<Self> {
		Arc::new(Self {
			outcome: Ok(public_key.to_string()),
			connects: AtomicUsize::new(0),
			gate: Some(gate),
		})
	}

	pub fn connects(&self) -> usize {
		self.connects.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl WalletProvider for ScriptedWallet {
	async fn connect(&self, _network: Network) -> Result<WalletAccount, WalletError> {
		self.connects.fetch_add(1, Ordering::SeqCst);
		if let Some(gate) = &self.gate {
			gate.notified().await;
		}
		self.outcome
			.clone()
			.map(WalletAccount::new)
			.map_err(WalletError::ConnectionError)
	}

	async fn sign(
		&self,
		account: &WalletAccount,
		_network: Network,
		payload: &[u8],
	) -> Result<SignedEnvelope, WalletError> {
		Ok(SignedEnvelope {
			signer: account.public_key.clone(),
			envelope: hex::encode(payload),
		})
	}

	fn name(&self) -> &'static str {
		"ScriptedWallet"
	}
}

pub struct Harness {
	pub selector: NetworkSelector,
	pub ledger: Arc<MemoryLedger>,
	pub wallet: Arc<WalletConnectionManager>,
	pub client: ContractClient,
}

impl Harness {
	/// Client bound to a fresh selector on testnet, wallet not yet connected.
	pub fn new() -> Self {
		let selector = NetworkSelector::new(Network::Testnet);
		let ledger = MemoryLedger::new();
		let wallet = Arc::new(WalletConnectionManager::new(
			ScriptedWallet::approving(ACCOUNT),
			selector.clone(),
		));
		let client =
			ContractClient::for_active_network(&selector, CONTRACT_ID, ledger.clone(), wallet.clone())
				.unwrap();
		Self {
			selector,
			ledger,
			wallet,
			client,
		}
	}

	/// Another client over the same ledger and wallet, with no session cache.
	pub fn second_client(&self) -> ContractClient {
		let config = ContractClientConfig::for_network(CONTRACT_ID, self.selector.active()).unwrap();
		ContractClient::new(config, self.ledger.clone(), self.wallet.clone())
	}
}
