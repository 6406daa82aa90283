//! Contract client: product registration, event submission and history.
//!
//! Submitting operations need a connected wallet and are single-shot: a remote
//! failure is returned to the caller and never retried here. Reads go through
//! the transport without a signer.

use futures_util::future;
use futures_util::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::{
	CONTRACT_PRODUCT_NOT_FOUND, ContractCall, ContractClientConfig, ContractError,
	ContractTransport, Invocation, ProductRecord, SubmissionReceipt, TransportError,
	contract_error_name,
};
use crate::network::{ConfigError, NetworkSelector};
use crate::tracking::{
	History, HistoryPage, Metadata, ProductDetails, ProductId, TrackingEvent, TrackingEventType,
	ValidationError, parse_event, validate, validate_details,
};
use crate::wallet::{WalletConnectionManager, WalletError};

/// Event records fetched concurrently while streaming a history.
const HISTORY_FETCH_CONCURRENCY: usize = 8;

/// Client for one contract on one endpoint.
pub struct ContractClient {
	config: ContractClientConfig,
	transport: Arc<dyn ContractTransport>,
	wallet: Arc<WalletConnectionManager>,
	/// Set when the client follows the process-wide network setting.
	selector: Option<NetworkSelector>,
	/// Products seen registered in this session, with their latest event time.
	///
	/// Grows for the life of the client and is never evicted; a client is
	/// meant to live for one user session.
	known_products: RwLock<HashMap<ProductId, u64>>,
}

impl ContractClient {
	pub fn new(
		config: ContractClientConfig,
		transport: Arc<dyn ContractTransport>,
		wallet: Arc<WalletConnectionManager>,
	) -> Self {
		Self {
			config,
			transport,
			wallet,
			selector: None,
			known_products: RwLock::new(HashMap::new()),
		}
	}

	/// Client for the currently active network's default endpoint.
	///
	/// The client stays bound to that network: once the selector moves on,
	/// new operations fail with [`ContractError::NetworkChanged`].
	pub fn for_active_network(
		selector: &NetworkSelector,
		contract_id: impl Into<String>,
		transport: Arc<dyn ContractTransport>,
		wallet: Arc<WalletConnectionManager>,
	) -> Result<Self, ConfigError> {
		let config = ContractClientConfig::for_network(contract_id, selector.active())?;
		Ok(Self::new(config, transport, wallet).bound_to(selector.clone()))
	}

	/// Bind this client to `selector`, rejecting operations after a switch.
	pub fn bound_to(mut self, selector: NetworkSelector) -> Self {
		self.selector = Some(selector);
		self
	}

	pub fn config(&self) -> &ContractClientConfig {
		&self.config
	}

	/// Whether the RPC endpoint is healthy.
	pub async fn ping(&self) -> Result<bool, ContractError> {
		self.transport
			.health(self.config.rpc_url())
			.await
			.map_err(|e| self.transport_error(e, None))
	}

	/// Register a product and return its id.
	pub async fn register_product(&self, details: ProductDetails) -> Result<ProductId, ContractError> {
		self.ensure_current_network()?;
		validate_details(&details)?;

		let timestamp = now();
		let event = validate(TrackingEvent::new(
			details.id.clone(),
			TrackingEventType::Register,
			timestamp,
			details.register_metadata(),
		))?;

		let owner = self
			.wallet
			.account()
			.ok_or(ContractError::NotConnected)?
			.public_key;

		let args = json!({
			"owner": owner,
			"id": details.id,
			"name": details.name,
			"description": details.description,
			"origin_location": details.origin_location,
			"category": details.category,
			"tags": details.tags,
			"custom": details.custom,
			"created_at": event.timestamp,
		});

		let receipt = self
			.submit("register_product", args, Some(&details.id))
			.await?;
		info!(
			"Registered product {} in transaction {}",
			details.id, receipt.tx_hash
		);

		self.known_products
			.write()
			.await
			.insert(details.id.clone(), event.timestamp);
		Ok(details.id)
	}

	/// Append a TRANSFER or CHECKPOINT event to a registered product.
	///
	/// The returned event carries the timestamp this client submitted. A
	/// contract that stamps events with the ledger close time instead reports
	/// that value from [`get_history`](Self::get_history), which is the
	/// authoritative record.
	pub async fn append_event(
		&self,
		product_id: &ProductId,
		event_type: TrackingEventType,
		metadata: Metadata,
	) -> Result<TrackingEvent, ContractError> {
		self.ensure_current_network()?;
		if event_type == TrackingEventType::Register {
			return Err(ValidationError::RegisterNotAppendable.into());
		}
		let draft = validate(TrackingEvent::new(
			product_id.clone(),
			event_type,
			0,
			metadata,
		))?;

		let actor = self
			.wallet
			.account()
			.ok_or(ContractError::NotConnected)?
			.public_key;

		let last_seen = self.require_registered(product_id).await?;
		let event = TrackingEvent {
			timestamp: now().max(last_seen),
			..draft
		};

		let args = json!({
			"actor": actor,
			"product_id": event.product_id,
			"event_type": event.event_type.as_symbol(),
			"timestamp": event.timestamp,
			"metadata": event.metadata,
			"note": "",
		});

		let receipt = self
			.submit("add_tracking_event", args, Some(product_id))
			.await?;
		info!(
			"Appended {} to {} in transaction {}",
			event.event_type, event.product_id, receipt.tx_hash
		);

		self.known_products
			.write()
			.await
			.insert(product_id.clone(), event.timestamp);
		Ok(event)
	}

	/// On-chain product record.
	pub async fn get_product(&self, product_id: &ProductId) -> Result<ProductRecord, ContractError> {
		self.ensure_current_network()?;
		let value = self
			.query("get_product", json!({ "id": product_id }), Some(product_id))
			.await?;
		serde_json::from_value(value).map_err(|e| {
			ContractError::MalformedResponse(format!("product {}: {}", product_id, e))
		})
	}

	/// Ordered history of a product, oldest first.
	pub async fn get_history(&self, product_id: &ProductId) -> Result<History, ContractError> {
		let events: Vec<TrackingEvent> = self.history_stream(product_id).try_collect().await?;
		let history = History::new(product_id.clone(), events);

		match history.first() {
			Some(first) if first.event_type == TrackingEventType::Register => {}
			Some(first) => {
				error!(
					"History of {} starts with {} instead of REGISTER",
					product_id, first.event_type
				);
				return Err(ContractError::MalformedResponse(format!(
					"history of {} does not start with REGISTER",
					product_id
				)));
			}
			None => return Err(ContractError::UnknownProduct(product_id.clone())),
		}

		if let Some(last) = history.last() {
			self.known_products
				.write()
				.await
				.insert(product_id.clone(), last.timestamp);
		}
		debug!("Fetched {} events for {}", history.len(), product_id);
		Ok(history)
	}

	/// One page of a product's history.
	pub async fn get_history_page(
		&self,
		product_id: &ProductId,
		offset: usize,
		limit: usize,
	) -> Result<HistoryPage, ContractError> {
		Ok(self.get_history(product_id).await?.page(offset, limit))
	}

	/// Lazily stream a product's events in ledger order.
	///
	/// Nothing is fetched until the stream is polled; calling again starts a
	/// fresh read.
	pub fn history_stream<'a>(
		&'a self,
		product_id: &ProductId,
	) -> BoxStream<'a, Result<TrackingEvent, ContractError>> {
		let product_id = product_id.clone();
		let head_id = product_id.clone();
		stream::once(async move { self.history_head(&head_id).await })
			.map_ok(move |(register, event_ids)| {
				let product_id = product_id.clone();
				stream::once(future::ready(Ok(register))).chain(
					stream::iter(event_ids)
						.map(move |event_id| self.fetch_event(product_id.clone(), event_id))
						.buffered(HISTORY_FETCH_CONCURRENCY),
				)
			})
			.try_flatten()
			.boxed()
	}

	async fn history_head(
		&self,
		product_id: &ProductId,
	) -> Result<(TrackingEvent, Vec<u64>), ContractError> {
		let product = self.get_product(product_id).await?;
		let value = self
			.query(
				"get_product_event_ids",
				json!({ "id": product_id }),
				Some(product_id),
			)
			.await?;
		let event_ids: Vec<u64> = serde_json::from_value(value).map_err(|e| {
			ContractError::MalformedResponse(format!("event ids of {}: {}", product_id, e))
		})?;
		Ok((product.register_event(), event_ids))
	}

	async fn fetch_event(
		&self,
		product_id: ProductId,
		event_id: u64,
	) -> Result<TrackingEvent, ContractError> {
		let value = self
			.query("get_event", json!({ "event_id": event_id }), None)
			.await?;
		let event = parse_event(&value)
			.map_err(|e| ContractError::MalformedResponse(format!("event {}: {}", event_id, e)))?;
		if event.product_id != product_id {
			error!(
				"Event {} listed for {} belongs to {}",
				event_id, product_id, event.product_id
			);
			return Err(ContractError::MalformedResponse(format!(
				"event {} belongs to {}, not {}",
				event_id, event.product_id, product_id
			)));
		}
		Ok(event)
	}

	/// Latest known event time of a registered product.
	async fn require_registered(&self, product_id: &ProductId) -> Result<u64, ContractError> {
		if let Some(last) = self.known_products.read().await.get(product_id) {
			return Ok(*last);
		}
		let history = self.get_history(product_id).await?;
		Ok(history.last().map(|e| e.timestamp).unwrap_or_default())
	}

	fn ensure_current_network(&self) -> Result<(), ContractError> {
		let Some(selector) = &self.selector else {
			return Ok(());
		};
		let active = selector.active();
		let bound = self.config.network();
		if active != bound {
			warn!(
				"Rejecting call on client bound to {} while {} is active",
				bound, active
			);
			return Err(ContractError::NetworkChanged { bound, active });
		}
		Ok(())
	}

	async fn query(
		&self,
		function: &str,
		args: serde_json::Value,
		product_id: Option<&ProductId>,
	) -> Result<serde_json::Value, ContractError> {
		let call = ContractCall::new(self.config.contract_id(), function, args);
		self.transport
			.query(self.config.rpc_url(), &call)
			.await
			.map_err(|e| self.transport_error(e, product_id))
	}

	async fn submit(
		&self,
		function: &str,
		args: serde_json::Value,
		product_id: Option<&ProductId>,
	) -> Result<SubmissionReceipt, ContractError> {
		let account = self.wallet.account().ok_or(ContractError::NotConnected)?;
		let network = self.config.network();
		let call = ContractCall::new(self.config.contract_id(), function, args);
		let payload = Invocation::new(call, account.public_key, network)
			.to_bytes()
			.map_err(|e| ContractError::SubmissionError(format!("encoding failed: {}", e)))?;

		let envelope = self
			.wallet
			.sign(network, &payload)
			.await
			.map_err(|e| match e {
				WalletError::NotConnected => ContractError::NotConnected,
				other => ContractError::SubmissionError(format!("signing failed: {}", other)),
			})?;

		debug!("Submitting {} to {}", function, self.config.rpc_url());
		self.transport
			.submit(self.config.rpc_url(), &envelope)
			.await
			.map_err(|e| self.transport_error(e, product_id))
	}

	fn transport_error(&self, error: TransportError, product_id: Option<&ProductId>) -> ContractError {
		match (error, product_id) {
			(TransportError::Contract { code, .. }, Some(id)) if code == CONTRACT_PRODUCT_NOT_FOUND => {
				ContractError::UnknownProduct(id.clone())
			}
			(TransportError::Contract { code, message }, _) => {
				error!("Contract rejected call: #{} {}", code, message);
				ContractError::SubmissionError(format!(
					"{} (contract error #{})",
					contract_error_name(code),
					code
				))
			}
			(TransportError::Rpc(e), _) => {
				error!("RPC call to {} failed: {}", self.config.rpc_url(), e);
				ContractError::SubmissionError(e.to_string())
			}
		}
	}
}

/// Current wall-clock time in seconds.
fn now() -> u64 {
	chrono::Utc::now().timestamp().max(0) as u64
}
