use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Open key/value metadata attached to an event.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Opaque product identifier, fixed at registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Fresh random identifier (16 bytes, hex encoded).
	pub fn generate() -> Self {
		let mut bytes = [0u8; 16];
		rand::rng().fill(&mut bytes);
		Self(hex::encode(bytes))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl fmt::Display for ProductId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ProductId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for ProductId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

/// Kinds of tracking events recorded on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingEventType {
	Register,
	Transfer,
	Checkpoint,
}

impl TrackingEventType {
	/// Symbol stored in the contract's `event_type` field.
	pub fn as_symbol(&self) -> &'static str {
		match self {
			TrackingEventType::Register => "REGISTER",
			TrackingEventType::Transfer => "TRANSFER",
			TrackingEventType::Checkpoint => "CHECKPOINT",
		}
	}
}

impl fmt::Display for TrackingEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_symbol())
	}
}

impl FromStr for TrackingEventType {
	type Err = ValidationError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.to_ascii_uppercase().as_str() {
			"REGISTER" => Ok(TrackingEventType::Register),
			"TRANSFER" => Ok(TrackingEventType::Transfer),
			"CHECKPOINT" => Ok(TrackingEventType::Checkpoint),
			_ => Err(ValidationError::UnknownEventType(value.to_string())),
		}
	}
}

/// A single entry of a product's append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
	pub product_id: ProductId,
	#[serde(rename = "type")]
	pub event_type: TrackingEventType,
	/// Producer-assigned wall-clock time, seconds since the Unix epoch.
	pub timestamp: u64,
	#[serde(default)]
	pub metadata: Metadata,
}

impl TrackingEvent {
	pub fn new(
		product_id: ProductId,
		event_type: TrackingEventType,
		timestamp: u64,
		metadata: Metadata,
	) -> Self {
		Self {
			product_id,
			event_type,
			timestamp,
			metadata,
		}
	}
}

/// Registration input, mirroring the contract's product configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
	pub id: ProductId,
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub origin_location: String,
	#[serde(default)]
	pub category: String,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub custom: BTreeMap<String, String>,
}

impl ProductDetails {
	/// Details for a caller-chosen id. The name defaults to the id.
	pub fn new(id: impl Into<ProductId>) -> Self {
		let id = id.into();
		Self {
			name: id.as_str().to_string(),
			id,
			description: String::new(),
			origin_location: String::new(),
			category: String::new(),
			tags: Vec::new(),
			custom: BTreeMap::new(),
		}
	}

	/// Details with a freshly generated id.
	pub fn generated(name: impl Into<String>) -> Self {
		let mut details = Self::new(ProductId::generate());
		details.name = name.into();
		details
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	pub fn with_origin(mut self, location: impl Into<String>) -> Self {
		self.origin_location = location.into();
		self
	}

	pub fn with_category(mut self, category: impl Into<String>) -> Self {
		self.category = category.into();
		self
	}

	pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
		self.tags.push(tag.into());
		self
	}

	pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.custom.insert(key.into(), value.into());
		self
	}

	/// Metadata carried by the REGISTER event for these details.
	pub fn register_metadata(&self) -> Metadata {
		self.custom
			.iter()
			.map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
			.collect()
	}
}

/// Ordered history of one product, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
	product_id: ProductId,
	events: Vec<TrackingEvent>,
}

impl History {
	/// Orders events by timestamp. Events sharing a timestamp keep their
	/// ledger order.
	pub fn new(product_id: ProductId, events: Vec<TrackingEvent>) -> Self {
		let events = events
			.into_iter()
			.sorted_by_key(|event| event.timestamp)
			.collect();
		Self { product_id, events }
	}

	pub fn product_id(&self) -> &ProductId {
		&self.product_id
	}

	pub fn events(&self) -> &[TrackingEvent] {
		&self.events
	}

	pub fn first(&self) -> Option<&TrackingEvent> {
		self.events.first()
	}

	pub fn last(&self) -> Option<&TrackingEvent> {
		self.events.last()
	}

	pub fn len(&self) -> usize {
		self.events.len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, TrackingEvent> {
		self.events.iter()
	}

	/// Slice of the history in the shape of the contract's event page.
	pub fn page(&self, offset: usize, limit: usize) -> HistoryPage {
		let total = self.events.len();
		let events: Vec<TrackingEvent> = self
			.events
			.iter()
			.skip(offset)
			.take(limit)
			.cloned()
			.collect();
		let has_more = offset.saturating_add(events.len()) < total;
		HistoryPage {
			events,
			total_count: total as u64,
			has_more,
		}
	}
}

impl IntoIterator for History {
	type Item = TrackingEvent;
	type IntoIter = std::vec::IntoIter<TrackingEvent>;

	fn into_iter(self) -> Self::IntoIter {
		self.events.into_iter()
	}
}

impl<'a> IntoIterator for &'a History {
	type Item = &'a TrackingEvent;
	type IntoIter = std::slice::Iter<'a, TrackingEvent>;

	fn into_iter(self) -> Self::IntoIter {
		self.events.iter()
	}
}

/// One page of a product history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
	pub events: Vec<TrackingEvent>,
	pub total_count: u64,
	pub has_more: bool,
}
