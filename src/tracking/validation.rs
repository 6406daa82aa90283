//! Local validation of tracking data.
//!
//! Everything here runs before a network call; a failure never reaches the
//! contract.

use super::{Metadata, ProductDetails, ProductId, TrackingEvent, TrackingEventType};

pub const MAX_PRODUCT_ID_LEN: usize = 64;
pub const MAX_NAME_LEN: usize = 128;
pub const MAX_DESCRIPTION_LEN: usize = 1024;
pub const MAX_ORIGIN_LEN: usize = 256;
pub const MAX_CATEGORY_LEN: usize = 64;
pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_LEN: usize = 32;
pub const MAX_CUSTOM_FIELDS: usize = 20;
pub const MAX_CUSTOM_VALUE_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
	#[error("Product id must not be empty")]
	EmptyProductId,

	#[error("Product id is longer than {MAX_PRODUCT_ID_LEN} characters")]
	ProductIdTooLong,

	#[error("Product name must not be empty")]
	EmptyName,

	#[error("{field} is longer than {max} characters")]
	TooLong { field: &'static str, max: usize },

	#[error("Too many {field}: at most {max} allowed")]
	TooMany { field: &'static str, max: usize },

	#[error("Metadata keys must not be empty")]
	EmptyMetadataKey,

	#[error("Unknown event type: {0}")]
	UnknownEventType(String),

	#[error("Invalid timestamp: {0}")]
	InvalidTimestamp(String),

	#[error("Malformed event record: {0}")]
	Malformed(String),

	#[error("REGISTER events are only created by product registration")]
	RegisterNotAppendable,
}

/// Check an event's fields. Returns the event unchanged when valid.
///
/// The event type is a closed enum and the timestamp an unsigned integer, so
/// only the id and metadata need runtime checks here. Raw records coming off
/// the wire go through [`parse_event`] first.
pub fn validate(event: TrackingEvent) -> Result<TrackingEvent, ValidationError> {
	validate_product_id(&event.product_id)?;
	validate_metadata(&event.metadata)?;
	Ok(event)
}

pub fn validate_product_id(id: &ProductId) -> Result<(), ValidationError> {
	if id.is_empty() {
		return Err(ValidationError::EmptyProductId);
	}
	if id.as_str().chars().count() > MAX_PRODUCT_ID_LEN {
		return Err(ValidationError::ProductIdTooLong);
	}
	Ok(())
}

pub fn validate_metadata(metadata: &Metadata) -> Result<(), ValidationError> {
	if metadata.keys().any(|key| key.trim().is_empty()) {
		return Err(ValidationError::EmptyMetadataKey);
	}
	Ok(())
}

/// Check registration details against the contract's field limits.
pub fn validate_details(details: &ProductDetails) -> Result<(), ValidationError> {
	validate_product_id(&details.id)?;
	if details.name.trim().is_empty() {
		return Err(ValidationError::EmptyName);
	}
	check_len("name", &details.name, MAX_NAME_LEN)?;
	check_len("description", &details.description, MAX_DESCRIPTION_LEN)?;
	check_len("origin", &details.origin_location, MAX_ORIGIN_LEN)?;
	check_len("category", &details.category, MAX_CATEGORY_LEN)?;

	if details.tags.len() > MAX_TAGS {
		return Err(ValidationError::TooMany {
			field: "tags",
			max: MAX_TAGS,
		});
	}
	for tag in &details.tags {
		check_len("tag", tag, MAX_TAG_LEN)?;
	}

	if details.custom.len() > MAX_CUSTOM_FIELDS {
		return Err(ValidationError::TooMany {
			field: "custom fields",
			max: MAX_CUSTOM_FIELDS,
		});
	}
	for (key, value) in &details.custom {
		if key.trim().is_empty() {
			return Err(ValidationError::EmptyMetadataKey);
		}
		check_len("custom field value", value, MAX_CUSTOM_VALUE_LEN)?;
	}
	Ok(())
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
	if value.chars().count() > max {
		return Err(ValidationError::TooLong { field, max });
	}
	Ok(())
}

/// Parse and validate a raw JSON event record.
///
/// Accepts `{ productId, type, timestamp, metadata? }` as well as the
/// contract's `{ product_id, event_type, ... }` spelling. The timestamp must be
/// a non-negative integer; floats, negatives and strings are rejected.
pub fn parse_event(record: &serde_json::Value) -> Result<TrackingEvent, ValidationError> {
	let object = record
		.as_object()
		.ok_or_else(|| ValidationError::Malformed("expected a JSON object".to_string()))?;

	let field = |names: [&str; 2]| names.iter().find_map(|name| object.get(*name));

	let product_id = field(["productId", "product_id"])
		.and_then(|v| v.as_str())
		.ok_or_else(|| ValidationError::Malformed("missing productId".to_string()))?;

	let event_type = field(["type", "event_type"])
		.and_then(|v| v.as_str())
		.ok_or_else(|| ValidationError::Malformed("missing type".to_string()))?
		.parse::<TrackingEventType>()?;

	let timestamp = match object.get("timestamp") {
		Some(serde_json::Value::Number(n)) => n
			.as_u64()
			.ok_or_else(|| ValidationError::InvalidTimestamp(n.to_string()))?,
		Some(other) => return Err(ValidationError::InvalidTimestamp(other.to_string())),
		None => return Err(ValidationError::InvalidTimestamp("missing".to_string())),
	};

	let metadata = match object.get("metadata") {
		None | Some(serde_json::Value::Null) => Metadata::new(),
		Some(serde_json::Value::Object(map)) => map
			.iter()
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect(),
		Some(_) => {
			return Err(ValidationError::Malformed(
				"metadata must be an object".to_string(),
			));
		}
	};

	validate(TrackingEvent::new(
		ProductId::new(product_id),
		event_type,
		timestamp,
		metadata,
	))
}
