//! Mapping between named properties and the tracker's (possibly custom) fields.
//!
//! Encoding runs in two stages. The first stage shapes a value for its field kind; the
//! second stage applies only to custom fields and may consult the issue's other
//! properties, since the legal value of e.g. a cascading select depends on its parent.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::CustomField;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
	/// Value stored as-is.
	Plain,
	/// `{"name": v}`
	Named,
	/// `[{"name": v}, ...]`
	NamedList,
	/// Custom single select: `{"value": v}`
	Select,
	/// Custom cascading select: `{"value": <parent property>, "child": {"value": v}}`
	Cascading { parent: String },
}

impl FieldKind {
	fn is_custom(&self) -> bool {
		matches!(self, FieldKind::Select | FieldKind::Cascading { .. })
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldMapping {
	pub property: String,
	pub field: String,
	pub kind: FieldKind,
}

impl FieldMapping {
	pub fn new(property: impl Into<String>, field: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			property: property.into(),
			field: field.into(),
			kind,
		}
	}
}

/// A property value shaped for its backend field, before the custom-field stage.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedField {
	pub field: String,
	pub value: Value,
	kind: FieldKind,
}

#[derive(Clone, Debug)]
pub struct PropertyCodec {
	mappings: Vec<FieldMapping>,
}

impl Default for PropertyCodec {
	fn default() -> Self {
		Self {
			mappings: vec![
				FieldMapping::new("issuetype", "issuetype", FieldKind::Named),
				FieldMapping::new("priority", "priority", FieldKind::Named),
				FieldMapping::new("components", "components", FieldKind::NamedList),
				FieldMapping::new("fixVersions", "fixVersions", FieldKind::NamedList),
				FieldMapping::new("versions", "versions", FieldKind::NamedList),
				FieldMapping::new("environment", "environment", FieldKind::Plain),
			],
		}
	}
}

impl PropertyCodec {
	/// Built-in mappings plus the declared custom fields.
	pub fn with_custom_fields(custom: &[CustomField]) -> Self {
		let mut codec = Self::default();
		codec.mappings.extend(custom.iter().map(|c| FieldMapping::new(&c.property, &c.field, c.kind.clone())));
		codec
	}

	fn by_field(&self, field: &str) -> Option<&FieldMapping> {
		self.mappings.iter().find(|m| m.field == field)
	}

	fn by_property(&self, property: &str) -> Option<&FieldMapping> {
		self.mappings.iter().find(|m| m.property == property)
	}

	/// Property name and value for a backend field, or `None` when the field is unknown or unset.
	pub fn decode(&self, field: &str, value: &Value) -> Option<(String, Value)> {
		let mapping = self.by_field(field)?;
		if value.is_null() {
			return None;
		}

		let decoded = match &mapping.kind {
			FieldKind::Plain => value.clone(),
			FieldKind::Named => value.get("name")?.clone(),
			FieldKind::NamedList => Value::Array(value.as_array()?.iter().filter_map(|v| v.get("name").cloned()).collect()),
			FieldKind::Select => value.get("value")?.clone(),
			FieldKind::Cascading { .. } => value.pointer("/child/value")?.clone(),
		};
		Some((mapping.property.clone(), decoded))
	}

	/// First encoding stage. `None` when the property is not known to this codec.
	pub fn encode(&self, property: &str, value: &Value) -> Option<EncodedField> {
		let mapping = self.by_property(property)?;

		let encoded = match &mapping.kind {
			FieldKind::Named => json!({ "name": value }),
			FieldKind::NamedList => match value {
				Value::Array(items) => Value::Array(items.iter().map(|v| json!({ "name": v })).collect()),
				single => json!([{ "name": single }]),
			},
			FieldKind::Plain | FieldKind::Select | FieldKind::Cascading { .. } => value.clone(),
		};
		Some(EncodedField {
			field: mapping.field.clone(),
			value: encoded,
			kind: mapping.kind.clone(),
		})
	}

	/// Second encoding stage, for custom fields. `properties` are the issue's current decoded properties.
	pub fn encode_custom(&self, encoded: &EncodedField, properties: &BTreeMap<String, Value>, issue_id: &str) -> Value {
		if !encoded.kind.is_custom() {
			return encoded.value.clone();
		}

		match &encoded.kind {
			FieldKind::Cascading { parent } => match properties.get(parent).and_then(parent_option) {
				Some(parent_value) => json!({ "value": parent_value, "child": { "value": encoded.value } }),
				None => {
					tracing::warn!(issue = issue_id, field = %encoded.field, parent = %parent, "cascading field without parent value, encoding as plain select");
					json!({ "value": encoded.value })
				}
			},
			_ => json!({ "value": encoded.value }),
		}
	}
}

/// The parent option of a cascading select: a plain value, or the first entry of a list property.
fn parent_option(value: &Value) -> Option<&Value> {
	match value {
		Value::Array(items) => items.first(),
		Value::Null => None,
		other => Some(other),
	}
}
