//! Typed access into fetched JSON documents.

use std::hash::{Hash, Hasher};

use jiff::Timestamp;
use serde_json::Value;

use crate::{Result, TrackerError};

/// Timestamp layout the tracker uses, e.g. `2024-03-01T10:15:30.000+0000`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Value at a JSON pointer, or a `Document` error naming the pointer.
pub fn at<'a>(doc: &'a Value, pointer: &str) -> Result<&'a Value> {
	doc.pointer(pointer).ok_or_else(|| TrackerError::Document(format!("missing {pointer}")))
}

pub fn str_at<'a>(doc: &'a Value, pointer: &str) -> Result<&'a str> {
	at(doc, pointer)?.as_str().ok_or_else(|| TrackerError::Document(format!("{pointer} is not a string")))
}

/// String at a pointer, treating a missing or `null` value as absent.
pub fn opt_str_at<'a>(doc: &'a Value, pointer: &str) -> Option<&'a str> {
	doc.pointer(pointer).and_then(Value::as_str)
}

/// Tracker ids come back as strings, but tolerate numbers.
pub fn id_at(doc: &Value, pointer: &str) -> Result<String> {
	match at(doc, pointer)? {
		Value::String(s) => Ok(s.clone()),
		Value::Number(n) => Ok(n.to_string()),
		_ => Err(TrackerError::Document(format!("{pointer} is not an id"))),
	}
}

pub fn timestamp_at(doc: &Value, pointer: &str) -> Result<Timestamp> {
	parse_timestamp(str_at(doc, pointer)?)
}

pub fn parse_timestamp(s: &str) -> Result<Timestamp> {
	Ok(jiff::fmt::strtime::parse(TIMESTAMP_FORMAT, s)?.to_timestamp()?)
}

/// Array elements at a pointer; missing or non-array values yield nothing.
pub fn array_at<'a>(doc: &'a Value, pointer: &str) -> impl Iterator<Item = &'a Value> {
	doc.pointer(pointer).and_then(Value::as_array).into_iter().flatten()
}

/// Copy of `doc` with every dotted path in `paths` removed.
///
/// A path whose intermediate segments are missing (or not objects) is skipped.
pub fn without_paths(doc: &Value, paths: &[&str]) -> Value {
	let mut doc = doc.clone();
	for path in paths {
		let mut parts = path.split('.').peekable();
		let mut node = &mut doc;
		while let Some(part) = parts.next() {
			let Some(object) = node.as_object_mut() else {
				break;
			};
			if parts.peek().is_none() {
				object.remove(part);
				break;
			}
			match object.get_mut(part) {
				Some(child) => node = child,
				None => break,
			}
		}
	}
	doc
}

/// Feed `value` into `state` independently of object key order, consistent with `Value`'s equality.
pub fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
	match value {
		Value::Null => 0u8.hash(state),
		Value::Bool(b) => {
			1u8.hash(state);
			b.hash(state);
		}
		Value::Number(n) => {
			2u8.hash(state);
			n.hash(state);
		}
		Value::String(s) => {
			3u8.hash(state);
			s.hash(state);
		}
		Value::Array(items) => {
			4u8.hash(state);
			items.len().hash(state);
			for item in items {
				hash_value(item, state);
			}
		}
		Value::Object(object) => {
			5u8.hash(state);
			object.len().hash(state);
			let mut entries: Vec<_> = object.iter().collect();
			entries.sort_by(|a, b| a.0.cmp(b.0));
			for (key, value) in entries {
				key.hash(state);
				hash_value(value, state);
			}
		}
	}
}
