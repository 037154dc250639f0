//! Wire encodings of web links.
//!
//! Two encodings exist:
//! - the tracker's native remote-link JSON, keyed by a global id derived from the URI;
//! - a plain-text comment, used when comments must carry a restricted visibility:
//!
//! ```text
//! Remote link: <title>
//! URL: <uri>
//! [Summary: <summary>]
//! [Relationship: <relationship>]
//! ```
//!
//! Comment parsing is best-effort scanning: anything that does not look like a link
//! comment is simply not a link.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};
use url::Url;

use crate::{Result, TrackerError, WebLink, WebLinkBuilder, document};

/// Namespace of the global ids this crate assigns to remote links.
pub const GLOBAL_ID_PREFIX: &str = "skaralink=";

static TITLE_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Remote link: (.*)$").expect("static regex"));
static URL_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^URL: (.*)$").expect("static regex"));
static SUMMARY_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Summary: (.*)$").expect("static regex"));
static RELATIONSHIP_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Relationship: (.*)$").expect("static regex"));

/// Global id of the remote link for `uri`. Deterministic, so re-adding the same URI upserts.
pub fn global_id(uri: &Url) -> String {
	format!("{GLOBAL_ID_PREFIX}{uri}")
}

//==============================================================================
// Comment encoding
//==============================================================================

/// Parse a comment body as a link comment. Returns `None` for anything else.
pub fn parse_link_comment(body: &str) -> Option<WebLink> {
	let lines: Vec<&str> = body.lines().collect();
	if lines.len() < 2 || lines.len() > 4 {
		return None;
	}

	let title = TITLE_LINE.captures(lines[0])?.get(1)?.as_str();
	let uri = URL_LINE.captures(lines[1])?.get(1)?.as_str();

	let mut builder = match Url::parse(uri) {
		Ok(uri) => WebLinkBuilder::new(uri, title),
		Err(e) => {
			tracing::warn!(uri, error = %e, "invalid link in web link comment");
			return None;
		}
	};

	for line in &lines[2..] {
		if let Some(summary) = SUMMARY_LINE.captures(line).and_then(|c| c.get(1)) {
			builder = builder.summary(summary.as_str());
		}
		if let Some(relationship) = RELATIONSHIP_LINE.captures(line).and_then(|c| c.get(1)) {
			builder = builder.relationship(relationship.as_str());
		}
	}

	Some(builder.build())
}

/// Render a link as a comment body that [`parse_link_comment`] reads back.
pub fn serialize_link_comment(link: &WebLink) -> String {
	let mut body = format!("Remote link: {}\nURL: {}\n", link.title(), link.uri());
	if let Some(summary) = link.summary() {
		body.push_str(&format!("Summary: {summary}\n"));
	}
	if let Some(relationship) = link.relationship() {
		body.push_str(&format!("Relationship: {relationship}\n"));
	}
	body
}

//==============================================================================
// Remote-link encoding
//==============================================================================

/// True for remote-link entries created by this crate.
pub fn is_own_remote_link(entry: &Value) -> bool {
	entry.get("globalId").and_then(Value::as_str).is_some_and(|id| id.starts_with(GLOBAL_ID_PREFIX))
}

/// Decode one entry of the remote-link collection.
pub fn parse_remote_link(entry: &Value) -> Result<WebLink> {
	let uri = document::str_at(entry, "/object/url")?;
	let uri = Url::parse(uri).map_err(|e| TrackerError::MalformedInput(format!("remote link url '{uri}': {e}")))?;
	let mut builder = WebLinkBuilder::new(uri, document::str_at(entry, "/object/title")?);
	if let Some(id) = document::opt_str_at(entry, "/globalId") {
		builder = builder.stored_id(id);
	}

	if let Some(relationship) = document::opt_str_at(entry, "/relationship") {
		builder = builder.relationship(relationship);
	}
	if let Some(summary) = document::opt_str_at(entry, "/object/summary") {
		builder = builder.summary(summary);
	}
	if let Some(url) = icon_url(entry, "/object/icon/url16x16") {
		builder = builder.icon_url(url);
	}
	if let Some(title) = document::opt_str_at(entry, "/object/icon/title") {
		builder = builder.icon_title(title);
	}
	if let Some(url) = icon_url(entry, "/object/status/icon/url16x16") {
		builder = builder.status_icon_url(url);
	}
	if let Some(title) = document::opt_str_at(entry, "/object/status/icon/title") {
		builder = builder.status_icon_title(title);
	}
	let resolved = entry.pointer("/object/status/resolved").and_then(Value::as_bool).unwrap_or(false);

	Ok(builder.resolved(resolved).build())
}

fn icon_url(entry: &Value, pointer: &str) -> Option<Url> {
	let raw = document::opt_str_at(entry, pointer)?;
	match Url::parse(raw) {
		Ok(url) => Some(url),
		Err(e) => {
			tracing::warn!(url = raw, error = %e, "ignoring invalid remote link icon");
			None
		}
	}
}

/// Body of the create-or-update remote-link call.
pub fn remote_link_body(link: &WebLink) -> Value {
	let mut icon = Map::new();
	if let Some(url) = &link.icon().url {
		icon.insert("url16x16".into(), json!(url.as_str()));
	}
	if let Some(title) = &link.icon().title {
		icon.insert("title".into(), json!(title));
	}

	let mut status_icon = Map::new();
	if let Some(url) = &link.status_icon().url {
		status_icon.insert("url16x16".into(), json!(url.as_str()));
	}
	if let Some(title) = &link.status_icon().title {
		status_icon.insert("title".into(), json!(title));
	}

	let mut object = json!({
		"url": link.uri().as_str(),
		"title": link.title(),
		"icon": icon,
		"status": {
			"resolved": link.resolved(),
			"icon": status_icon,
		},
	});
	if let Some(summary) = link.summary() {
		object["summary"] = json!(summary);
	}

	let mut body = json!({
		"globalId": link.global_id(),
		"object": object,
	});
	if let Some(relationship) = link.relationship() {
		body["relationship"] = json!(relationship);
	}
	body
}
