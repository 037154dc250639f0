//! In-memory tracker for testing purposes.
//!
//! [`MockTracker`] implements [`Transport`] by routing the same API paths the real
//! service exposes, keeping every issue, comment and link in memory. Each handled call
//! is appended to a call log and emitted as a `tracing::info!` event on target
//! `mock_tracker`, so tests can verify which remote operations happened.

use std::{
	collections::BTreeMap,
	sync::{
		Mutex, MutexGuard, PoisonError,
		atomic::{AtomicU64, Ordering},
	},
};

use serde_json::{Map, Value, json};
use tracing::instrument;

use super::{Method, Request, Transport};
use crate::{LinkType, Result, TrackerError};

/// Timestamp stamped on everything the mock creates.
pub const CREATED: &str = "2024-03-01T10:15:30.000+0000";
/// Timestamp stamped on everything the mock updates.
pub const UPDATED: &str = "2024-03-02T08:00:00.000+0000";

#[derive(Debug, Default)]
struct TrackerState {
	/// Issue key -> full issue document.
	issues: BTreeMap<String, Value>,
	/// Issue key -> comment documents, oldest first.
	comments: BTreeMap<String, Vec<Value>>,
	/// Issue key -> remote link entries.
	remote_links: BTreeMap<String, Vec<Value>>,
	/// Status name -> [(target status, transition id)].
	workflow: BTreeMap<String, Vec<(String, String)>>,
	link_types: Vec<LinkType>,
	deny_remote_links: bool,
}

/// Tracker backend that stores all state in memory. Thread-safe.
pub struct MockTracker {
	/// Account that authors comments created through the mock.
	user: String,
	next_comment_id: AtomicU64,
	next_remote_link_id: AtomicU64,
	state: Mutex<TrackerState>,
	call_log: Mutex<Vec<String>>,
}

impl MockTracker {
	pub fn new(user: &str) -> Self {
		Self {
			user: user.to_string(),
			next_comment_id: AtomicU64::new(10000),
			next_remote_link_id: AtomicU64::new(500),
			state: Mutex::new(TrackerState::default()),
			call_log: Mutex::new(Vec::new()),
		}
	}

	fn state(&self) -> MutexGuard<'_, TrackerState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Add an issue with the given key, summary and status name.
	pub fn add_issue(&self, key: &str, summary: &str, status: &str) {
		let issue = json!({
			"key": key,
			"id": format!("{}", 20000 + self.state().issues.len()),
			"fields": {
				"summary": summary,
				"description": null,
				"status": { "name": status },
				"resolution": null,
				"created": CREATED,
				"updated": CREATED,
				"creator": { "key": "JIRAUSER1", "name": self.user, "displayName": display_name(&self.user) },
				"assignee": null,
				"labels": [],
				"issuelinks": [],
				"customfield_11700": 0,
			},
		});
		self.state().issues.insert(key.to_string(), issue);
	}

	/// Overwrite one field of a stored issue, bypassing the call log.
	pub fn set_field(&self, key: &str, field: &str, value: Value) {
		if let Some(issue) = self.state().issues.get_mut(key) {
			issue["fields"][field] = value;
		}
	}

	/// Stored document of an issue, bypassing the call log.
	pub fn issue(&self, key: &str) -> Option<Value> {
		self.state().issues.get(key).cloned()
	}

	/// Replace the workflow graph. `edges` are (from status, to status, transition id).
	pub fn set_workflow(&self, edges: &[(&str, &str, &str)]) {
		let mut workflow: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
		for (from, to, id) in edges {
			workflow.entry(from.to_string()).or_default().push((to.to_string(), id.to_string()));
		}
		self.state().workflow = workflow;
	}

	pub fn add_link_type(&self, link_type: LinkType) {
		self.state().link_types.push(link_type);
	}

	/// Add a comment authored by `author`, bypassing the call log. Returns its id.
	pub fn add_comment(&self, key: &str, author: &str, body: &str) -> String {
		let comment = self.comment_document(author, body);
		let id = comment["id"].as_str().unwrap_or_default().to_string();
		self.state().comments.entry(key.to_string()).or_default().push(comment);
		id
	}

	/// Add a raw remote link entry, bypassing the call log.
	pub fn add_remote_link(&self, key: &str, entry: Value) {
		self.state().remote_links.entry(key.to_string()).or_default().push(entry);
	}

	/// Answer 401 to every remote-link listing.
	pub fn deny_remote_links(&self) {
		self.state().deny_remote_links = true;
	}

	/// Stored comment documents of an issue, bypassing the call log.
	pub fn comments(&self, key: &str) -> Vec<Value> {
		self.state().comments.get(key).cloned().unwrap_or_default()
	}

	pub fn comment_bodies(&self, key: &str) -> Vec<String> {
		self.comments(key).iter().filter_map(|c| c["body"].as_str().map(str::to_string)).collect()
	}

	pub fn remote_link_count(&self, key: &str) -> usize {
		self.state().remote_links.get(key).map_or(0, Vec::len)
	}

	/// Every call handled so far, as `METHOD path`.
	pub fn call_log(&self) -> Vec<String> {
		self.call_log.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}

	pub fn clear_call_log(&self) {
		self.call_log.lock().unwrap_or_else(PoisonError::into_inner).clear();
	}

	/// Number of logged calls matching `method` and `path` exactly.
	pub fn count_calls(&self, method: Method, path: &str) -> usize {
		let call = format!("{method} {path}");
		self.call_log().iter().filter(|c| **c == call).count()
	}

	fn log_call(&self, request: &Request) {
		self.call_log.lock().unwrap_or_else(PoisonError::into_inner).push(format!("{} {}", request.method(), request.path()));
	}

	fn comment_document(&self, author: &str, body: &str) -> Value {
		let id = self.next_comment_id.fetch_add(1, Ordering::SeqCst);
		json!({
			"id": id.to_string(),
			"body": body,
			"author": { "name": author, "displayName": display_name(author) },
			"created": CREATED,
			"updated": CREATED,
		})
	}

	//==========================================================================
	// Routes
	//==========================================================================

	fn issue_route(&self, method: Method, key: &str, request: &Request) -> Result<Value> {
		let mut state = self.state();
		let issue = state.issues.get_mut(key).ok_or_else(|| not_found(format!("issue {key}")))?;
		match method {
			Method::Get => Ok(issue.clone()),
			Method::Put => {
				let body = request.json_body().cloned().unwrap_or(Value::Null);
				if let Some(fields) = body.get("fields").and_then(Value::as_object) {
					for (field, value) in fields {
						issue["fields"][field] = value.clone();
					}
				}
				for operation in body.pointer("/update/labels").and_then(Value::as_array).into_iter().flatten() {
					apply_label_operation(issue, operation)?;
				}
				issue["fields"]["updated"] = json!(UPDATED);
				Ok(json!({}))
			}
			_ => Err(method_not_allowed(request)),
		}
	}

	fn assignee_route(&self, key: &str, request: &Request) -> Result<Value> {
		let mut state = self.state();
		let issue = state.issues.get_mut(key).ok_or_else(|| not_found(format!("issue {key}")))?;
		let assignee = match request.json_body().and_then(|b| b.get("name")).and_then(Value::as_str) {
			Some(name) => json!({ "name": name, "displayName": display_name(name) }),
			None => Value::Null,
		};
		issue["fields"]["assignee"] = assignee;
		Ok(json!({}))
	}

	fn comments_route(&self, method: Method, key: &str, request: &Request) -> Result<Value> {
		if !self.state().issues.contains_key(key) {
			return Err(not_found(format!("issue {key}")));
		}
		match method {
			Method::Get => {
				let comments = self.state().comments.get(key).cloned().unwrap_or_default();
				Ok(json!({ "startAt": 0, "total": comments.len(), "comments": comments }))
			}
			Method::Post => {
				let body = request.json_body().cloned().unwrap_or(Value::Null);
				let mut comment = self.comment_document(&self.user, body["body"].as_str().unwrap_or_default());
				if let Some(visibility) = body.get("visibility") {
					comment["visibility"] = visibility.clone();
				}
				self.state().comments.entry(key.to_string()).or_default().push(comment.clone());
				Ok(comment)
			}
			_ => Err(method_not_allowed(request)),
		}
	}

	fn comment_route(&self, method: Method, key: &str, id: &str, request: &Request) -> Result<Value> {
		let mut state = self.state();
		let comments = state.comments.entry(key.to_string()).or_default();
		let position = comments.iter().position(|c| c["id"] == id).ok_or_else(|| not_found(format!("comment {id}")))?;
		match method {
			Method::Get => Ok(comments[position].clone()),
			Method::Put => {
				let body = request.json_body().cloned().unwrap_or(Value::Null);
				let comment = &mut comments[position];
				comment["body"] = body["body"].clone();
				comment["updated"] = json!(UPDATED);
				if let Some(visibility) = body.get("visibility") {
					comment["visibility"] = visibility.clone();
				}
				Ok(comment.clone())
			}
			Method::Delete => {
				comments.remove(position);
				Ok(json!({}))
			}
			Method::Post => Err(method_not_allowed(request)),
		}
	}

	fn transitions_route(&self, method: Method, key: &str, request: &Request) -> Result<Value> {
		let mut state = self.state();
		let TrackerState { issues, workflow, .. } = &mut *state;
		let issue = issues.get_mut(key).ok_or_else(|| not_found(format!("issue {key}")))?;
		let status = issue.pointer("/fields/status/name").and_then(Value::as_str).unwrap_or_default().to_string();
		let available = workflow.get(&status).cloned().unwrap_or_default();

		match method {
			Method::Get => {
				let transitions: Vec<Value> = available.iter().map(|(to, id)| json!({ "id": id, "name": to, "to": { "name": to } })).collect();
				Ok(json!({ "transitions": transitions }))
			}
			Method::Post => {
				let id = request.json_body().and_then(|b| b.pointer("/transition/id")).and_then(Value::as_str).unwrap_or_default();
				let (to, _) = available.iter().find(|(_, t)| t == id).ok_or_else(|| TrackerError::Status {
					status: 400,
					body: format!("transition {id} is not valid from {status}"),
				})?;
				issue["fields"]["status"]["name"] = json!(to);
				Ok(json!({}))
			}
			_ => Err(method_not_allowed(request)),
		}
	}

	fn remote_links_route(&self, method: Method, key: &str, request: &Request) -> Result<Value> {
		let mut state = self.state();
		if !state.issues.contains_key(key) {
			return Err(not_found(format!("issue {key}")));
		}
		match method {
			Method::Get => {
				if state.deny_remote_links {
					return Err(TrackerError::Status {
						status: 401,
						body: "not permitted to view remote links".into(),
					});
				}
				Ok(Value::Array(state.remote_links.get(key).cloned().unwrap_or_default()))
			}
			Method::Post => {
				let mut entry = request.json_body().cloned().unwrap_or(Value::Null);
				let links = state.remote_links.entry(key.to_string()).or_default();
				match links.iter_mut().find(|l| l["globalId"] == entry["globalId"]) {
					Some(existing) => {
						entry["id"] = existing["id"].clone();
						*existing = entry.clone();
					}
					None => {
						entry["id"] = json!(self.next_remote_link_id.fetch_add(1, Ordering::SeqCst));
						links.push(entry.clone());
					}
				}
				Ok(json!({ "id": entry["id"] }))
			}
			Method::Delete => {
				let global_id = request.param_value("globalId").unwrap_or_default();
				let links = state.remote_links.entry(key.to_string()).or_default();
				let before = links.len();
				links.retain(|l| l["globalId"] != global_id);
				if links.len() == before {
					return Err(not_found(format!("remote link {global_id}")));
				}
				Ok(json!({}))
			}
			Method::Put => Err(method_not_allowed(request)),
		}
	}

	fn issue_link_route(&self, request: &Request) -> Result<Value> {
		let body = request.json_body().cloned().unwrap_or(Value::Null);
		let name = body.pointer("/type/name").and_then(Value::as_str).unwrap_or_default();
		let inward = body.pointer("/inwardIssue/key").and_then(Value::as_str).unwrap_or_default();
		let outward = body.pointer("/outwardIssue/key").and_then(Value::as_str).unwrap_or_default();

		let mut state = self.state();
		let link_type = state.link_types.iter().find(|t| t.name == name).ok_or_else(|| TrackerError::Status {
			status: 404,
			body: format!("no link type named {name}"),
		})?;
		let link_type = json!({ "name": link_type.name, "inward": link_type.inward, "outward": link_type.outward });

		for (key, entry) in [(inward, json!({ "type": link_type, "outwardIssue": { "key": outward } })), (outward, json!({ "type": link_type, "inwardIssue": { "key": inward } }))] {
			let issue = state.issues.get_mut(key).ok_or_else(|| not_found(format!("issue {key}")))?;
			match issue["fields"]["issuelinks"].as_array_mut() {
				Some(links) => links.push(entry),
				None => issue["fields"]["issuelinks"] = json!([entry]),
			}
		}
		Ok(json!({}))
	}

	fn link_types_route(&self) -> Value {
		let types: Vec<Value> = self.state().link_types.iter().map(|t| json!({ "name": t.name, "inward": t.inward, "outward": t.outward })).collect();
		json!({ "issueLinkTypes": types })
	}
}

impl Transport for MockTracker {
	#[instrument(skip(self, request), name = "MockTracker::send", fields(method = %request.method(), path = request.path()))]
	fn send(&self, request: &Request) -> Result<Value> {
		tracing::info!(target: "mock_tracker", method = %request.method(), path = request.path(), "request");
		self.log_call(request);

		let method = request.method();
		let segments: Vec<&str> = request.path().split('/').collect();
		match segments.as_slice() {
			["issue", key] => self.issue_route(method, key, request),
			["issue", key, "assignee"] if method == Method::Put => self.assignee_route(key, request),
			["issue", key, "comment"] => self.comments_route(method, key, request),
			["issue", key, "comment", id] => self.comment_route(method, key, id, request),
			["issue", key, "transitions"] => self.transitions_route(method, key, request),
			["issue", key, "remotelink"] => self.remote_links_route(method, key, request),
			["issueLink"] if method == Method::Post => self.issue_link_route(request),
			["issueLinkType"] if method == Method::Get => Ok(self.link_types_route()),
			_ => Err(not_found(format!("route {method} {}", request.path()))),
		}
	}
}

fn apply_label_operation(issue: &mut Value, operation: &Value) -> Result<()> {
	let labels = &mut issue["fields"]["labels"];
	if !labels.is_array() {
		*labels = json!([]);
	}
	let Some(current) = labels.as_array_mut() else {
		return Ok(());
	};

	let operation = operation.as_object().cloned().unwrap_or_else(Map::new);
	if let Some(label) = operation.get("add") {
		if !current.contains(label) {
			current.push(label.clone());
		}
	} else if let Some(label) = operation.get("remove") {
		current.retain(|l| l != label);
	} else if let Some(Value::Array(labels)) = operation.get("set") {
		*current = labels.clone();
	} else {
		return Err(TrackerError::Status {
			status: 400,
			body: format!("unsupported label operation {operation:?}"),
		});
	}
	Ok(())
}

fn display_name(account: &str) -> String {
	let mut chars = account.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

fn not_found(what: String) -> TrackerError {
	TrackerError::Status { status: 404, body: format!("{what} does not exist") }
}

fn method_not_allowed(request: &Request) -> TrackerError {
	TrackerError::Status {
		status: 405,
		body: format!("{} not allowed on {}", request.method(), request.path()),
	}
}
