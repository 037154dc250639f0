//! Point-in-time view of one issue.
//!
//! An [`IssueSnapshot`] wraps the JSON document fetched when it was created. Reads come
//! from that document, except labels, which are cached and re-fetched after label
//! mutations. Mutators write to the tracker immediately; the snapshot itself is not
//! refreshed, so callers re-fetch the issue when they need to observe their writes.
//!
//! Equality and hashing are structural over the document, ignoring [`VOLATILE_FIELDS`].

use std::{
	cell::OnceCell,
	collections::BTreeMap,
	fmt,
	hash::{Hash, Hasher},
	sync::Arc,
};

use jiff::Timestamp;
use serde_json::{Map, Value, json};
use url::Url;

use crate::{
	Comment, Direction, HostUser, IssueLink, Label, Link, Result, State, TrackerError, WebLink,
	comments::CommentStore,
	document::{self, array_at},
	link_store::{CommentLinkChannel, LinkChannel, RemoteLinkChannel},
	project::{ProjectContext, issue_link_query},
	transitions::{RemoteWorkflow, drive_to},
	transport::{Request, SharedTransport},
};

/// Dotted paths that change without semantic meaning and are left out of equality.
pub const VOLATILE_FIELDS: &[&str] = &["fields.customfield_11700"];

/// Resolutions that count as fixed.
pub const FIXED_RESOLUTIONS: &[&str] = &["Fixed", "Delivered"];

#[derive(Clone)]
pub struct IssueSnapshot {
	project: Arc<dyn ProjectContext>,
	transport: SharedTransport,
	json: Value,
	id: String,
	title: String,
	status: String,
	/// Unset means "unknown, fetch on next read".
	labels: OnceCell<Vec<Label>>,
}

impl IssueSnapshot {
	pub fn new(project: Arc<dyn ProjectContext>, transport: SharedTransport, json: Value) -> Result<Self> {
		let id = document::str_at(&json, "/key")?.to_string();
		let title = document::str_at(&json, "/fields/summary")?.trim().to_string();
		let status = document::str_at(&json, "/fields/status/name")?.to_string();
		let labels = OnceCell::from(parse_labels(&json));

		Ok(Self {
			project,
			transport,
			json,
			id,
			title,
			status,
			labels,
		})
	}

	pub fn project(&self) -> &Arc<dyn ProjectContext> {
		&self.project
	}

	/// The document this snapshot was created from.
	pub fn json(&self) -> &Value {
		&self.json
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	fn path(&self) -> String {
		format!("issue/{}", self.id)
	}

	fn needs_visibility(&self) -> bool {
		self.project.visibility_role().is_some()
	}

	fn comment_store<'a>(&'a self, path: &'a str) -> CommentStore<'a> {
		CommentStore::new(&*self.transport, path, self.project.visibility_role())
	}

	fn update(&self, query: Value) -> Result<()> {
		self.transport.execute(&Request::put(self.path()).body(query))?;
		Ok(())
	}

	pub fn author(&self) -> Result<HostUser> {
		Ok(HostUser::new(
			document::str_at(&self.json, "/fields/creator/key")?,
			document::str_at(&self.json, "/fields/creator/name")?,
			document::str_at(&self.json, "/fields/creator/displayName")?,
		))
	}

	pub fn title(&self) -> &str {
		&self.title
	}

	/// Restricted-visibility projects cannot scope a title change, so it is skipped there.
	pub fn set_title(&self, title: &str) -> Result<()> {
		if self.needs_visibility() {
			tracing::warn!(issue = %self.id, "issue title does not support setting a visibility role - ignoring");
			return Ok(());
		}
		self.update(json!({ "fields": { "summary": title } }))
	}

	pub fn body(&self) -> &str {
		document::opt_str_at(&self.json, "/fields/description").unwrap_or("")
	}

	pub fn set_body(&self, body: &str) -> Result<()> {
		if self.needs_visibility() {
			tracing::warn!(issue = %self.id, "issue body does not support setting a visibility role - ignoring");
			return Ok(());
		}
		self.update(json!({ "fields": { "description": body } }))
	}

	pub fn created_at(&self) -> Result<Timestamp> {
		document::timestamp_at(&self.json, "/fields/created")
	}

	pub fn updated_at(&self) -> Result<Timestamp> {
		document::timestamp_at(&self.json, "/fields/updated")
	}

	//==========================================================================
	// Comments
	//==========================================================================

	pub fn comments(&self) -> Result<Vec<Comment>> {
		self.comment_store(&self.path()).list()
	}

	pub fn add_comment(&self, body: &str) -> Result<Comment> {
		self.comment_store(&self.path()).create(body)
	}

	pub fn update_comment(&self, id: &str, body: &str) -> Result<Comment> {
		self.comment_store(&self.path()).update(id, body)
	}

	pub fn remove_comment(&self, comment: &Comment) -> Result<()> {
		self.comment_store(&self.path()).delete(&comment.id)
	}

	pub fn comment_url(&self, comment: &Comment) -> Result<Url> {
		let mut url = self.web_url()?;
		url.set_query(Some(&format!("focusedCommentId={}", comment.id)));
		Ok(url)
	}

	//==========================================================================
	// Status
	//==========================================================================

	/// Free-text status name, e.g. "In Progress".
	pub fn status(&self) -> &str {
		&self.status
	}

	pub fn state(&self) -> State {
		State::from_status(&self.status)
	}

	pub fn is_open(&self) -> bool {
		self.state() == State::Open
	}

	pub fn is_resolved(&self) -> bool {
		self.state() == State::Resolved
	}

	pub fn is_closed(&self) -> bool {
		self.state() == State::Closed
	}

	pub fn resolution(&self) -> Option<&str> {
		document::opt_str_at(&self.json, "/fields/resolution/name")
	}

	/// Resolved or closed, with a resolution that counts as fixed.
	pub fn is_fixed(&self) -> bool {
		(self.is_resolved() || self.is_closed()) && self.resolution().is_some_and(|r| FIXED_RESOLUTIONS.contains(&r))
	}

	/// Move the issue into `state`, performing up to two transitions. See [`crate::transitions`].
	pub fn set_state(&self, state: State) -> Result<()> {
		let path = self.path();
		drive_to(&RemoteWorkflow::new(&*self.transport, &path), state)
	}

	//==========================================================================
	// Labels
	//==========================================================================

	pub fn labels(&self) -> Result<Vec<Label>> {
		if let Some(labels) = self.labels.get() {
			return Ok(labels.clone());
		}

		let json = self.transport.execute(&Request::get(self.path()))?;
		let labels = parse_labels(&json);
		Ok(self.labels.get_or_init(|| labels).clone())
	}

	pub fn add_label(&mut self, label: &str) -> Result<()> {
		self.labels.take();
		self.update(json!({ "update": { "labels": [{ "add": label }] } }))
	}

	pub fn remove_label(&mut self, label: &str) -> Result<()> {
		self.labels.take();
		self.update(json!({ "update": { "labels": [{ "remove": label }] } }))
	}

	pub fn set_labels(&mut self, labels: &[Label]) -> Result<()> {
		self.update(json!({ "update": { "labels": [{ "set": labels }] } }))?;
		self.labels = OnceCell::from(labels.to_vec());
		Ok(())
	}

	//==========================================================================
	// People
	//==========================================================================

	pub fn web_url(&self) -> Result<Url> {
		Ok(self.project.web_url().join(&format!("browse/{}", self.id))?)
	}

	/// Zero or one assignee; the tracker has a single assignee slot.
	pub fn assignees(&self) -> Vec<HostUser> {
		match self.json.pointer("/fields/assignee") {
			Some(assignee) if !assignee.is_null() => {
				let Some(name) = assignee.get("name").and_then(Value::as_str) else {
					return Vec::new();
				};
				let display_name = assignee.get("displayName").and_then(Value::as_str).unwrap_or(name);
				vec![HostUser::from_account(name, display_name)]
			}
			_ => Vec::new(),
		}
	}

	pub fn set_assignees(&self, assignees: &[HostUser]) -> Result<()> {
		let name = match assignees {
			[] => Value::Null,
			[single] => json!(single.id),
			_ => return Err(TrackerError::Unsupported("multiple assignees")),
		};
		self.transport.execute(&Request::put(format!("{}/assignee", self.path())).body(json!({ "name": name })))?;
		Ok(())
	}

	/// Not tracked by this backend.
	pub fn closed_by(&self) -> Result<Option<HostUser>> {
		Err(TrackerError::NotImplemented("closed_by"))
	}

	//==========================================================================
	// Links
	//==========================================================================

	/// Native web links, then comment-encoded web links, then issue links.
	pub fn links(&self) -> Result<Vec<Link>> {
		let path = self.path();
		let mut result: Vec<Link> = RemoteLinkChannel::new(&*self.transport, &path).links()?.into_iter().map(Link::Web).collect();
		result.extend(CommentLinkChannel::new(self.comment_store(&path)).links()?.into_iter().map(Link::Web));

		for entry in array_at(&self.json, "/fields/issuelinks") {
			let (key, relationship) = match entry.get("inwardIssue") {
				Some(inward) => (document::str_at(inward, "/key")?, document::str_at(entry, "/type/inward")?),
				None => (document::str_at(entry, "/outwardIssue/key")?, document::str_at(entry, "/type/outward")?),
			};
			let issue = self.project.issue(key)?.ok_or_else(|| TrackerError::Document(format!("linked issue {key} not found")))?;
			result.push(Link::issue(issue, relationship));
		}

		Ok(result)
	}

	pub fn add_link(&self, link: &Link) -> Result<()> {
		match link {
			Link::Web(web) => self.add_web_link(web),
			Link::Issue(issue) => self.add_issue_link(issue),
		}
	}

	/// Remove a web link from both channels. Removing an issue link is not supported.
	pub fn remove_link(&self, link: &Link) -> Result<()> {
		match link {
			Link::Web(web) => {
				let path = self.path();
				RemoteLinkChannel::new(&*self.transport, &path).remove(web)?;
				CommentLinkChannel::new(self.comment_store(&path)).remove(web)
			}
			Link::Issue(_) => Err(TrackerError::Unsupported("removing issue links")),
		}
	}

	fn add_web_link(&self, link: &WebLink) -> Result<()> {
		let path = self.path();
		if self.needs_visibility() {
			CommentLinkChannel::new(self.comment_store(&path)).add(link)
		} else {
			RemoteLinkChannel::new(&*self.transport, &path).add(link)
		}
	}

	fn add_issue_link(&self, link: &IssueLink) -> Result<()> {
		let relationship = link.relationship();
		let link_types = self.project.link_types()?;
		let (link_type, direction) = link_types
			.iter()
			.find_map(|t| t.direction_of(relationship).map(|d| (t, d)))
			.ok_or_else(|| TrackerError::NoSuchLinkType {
				relationship: relationship.to_string(),
			})?;

		let target = link.issue().id();
		let query = match direction {
			Direction::Outward => issue_link_query(&link_type.name, &self.id, target),
			Direction::Inward => issue_link_query(&link_type.name, target, &self.id),
		};
		self.project.create_issue_link(&query)
	}

	//==========================================================================
	// Properties
	//==========================================================================

	/// Decoded properties of every field the project knows; other fields are left out.
	pub fn properties(&self) -> BTreeMap<String, Value> {
		let Some(fields) = self.json.get("fields").and_then(Value::as_object) else {
			return BTreeMap::new();
		};
		fields.iter().filter_map(|(field, value)| self.project.decode_property(field, value)).collect()
	}

	/// Unknown property names are logged and ignored.
	pub fn set_property(&self, name: &str, value: &Value) -> Result<()> {
		let Some(encoded) = self.project.encode_property(name, value) else {
			tracing::warn!(issue = %self.id, property = name, "ignoring unknown property");
			return Ok(());
		};
		let value = self.project.encode_custom_fields(&encoded, &self.properties(), &self.id);

		let mut fields = Map::new();
		fields.insert(encoded.field, value);
		self.update(json!({ "fields": fields }))
	}

	/// Not supported by this backend: nothing is removed and the caller is told so.
	pub fn remove_property(&self, name: &str) -> Result<()> {
		tracing::warn!(issue = %self.id, property = name, "removing properties is not implemented");
		Err(TrackerError::NotImplemented("remove_property"))
	}
}

fn parse_labels(json: &Value) -> Vec<Label> {
	array_at(json, "/fields/labels").filter_map(Value::as_str).map(str::to_string).collect()
}

impl fmt::Debug for IssueSnapshot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("IssueSnapshot").field("id", &self.id).field("status", &self.status).finish_non_exhaustive()
	}
}

impl PartialEq for IssueSnapshot {
	fn eq(&self, other: &Self) -> bool {
		document::without_paths(&self.json, VOLATILE_FIELDS) == document::without_paths(&other.json, VOLATILE_FIELDS)
	}
}

impl Eq for IssueSnapshot {}

impl Hash for IssueSnapshot {
	fn hash<H: Hasher>(&self, state: &mut H) {
		document::hash_value(&document::without_paths(&self.json, VOLATILE_FIELDS), state);
	}
}
