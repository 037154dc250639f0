//! Project context: what an issue needs to know about the project it belongs to.

use std::{
	collections::BTreeMap,
	sync::{Arc, OnceLock, Weak},
};

use serde_json::{Value, json};
use url::Url;

use crate::{
	IssueSnapshot, LinkType, Result, TrackerError,
	config::Settings,
	document::array_at,
	properties::{EncodedField, PropertyCodec},
	transport::{HttpTransport, Request, SharedTransport},
};

pub trait ProjectContext: Send + Sync {
	/// Base url issues are browsed under.
	fn web_url(&self) -> &Url;

	/// Role comments are restricted to. When present, web links are stored as comments.
	fn visibility_role(&self) -> Option<&str>;

	fn link_types(&self) -> Result<Vec<LinkType>>;

	/// Property name and value for a backend field; `None` for fields outside the model.
	fn decode_property(&self, field: &str, value: &Value) -> Option<(String, Value)>;

	/// First encoding stage; `None` for unknown property names.
	fn encode_property(&self, name: &str, value: &Value) -> Option<EncodedField>;

	/// Second encoding stage for custom fields, given the issue's current properties and id.
	fn encode_custom_fields(&self, encoded: &EncodedField, properties: &BTreeMap<String, Value>, issue_id: &str) -> Value;

	/// Fetch an issue by id. `None` when the tracker does not know it.
	fn issue(&self, id: &str) -> Result<Option<IssueSnapshot>>;

	/// Create an issue-to-issue link from a prepared payload.
	fn create_issue_link(&self, query: &Value) -> Result<()>;
}

/// [`ProjectContext`] backed by the tracker's REST API.
pub struct JiraProject {
	me: Weak<JiraProject>,
	transport: SharedTransport,
	web_url: Url,
	visibility_role: Option<String>,
	codec: PropertyCodec,
	link_types: OnceLock<Vec<LinkType>>,
}

impl JiraProject {
	pub fn new(transport: SharedTransport, settings: &Settings) -> Result<Arc<Self>> {
		let web_url = settings.base_url()?;
		let codec = PropertyCodec::with_custom_fields(&settings.custom_fields);
		Ok(Arc::new_cyclic(|me| Self {
			me: me.clone(),
			transport,
			web_url,
			visibility_role: settings.visibility_role.clone(),
			codec,
			link_types: OnceLock::new(),
		}))
	}

	/// Project talking to the tracker configured in `settings` over HTTP.
	pub fn connect(settings: &Settings) -> Result<Arc<Self>> {
		Self::new(Arc::new(HttpTransport::new(settings)?), settings)
	}

	pub fn transport(&self) -> &SharedTransport {
		&self.transport
	}
}

impl ProjectContext for JiraProject {
	fn web_url(&self) -> &Url {
		&self.web_url
	}

	fn visibility_role(&self) -> Option<&str> {
		self.visibility_role.as_deref()
	}

	fn link_types(&self) -> Result<Vec<LinkType>> {
		if let Some(cached) = self.link_types.get() {
			return Ok(cached.clone());
		}

		let json = self.transport.execute(&Request::get("issueLinkType"))?;
		let link_types = array_at(&json, "/issueLinkTypes").map(|t| Ok(serde_json::from_value::<LinkType>(t.clone())?)).collect::<Result<Vec<_>>>()?;
		tracing::debug!(count = link_types.len(), "fetched link types");

		Ok(self.link_types.get_or_init(|| link_types).clone())
	}

	fn decode_property(&self, field: &str, value: &Value) -> Option<(String, Value)> {
		self.codec.decode(field, value)
	}

	fn encode_property(&self, name: &str, value: &Value) -> Option<EncodedField> {
		self.codec.encode(name, value)
	}

	fn encode_custom_fields(&self, encoded: &EncodedField, properties: &BTreeMap<String, Value>, issue_id: &str) -> Value {
		self.codec.encode_custom(encoded, properties, issue_id)
	}

	fn issue(&self, id: &str) -> Result<Option<IssueSnapshot>> {
		let request = Request::get(format!("issue/{id}")).on_status(404, Value::Null);
		let json = self.transport.execute(&request)?;
		if json.is_null() {
			return Ok(None);
		}

		let me = self.me.upgrade().ok_or(TrackerError::ProjectDropped)?;
		Ok(Some(IssueSnapshot::new(me, self.transport.clone(), json)?))
	}

	fn create_issue_link(&self, query: &Value) -> Result<()> {
		self.transport.execute(&Request::post("issueLink").body(query.clone()))?;
		Ok(())
	}
}

/// Payload creating a link of type `name` from `inward` to `outward`.
pub fn issue_link_query(name: &str, inward: &str, outward: &str) -> Value {
	json!({
		"type": { "name": name },
		"inwardIssue": { "key": inward },
		"outwardIssue": { "key": outward },
	})
}
