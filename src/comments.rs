//! Comment storage for a single issue.

use serde_json::{Value, json};

use crate::{
	Comment, HostUser, Result,
	document::{self, array_at},
	transport::{Request, Transport},
};

/// Upper bound the tracker accepts for a single comment page.
const MAX_RESULTS: &str = "1000";

/// Comments of one issue, created with the project's visibility restriction when there is one.
pub struct CommentStore<'a> {
	transport: &'a dyn Transport,
	issue_path: &'a str,
	visibility_role: Option<&'a str>,
}

impl<'a> CommentStore<'a> {
	pub fn new(transport: &'a dyn Transport, issue_path: &'a str, visibility_role: Option<&'a str>) -> Self {
		Self {
			transport,
			issue_path,
			visibility_role,
		}
	}

	fn comment_path(&self, id: &str) -> String {
		format!("{}/comment/{id}", self.issue_path)
	}

	fn body_with_visibility(&self, body: &str) -> Value {
		let mut query = json!({ "body": body });
		if let Some(role) = self.visibility_role {
			query["visibility"] = json!({ "type": "role", "value": role });
		}
		query
	}

	pub fn list(&self) -> Result<Vec<Comment>> {
		let request = Request::get(format!("{}/comment", self.issue_path)).param("maxResults", MAX_RESULTS);
		let comments = self.transport.execute(&request)?;
		array_at(&comments, "/comments").map(parse_comment).collect()
	}

	pub fn create(&self, body: &str) -> Result<Comment> {
		let request = Request::post(format!("{}/comment", self.issue_path)).body(self.body_with_visibility(body));
		parse_comment(&self.transport.execute(&request)?)
	}

	pub fn update(&self, id: &str, body: &str) -> Result<Comment> {
		let request = Request::put(self.comment_path(id)).body(self.body_with_visibility(body));
		parse_comment(&self.transport.execute(&request)?)
	}

	/// Delete a comment. A comment that is already gone counts as deleted.
	pub fn delete(&self, id: &str) -> Result<()> {
		let request = Request::delete(self.comment_path(id)).on_status(404, json!({ "already_deleted": true }));
		self.transport.execute(&request)?;
		Ok(())
	}
}

pub fn parse_comment(json: &Value) -> Result<Comment> {
	let author_name = document::str_at(json, "/author/name")?;
	let author = HostUser::from_account(author_name, document::opt_str_at(json, "/author/displayName").unwrap_or(author_name));

	Ok(Comment::new(
		document::id_at(json, "/id")?,
		document::str_at(json, "/body")?,
		author,
		document::timestamp_at(json, "/created")?,
		document::timestamp_at(json, "/updated")?,
	))
}
