//! Persistence channels for web links.
//!
//! Web links live either in the tracker's native remote-link collection or, when the
//! project restricts comment visibility, in specially formatted comments. Which channel
//! receives new links is a project capability; reads and removals always cover both,
//! since links may have been added under either mode in the past.

use serde_json::json;

use crate::{
	Result, WebLink,
	comments::CommentStore,
	link_codec,
	transport::{Request, Transport},
};

pub trait LinkChannel {
	fn links(&self) -> Result<Vec<WebLink>>;

	/// Store `link`. Adding a link that is already stored must not duplicate it.
	fn add(&self, link: &WebLink) -> Result<()>;

	/// Remove every stored link pointing at `link`'s URI. Removing nothing is not an error.
	fn remove(&self, link: &WebLink) -> Result<()>;
}

//==============================================================================
// Native remote links
//==============================================================================

pub struct RemoteLinkChannel<'a> {
	transport: &'a dyn Transport,
	path: String,
}

impl<'a> RemoteLinkChannel<'a> {
	pub fn new(transport: &'a dyn Transport, issue_path: &str) -> Self {
		Self {
			transport,
			path: format!("{issue_path}/remotelink"),
		}
	}
}

impl LinkChannel for RemoteLinkChannel<'_> {
	fn links(&self) -> Result<Vec<WebLink>> {
		// Without permission to see remote links, there are none to show.
		let request = Request::get(&self.path).on_status(401, json!([]));
		let entries = self.transport.execute(&request)?;

		entries.as_array().into_iter().flatten().filter(|entry| link_codec::is_own_remote_link(entry)).map(link_codec::parse_remote_link).collect()
	}

	fn add(&self, link: &WebLink) -> Result<()> {
		// Keyed by global id: the tracker updates the existing entry for a known URI.
		let request = Request::post(&self.path).body(link_codec::remote_link_body(link));
		self.transport.execute(&request)?;
		Ok(())
	}

	fn remove(&self, link: &WebLink) -> Result<()> {
		// Entries are deleted by the id they are stored under, which may predate URI normalization.
		let mut ids = vec![link.global_id()];
		for stored in self.links()? {
			let id = stored.global_id();
			if stored.uri() == link.uri() && !ids.contains(&id) {
				ids.push(id);
			}
		}

		for id in ids {
			let request = Request::delete(&self.path).param("globalId", id).on_status(404, json!({ "already_deleted": true }));
			self.transport.execute(&request)?;
		}
		Ok(())
	}
}

//==============================================================================
// Comment-encoded links
//==============================================================================

pub struct CommentLinkChannel<'a> {
	comments: CommentStore<'a>,
}

impl<'a> CommentLinkChannel<'a> {
	pub fn new(comments: CommentStore<'a>) -> Self {
		Self { comments }
	}
}

impl LinkChannel for CommentLinkChannel<'_> {
	fn links(&self) -> Result<Vec<WebLink>> {
		Ok(self.comments.list()?.iter().filter_map(|c| link_codec::parse_link_comment(&c.body)).collect())
	}

	fn add(&self, link: &WebLink) -> Result<()> {
		if self.links()?.iter().any(|posted| posted.same_target(link)) {
			tracing::debug!(uri = %link.uri(), "link comment already posted");
			return Ok(());
		}
		self.comments.create(&link_codec::serialize_link_comment(link))?;
		Ok(())
	}

	fn remove(&self, link: &WebLink) -> Result<()> {
		for comment in self.comments.list()? {
			let Some(posted) = link_codec::parse_link_comment(&comment.body) else {
				continue;
			};
			if posted.uri() != link.uri() {
				continue;
			}
			self.comments.delete(&comment.id)?;
		}
		Ok(())
	}
}
