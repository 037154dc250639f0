//! Links attached to an issue.
//!
//! A link is either a web link (a URI with presentation metadata) or an issue link
//! (another issue plus a relationship name). The two shapes never mix.

use derive_more::From;
use url::Url;

use crate::{IssueSnapshot, Result, TrackerError, link_codec};

#[derive(Clone, Debug, From, PartialEq)]
pub enum Link {
	Web(WebLink),
	Issue(IssueLink),
}

impl Link {
	/// Start building a web link.
	pub fn web(uri: Url, title: impl Into<String>) -> WebLinkBuilder {
		WebLinkBuilder::new(uri, title)
	}

	/// Link to another issue under the given relationship name (e.g. "backport of").
	pub fn issue(issue: IssueSnapshot, relationship: impl Into<String>) -> Self {
		Link::Issue(IssueLink {
			issue: Box::new(issue),
			relationship: relationship.into(),
		})
	}

	pub fn relationship(&self) -> Option<&str> {
		match self {
			Link::Web(web) => web.relationship(),
			Link::Issue(issue) => Some(issue.relationship()),
		}
	}

	pub fn as_web(&self) -> Option<&WebLink> {
		match self {
			Link::Web(web) => Some(web),
			Link::Issue(_) => None,
		}
	}

	pub fn as_issue(&self) -> Option<&IssueLink> {
		match self {
			Link::Issue(issue) => Some(issue),
			Link::Web(_) => None,
		}
	}
}

/// Small icon shown next to a remote link.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Icon {
	pub url: Option<Url>,
	pub title: Option<String>,
}

impl Icon {
	pub fn is_empty(&self) -> bool {
		self.url.is_none() && self.title.is_none()
	}
}

/// URI plus title, with optional presentation metadata.
#[derive(Clone, Debug)]
pub struct WebLink {
	uri: Url,
	/// Global id of the remote-link entry this was read from, verbatim.
	stored_id: Option<String>,
	title: String,
	summary: Option<String>,
	relationship: Option<String>,
	resolved: bool,
	icon: Icon,
	status_icon: Icon,
}

impl WebLink {
	pub fn uri(&self) -> &Url {
		&self.uri
	}

	pub fn title(&self) -> &str {
		&self.title
	}

	pub fn summary(&self) -> Option<&str> {
		self.summary.as_deref()
	}

	pub fn relationship(&self) -> Option<&str> {
		self.relationship.as_deref()
	}

	pub fn resolved(&self) -> bool {
		self.resolved
	}

	pub fn icon(&self) -> &Icon {
		&self.icon
	}

	pub fn status_icon(&self) -> &Icon {
		&self.status_icon
	}

	/// Same URI and title. Metadata is not part of a link's identity.
	pub fn same_target(&self, other: &WebLink) -> bool {
		self.uri == other.uri && self.title == other.title
	}

	/// Id of the native remote-link entry for this link. A link read from the tracker keeps the id it was
	/// stored under, which need not match the one derived from the normalized URI.
	pub fn global_id(&self) -> String {
		self.stored_id.clone().unwrap_or_else(|| link_codec::global_id(&self.uri))
	}
}

// Where a link happens to be stored is not part of what it is.
impl PartialEq for WebLink {
	fn eq(&self, other: &Self) -> bool {
		self.uri == other.uri
			&& self.title == other.title
			&& self.summary == other.summary
			&& self.relationship == other.relationship
			&& self.resolved == other.resolved
			&& self.icon == other.icon
			&& self.status_icon == other.status_icon
	}
}
impl Eq for WebLink {}

/// Immutable-style builder: every setter consumes and returns the builder.
#[derive(Clone, Debug)]
pub struct WebLinkBuilder {
	link: WebLink,
}

impl WebLinkBuilder {
	pub fn new(uri: Url, title: impl Into<String>) -> Self {
		Self {
			link: WebLink {
				uri,
				stored_id: None,
				title: title.into(),
				summary: None,
				relationship: None,
				resolved: false,
				icon: Icon::default(),
				status_icon: Icon::default(),
			},
		}
	}

	/// Like [`WebLinkBuilder::new`], but from an unparsed URI string.
	pub fn parse(uri: &str, title: impl Into<String>) -> Result<Self> {
		let uri = Url::parse(uri).map_err(|e| TrackerError::MalformedInput(format!("invalid link URI '{uri}': {e}")))?;
		Ok(Self::new(uri, title))
	}

	pub(crate) fn stored_id(mut self, id: impl Into<String>) -> Self {
		self.link.stored_id = Some(id.into());
		self
	}

	pub fn summary(mut self, summary: impl Into<String>) -> Self {
		self.link.summary = Some(summary.into());
		self
	}

	pub fn relationship(mut self, relationship: impl Into<String>) -> Self {
		self.link.relationship = Some(relationship.into());
		self
	}

	pub fn resolved(mut self, resolved: bool) -> Self {
		self.link.resolved = resolved;
		self
	}

	pub fn icon_url(mut self, url: Url) -> Self {
		self.link.icon.url = Some(url);
		self
	}

	pub fn icon_title(mut self, title: impl Into<String>) -> Self {
		self.link.icon.title = Some(title.into());
		self
	}

	pub fn status_icon_url(mut self, url: Url) -> Self {
		self.link.status_icon.url = Some(url);
		self
	}

	pub fn status_icon_title(mut self, title: impl Into<String>) -> Self {
		self.link.status_icon.title = Some(title.into());
		self
	}

	pub fn build(self) -> WebLink {
		self.link
	}
}

impl From<WebLinkBuilder> for Link {
	fn from(builder: WebLinkBuilder) -> Self {
		Link::Web(builder.build())
	}
}

/// Another issue plus the relationship it has to the owning issue.
#[derive(Clone, Debug, PartialEq)]
pub struct IssueLink {
	issue: Box<IssueSnapshot>,
	relationship: String,
}

impl IssueLink {
	pub fn issue(&self) -> &IssueSnapshot {
		&self.issue
	}

	pub fn relationship(&self) -> &str {
		&self.relationship
	}
}

/// Project-declared issue link type, e.g. `Blocks` with "blocks" / "is blocked by".
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, derive_new::new)]
pub struct LinkType {
	#[new(into)]
	pub name: String,
	#[new(into)]
	pub inward: String,
	#[new(into)]
	pub outward: String,
}

/// Which side of a link type a relationship name selected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
	Inward,
	Outward,
}

impl LinkType {
	/// Case-insensitive match of `relationship` against the inward or outward name.
	pub fn direction_of(&self, relationship: &str) -> Option<Direction> {
		if self.outward.eq_ignore_ascii_case(relationship) {
			Some(Direction::Outward)
		} else if self.inward.eq_ignore_ascii_case(relationship) {
			Some(Direction::Inward)
		} else {
			None
		}
	}
}
