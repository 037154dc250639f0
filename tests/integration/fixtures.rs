//! Shared fixtures: a mock tracker seeded with one issue, and a project on top of it.

use std::sync::Arc;

use issue_bridge::{
	IssueSnapshot, JiraProject, LinkType, ProjectContext, Settings,
	config::CustomField,
	properties::FieldKind,
	transport::{SharedTransport, mock::MockTracker},
};
use rstest::fixture;

pub const ISSUE: &str = "JDK-8272373";
pub const BASE_URL: &str = "https://bugs.example.org";
pub const ROLE: &str = "Confidential";

pub struct TrackerContext {
	pub mock: Arc<MockTracker>,
	pub project: Arc<JiraProject>,
}

impl TrackerContext {
	pub fn new(settings: Settings) -> Self {
		let mock = Arc::new(MockTracker::new("duke"));
		mock.add_issue(ISSUE, "Crash in C2 compiler", "Open");
		mock.set_workflow(&[
			("Open", "Resolved", "5"),
			("Open", "Closed", "2"),
			("In Progress", "Resolved", "5"),
			("Resolved", "Closed", "701"),
			("Resolved", "Open", "3"),
			("Closed", "Open", "3"),
		]);
		mock.add_link_type(LinkType::new("Backport", "backport of", "backported by"));
		mock.add_link_type(LinkType::new("Blocks", "is blocked by", "blocks"));

		let transport: SharedTransport = mock.clone();
		let project = JiraProject::new(transport, &settings).expect("valid settings");
		Self { mock, project }
	}

	/// Fresh snapshot of `key`.
	pub fn issue(&self, key: &str) -> IssueSnapshot {
		self.project.issue(key).expect("issue lookup").expect("issue exists")
	}

	/// Fresh snapshot of the seeded issue.
	pub fn main_issue(&self) -> IssueSnapshot {
		self.issue(ISSUE)
	}
}

pub fn settings(visibility_role: Option<&str>) -> Settings {
	Settings {
		url: BASE_URL.into(),
		visibility_role: visibility_role.map(str::to_string),
		custom_fields: vec![
			CustomField {
				property: "resolved_in_build".into(),
				field: "customfield_10006".into(),
				kind: FieldKind::Plain,
			},
			CustomField {
				property: "subcomponent".into(),
				field: "customfield_10008".into(),
				kind: FieldKind::Cascading { parent: "components".into() },
			},
		],
		..Default::default()
	}
}

/// Project storing web links as native remote links.
#[fixture]
pub fn tracker() -> TrackerContext {
	TrackerContext::new(settings(None))
}

/// Project with restricted comment visibility, storing web links as comments.
#[fixture]
pub fn restricted() -> TrackerContext {
	TrackerContext::new(settings(Some(ROLE)))
}
