use issue_bridge::{Link, ProjectContext, TrackerError, WebLinkBuilder};
use rstest::rstest;
use serde_json::json;

use crate::fixtures::{ISSUE, TrackerContext, tracker};

#[rstest]
fn test_backport_link_direction(tracker: TrackerContext) {
	tracker.mock.add_issue("JDK-1", "Original bug", "Resolved");
	let original = tracker.issue("JDK-1");

	tracker.main_issue().add_link(&Link::issue(original, "backport of")).unwrap();

	// Inward on the backport, outward on the original.
	let backport_links = tracker.mock.issue(ISSUE).unwrap()["fields"]["issuelinks"].clone();
	assert_eq!(backport_links[0]["inwardIssue"]["key"], "JDK-1");
	let original_links = tracker.mock.issue("JDK-1").unwrap()["fields"]["issuelinks"].clone();
	assert_eq!(original_links[0]["outwardIssue"]["key"], ISSUE);

	let links = tracker.main_issue().links().unwrap();
	let link = links[0].as_issue().unwrap();
	assert_eq!(link.relationship(), "backport of");
	assert_eq!(link.issue().id(), "JDK-1");
	assert_eq!(link.issue().title(), "Original bug");

	let links = tracker.issue("JDK-1").links().unwrap();
	let link = links[0].as_issue().unwrap();
	assert_eq!(link.relationship(), "backported by");
	assert_eq!(link.issue().id(), ISSUE);
}

#[rstest]
fn test_outward_relationship(tracker: TrackerContext) {
	tracker.mock.add_issue("JDK-2", "Blocked work", "Open");
	tracker.main_issue().add_link(&Link::issue(tracker.issue("JDK-2"), "Blocks")).unwrap();

	let links = tracker.main_issue().links().unwrap();
	assert_eq!(links[0].relationship(), Some("blocks"));
	let links = tracker.issue("JDK-2").links().unwrap();
	assert_eq!(links[0].relationship(), Some("is blocked by"));
}

#[rstest]
fn test_unknown_relationship(tracker: TrackerContext) {
	tracker.mock.add_issue("JDK-2", "Other", "Open");
	let err = tracker.main_issue().add_link(&Link::issue(tracker.issue("JDK-2"), "duplicates")).unwrap_err();
	assert!(matches!(err, TrackerError::NoSuchLinkType { ref relationship } if relationship == "duplicates"));
	assert!(tracker.mock.issue(ISSUE).unwrap()["fields"]["issuelinks"].as_array().unwrap().is_empty());
}

#[rstest]
fn test_link_types_are_fetched_once(tracker: TrackerContext) {
	tracker.project.link_types().unwrap();
	let types = tracker.project.link_types().unwrap();
	assert_eq!(types.len(), 2);
	assert_eq!(tracker.mock.call_log().iter().filter(|c| *c == "GET issueLinkType").count(), 1);
}

#[rstest]
fn test_removing_issue_links_is_unsupported(tracker: TrackerContext) {
	tracker.mock.add_issue("JDK-1", "Original bug", "Resolved");
	let link = Link::issue(tracker.issue("JDK-1"), "backport of");
	let issue = tracker.main_issue();
	issue.add_link(&link).unwrap();

	assert!(matches!(issue.remove_link(&link), Err(TrackerError::Unsupported(_))));
}

#[rstest]
fn test_dangling_issue_link_is_a_document_error(tracker: TrackerContext) {
	tracker.mock.set_field(ISSUE, "issuelinks", json!([{"type": {"name": "Backport", "inward": "backport of", "outward": "backported by"}, "inwardIssue": {"key": "GONE-1"}}]));
	assert!(matches!(tracker.main_issue().links(), Err(TrackerError::Document(_))));

	// Web links are still addable.
	let link: Link = WebLinkBuilder::parse("https://x/y", "Y").unwrap().into();
	tracker.main_issue().add_link(&link).unwrap();
}
