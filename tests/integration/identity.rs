use std::{
	collections::HashSet,
	hash::{BuildHasher, RandomState},
};

use rstest::rstest;
use serde_json::json;

use crate::fixtures::{ISSUE, TrackerContext, tracker};

#[rstest]
fn test_volatile_field_does_not_affect_identity(tracker: TrackerContext) {
	let before = tracker.main_issue();
	tracker.mock.set_field(ISSUE, "customfield_11700", json!(12345));
	let after = tracker.main_issue();

	assert_ne!(before.json(), after.json());
	assert_eq!(before, after);

	let hasher = RandomState::new();
	assert_eq!(hasher.hash_one(&before), hasher.hash_one(&after));
	assert_eq!(HashSet::from([before, after]).len(), 1);
}

#[rstest]
fn test_signed_zero_fields_hash_alike(tracker: TrackerContext) {
	tracker.mock.set_field(ISSUE, "customfield_10200", serde_json::from_str("0.0").unwrap());
	let positive = tracker.main_issue();
	tracker.mock.set_field(ISSUE, "customfield_10200", serde_json::from_str("-0.0").unwrap());
	let negative = tracker.main_issue();

	assert_eq!(positive, negative);
	let hasher = RandomState::new();
	assert_eq!(hasher.hash_one(&positive), hasher.hash_one(&negative));
}

#[rstest]
fn test_other_fields_affect_identity(tracker: TrackerContext) {
	let before = tracker.main_issue();
	tracker.mock.set_field(ISSUE, "summary", json!("Crash in C1 compiler"));
	let after = tracker.main_issue();

	assert_ne!(before, after);
	assert_eq!(after.title(), "Crash in C1 compiler");
}

#[rstest]
fn test_distinct_issues_differ(tracker: TrackerContext) {
	tracker.mock.add_issue("JDK-2", "Crash in C2 compiler", "Open");
	assert_ne!(tracker.main_issue(), tracker.issue("JDK-2"));
}

#[rstest]
fn test_missing_issue_is_none(tracker: TrackerContext) {
	use issue_bridge::ProjectContext;
	assert!(tracker.project.issue("JDK-404").unwrap().is_none());
}
