use issue_bridge::transport::Method;
use rstest::rstest;
use serde_json::json;

use crate::fixtures::{ISSUE, TrackerContext, tracker};

fn issue_path() -> String {
	format!("issue/{ISSUE}")
}

#[rstest]
fn test_add_and_remove_labels(tracker: TrackerContext) {
	let mut issue = tracker.main_issue();
	assert!(issue.labels().unwrap().is_empty());

	issue.add_label("jdk17u-fix-request").unwrap();
	issue.add_label("hgupdate-sync").unwrap();
	assert_eq!(issue.labels().unwrap(), ["jdk17u-fix-request", "hgupdate-sync"]);

	issue.remove_label("hgupdate-sync").unwrap();
	assert_eq!(issue.labels().unwrap(), ["jdk17u-fix-request"]);
	assert_eq!(tracker.mock.issue(ISSUE).unwrap()["fields"]["labels"], json!(["jdk17u-fix-request"]));
}

#[rstest]
fn test_labels_are_cached_until_mutated(tracker: TrackerContext) {
	let mut issue = tracker.main_issue();
	tracker.mock.clear_call_log();

	issue.labels().unwrap();
	issue.labels().unwrap();
	assert_eq!(tracker.mock.count_calls(Method::Get, &issue_path()), 0);

	issue.add_label("a").unwrap();
	issue.labels().unwrap();
	issue.labels().unwrap();
	assert_eq!(tracker.mock.count_calls(Method::Get, &issue_path()), 1);
}

#[rstest]
fn test_set_labels_refreshes_cache(tracker: TrackerContext) {
	let mut issue = tracker.main_issue();
	issue.add_label("stale").unwrap();
	tracker.mock.clear_call_log();

	let labels = vec!["x".to_string(), "y".to_string()];
	issue.set_labels(&labels).unwrap();
	assert_eq!(issue.labels().unwrap(), labels);
	assert_eq!(tracker.mock.call_log(), [format!("PUT {}", issue_path())]);
	assert_eq!(tracker.mock.issue(ISSUE).unwrap()["fields"]["labels"], json!(["x", "y"]));
}
