use issue_bridge::{TrackerError, transport::Method};
use rstest::rstest;
use serde_json::json;

use crate::fixtures::{ISSUE, TrackerContext, tracker};

fn fields(tracker: &TrackerContext) -> serde_json::Value {
	tracker.mock.issue(ISSUE).unwrap()["fields"].clone()
}

#[rstest]
fn test_properties_decode_known_fields_only(tracker: TrackerContext) {
	tracker.mock.set_field(ISSUE, "issuetype", json!({"name": "Backport", "id": "10001"}));
	tracker.mock.set_field(ISSUE, "fixVersions", json!([{"name": "17.0.2"}]));
	tracker.mock.set_field(ISSUE, "priority", json!(null));
	tracker.mock.set_field(ISSUE, "customfield_10006", json!("b05"));

	let properties = tracker.main_issue().properties();
	insta::assert_snapshot!(serde_json::to_string_pretty(&properties).unwrap(), @r#"
	{
	  "fixVersions": [
	    "17.0.2"
	  ],
	  "issuetype": "Backport",
	  "resolved_in_build": "b05"
	}
	"#);
}

#[rstest]
fn test_set_standard_property(tracker: TrackerContext) {
	let issue = tracker.main_issue();
	issue.set_property("priority", &json!("P2")).unwrap();
	issue.set_property("fixVersions", &json!("21")).unwrap();

	assert_eq!(fields(&tracker)["priority"], json!({"name": "P2"}));
	assert_eq!(fields(&tracker)["fixVersions"], json!([{"name": "21"}]));
	assert_eq!(tracker.main_issue().properties()["fixVersions"], json!(["21"]));
}

#[rstest]
fn test_cascading_property_uses_parent(tracker: TrackerContext) {
	tracker.mock.set_field(ISSUE, "components", json!([{"name": "hotspot"}]));
	tracker.main_issue().set_property("subcomponent", &json!("compiler")).unwrap();

	assert_eq!(fields(&tracker)["customfield_10008"], json!({"value": "hotspot", "child": {"value": "compiler"}}));
	assert_eq!(tracker.main_issue().properties()["subcomponent"], json!("compiler"));
}

#[rstest]
fn test_unknown_property_is_ignored(tracker: TrackerContext) {
	tracker.mock.clear_call_log();
	tracker.main_issue().set_property("no_such_property", &json!(1)).unwrap();
	assert_eq!(tracker.mock.count_calls(Method::Put, &format!("issue/{ISSUE}")), 0);
}

#[rstest]
fn test_remove_property_is_not_implemented(tracker: TrackerContext) {
	tracker.main_issue().set_property("resolved_in_build", &json!("b05")).unwrap();
	tracker.mock.clear_call_log();

	let err = tracker.main_issue().remove_property("resolved_in_build").unwrap_err();
	assert!(matches!(err, TrackerError::NotImplemented(_)));
	assert_eq!(tracker.mock.count_calls(Method::Put, &format!("issue/{ISSUE}")), 0);
	assert_eq!(fields(&tracker)["customfield_10006"], json!("b05"));
}
