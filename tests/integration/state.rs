use issue_bridge::{State, TrackerError, TransitionError, transport::Method};
use rstest::rstest;
use serde_json::json;

use crate::fixtures::{ISSUE, TrackerContext, tracker};

fn transitions_path() -> String {
	format!("issue/{ISSUE}/transitions")
}

#[rstest]
#[case("Open", State::Open)]
#[case("In Progress", State::Open)]
#[case("Resolved", State::Resolved)]
#[case("Closed", State::Closed)]
fn test_status_maps_to_state(tracker: TrackerContext, #[case] status: &str, #[case] expected: State) {
	tracker.mock.add_issue("JDK-2", "Other", status);
	let issue = tracker.issue("JDK-2");
	assert_eq!(issue.status(), status);
	assert_eq!(issue.state(), expected);
	assert_eq!(issue.is_open(), expected == State::Open);
	assert_eq!(issue.is_resolved(), expected == State::Resolved);
	assert_eq!(issue.is_closed(), expected == State::Closed);
}

#[rstest]
fn test_close_goes_through_resolved(tracker: TrackerContext) {
	tracker.mock.add_issue("JDK-2", "Other", "In Progress");
	tracker.issue("JDK-2").set_state(State::Closed).unwrap();
	assert_eq!(tracker.issue("JDK-2").state(), State::Closed);
}

#[rstest]
fn test_resolve_and_reopen(tracker: TrackerContext) {
	tracker.main_issue().set_state(State::Resolved).unwrap();
	assert!(tracker.main_issue().is_resolved());

	tracker.main_issue().set_state(State::Open).unwrap();
	assert!(tracker.main_issue().is_open());
}

#[rstest]
fn test_resolve_a_closed_issue_through_open(tracker: TrackerContext) {
	tracker.mock.add_issue("JDK-2", "Other", "Closed");
	tracker.issue("JDK-2").set_state(State::Resolved).unwrap();
	assert_eq!(tracker.issue("JDK-2").status(), "Resolved");
}

#[rstest]
fn test_close_fails_when_resolved_is_a_dead_end(tracker: TrackerContext) {
	tracker.mock.set_workflow(&[("Open", "Resolved", "5")]);
	tracker.mock.clear_call_log();

	let err = tracker.main_issue().set_state(State::Closed).unwrap_err();
	assert!(matches!(err, TrackerError::Transition(TransitionError::ClosedViaResolved)));

	// The intermediate hop is not rolled back, and the transitions were fetched again after it.
	assert_eq!(tracker.main_issue().status(), "Resolved");
	assert_eq!(tracker.mock.count_calls(Method::Get, &transitions_path()), 2);
	assert_eq!(tracker.mock.count_calls(Method::Post, &transitions_path()), 1);
}

#[rstest]
fn test_no_transitions_is_an_error(tracker: TrackerContext) {
	tracker.mock.set_workflow(&[]);
	let err = tracker.main_issue().set_state(State::Open).unwrap_err();
	assert!(matches!(err, TrackerError::Transition(TransitionError::NoneAvailable)));
}

#[rstest]
fn test_resolving_closed_issue_without_reopen_is_noop(tracker: TrackerContext) {
	tracker.mock.set_workflow(&[("Closed", "Reopened", "9")]);
	tracker.mock.add_issue("JDK-2", "Other", "Closed");
	tracker.mock.clear_call_log();

	tracker.issue("JDK-2").set_state(State::Resolved).unwrap();
	assert_eq!(tracker.mock.count_calls(Method::Post, "issue/JDK-2/transitions"), 0);
	assert!(tracker.issue("JDK-2").is_closed());
}

#[rstest]
#[case("Fixed", true)]
#[case("Delivered", true)]
#[case("Won't Fix", false)]
fn test_is_fixed_needs_fixing_resolution(tracker: TrackerContext, #[case] resolution: &str, #[case] fixed: bool) {
	tracker.main_issue().set_state(State::Resolved).unwrap();
	tracker.mock.set_field(ISSUE, "resolution", json!({"name": resolution}));

	let issue = tracker.main_issue();
	assert_eq!(issue.resolution(), Some(resolution));
	assert_eq!(issue.is_fixed(), fixed);
}

#[rstest]
fn test_open_issue_is_never_fixed(tracker: TrackerContext) {
	tracker.mock.set_field(ISSUE, "resolution", json!({"name": "Fixed"}));
	assert!(!tracker.main_issue().is_fixed());
}
