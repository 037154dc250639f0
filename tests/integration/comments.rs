use issue_bridge::{HostUser, TrackerError, transport::Method};
use rstest::rstest;
use serde_json::json;

use crate::fixtures::{BASE_URL, ISSUE, ROLE, TrackerContext, restricted, tracker};

#[rstest]
fn test_comment_lifecycle(tracker: TrackerContext) {
	let issue = tracker.main_issue();
	let comment = issue.add_comment("Fix pushed").unwrap();
	assert_eq!(comment.body, "Fix pushed");
	assert_eq!(comment.author, HostUser::new("duke", "duke", "Duke"));

	let updated = issue.update_comment(&comment.id, "Fix pushed to jdk17u").unwrap();
	assert_eq!(updated.id, comment.id);
	assert!(updated.updated_at > updated.created_at);

	let comments = issue.comments().unwrap();
	assert_eq!(comments, [updated.clone()]);

	issue.remove_comment(&updated).unwrap();
	issue.remove_comment(&updated).unwrap();
	assert!(issue.comments().unwrap().is_empty());
}

#[rstest]
fn test_comments_carry_visibility_role(restricted: TrackerContext) {
	let issue = restricted.main_issue();
	let comment = issue.add_comment("Internal note").unwrap();
	issue.update_comment(&comment.id, "Edited internal note").unwrap();

	let stored = restricted.mock.comments(ISSUE);
	assert_eq!(stored[0]["visibility"], json!({"type": "role", "value": ROLE}));
	assert_eq!(stored[0]["body"], "Edited internal note");
}

#[rstest]
fn test_comment_url(tracker: TrackerContext) {
	let issue = tracker.main_issue();
	let comment = issue.add_comment("hello").unwrap();
	assert_eq!(issue.web_url().unwrap().as_str(), format!("{BASE_URL}/browse/{ISSUE}"));
	assert_eq!(issue.comment_url(&comment).unwrap().as_str(), format!("{BASE_URL}/browse/{ISSUE}?focusedCommentId={}", comment.id));
}

#[rstest]
fn test_title_and_body_updates(tracker: TrackerContext) {
	let issue = tracker.main_issue();
	assert_eq!(issue.body(), "");

	issue.set_title("  Crash in C2 compiler during OSR  ").unwrap();
	issue.set_body("Reproducer attached").unwrap();

	let issue = tracker.main_issue();
	assert_eq!(issue.title(), "Crash in C2 compiler during OSR");
	assert_eq!(issue.body(), "Reproducer attached");
	assert!(issue.updated_at().unwrap() > issue.created_at().unwrap());
}

#[rstest]
fn test_title_and_body_are_skipped_with_visibility_role(restricted: TrackerContext) {
	restricted.mock.clear_call_log();
	let issue = restricted.main_issue();
	issue.set_title("New title").unwrap();
	issue.set_body("New body").unwrap();

	assert_eq!(restricted.mock.count_calls(Method::Put, &format!("issue/{ISSUE}")), 0);
	assert_eq!(restricted.main_issue().title(), "Crash in C2 compiler");
}

#[rstest]
fn test_author_and_assignees(tracker: TrackerContext) {
	let issue = tracker.main_issue();
	assert_eq!(issue.author().unwrap(), HostUser::new("JIRAUSER1", "duke", "Duke"));
	assert!(issue.assignees().is_empty());

	issue.set_assignees(&[HostUser::from_account("rkennke", "Roman")]).unwrap();
	assert_eq!(tracker.main_issue().assignees(), [HostUser::from_account("rkennke", "Rkennke")]);

	issue.set_assignees(&[]).unwrap();
	assert!(tracker.main_issue().assignees().is_empty());

	let two = [HostUser::from_account("a", "A"), HostUser::from_account("b", "B")];
	assert!(matches!(issue.set_assignees(&two), Err(TrackerError::Unsupported(_))));
}

#[rstest]
fn test_closed_by_is_not_implemented(tracker: TrackerContext) {
	assert!(matches!(tracker.main_issue().closed_by(), Err(TrackerError::NotImplemented(_))));
}
