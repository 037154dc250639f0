//! Integration tests entry point, following https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
//!
//! Every test drives `IssueSnapshot` end to end against an in-memory `MockTracker`.

mod comments;
mod fixtures;
mod identity;
mod issue_links;
mod labels;
mod properties;
mod state;
