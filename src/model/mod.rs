//! Backend-neutral data model: states, users, comments and links.

mod comment;
pub use comment::Comment;

mod link;
pub use link::{Direction, Icon, IssueLink, Link, LinkType, WebLink, WebLinkBuilder};

mod state;
pub use state::State;

mod user;
pub use user::HostUser;

/// A label on an issue.
pub type Label = String;
