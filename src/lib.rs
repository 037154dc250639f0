//! Tracker-agnostic view of issues on a remote issue tracker.
//!
//! Callers work with [`IssueSnapshot`]s obtained from a [`ProjectContext`]: titles, bodies,
//! comments, labels, links, properties and a three-valued [`State`]. The backend's named
//! workflow transitions, restricted-visibility mode and its two linking mechanisms stay
//! behind that surface.

pub mod comments;
pub mod config;
pub mod document;
pub mod error;
pub mod link_codec;
pub mod link_store;
pub mod logging;
pub mod model;
pub mod project;
pub mod properties;
pub mod snapshot;
pub mod transitions;
pub mod transport;

pub use config::Settings;
pub use error::{Result, TrackerError, TransitionError};
pub use model::{Comment, Direction, HostUser, Icon, IssueLink, Label, Link, LinkType, State, WebLink, WebLinkBuilder};
pub use project::{JiraProject, ProjectContext};
pub use snapshot::IssueSnapshot;
