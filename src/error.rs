//! Error types for tracker operations.
//!
//! Uses miette for diagnostics so the binary can render codes and hints.

use miette::Diagnostic;
use thiserror::Error;

use crate::State;

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;

/// No path through the tracker's workflow reaches the requested state.
#[derive(Debug, Diagnostic, Error, Eq, PartialEq)]
pub enum TransitionError {
	#[error("no transitions available")]
	#[diagnostic(code(issue_bridge::transition::none_available))]
	NoneAvailable,

	#[error("cannot reach Resolved via Open")]
	#[diagnostic(code(issue_bridge::transition::resolved_via_open))]
	ResolvedViaOpen,

	#[error("cannot reach Closed via Resolved")]
	#[diagnostic(code(issue_bridge::transition::closed_via_resolved))]
	ClosedViaResolved,

	#[error("cannot reach {0}")]
	#[diagnostic(code(issue_bridge::transition::unreachable), help("the issue's current status exposes no transition towards this state"))]
	Unreachable(State),
}

#[derive(Debug, Diagnostic, Error)]
pub enum TrackerError {
	#[error(transparent)]
	#[diagnostic(transparent)]
	Transition(#[from] TransitionError),

	#[error("no declared link type matches relationship '{relationship}'")]
	#[diagnostic(code(issue_bridge::link::no_such_type), help("relationship must equal the inward or outward name of one of the project's link types"))]
	NoSuchLinkType { relationship: String },

	#[error("unsupported operation: {0}")]
	#[diagnostic(code(issue_bridge::unsupported))]
	Unsupported(&'static str),

	#[error("malformed input: {0}")]
	#[diagnostic(code(issue_bridge::malformed_input))]
	MalformedInput(String),

	#[error("not implemented: {0}")]
	#[diagnostic(code(issue_bridge::not_implemented))]
	NotImplemented(&'static str),

	#[error("invalid argument: {0}")]
	#[diagnostic(code(issue_bridge::invalid_argument))]
	InvalidArgument(String),

	/// Non-2xx answer from the tracker that no fallback converted into a result.
	#[error("tracker responded with {status}: {body}")]
	#[diagnostic(code(issue_bridge::transport::status))]
	Status { status: u16, body: String },

	/// The fetched document lacks a field this layer depends on.
	#[error("invalid issue document: {0}")]
	#[diagnostic(code(issue_bridge::document))]
	Document(String),

	#[error("project context was dropped while issues still referenced it")]
	#[diagnostic(code(issue_bridge::project::dropped))]
	ProjectDropped,

	#[error(transparent)]
	Http(#[from] reqwest::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Url(#[from] url::ParseError),

	#[error(transparent)]
	Timestamp(#[from] jiff::Error),

	#[error(transparent)]
	#[diagnostic(code(issue_bridge::config), help("check the settings file and ISSUE_BRIDGE__* environment variables"))]
	Config(#[from] config::ConfigError),
}

impl TrackerError {
	/// HTTP status carried by a transport failure, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			TrackerError::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}
