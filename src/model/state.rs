use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::TrackerError;

/// Uniform issue state, derived from the tracker's free-text status.
///
/// The mapping is one-directional: many open-like statuses ("In Progress", "New", ...)
/// collapse to [`State::Open`], so a status cannot be recovered from a state.
#[derive(Clone, Copy, Debug, Display, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum State {
	Open,
	Resolved,
	Closed,
}

impl State {
	/// Backend status name that means "resolved".
	pub const RESOLVED_STATUS: &'static str = "Resolved";
	/// Backend status name that means "closed".
	pub const CLOSED_STATUS: &'static str = "Closed";
	/// Backend status name of the transition target used to (re)open an issue.
	pub const OPEN_STATUS: &'static str = "Open";

	/// Derive the state from a backend status name. Only exact "Closed" and "Resolved" are terminal.
	pub fn from_status(status: &str) -> Self {
		match status {
			Self::CLOSED_STATUS => State::Closed,
			Self::RESOLVED_STATUS => State::Resolved,
			_ => State::Open,
		}
	}

	/// Status name a transition must lead to for the issue to land in this state.
	pub fn target_status(&self) -> &'static str {
		match self {
			State::Open => Self::OPEN_STATUS,
			State::Resolved => Self::RESOLVED_STATUS,
			State::Closed => Self::CLOSED_STATUS,
		}
	}
}

impl FromStr for State {
	type Err = TrackerError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"open" => Ok(State::Open),
			"resolved" => Ok(State::Resolved),
			"closed" => Ok(State::Closed),
			other => Err(TrackerError::InvalidArgument(format!("unknown state '{other}', expected open, resolved or closed"))),
		}
	}
}
