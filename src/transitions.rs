//! Driving an issue to a [`State`] through the tracker's named transitions.
//!
//! The tracker only offers the transitions valid from the issue's current status, and its
//! status graph is not fully connected. Rather than searching that graph, the resolver
//! follows a fixed decision table matching the workflow Open -> Resolved -> Closed:
//!
//! | target   | direct     | via one hop             | otherwise              |
//! |----------|------------|-------------------------|------------------------|
//! | Resolved | "Resolved" | "Open", then Resolved   | no-op (already closed) |
//! | Closed   | "Closed"   | "Resolved", then Closed | error                  |
//! | Open     | "Open"     | -                       | error                  |
//!
//! The available transitions are re-fetched after every hop. Hops are not atomic: a
//! failure after the first hop leaves the issue in the intermediate status.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::{
	Result, State, TransitionError,
	document::{self, array_at},
	transport::{Request, Transport},
};

/// Target status name -> transition id, valid for the issue's current status only.
pub type Transitions = BTreeMap<String, String>;

/// The two remote operations the resolver needs.
pub trait Workflow {
	fn available_transitions(&self) -> Result<Transitions>;
	fn perform_transition(&self, id: &str) -> Result<()>;
}

/// Perform the transitions that bring the issue into `target`.
pub fn drive_to(workflow: &impl Workflow, target: State) -> Result<()> {
	let available = workflow.available_transitions()?;
	if available.is_empty() {
		return Err(TransitionError::NoneAvailable.into());
	}

	let (open, resolved, closed) = (State::Open.target_status(), State::Resolved.target_status(), State::Closed.target_status());
	match target {
		State::Resolved => {
			let id = match available.get(resolved) {
				Some(id) => id.clone(),
				None => match available.get(open) {
					Some(open_id) => {
						workflow.perform_transition(open_id)?;
						workflow.available_transitions()?.remove(resolved).ok_or(TransitionError::ResolvedViaOpen)?
					}
					None => {
						// Most likely closed already; nothing left to resolve.
						tracing::warn!("can't transition the issue to Resolved or Open");
						return Ok(());
					}
				},
			};
			workflow.perform_transition(&id)
		}
		State::Closed => {
			let id = match available.get(closed) {
				Some(id) => id.clone(),
				None => match available.get(resolved) {
					Some(resolved_id) => {
						workflow.perform_transition(resolved_id)?;
						workflow.available_transitions()?.remove(closed).ok_or(TransitionError::ClosedViaResolved)?
					}
					None => return Err(TransitionError::Unreachable(State::Closed).into()),
				},
			};
			workflow.perform_transition(&id)
		}
		State::Open => {
			let id = available.get(open).ok_or(TransitionError::Unreachable(State::Open))?;
			workflow.perform_transition(id)
		}
	}
}

/// [`Workflow`] of one issue on the tracker.
pub struct RemoteWorkflow<'a> {
	transport: &'a dyn Transport,
	path: String,
}

impl<'a> RemoteWorkflow<'a> {
	pub fn new(transport: &'a dyn Transport, issue_path: &str) -> Self {
		Self {
			transport,
			path: format!("{issue_path}/transitions"),
		}
	}
}

impl Workflow for RemoteWorkflow<'_> {
	fn available_transitions(&self) -> Result<Transitions> {
		let transitions = self.transport.execute(&Request::get(&self.path))?;
		parse_transitions(&transitions)
	}

	fn perform_transition(&self, id: &str) -> Result<()> {
		tracing::debug!(path = %self.path, id, "performing transition");
		let request = Request::post(&self.path).body(json!({ "transition": { "id": id } }));
		self.transport.execute(&request)?;
		Ok(())
	}
}

fn parse_transitions(json: &Value) -> Result<Transitions> {
	array_at(json, "/transitions")
		.map(|t| Ok((document::str_at(t, "/to/name")?.to_string(), document::id_at(t, "/id")?)))
		.collect()
}
