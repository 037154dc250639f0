use jiff::Timestamp;
use serde::Serialize;

use super::HostUser;

/// A comment as stored by the tracker.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, derive_new::new)]
pub struct Comment {
	#[new(into)]
	pub id: String,
	#[new(into)]
	pub body: String,
	pub author: HostUser,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
}
