use serde::{Deserialize, Serialize};

/// Canonical handle for a tracker account.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, derive_new::new)]
pub struct HostUser {
	/// Identifier the tracker accepts when assigning (the account name for Jira).
	#[new(into)]
	pub id: String,
	#[new(into)]
	pub username: String,
	#[new(into)]
	pub full_name: String,
}

impl HostUser {
	/// Identity for a raw (username, display name) pair, where the username doubles as the id.
	pub fn from_account(username: impl Into<String>, display_name: impl Into<String>) -> Self {
		let username = username.into();
		Self::new(username.clone(), username, display_name)
	}
}
