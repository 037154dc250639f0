use std::path::Path;

use serde::Deserialize;
use smart_default::SmartDefault;
use url::Url;

use crate::{Result, properties::FieldKind};

/// Environment variable prefix; nested keys use `__`, e.g. `ISSUE_BRIDGE__LOG__DIRECTIVES`.
pub const ENV_PREFIX: &str = "ISSUE_BRIDGE";

#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Settings {
	/// Base url of the tracker, e.g. `https://bugs.openjdk.org`.
	#[default = "http://localhost:8080"]
	pub url: String,
	/// API token. Sent as a bearer token, or as the basic-auth password when `username` is set.
	pub token: Option<String>,
	pub username: Option<String>,
	/// Role that comments must be restricted to. When set, web links are stored as comments.
	pub visibility_role: Option<String>,
	/// Declared custom fields, in addition to the built-in properties.
	pub custom_fields: Vec<CustomField>,
	pub log: LogSettings,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CustomField {
	/// Property name exposed to callers.
	pub property: String,
	/// Backend field id, e.g. `customfield_10006`.
	pub field: String,
	#[serde(default = "default_custom_kind")]
	pub kind: FieldKind,
}

fn default_custom_kind() -> FieldKind {
	FieldKind::Select
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogSettings {
	/// `EnvFilter` directives, used when `RUST_LOG` is not set.
	pub directives: Option<String>,
	/// Write JSON trace events to this file instead of stderr.
	pub trace_file: Option<String>,
}

impl Settings {
	/// Load settings from an optional TOML file, overridden by `ISSUE_BRIDGE__*` environment variables.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let mut builder = config::Config::builder();
		if let Some(path) = path {
			builder = builder.add_source(config::File::from(path).required(true));
		}
		let config = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__")).build()?;

		Ok(config.try_deserialize()?)
	}

	/// The tracker url, normalized so relative joins stay below it.
	pub fn base_url(&self) -> Result<Url> {
		let mut url = Url::parse(&self.url)?;
		if !url.path().ends_with('/') {
			let path = format!("{}/", url.path());
			url.set_path(&path);
		}
		Ok(url)
	}
}
