//! Request/response plumbing towards the tracker.
//!
//! Everything above this module talks to the tracker through [`Transport`], so the
//! real HTTP client and the in-memory [`mock::MockTracker`] are interchangeable.

use std::{fmt, sync::Arc};

use serde_json::Value;

use crate::{Result, TrackerError};

mod http;
pub use http::HttpTransport;

pub mod mock;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
	Get,
	Post,
	Put,
	Delete,
}

impl fmt::Display for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		};
		write!(f, "{s}")
	}
}

/// A single call against the tracker's REST API.
///
/// Paths are relative to the API root (e.g. `issue/JDK-1234/comment`).
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
	method: Method,
	path: String,
	params: Vec<(String, String)>,
	body: Option<Value>,
	/// Statuses that count as success, with the document to answer instead.
	fallbacks: Vec<(u16, Value)>,
}

impl Request {
	fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			params: Vec::new(),
			body: None,
			fallbacks: Vec::new(),
		}
	}

	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((name.into(), value.into()));
		self
	}

	pub fn body(mut self, body: Value) -> Self {
		self.body = Some(body);
		self
	}

	/// Answer `fallback` instead of failing when the tracker responds with `status`.
	pub fn on_status(mut self, status: u16, fallback: Value) -> Self {
		self.fallbacks.push((status, fallback));
		self
	}

	pub fn method(&self) -> Method {
		self.method
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	pub fn params(&self) -> &[(String, String)] {
		&self.params
	}

	pub fn param_value(&self, name: &str) -> Option<&str> {
		self.params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
	}

	pub fn json_body(&self) -> Option<&Value> {
		self.body.as_ref()
	}

	fn fallback_for(&self, status: u16) -> Option<&Value> {
		self.fallbacks.iter().find(|(s, _)| *s == status).map(|(_, v)| v)
	}
}

/// Synchronous access to the tracker. Retries, timeouts and auth belong to implementors.
pub trait Transport: Send + Sync {
	/// Perform the request. Non-2xx answers must surface as [`TrackerError::Status`].
	fn send(&self, request: &Request) -> Result<Value>;

	/// Perform the request, turning statuses registered with [`Request::on_status`] into results.
	fn execute(&self, request: &Request) -> Result<Value> {
		match self.send(request) {
			Err(TrackerError::Status { status, body }) => match request.fallback_for(status) {
				Some(fallback) => {
					tracing::debug!(status, path = request.path(), "treating status as success");
					Ok(fallback.clone())
				}
				None => Err(TrackerError::Status { status, body }),
			},
			other => other,
		}
	}
}

pub type SharedTransport = Arc<dyn Transport>;
