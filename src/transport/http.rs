use reqwest::blocking::Client;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::{Method, Request, Transport};
use crate::{Result, TrackerError, config::Settings};

const API_ROOT: &str = "rest/api/2/";

enum Auth {
	Bearer(String),
	Basic { username: String, token: String },
}

/// Real tracker client that makes blocking HTTP requests.
pub struct HttpTransport {
	http_client: Client,
	api_root: Url,
	auth: Option<Auth>,
}

impl HttpTransport {
	pub fn new(settings: &Settings) -> Result<Self> {
		let api_root = settings.base_url()?.join(API_ROOT)?;
		let auth = match (&settings.username, &settings.token) {
			(Some(username), Some(token)) => Some(Auth::Basic {
				username: username.clone(),
				token: token.clone(),
			}),
			(None, Some(token)) => Some(Auth::Bearer(token.clone())),
			(_, None) => None,
		};

		Ok(Self {
			http_client: Client::builder().user_agent(concat!("issue-bridge/", env!("CARGO_PKG_VERSION"))).build()?,
			api_root,
			auth,
		})
	}

	fn url_for(&self, request: &Request) -> Result<Url> {
		let mut url = self.api_root.join(request.path())?;
		if !request.params().is_empty() {
			let mut pairs = url.query_pairs_mut();
			for (name, value) in request.params() {
				pairs.append_pair(name, value);
			}
		}
		Ok(url)
	}
}

impl Transport for HttpTransport {
	#[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
	fn send(&self, request: &Request) -> Result<Value> {
		let method = match request.method() {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Delete => reqwest::Method::DELETE,
		};

		let mut builder = self.http_client.request(method, self.url_for(request)?).header("Accept", "application/json");
		if let Some(body) = request.json_body() {
			builder = builder.json(body);
		}
		builder = match &self.auth {
			Some(Auth::Bearer(token)) => builder.bearer_auth(token),
			Some(Auth::Basic { username, token }) => builder.basic_auth(username, Some(token)),
			None => builder,
		};

		let res = builder.send()?;
		let status = res.status();
		let text = res.text()?;

		if !status.is_success() {
			tracing::debug!(status = status.as_u16(), "tracker request failed");
			return Err(TrackerError::Status { status: status.as_u16(), body: text });
		}

		if text.trim().is_empty() {
			return Ok(Value::Object(Default::default()));
		}
		Ok(serde_json::from_str(&text)?)
	}
}
