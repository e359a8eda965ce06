mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use chroma_config::Server;

const API_PREFIX: &str = "/api/v1";

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CollectionSummary {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Heartbeat {
	#[serde(rename = "nanosecond heartbeat")]
	nanosecond_heartbeat: u64,
}

/// Handle to a single Chroma server.
#[derive(Clone, Debug)]
pub struct ChromaClient {
	http: Client,
	base_url: String,
}
impl ChromaClient {
	pub fn new(server: &Server) -> Result<Self> {
		let mut builder = Client::builder();

		if let Some(timeout_ms) = server.timeout_ms {
			builder = builder.timeout(Duration::from_millis(timeout_ms));
		}

		Ok(Self { http: builder.build()?, base_url: server.base_url() })
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Clears every collection on the server.
	///
	/// Returns whatever boolean the server answers with. Servers started without
	/// `ALLOW_RESET` reject the call with an error status instead.
	pub async fn reset(&self) -> Result<bool> {
		tracing::debug!(base_url = %self.base_url, "Sending reset request.");

		let res = self.http.post(self.endpoint("reset")).send().await?;

		decode(res).await
	}

	/// Returns the server heartbeat in nanoseconds.
	pub async fn heartbeat(&self) -> Result<u64> {
		let res = self.http.get(self.endpoint("heartbeat")).send().await?;
		let heartbeat: Heartbeat = decode(res).await?;

		Ok(heartbeat.nanosecond_heartbeat)
	}

	pub async fn version(&self) -> Result<String> {
		let res = self.http.get(self.endpoint("version")).send().await?;

		decode(res).await
	}

	pub async fn list_collections(&self) -> Result<Vec<CollectionSummary>> {
		let res = self.http.get(self.endpoint("collections")).send().await?;

		decode(res).await
	}

	fn endpoint(&self, path: &str) -> String {
		format!("{}{API_PREFIX}/{path}", self.base_url)
	}
}

async fn decode<T>(res: Response) -> Result<T>
where
	T: DeserializeOwned,
{
	let status = res.status();
	let body = res.text().await?;

	if !status.is_success() {
		return Err(Error::Status { status, body: error_message(&body) });
	}

	serde_json::from_str(&body).map_err(|err| Error::InvalidResponse {
		message: format!("Unexpected response body {body:?}: {err}."),
	})
}

/// Extracts `{"error": ...}` from a failure body, falling back to the raw text.
fn error_message(body: &str) -> String {
	serde_json::from_str::<Value>(body)
		.ok()
		.and_then(|json| json.get("error").and_then(Value::as_str).map(str::to_string))
		.unwrap_or_else(|| body.trim().to_string())
}
