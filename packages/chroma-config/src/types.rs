use std::net::Ipv6Addr;

use serde::{Deserialize, Deserializer};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub server: Server,
	pub log: Log,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Server {
	pub host: String,
	/// Accepts both `8000` and `"8000"`.
	#[serde(deserialize_with = "deserialize_port")]
	pub port: u16,
	pub api_impl: ApiImpl,
	/// Absent means requests never time out on the client side.
	pub timeout_ms: Option<u64>,
}
impl Server {
	pub fn base_url(&self) -> String {
		if self.host.parse::<Ipv6Addr>().is_ok() {
			format!("http://[{}]:{}", self.host, self.port)
		} else {
			format!("http://{}:{}", self.host, self.port)
		}
	}
}
impl Default for Server {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.to_string(),
			port: DEFAULT_PORT,
			api_impl: ApiImpl::default(),
			timeout_ms: None,
		}
	}
}

/// Transport flavor used to talk to the server.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum ApiImpl {
	#[default]
	#[serde(rename = "rest", alias = "chromadb.api.fastapi.FastAPI")]
	Rest,
}
impl ApiImpl {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Rest => "rest",
		}
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Log {
	/// A `tracing_subscriber::EnvFilter` directive.
	pub level: String,
}
impl Default for Log {
	fn default() -> Self {
		Self { level: DEFAULT_LOG_LEVEL.to_string() }
	}
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum RawPort {
		Number(u16),
		Text(String),
	}

	match RawPort::deserialize(deserializer)? {
		RawPort::Number(port) => Ok(port),
		RawPort::Text(raw) => raw
			.trim()
			.parse()
			.map_err(|err| serde::de::Error::custom(format!("invalid port {raw:?}: {err}"))),
	}
}
