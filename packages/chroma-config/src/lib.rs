mod error;
mod types;

pub use error::{Error, Result};
pub use types::{ApiImpl, Config, DEFAULT_HOST, DEFAULT_LOG_LEVEL, DEFAULT_PORT, Log, Server};

use std::{fs, path::Path};

/// Reads, parses and validates a standalone config file.
pub fn load(path: &Path) -> Result<Config> {
	let cfg = read(path)?;

	validate(&cfg)?;

	Ok(cfg)
}

/// Reads and normalizes a config file without validating it, so later layers can still
/// override values before the final [`validate`].
pub fn read(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	let host = cfg.server.host.as_str();

	if host.trim().is_empty() {
		return Err(Error::invalid("server.host", "must be non-empty."));
	}
	if host.contains("://") || host.contains('/') {
		return Err(Error::invalid(
			"server.host",
			format!("must be a bare host name or address, got {host}."),
		));
	}
	if cfg.server.port == 0 {
		return Err(Error::invalid("server.port", "must be greater than zero."));
	}

	if let Some(timeout_ms) = cfg.server.timeout_ms
		&& timeout_ms == 0
	{
		return Err(Error::invalid("server.timeout_ms", "must be greater than zero when set."));
	}

	Ok(())
}

/// Trims user-provided strings and restores defaults for blank optional values.
pub fn normalize(cfg: &mut Config) {
	let host = cfg.server.host.trim();

	if host.len() != cfg.server.host.len() {
		cfg.server.host = host.to_string();
	}
	if cfg.log.level.trim().is_empty() {
		cfg.log.level = DEFAULT_LOG_LEVEL.to_string();
	}
}
