use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use chroma_config::{ApiImpl, Config, Error};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_temp_config(payload: &str) -> PathBuf {
	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("System time error.").as_nanos();
	let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
	let path = env::temp_dir().join(format!("chroma_reset_config_{nanos}_{seq}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_str(payload: &str) -> chroma_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = chroma_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

#[test]
fn loads_sample_config() {
	let cfg = load_str(SAMPLE_CONFIG_TOML).expect("Expected sample config to load.");

	assert_eq!(cfg.server.host, "chroma.internal");
	assert_eq!(cfg.server.port, 8001);
	assert_eq!(cfg.server.api_impl, ApiImpl::Rest);
	assert_eq!(cfg.server.timeout_ms, Some(2_500));
	assert_eq!(cfg.log.level, "chroma_reset=debug,info");
	assert_eq!(cfg.server.base_url(), "http://chroma.internal:8001");
}

#[test]
fn empty_file_yields_defaults() {
	let cfg = load_str("").expect("Expected empty config to load.");

	assert_eq!(cfg, Config::default());
}

#[test]
fn port_accepts_integer_and_string() {
	let numeric = load_str("[server]\nport = 9000\n").expect("Expected numeric port.");
	let text = load_str("[server]\nport = \"9000\"\n").expect("Expected string port.");

	assert_eq!(numeric.server.port, 9000);
	assert_eq!(text.server.port, 9000);
}

#[test]
fn legacy_api_impl_name_is_rest() {
	let cfg = load_str("[server]\napi_impl = \"chromadb.api.fastapi.FastAPI\"\n")
		.expect("Expected legacy api_impl to load.");

	assert_eq!(cfg.server.api_impl, ApiImpl::Rest);
}

#[test]
fn unknown_api_impl_is_rejected() {
	let result = load_str("[server]\napi_impl = \"local\"\n");

	assert!(matches!(result, Err(Error::ParseConfig { .. })), "Unexpected result: {result:?}");
}

#[test]
fn non_numeric_port_is_rejected() {
	let result = load_str("[server]\nport = \"eighty\"\n");

	assert!(matches!(result, Err(Error::ParseConfig { .. })), "Unexpected result: {result:?}");
}

#[test]
fn empty_host_is_rejected() {
	let result = load_str("[server]\nhost = \"   \"\n");

	match result {
		Err(err @ Error::Validation { field: "server.host", .. }) => {
			assert_eq!(err.to_string(), "server.host must be non-empty.");
		},
		other => panic!("Expected validation error, got {other:?}."),
	}
}

#[test]
fn host_with_scheme_is_rejected() {
	let result = load_str("[server]\nhost = \"http://localhost\"\n");

	assert!(matches!(result, Err(Error::Validation { .. })), "Unexpected result: {result:?}");
}

#[test]
fn zero_port_is_rejected() {
	let result = load_str("[server]\nport = 0\n");

	match result {
		Err(err @ Error::Validation { field: "server.port", .. }) => {
			assert_eq!(err.to_string(), "server.port must be greater than zero.");
		},
		other => panic!("Expected validation error, got {other:?}."),
	}
}

#[test]
fn zero_timeout_is_rejected() {
	let result = load_str("[server]\ntimeout_ms = 0\n");

	assert!(matches!(result, Err(Error::Validation { .. })), "Unexpected result: {result:?}");
}

#[test]
fn unknown_keys_are_rejected() {
	let result = load_str("[server]\nchroma_server_host = \"localhost\"\n");

	assert!(matches!(result, Err(Error::ParseConfig { .. })), "Unexpected result: {result:?}");
}

#[test]
fn missing_file_reports_path() {
	let path = env::temp_dir().join("chroma_reset_config_missing.toml");
	let result = chroma_config::load(&path);

	match result {
		Err(Error::ReadConfig { path: reported, .. }) => assert_eq!(reported, path),
		other => panic!("Expected read error, got {other:?}."),
	}
}

#[test]
fn read_leaves_validation_to_the_caller() {
	let path = write_temp_config("[server]\nport = 0\n");
	let read = chroma_config::read(&path);
	let loaded = chroma_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = read.expect("Expected read to skip validation.");

	assert_eq!(cfg.server.port, 0);
	assert!(chroma_config::validate(&cfg).is_err());
	assert!(matches!(loaded, Err(Error::Validation { field: "server.port", .. })));
}
