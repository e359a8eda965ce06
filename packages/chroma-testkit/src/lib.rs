mod error;

pub use error::{Error, Result};

use std::{
	net::{Ipv4Addr, SocketAddr, TcpListener as StdTcpListener},
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::{Duration, SystemTime, UNIX_EPOCH},
};

use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use chroma_config::Server;

const RESET_DISABLED_ERROR: &str = "ValueError('Resetting is not allowed by this configuration')";

/// Behavior knobs for [`MockChroma`].
#[derive(Clone, Debug)]
pub struct MockOptions {
	/// Mirrors the server-side `ALLOW_RESET` setting.
	pub allow_reset: bool,
	/// Body returned for an allowed reset.
	pub reset_response: bool,
	/// Sleep applied before answering a reset.
	pub reset_delay: Option<Duration>,
	pub version: String,
	/// Collections reported until the next accepted reset.
	pub collections: Vec<Value>,
}
impl Default for MockOptions {
	fn default() -> Self {
		Self {
			allow_reset: true,
			reset_response: true,
			reset_delay: None,
			version: "0.4.24".to_string(),
			collections: Vec::new(),
		}
	}
}

#[derive(Debug)]
struct MockState {
	options: MockOptions,
	collections: Mutex<Vec<Value>>,
	reset_requests: AtomicUsize,
	total_requests: AtomicUsize,
}

/// In-process stand-in for the Chroma REST API, bound to an ephemeral loopback port.
pub struct MockChroma {
	addr: SocketAddr,
	state: Arc<MockState>,
	shutdown: Option<oneshot::Sender<()>>,
	task: Option<JoinHandle<()>>,
}
impl MockChroma {
	pub async fn start() -> Result<Self> {
		Self::with_options(MockOptions::default()).await
	}

	pub async fn with_options(options: MockOptions) -> Result<Self> {
		let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
		let addr = listener.local_addr()?;
		let state = Arc::new(MockState {
			collections: Mutex::new(options.collections.clone()),
			options,
			reset_requests: AtomicUsize::new(0),
			total_requests: AtomicUsize::new(0),
		});
		let (shutdown, shutdown_rx) = oneshot::channel();
		let app = router(state.clone());
		let task = tokio::spawn(async move {
			let server = axum::serve(listener, app).with_graceful_shutdown(async move {
				let _ = shutdown_rx.await;
			});

			if let Err(err) = server.await {
				tracing::warn!(error = %err, "Mock Chroma server stopped with an error.");
			}
		});

		Ok(Self { addr, state, shutdown: Some(shutdown), task: Some(task) })
	}

	pub fn addr(&self) -> SocketAddr {
		self.addr
	}

	/// Connection settings pointing at this mock.
	pub fn server(&self) -> Server {
		Server { host: self.addr.ip().to_string(), port: self.addr.port(), ..Server::default() }
	}

	pub fn reset_requests(&self) -> usize {
		self.state.reset_requests.load(Ordering::SeqCst)
	}

	pub fn total_requests(&self) -> usize {
		self.state.total_requests.load(Ordering::SeqCst)
	}

	pub fn collection_count(&self) -> usize {
		self.state.collections.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub async fn shutdown(mut self) -> Result<()> {
		if let Some(shutdown) = self.shutdown.take() {
			let _ = shutdown.send(());
		}
		if let Some(task) = self.task.take() {
			task.await
				.map_err(|err| Error::Message(format!("Mock Chroma task failed: {err}.")))?;
		}

		Ok(())
	}
}
impl Drop for MockChroma {
	fn drop(&mut self) {
		if let Some(shutdown) = self.shutdown.take() {
			let _ = shutdown.send(());
		}
	}
}

/// Returns a loopback port that nothing is listening on.
pub fn closed_port() -> Result<u16> {
	let listener = StdTcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
	let port = listener.local_addr()?.port();

	drop(listener);

	Ok(port)
}

/// A collection entry shaped like the ones Chroma lists.
pub fn collection(id: &str, name: &str) -> Value {
	json!({ "id": id, "name": name, "metadata": null })
}

fn router(state: Arc<MockState>) -> Router {
	Router::new()
		.route("/api/v1/reset", post(reset))
		.route("/api/v1/heartbeat", get(heartbeat))
		.route("/api/v1/version", get(version))
		.route("/api/v1/collections", get(list_collections))
		.with_state(state)
}

async fn reset(State(state): State<Arc<MockState>>) -> Response {
	state.total_requests.fetch_add(1, Ordering::SeqCst);
	state.reset_requests.fetch_add(1, Ordering::SeqCst);

	if let Some(delay) = state.options.reset_delay {
		tokio::time::sleep(delay).await;
	}
	if !state.options.allow_reset {
		return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": RESET_DISABLED_ERROR })))
			.into_response();
	}

	if state.options.reset_response {
		state.collections.lock().unwrap_or_else(|err| err.into_inner()).clear();
	}

	Json(state.options.reset_response).into_response()
}

async fn heartbeat(State(state): State<Arc<MockState>>) -> Json<Value> {
	state.total_requests.fetch_add(1, Ordering::SeqCst);

	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);

	Json(json!({ "nanosecond heartbeat": nanos as u64 }))
}

async fn version(State(state): State<Arc<MockState>>) -> Json<String> {
	state.total_requests.fetch_add(1, Ordering::SeqCst);

	Json(state.options.version.clone())
}

async fn list_collections(State(state): State<Arc<MockState>>) -> Json<Vec<Value>> {
	state.total_requests.fetch_add(1, Ordering::SeqCst);

	Json(state.collections.lock().unwrap_or_else(|err| err.into_inner()).clone())
}
