use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use chroma_client::ChromaClient;
use chroma_config::Config;

#[derive(Debug, Parser)]
#[command(
	version = chroma_cli::VERSION,
	rename_all = "kebab",
	styles = chroma_cli::styles(),
	about = "Reset the state of a remote Chroma vector database.",
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,
	#[arg(long, env = "CHROMA_SERVER_HOST", value_name = "HOST")]
	pub host: Option<String>,
	#[arg(long, env = "CHROMA_SERVER_HTTP_PORT", value_name = "PORT")]
	pub port: Option<u16>,
	#[arg(long, value_name = "FILTER")]
	pub log_level: Option<String>,
	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Subcommand)]
pub enum Command {
	/// Delete every collection on the server (default).
	#[default]
	Reset,
	/// Print the server heartbeat in nanoseconds.
	Heartbeat,
	/// Print the collections currently stored on the server.
	Collections,
}

pub async fn run(args: Args) -> Result<()> {
	let config = resolve_config(&args)?;

	init_tracing(&config);

	let client = ChromaClient::new(&config.server)?;

	execute(&client, args.command.unwrap_or_default()).await
}

/// Builds the connection settings once: defaults, then the config file, then flags.
/// Validation runs only on the merged result.
pub fn resolve_config(args: &Args) -> Result<Config> {
	let mut config = match args.config.as_deref() {
		Some(path) => chroma_config::read(path)?,
		None => Config::default(),
	};

	if let Some(host) = args.host.as_ref() {
		config.server.host = host.clone();
	}
	if let Some(port) = args.port {
		config.server.port = port;
	}
	if let Some(level) = args.log_level.as_ref() {
		config.log.level = level.clone();
	}

	chroma_config::normalize(&mut config);
	chroma_config::validate(&config)?;

	Ok(config)
}

pub async fn execute(client: &ChromaClient, command: Command) -> Result<()> {
	match command {
		Command::Reset => {
			let accepted = client.reset().await?;

			if accepted {
				tracing::info!(base_url = %client.base_url(), "Chroma reset completed.");
			} else {
				tracing::warn!(base_url = %client.base_url(), "Chroma answered the reset with false.");
			}
		},
		Command::Heartbeat => {
			let nanos = client.heartbeat().await?;

			tracing::debug!(base_url = %client.base_url(), nanos, "Heartbeat received.");
			println!("{nanos}");
		},
		Command::Collections => {
			let collections = client.list_collections().await?;

			tracing::info!(count = collections.len(), "Listed collections.");

			for collection in collections {
				let metadata = collection
					.metadata
					.map(serde_json::Value::Object)
					.unwrap_or(serde_json::Value::Null);

				println!("{}\t{}\t{metadata}", collection.id, collection.name);
			}
		},
	}

	Ok(())
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info"));

	// A subscriber may already be installed when `run` is driven from tests.
	let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
