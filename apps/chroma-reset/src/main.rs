// crates.io
use clap::Parser;
// self
use chroma_reset::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	chroma_reset::run(args).await
}
