//! `beatdrops` HTTP server.

// crates.io
use color_eyre::Result;
// self
use beatdrops::{config::Config, obs, server};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	obs::init_tracing();

	let config = Config::from_env()?;
	let state = server::AppState::from_config(config)?;

	server::serve(state).await?;

	Ok(())
}
