// Entrypoint for the demo CLI.
// - Keeps `main` small: set up logging, create an API client, hand it to the
//   menu loop.
// - Returns `anyhow::Result` so setup failures print with context.

use anyhow::Context;
use streamtape_cli::ui::{connect, main_menu};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // `RUST_LOG=streamtape_cli=debug` shows every request.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    // Credentials come from STREAMTAPE_LOGIN / STREAMTAPE_KEY, or a prompt.
    let api = connect().context("Failed to create API client")?;

    main_menu(&api)?;
    Ok(())
}
