use anyhow::Context;
use bakery_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. dotenv and logging
    setup_environment().context("failed to set up environment")?;

    print_banner();

    tracing::info!("Bakery server starting...");

    // 2. Configuration
    let config = Config::from_env();

    // 3. State: database, default grants, router
    let state = ServerState::initialize(&config)
        .await
        .context("failed to initialize server state")?;

    // 4. Serve until Ctrl-C
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
