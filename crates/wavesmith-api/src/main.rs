use wavesmith_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (telemetry, tool, routes)
    let (_state, router) = wavesmith_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    wavesmith_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
