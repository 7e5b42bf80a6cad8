use axum_helpers::create_production_app;
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;
use users_api::{AppState, Config, build_router};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        "Starting {} v{} with {} storage",
        config.app.name,
        config.app.version,
        config.storage.name()
    );

    let server_config = config.server.clone();
    let state = AppState::init(config).await?;
    let router = build_router(&state)?;

    let cleanup = async move {
        info!("Closing storage backend");
        state.close().await;
    };

    create_production_app(router, &server_config, Duration::from_secs(30), cleanup)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Server shutdown complete");
    Ok(())
}
