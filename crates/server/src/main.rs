use tracing::info;

use watchtower_core::Config;
use watchtower_server::background::spawn_background_tasks;
use watchtower_server::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    watchtower_core::config::load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let state = AppState::from_config(config.clone()).await?;
    spawn_background_tasks(&state);

    let app = build_router(state.clone());
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("module engine listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.scheduler.shutdown();
    state.sweeper.shutdown();
    info!("module engine stopped");

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
