use occupancy_dashboard::{AppState, Config, ConnectionManager, DashboardView, WebSocketTransport};
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let transport = WebSocketTransport::new(&config.stream_url)?;
    let manager = Arc::new(ConnectionManager::new(
        Arc::new(transport),
        config.close_when_idle,
    ));
    let view = Arc::new(DashboardView::new(config.enforce_order));

    let mounted = match view.mount(&manager).await {
        Ok(mounted) => Some(mounted),
        Err(err) => {
            error!("{err}; live counters will stay at zero");
            None
        }
    };
    let state = AppState::new(Arc::clone(&view), Arc::clone(&manager));

    let app = occupancy_dashboard::router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(mounted) = mounted {
        mounted.unmount(&manager).await;
    }
    manager.shutdown().await;
    info!("shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
