use anyhow::Result;
use schedule_portal::PortalClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use schedule_proxy::{
    build_router, config::Settings, session::SessionStore, telemetry, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_telemetry();

    info!("Starting schedule proxy...");

    let settings = Settings::load()?;
    info!("Configuration loaded, upstream {}", settings.upstream.base_url);

    let sessions = Arc::new(
        SessionStore::open(settings.session.max_age(), settings.session.storage_path()).await,
    );
    let flush_task = sessions
        .clone()
        .spawn_flush_task(settings.session.flush_interval());

    let portal = Arc::new(PortalClient::new(settings.upstream.clone())?);

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    let state = AppState::new(sessions.clone(), portal, settings);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, flushing sessions");
    flush_task.abort();
    if let Err(e) = flush_task.await {
        if !e.is_cancelled() {
            warn!("Session flush task ended abnormally: {}", e);
        }
    }
    if let Err(e) = sessions.flush().await {
        error!("Final session flush failed: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
