use dbprov::config::Config;
use dbprov::engine::MySqlConnector;
use dbprov::lifecycle::LifecycleManager;
use dbprov::server::{ProvisionState, provision_router};
use mimalloc::MiMalloc;
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let mut redacted_url = cfg.engine.url.clone();
    if redacted_url.password().is_some() {
        let _ = redacted_url.set_password(Some("***"));
    }
    info!(
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        loglevel = %cfg.basic.loglevel,
        engine_url = %redacted_url,
        default_engine = %cfg.engine.default_engine,
        max_open_connections = cfg.engine.max_open_connections,
        max_idle_connections = cfg.engine.max_idle_connections,
        max_lifetime_secs = cfg.engine.max_lifetime_secs,
        operation_timeout_secs = cfg.engine.operation_timeout_secs,
        "Configuration loaded"
    );

    let registry = dbprov::registry::spawn().await?;
    let connector = Arc::new(MySqlConnector::new(
        cfg.engine.url.clone(),
        cfg.engine.pool_policy(),
    ));
    let manager = LifecycleManager::new(
        registry.clone(),
        connector,
        cfg.engine.operation_timeout(),
    );

    let state = ProvisionState::new(manager, cfg.engine.default_engine.as_str());
    let app = provision_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.stop();
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Ctrl+C received; shutting down"),
        () = terminate => info!("SIGTERM received; shutting down"),
    }
}
