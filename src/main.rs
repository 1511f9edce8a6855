use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dbaas_agent::client::{FileTokenSource, RestClient, StaticTokenSource, TokenSource};
use dbaas_agent::config::Config;
use dbaas_agent::control_plane::ControlPlaneClient;
use dbaas_agent::handlers::{router, AppState};
use dbaas_agent::isolation::{
    IsolationEngine, IsolationSettings, TenantCacheCleaner, TenantRegistryCache, TopologyCache,
};
use dbaas_agent::metrics::Metrics;
use dbaas_agent::proxy::{BasicCredentials, Forwarder};
use dbaas_agent::tenant_manager::TenantManagerClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config);

    tracing::info!(
        host = %config.host,
        port = config.port,
        namespace = %config.namespace,
        isolation_enabled = config.namespace_isolation_enabled,
        dbaas_address = %config.dbaas_address,
        control_plane_url = %config.control_plane_url,
        tenant_manager_url = %config.tenant_manager_url,
        "starting dbaas-agent"
    );

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let shutting_down = Arc::new(AtomicBool::new(false));

    // Create metrics registry
    let metrics = Metrics::new();

    // Outbound clients for the two authorities
    let token_source: Arc<dyn TokenSource> = match &config.m2m_token_path {
        Some(path) => Arc::new(FileTokenSource::new(path)),
        None => Arc::new(StaticTokenSource::new(config.m2m_token.clone())),
    };
    let rest = RestClient::new(token_source, config.authority_timeout())
        .context("failed to create authority HTTP client")?;
    let control_plane = Arc::new(ControlPlaneClient::new(
        rest.clone(),
        config.control_plane_url.clone(),
    ));
    let tenant_manager = Arc::new(TenantManagerClient::new(
        rest,
        config.tenant_manager_url.clone(),
    ));

    // Caches start empty and fill on first need
    let topology = Arc::new(TopologyCache::new(control_plane));
    let tenants = Arc::new(TenantRegistryCache::new(tenant_manager));

    let engine = Arc::new(IsolationEngine::new(
        IsolationSettings::new(
            config.namespace.clone(),
            config.namespace_isolation_enabled,
        ),
        topology,
        Arc::clone(&tenants),
        metrics.clone(),
    ));

    // Spawn tenant cache cleaner
    let cleaner = TenantCacheCleaner::new(
        Arc::clone(&tenants),
        config.tenant_cache_clean_interval(),
        metrics.clone(),
    );
    let cleaner_shutdown_rx = shutdown_tx.subscribe();
    let cleaner_handle = tokio::spawn(async move {
        cleaner.run(cleaner_shutdown_rx).await;
    });

    let credentials = BasicCredentials::new(
        config.dbaas_username.clone(),
        config.dbaas_password.clone(),
    );
    let forwarder = Forwarder::new(
        config.dbaas_address.clone(),
        Some(credentials),
        config.dbaas_request_timeout(),
    )
    .context("failed to create aggregator HTTP client")?;

    let app = router(AppState {
        engine,
        forwarder,
        metrics,
        shutting_down: Arc::clone(&shutting_down),
    });

    // Create TCP listener
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "listening for connections");

    // Spawn graceful shutdown handler
    let shutdown_tx_clone = shutdown_tx.clone();
    let shutting_down_clone = Arc::clone(&shutting_down);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("shutdown signal received, initiating graceful shutdown");

        // Mark as shutting down (readiness probe will return 503)
        shutting_down_clone.store(true, Ordering::SeqCst);

        // Signal all tasks to stop
        let _ = shutdown_tx_clone.send(());
    });

    // Run server with graceful shutdown
    let mut server_shutdown_rx = shutdown_tx.subscribe();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = server_shutdown_rx.recv().await;
        })
        .await?;

    if let Err(e) = cleaner_handle.await {
        tracing::warn!(error = %e, "tenant cache cleaner task failed");
    }

    tracing::info!("dbaas-agent stopped");
    Ok(())
}

/// Initialize tracing based on configuration.
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
