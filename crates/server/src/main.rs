//! Reservation assistant server entry point

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use bbq_assistant_config::{load_settings, Settings};
use bbq_assistant_server::{create_router, init_metrics, AppState, InMemoryConversationStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("BBQ_ASSISTANT_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => {
            // Tracing not yet initialized
            eprintln!(
                "Loaded configuration from files (env: {})",
                env.as_deref().unwrap_or("default")
            );
            settings
        }
        Err(e) if e.is_invalid() => {
            // Defaults would silently drop settings such as auth
            eprintln!("Error: Invalid configuration: {}", e);
            return Err(e.into());
        }
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&config);

    tracing::info!("Starting reservation assistant v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = config.environment.as_str(),
        config_path = env.as_deref().unwrap_or("default"),
        retell_api_key_set = config.retell.api_key_set(),
        "Configuration loaded"
    );

    let store = Arc::new(InMemoryConversationStore::from_config(&config.sessions));
    let cleanup_shutdown = store.start_cleanup_task();

    let mut state = AppState::from_settings(config.clone())?.with_conversation_store(store);

    if config.observability.metrics_enabled {
        match init_metrics() {
            Ok(handle) => {
                state = state.with_metrics(handle);
                tracing::info!("Initialized Prometheus metrics at /metrics");
            }
            Err(e) => tracing::warn!(error = %e, "Metrics disabled"),
        }
    }

    tracing::info!(
        distributed = state.is_distributed_sessions(),
        webhook = state.call_logger.is_some(),
        "Initialized application state"
    );

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = cleanup_shutdown.send(true);
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("bbq_assistant={},tower_http=debug", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
