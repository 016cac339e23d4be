//! `claims-api`: HTTP server for the ownership claim lifecycle
//!
//! ```bash
//! API_DATABASE_URL=postgres://... API_REVIEWER_IDS=<uuid>,<uuid> cargo run --bin claims-api
//! ```
//!
//! Settings come from `API_*` variables (see [`ApiConfig`]); a `.env` file
//! in the working directory is honoured. The ones usually set:
//!
//! * `API_DATABASE_URL`, `API_JWT_SECRET`
//! * `API_REVIEWER_IDS`: comma-separated account ids allowed to review
//! * `API_PLACE_LOOKUP_BASE_URL`, `API_PLACE_LOOKUP_API_KEY`
//! * `API_AUTO_CONVERT_ON_APPROVE` (default `true`)
//!
//! `RUST_LOG` overrides `API_LOG_LEVEL` when both are present.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_db::DatabaseConfig;
use interface_api::{build_service, config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().unwrap_or_else(|e| {
        eprintln!("ignoring unreadable API_* settings: {}", e);
        ApiConfig::default()
    });
    install_subscriber(&config.log_level);

    let pool = infra_db::create_pool(DatabaseConfig::new(config.database_url.clone())).await?;
    infra_db::run_migrations(&pool).await?;

    let service = build_service(pool.clone(), &config)?;
    let addr: SocketAddr = config.server_addr().parse()?;
    let router = create_router(AppState::new(pool, config.clone(), service));

    let listener = TcpListener::bind(addr).await?;
    info!(
        %addr,
        auto_convert = config.auto_convert_on_approve,
        "claims-api accepting connections"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(stop_requested())
        .await?;

    info!("claims-api stopped");
    Ok(())
}

fn install_subscriber(fallback_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolves on the first Ctrl+C or SIGTERM
async fn stop_requested() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!(signal = "SIGINT", "Draining connections"),
            _ = sigterm.recv() => info!(signal = "SIGTERM", "Draining connections"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!(signal = "ctrl-c", "Draining connections");
    }
}
