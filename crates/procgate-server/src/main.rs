//! procgate - allow-listed stored procedures over HTTP

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use procgate_server::{AppConfig, AppState, build_service, logging, router};

#[derive(Debug, Parser)]
#[command(name = "procgate", version, about = "Invoke allow-listed SQL Server stored procedures over HTTP")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "PROCGATE_CONFIG", default_value = "config/procgate.toml")]
    config: PathBuf,

    /// Override the listen address from the config file
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Database password, overriding the config file
    #[arg(long, env = "PROCGATE_DB_PASSWORD", hide_env_values = true)]
    db_password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(password) = cli.db_password {
        config.database.password = Some(password);
    }

    let _log_guard = logging::init(&config.logging)?;

    let service = build_service(&config)?;
    let pool = service.pool().clone();
    pool.warm_up().await;

    tracing::info!(
        procedures = service.allowed_procedures().len(),
        database = ?config.database,
        "procedure service ready"
    );

    let app = router(AppState::new(service), config.server.body_limit_bytes);
    let listener = tokio::net::TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;

    tracing::info!(addr = %config.server.bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close_idle().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
