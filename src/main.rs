use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use visitlog_api::auth::TokenSigner;
use visitlog_api::config::AppConfig;
use visitlog_api::database::{DatabaseManager, Datastore, MemoryDatastore, PgDatastore};
use visitlog_api::{app, AppState};

#[derive(Parser)]
#[command(name = "visitlog-api")]
#[command(about = "Visit-logging web API with bearer-token auth")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Listen on this port instead of WEBPORT/PORT")]
        port: Option<u16>,

        #[arg(long, help = "Keep users and visits in memory instead of PostgreSQL")]
        memory: bool,
    },

    #[command(about = "Print a bearer token for an email, signed with JWTSECRETKEY")]
    Token { email: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWTSECRETKEY, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
        )
        .init();

    match cli.command.unwrap_or(Command::Serve { port: None, memory: false }) {
        Command::Token { email } => {
            let signer = TokenSigner::new(&config.security.jwt_secret)?;
            println!("{}", signer.issue(&email)?);
            Ok(())
        }
        Command::Serve { port, memory } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config, memory).await
        }
    }
}

async fn serve(config: AppConfig, memory: bool) -> anyhow::Result<()> {
    tracing::info!("Starting visitlog-api in {:?} mode", config.environment);

    let (store, pool): (Arc<dyn Datastore>, Option<PgPool>) = if memory {
        tracing::warn!("Using in-memory datastore; nothing survives a restart");
        (Arc::new(MemoryDatastore::new()), None)
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to open database")?;
        (Arc::new(PgDatastore::new(pool.clone())), Some(pool))
    };

    let bind_addr = config.bind_addr();
    let state = AppState::new(config, store)?;
    state.seed_initial_admin().await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        DatabaseManager::close(pool).await;
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutdown signal received");
}
