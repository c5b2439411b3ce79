mod api;
mod config;
mod error;
mod extract;
mod handlers;
mod metrics;
mod server;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use deeds_engine::RoundEngine;
use deeds_store_sqlite::SqliteStore;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::ServerConfig;
use server::{router, DeedsServer};

// ────────────────────────────────────── CLI Types ──────────────────────────────────────

#[derive(Parser)]
#[command(name = "deeds-server")]
#[command(about = "Good deeds round server: HTTP API and administration")]
struct Cli {
    /// Database URL (sqlite://path/to/db.db?mode=rwc)
    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        default_value = "sqlite://deeds.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Server address
        #[arg(long, default_value = "0.0.0.0:8000")]
        addr: String,
    },
    /// Deed template management
    Template {
        #[command(subcommand)]
        template_cmd: TemplateCommand,
    },
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// Add a deed template to the pool
    Add {
        /// Deed description, e.g. "Write a thank-you note"
        description: String,
    },
    /// List deed templates
    List {
        /// Include retired templates
        #[arg(long)]
        all: bool,
    },
}

// ────────────────────────────────────── Commands ──────────────────────────────────────

async fn cmd_serve(db_url: &str, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let addr: std::net::SocketAddr = addr.parse()?;
    let config = ServerConfig::from_env()?;

    let store = Arc::new(SqliteStore::open(db_url).await?);
    let metrics = metrics::init_metrics()?;

    let (readiness_tx, readiness_rx) = watch::channel(false);
    let server = DeedsServer::new(store, config.clone(), Some(metrics), readiness_rx);
    let app = router(server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;
    info!(
        addr = %actual_addr,
        completion_policy = config.completion_policy.as_str(),
        owner_can_verify = config.owner_can_verify,
        "deeds-server listening"
    );

    let _ = readiness_tx.send(true);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(readiness_tx))
        .await?;

    info!("deeds-server stopped");
    Ok(())
}

async fn open_engine(db_url: &str) -> Result<RoundEngine<SqliteStore>, Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    let store = Arc::new(SqliteStore::open(db_url).await?);
    Ok(RoundEngine::new(store, config.engine_config()))
}

async fn cmd_template_add(db_url: &str, description: &str) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine(db_url).await?;
    let template = engine.create_template(description).await?;
    println!("✓ Template {} added", template.id.0);
    Ok(())
}

async fn cmd_template_list(db_url: &str, all: bool) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine(db_url).await?;
    let templates = engine.list_templates(!all).await?;

    if templates.is_empty() {
        println!("No deed templates");
        return Ok(());
    }
    for t in templates {
        let marker = if t.active { " " } else { "x" };
        println!("[{}] {}  {}", marker, t.id.0, t.description);
    }
    Ok(())
}

async fn shutdown_signal(readiness_tx: watch::Sender<bool>) {
    use tokio::signal::unix::{signal, SignalKind};

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
    }

    // Mark not ready so load balancers drain traffic
    let _ = readiness_tx.send(false);
}

// ────────────────────────────────────── Main ──────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { addr } => {
            cmd_serve(&cli.database_url, &addr).await?;
        }
        Command::Template { template_cmd } => match template_cmd {
            TemplateCommand::Add { description } => {
                cmd_template_add(&cli.database_url, &description).await?;
            }
            TemplateCommand::List { all } => {
                cmd_template_list(&cli.database_url, all).await?;
            }
        },
    }

    Ok(())
}
