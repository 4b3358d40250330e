//! `campusd` — the campus alumni-management server binary.
//!
//! Usage:
//!   campusd serve -c <config-name-or-path> [--listen <addr>]
//!   campusd seed  -c <config-name-or-path>
//!
//! A bare config name resolves to `/etc/campus/<name>.toml`.

mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use campus_alumni::CampusModule;
use campus_alumni::service::{CampusConfig, CampusService};
use campus_core::Module;
use clap::{Parser, Subcommand};
use tracing::info;

use config::ServerConfig;

/// Campus alumni-management server.
#[derive(Parser, Debug)]
#[command(name = "campusd", about = "Campus alumni-management server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server.
    Serve {
        /// Config name or path to config file.
        #[arg(short = 'c', long = "config")]
        config: String,

        /// Listen address (overrides the config file).
        #[arg(long = "listen")]
        listen: Option<String>,
    },
    /// Wipe the database and load the reference demo data set.
    Seed {
        /// Config name or path to config file.
        #[arg(short = 'c', long = "config")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { config, listen } => serve(&config, listen).await,
        Command::Seed { config } => seed(&config),
    }
}

/// Load config, verify it, and build the service on its stores.
fn init_service(config_name: &str) -> anyhow::Result<(ServerConfig, Arc<CampusService>)> {
    let config_path = ServerConfig::resolve_path(config_name);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    bootstrap::verify_config(&server_config)?;

    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = campus_core::ServiceConfig {
        data_dir: Some(data_dir),
        listen: server_config.server.listen.clone(),
        ..Default::default()
    };

    let sql: Arc<dyn campus_sql::SQLStore> = Arc::new(
        campus_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    let blob: Arc<dyn campus_blob::BlobStore> = Arc::new(
        campus_blob::FileStore::open(&core_config.resolve_blob_dir())
            .map_err(|e| anyhow::anyhow!("failed to open blob store: {}", e))?,
    );

    let campus_config = CampusConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        token_ttl: server_config.jwt.expire_secs,
    };
    let service = CampusService::new(sql, blob, campus_config)
        .map_err(|e| anyhow::anyhow!("failed to initialize campus service: {}", e))?;
    info!("Campus service initialized");

    Ok((server_config, service))
}

async fn serve(config_name: &str, listen_override: Option<String>) -> anyhow::Result<()> {
    let (server_config, service) = init_service(config_name)?;

    let campus_module = CampusModule::new(service);
    let module_routes = vec![(campus_module.name(), campus_module.routes())];
    let app = routes::build_router(module_routes);

    let listen = listen_override.unwrap_or(server_config.server.listen);
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("campusd listening on {}", listen);
    axum::serve(listener, app).await?;

    Ok(())
}

fn seed(config_name: &str) -> anyhow::Result<()> {
    let (_, service) = init_service(config_name)?;
    let summary = service
        .seed()
        .map_err(|e| anyhow::anyhow!("seed failed: {}", e))?;
    info!(
        "Seed complete: {} batches, {} users, {} companies.",
        summary.batches, summary.users, summary.companies
    );
    info!("Demo accounts: admin@campus.edu/admin123, student@campus.edu/student123");
    Ok(())
}
