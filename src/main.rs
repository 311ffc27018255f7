use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hashnexus::config::ServerConfig;
use hashnexus::registry::normalize_handle;
use hashnexus::server::{AppState, create_router};
use hashnexus::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "hashnexus")]
#[command(about = "A wallet-authenticated HashName registry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Upper bound in seconds on any single store operation
        #[arg(long, default_value = "10")]
        store_timeout_secs: u64,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the database
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Create an unclaimed, active HashName. Handles are otherwise created
    /// by the surrounding platform, not by this server.
    AddHashname {
        /// Handle to register, with or without the leading '#'
        handle: String,

        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

fn db_path(data_dir: &str) -> PathBuf {
    PathBuf::from(data_dir).join("hashnexus.db")
}

fn open_initialized(data_dir: &str) -> anyhow::Result<SqliteStore> {
    let path = db_path(data_dir);
    if !path.exists() {
        bail!("Database not found. Run 'hashnexus admin init' first.");
    }
    Ok(SqliteStore::new(path)?)
}

fn run_init(data_dir: String) -> anyhow::Result<()> {
    fs::create_dir_all(&data_dir)?;

    let path = db_path(&data_dir);
    let store = SqliteStore::new(&path)?;
    store.initialize()?;

    println!("Initialized database at {}", path.display());
    Ok(())
}

fn run_add_hashname(handle: String, data_dir: String) -> anyhow::Result<()> {
    let store = open_initialized(&data_dir)?;
    let handle = normalize_handle(&handle)?;

    if store.get_hashname_by_handle(&handle)?.is_some() {
        bail!("HashName {handle} already exists");
    }

    let hashname = store.create_hashname(&handle)?;
    println!("Created {} (id {})", hashname.handle, hashname.hashname_id);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hashnexus=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init { data_dir } => {
                run_init(data_dir)?;
            }
            AdminCommands::AddHashname { handle, data_dir } => {
                run_add_hashname(handle, data_dir)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            store_timeout_secs,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.clone().into(),
                store_timeout: Duration::from_secs(store_timeout_secs),
            };

            let store = open_initialized(&data_dir)?;
            // Re-run the idempotent schema batch so upgrades pick up new
            // tables and indexes.
            store.initialize()?;

            let state = Arc::new(AppState::new(Arc::new(store), config.store_timeout));
            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
