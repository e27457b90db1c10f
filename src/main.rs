use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use larder::config::LarderConfig;
use larder::server::{AppState, create_router};
use larder::store::{SqliteStore, Store};
use larder::types::Household;

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Copy-on-write recipe sharing between households")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and database
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Manage households
    Household {
        #[command(subcommand)]
        command: HouseholdCommands,
    },

    /// Start the HTTP server
    Serve {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Data directory for the database
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum HouseholdCommands {
    /// Register a household and print its id
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

fn open_store(data_dir: &str) -> anyhow::Result<SqliteStore> {
    let db_path = PathBuf::from(data_dir).join("larder.db");
    if !db_path.exists() {
        bail!("Database not found. Run 'larder init' first.");
    }
    Ok(SqliteStore::new(&db_path)?)
}

fn run_init(data_dir: String) -> anyhow::Result<()> {
    let data_path = PathBuf::from(data_dir);
    fs::create_dir_all(&data_path)?;

    let db_path = data_path.join("larder.db");
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    println!("Initialized database at {}", db_path.display());
    Ok(())
}

fn run_household_add(name: String, data_dir: String) -> anyhow::Result<()> {
    let name = name.trim().to_string();
    if name.is_empty() {
        bail!("Household name cannot be empty");
    }

    let store = open_store(&data_dir)?;
    let id = store.create_household(&Household {
        id: 0,
        name: name.clone(),
        created_at: Utc::now(),
    })?;

    println!("Created household '{name}' with id {id}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("larder=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => run_init(data_dir)?,
        Commands::Household { command } => match command {
            HouseholdCommands::Add { name, data_dir } => run_household_add(name, data_dir)?,
        },
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => {
            let mut config = LarderConfig::load(config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.server.data_dir = data_dir;
            }

            let db_path = config.server.db_path();
            if !db_path.exists() {
                bail!("Database not found at {}. Run 'larder init' first.", db_path.display());
            }

            let store = SqliteStore::new(&db_path)?.with_busy_timeout(config.engine.busy_timeout())?;
            store.initialize()?;

            let state = Arc::new(AppState::new(Arc::new(store), config.engine.clone()));
            let app = create_router(state);
            let addr = config.server.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
