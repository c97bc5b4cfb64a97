use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use boxrepo::auth::{TokenGenerator, issue_token};
use boxrepo::blob::FsBlobStore;
use boxrepo::config::ServerConfig;
use boxrepo::server::{AppState, create_router};
use boxrepo::service::AccountService;
use boxrepo::store::{SqliteStore, Store};

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "boxrepo")]
#[command(about = "A self-hostable media organizer", long_about = None)]
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
        /// TOML config file; flags below override its values
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database and media
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database, media directory and admin token)
    Init {
        /// Data directory for the database and media
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },

    /// Create a user and print a token for them
    CreateUser {
        /// Data directory for the database and media
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// User name (alphanumerics, hyphens, underscores)
        #[arg(long)]
        name: String,

        /// Start on a PAID account for this many months (1, 3, 6 or 12)
        #[arg(long)]
        paid_months: Option<i32>,
    },
}

fn init_tracing(filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn open_initialized_store(config: &ServerConfig) -> anyhow::Result<SqliteStore> {
    let not_initialized =
        "Server not initialized. Run 'boxrepo admin init' first to create the database and admin token.";

    if !config.db_path().exists() {
        bail!(not_initialized);
    }

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;
    if !store.has_admin_token()? {
        bail!(not_initialized);
    }
    Ok(store)
}

fn run_init(data_dir: PathBuf) -> anyhow::Result<()> {
    let config = ServerConfig {
        data_dir,
        ..ServerConfig::default()
    };
    fs::create_dir_all(&config.data_dir)?;
    fs::create_dir_all(config.media_dir())?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let token_file = config.admin_token_path();

    if store.has_admin_token()? {
        bail!(
            "Server already initialized. Admin token exists at: {}",
            token_file.display()
        );
    }

    let generator = TokenGenerator::new()?;
    let (_token, raw_token) = issue_token(&store, &generator, true, None, None)?;

    fs::write(&token_file, &raw_token)?;

    #[cfg(unix)]
    set_restrictive_permissions(&token_file);

    println!();
    println!("========================================");
    println!("Admin token (save this, it won't be shown again):");
    println!();
    println!("  {raw_token}");
    println!();
    println!("Token also written to: {}", token_file.display());
    println!("========================================");
    println!();

    Ok(())
}

fn run_create_user(data_dir: PathBuf, name: String, paid_months: Option<i32>) -> anyhow::Result<()> {
    let config = ServerConfig {
        data_dir,
        ..ServerConfig::default()
    };
    let store: Arc<dyn Store> = Arc::new(open_initialized_store(&config)?);

    let (user, account) = AccountService::new(store.clone())
        .register_user(&name, paid_months)
        .with_context(|| format!("Failed to create user '{name}'"))?;

    let generator = TokenGenerator::new()?;
    let (_token, raw_token) =
        issue_token(store.as_ref(), &generator, false, Some(user.id.clone()), None)?;

    println!();
    println!("========================================");
    println!(
        "Created user '{}' ({}) with token:",
        user.name, account.account_type
    );
    println!();
    println!("  {raw_token}");
    println!();
    println!("========================================");
    println!();

    Ok(())
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let store = open_initialized_store(&config)?;
    fs::create_dir_all(config.media_dir())?;

    info!(
        "Admin token available at {}",
        config.admin_token_path().display()
    );

    let state = Arc::new(AppState::new(
        Arc::new(store),
        Arc::new(FsBlobStore::new(&config.media_dir())),
    ));

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => {
            init_tracing(boxrepo::config::DEFAULT_LOG_FILTER)?;
            match command {
                AdminCommands::Init { data_dir } => run_init(data_dir)?,
                AdminCommands::CreateUser {
                    data_dir,
                    name,
                    paid_months,
                } => run_create_user(data_dir, name, paid_months)?,
            }
        }
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => {
            let mut config = match config {
                Some(path) => ServerConfig::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => ServerConfig::default(),
            };
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }

            init_tracing(&config.log_filter)?;
            run_serve(config).await?;
        }
    }

    Ok(())
}
