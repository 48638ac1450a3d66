use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rosterd::auth::{CredentialHasher, SessionSigner};
use rosterd::config::AppConfig;
use rosterd::permissions::{self, NewUser, PageAssignment};
use rosterd::seed;
use rosterd::server::{AppState, create_router};
use rosterd::store::{SqliteStore, Store};
use rosterd::types::Page;

#[derive(Parser)]
#[command(name = "rosterd")]
#[command(about = "A shift-scheduling server", long_about = None)]
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
        /// Path to the TOML config file
        #[arg(long, default_value = "rosterd.toml")]
        config: PathBuf,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(long, short)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create config, database, and admin account)
    Init {
        /// Path to the TOML config file to create
        #[arg(long, default_value = "rosterd.toml")]
        config: PathBuf,

        /// Seed two demo teams with people, shift catalogs, and users
        #[arg(long)]
        demo_data: bool,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },
}

fn random_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

fn all_pages() -> Vec<PageAssignment> {
    Page::ALL
        .iter()
        .map(|page| PageAssignment {
            page: page.as_str().to_string(),
            can_view: true,
            can_edit: true,
        })
        .collect()
}

fn run_init(config_path: PathBuf, demo_data: bool, non_interactive: bool) -> anyhow::Result<()> {
    if config_path.exists() {
        bail!(
            "Server already initialized. Config exists at: {}",
            config_path.display()
        );
    }

    let config = AppConfig::generate(&config_path)?;

    let store = SqliteStore::new(&config.database_path)?;
    store.initialize()?;

    let hasher = CredentialHasher::new();

    let (username, password, must_change_password) = if non_interactive {
        ("admin".to_string(), random_password(), true)
    } else {
        let username = inquire::Text::new("Admin username:")
            .with_default("admin")
            .with_validator(|input: &str| {
                if input.trim().is_empty() {
                    Err("Username cannot be empty".into())
                } else if input.contains(char::is_whitespace) {
                    Err("Username cannot contain whitespace".into())
                } else {
                    Ok(inquire::validator::Validation::Valid)
                }
            })
            .prompt()?;
        let password = inquire::Password::new("Admin password:").prompt()?;
        (username, password, false)
    };

    let admin = permissions::create_user_with_permissions(
        &store,
        &hasher,
        &NewUser {
            username: username.clone(),
            display_name: username.clone(),
            password: password.clone(),
            must_change_password,
            pages: all_pages(),
            teams: vec![],
        },
    )?;

    if demo_data {
        seed::seed_demo(&store, &hasher, admin.id)?;
    }

    println!();
    println!("========================================");
    println!("Initialized. Config written to: {}", config_path.display());
    println!("Database at: {}", config.database_path.display());
    println!();
    println!("Admin account: {username}");
    if non_interactive {
        println!("Admin password (change it on first login):");
        println!();
        println!("  {password}");
    }
    if demo_data {
        println!();
        println!("Demo accounts: planner / planner123, viewer / viewer123");
    }
    println!("========================================");
    println!();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rosterd=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                config,
                demo_data,
                non_interactive,
            } => {
                run_init(config, demo_data, non_interactive)?;
            }
        },
        Commands::Serve { config, host, port } => {
            if !config.exists() {
                bail!(
                    "Server not initialized. Run 'rosterd admin init' first to create the config and database."
                );
            }

            let mut config = AppConfig::load(&config)?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            let store = SqliteStore::new(&config.database_path)?;
            store.initialize()?;

            let signer = SessionSigner::new(&config.secret_key, config.session_max_age);
            let addr = config.socket_addr()?;

            let state = Arc::new(AppState {
                store: Arc::new(store),
                signer,
                config,
            });

            let app = create_router(state);

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
