//! Tower support-matrix seeder
//!
//! ## Usage
//!
//! ```bash
//! # Seed the default store with the built-in catalog
//! towerdashboard-seed seed
//!
//! # Seed a specific store from a catalog file
//! towerdashboard-seed --sqlite-path /data/towerdashboard.sqlite --catalog catalog.toml seed
//!
//! # Print the sign-off job matrix as JSON lines without touching the store
//! towerdashboard-seed plan
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use towerdashboard_seed::{Config, Store};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "towerdashboard-seed")]
#[command(about = "Seed the Tower support-matrix store")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite store path
    #[arg(long, env = "TOWERDASHBOARD_SQLITE_PATH")]
    sqlite_path: Option<PathBuf>,

    /// Reference catalog (TOML); defaults to the built-in catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Seed the store; does nothing if it is already seeded
    Seed,

    /// Print the sign-off job matrix as JSON lines
    Plan,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `plan` output stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("towerdashboard_seed=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // Apply CLI overrides
    if let Some(path) = args.sqlite_path {
        config.sqlite_path = path;
    }
    if let Some(path) = args.catalog {
        config.catalog_path = Some(path);
    }

    let catalog = config.catalog()?;

    match args.command {
        Command::Seed => {
            let store = Store::open(&config.sqlite_path)?;
            if store.seed(&catalog)? {
                info!("Seeded {:?}", config.sqlite_path);
            } else {
                info!("{:?} already seeded, nothing to do", config.sqlite_path);
            }
        }
        Command::Plan => {
            let jobs = catalog.sign_off_jobs()?;
            for job in &jobs {
                println!("{}", serde_json::to_string(job)?);
            }
            info!("{} sign-off jobs", jobs.len());
        }
    }

    Ok(())
}
