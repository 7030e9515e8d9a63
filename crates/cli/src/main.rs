//! Kasir CLI - backend probing and cart management tools.
//!
//! # Usage
//!
//! ```bash
//! # Find a reachable backend, scanning nearby ports if needed
//! kasir-cli probe
//!
//! # Only scan the port window, without retries
//! kasir-cli probe --scan-only
//!
//! # Show the cart and its totals
//! kasir-cli cart show
//!
//! # Delete every cart record
//! kasir-cli cart clear
//! ```
//!
//! The backend is configured with the same `KASIR_API_*` variables as the
//! web front-end; `--url` overrides `KASIR_API_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use kasir_web::config::ApiConfig;
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "kasir-cli")]
#[command(author, version, about = "Kasir CLI tools")]
struct Cli {
    /// Backend base URL (overrides `KASIR_API_URL`)
    #[arg(long, global = true)]
    url: Option<Url>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a backend answers
    Probe {
        /// Only scan the configured port window
        #[arg(long)]
        scan_only: bool,
    },
    /// Inspect or empty the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show every cart record and the totals
    Show,
    /// Delete every cart record
    Clear,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let mut config = ApiConfig::from_env()?;
    if let Some(url) = cli.url {
        config.base_url = url;
    }

    match cli.command {
        Commands::Probe { scan_only } => commands::probe::run(&config, scan_only).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&config).await?,
            CartAction::Clear => commands::cart::clear(&config).await?,
        },
    }
    Ok(())
}
