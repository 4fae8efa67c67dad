//! `SaverSpot` CLI - Store seeding and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Seed the demo category directory
//! spot-cli seed categories
//!
//! # Seed categories from a YAML list
//! spot-cli seed categories --file categories.yaml
//!
//! # Seed demo offers for a merchant
//! spot-cli seed offers --merchant-id m3c9d2e7f8g1h4j
//!
//! # Check the credential store is reachable
//! spot-cli health
//! ```
//!
//! # Commands
//!
//! - `seed categories` - Insert the offer category directory
//! - `seed offers` - Insert demo offers for a merchant
//! - `health` - Check store connectivity

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "spot-cli")]
#[command(author, version, about = "SaverSpot CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the record store with demo data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Check that the credential store is reachable
    Health,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert the offer category directory
    Categories {
        /// YAML file holding a list of category names
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Insert demo offers for a merchant
    Offers {
        /// Merchant record id the offers belong to
        #[arg(short, long)]
        merchant_id: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { target } => match target {
            SeedTarget::Categories { file } => {
                commands::seed::categories(file.as_deref()).await?;
            }
            SeedTarget::Offers { merchant_id } => {
                commands::seed::offers(&merchant_id).await?;
            }
        },
        Commands::Health => commands::health::check().await?,
    }
    Ok(())
}
