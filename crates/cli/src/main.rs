//! Tidewater CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! tidewater-cli migrate
//!
//! # Load regions, catalogs, items and accounts from YAML
//! tidewater-cli seed seeds/sample.yaml
//!
//! # Create a customer account
//! tidewater-cli account create -e shopper@example.com -n "Sam Shopper" -p hunter22
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tidewater-cli")]
#[command(author, version, about = "Tidewater store CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load merchandise and accounts from a YAML file
    Seed {
        /// Path to the YAML seed file
        file: String,
    },
    /// Manage customer accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a customer account with a password
    Create {
        /// Email address used to log in
        #[arg(short, long)]
        email: String,

        /// Full name
        #[arg(short, long)]
        name: Option<String>,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::Account { action } => match action {
            AccountAction::Create {
                email,
                name,
                password,
            } => {
                let id = commands::account::create(&email, name.as_deref(), &password).await?;
                tracing::info!(account_id = %id, "Account created");
            }
        },
    }
    Ok(())
}
