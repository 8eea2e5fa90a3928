//! Teahouse CLI - Database seeding and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Drop and recreate all tables, then load the bundled fixtures
//! teahouse seed
//!
//! # Same, with a custom fixture file
//! teahouse seed --file my-teas.yaml
//!
//! # Create a user
//! teahouse user create -u leaf_lover -e leaf@example.com -p 'correct horse'
//! ```
//!
//! # Environment Variables
//!
//! - `TEAHOUSE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod fixtures;

#[derive(Parser)]
#[command(name = "teahouse")]
#[command(author, version, about = "Teahouse CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop all tables, recreate the schema and load fixture data
    Seed {
        /// YAML fixture file (defaults to the bundled fixtures)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
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
        Commands::Seed { file } => {
            // Seeding failures are reported but don't fail the process;
            // whatever was committed before the failure stays.
            if let Err(e) = commands::seed::run(file.as_deref()).await {
                tracing::error!("An error occurred while seeding: {e}");
            }
        }
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                password,
            } => {
                commands::user::create(&username, &email, &password).await?;
            }
        },
    }
    Ok(())
}
