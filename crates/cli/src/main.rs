//! Tech Commerce CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run order service database migrations
//! tc-cli migrate orders
//!
//! # Run identity service database migrations
//! tc-cli migrate identity
//!
//! # Run all database migrations
//! tc-cli migrate all
//!
//! # Create an admin account
//! tc-cli admin create -e admin@tech.com -p 'a long passphrase'
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tc-cli")]
#[command(author, version, about = "Tech Commerce CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run order service migrations
    Orders,
    /// Run identity service migrations
    Identity,
    /// Run all database migrations
    All,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an admin account (no-op if the email is taken)
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        #[arg(long, default_value = "admin")]
        first_name: String,

        #[arg(long, default_value = "admin")]
        last_name: String,
    },
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
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Orders => commands::migrate::orders().await?,
            MigrateTarget::Identity => commands::migrate::identity().await?,
            MigrateTarget::All => {
                commands::migrate::identity().await?;
                commands::migrate::orders().await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                password,
                first_name,
                last_name,
            } => {
                commands::admin::create_user(&email, &password, &first_name, &last_name).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_admin_create() {
        let cli = Cli::try_parse_from([
            "tc-cli", "admin", "create", "-e", "root@tech.com", "-p", "passphrase",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        match cli.command {
            Commands::Admin {
                action:
                    AdminAction::Create {
                        email,
                        first_name,
                        ..
                    },
            } => {
                assert_eq!(email, "root@tech.com");
                assert_eq!(first_name, "admin");
            }
            Commands::Migrate { .. } => panic!("parsed as migrate"),
        }
    }
}
