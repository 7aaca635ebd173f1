//! Bazaar CLI - database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (schema + session store)
//! bazaar-cli migrate
//!
//! # Create an admin account
//! bazaar-cli admin create -e admin@example.com -n "Admin Name"
//!
//! # Fix stock levels
//! bazaar-cli stock restock --quantity 25
//!
//! # Inspect the database
//! bazaar-cli inspect summary
//! ```
//!
//! # Environment Variables
//!
//! - `BAZAAR_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `BAZAAR_ADMIN_PASSWORD` - password for `admin create` when `-p` is omitted
//! - `RUST_LOG` - log filter (defaults to `info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use secrecy::SecretString;

use bazaar_core::{ProductId, UserRole};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "bazaar-cli")]
#[command(author, version, about = "Bazaar maintenance tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage accounts and roles
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Repair and report stock levels
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
    /// Read-only database inspection
    Inspect {
        #[command(subcommand)]
        target: InspectTarget,
    },
    /// Load data from files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (8-128 characters)
        #[arg(short, long, env = "BAZAAR_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Grant the admin role to an existing account
    Promote {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke the admin role from an existing account
    Demote {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Replace the password of an existing account
    ResetPassword {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// New password (8-128 characters)
        #[arg(short, long, env = "BAZAAR_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum StockAction {
    /// Set the absolute stock level of a product
    Set {
        #[arg(long)]
        product_id: i32,

        #[arg(long, allow_negative_numbers = true)]
        quantity: i32,
    },
    /// Change the stock level of a product by a signed amount
    Adjust {
        #[arg(long)]
        product_id: i32,

        #[arg(long, allow_negative_numbers = true)]
        delta: i32,
    },
    /// Give every out-of-stock product a fixed quantity
    Restock {
        #[arg(long)]
        quantity: i32,

        /// Also restock deactivated products
        #[arg(long)]
        include_inactive: bool,
    },
    /// List products at or below a stock threshold
    Report {
        #[arg(long, default_value_t = 5)]
        threshold: i32,
    },
}

#[derive(Subcommand)]
enum InspectTarget {
    /// Account and catalog totals
    Summary,
    /// List accounts
    Users {
        #[arg(long, default_value_t = 100)]
        limit: i64,
    },
    /// Dump users from the legacy SQLite database
    Legacy {
        #[arg(long, default_value = commands::inspect::DEFAULT_LEGACY_PATH)]
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML file
    Products {
        /// Path to the YAML file
        #[arg(short, long)]
        file: PathBuf,

        /// Email of the account listed as seller
        #[arg(long)]
        seller_email: String,

        /// Validate the file without writing
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => commands::admin::create(&email, &name, &SecretString::from(password)).await,
            AdminAction::Promote { email } => {
                commands::admin::set_role(&email, UserRole::Admin).await
            }
            AdminAction::Demote { email } => {
                commands::admin::set_role(&email, UserRole::Customer).await
            }
            AdminAction::ResetPassword { email, password } => {
                commands::admin::reset_password(&email, &SecretString::from(password)).await
            }
        },
        Commands::Stock { action } => match action {
            StockAction::Set {
                product_id,
                quantity,
            } => commands::stock::set(ProductId::new(product_id), quantity).await,
            StockAction::Adjust { product_id, delta } => {
                commands::stock::adjust(ProductId::new(product_id), delta).await
            }
            StockAction::Restock {
                quantity,
                include_inactive,
            } => commands::stock::restock(quantity, include_inactive).await,
            StockAction::Report { threshold } => commands::stock::report(threshold).await,
        },
        Commands::Inspect { target } => match target {
            InspectTarget::Summary => commands::inspect::summary().await,
            InspectTarget::Users { limit } => commands::inspect::users(limit).await,
            InspectTarget::Legacy { path } => commands::inspect::legacy(&path).await,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products {
                file,
                seller_email,
                dry_run,
            } => commands::seed::products(&file, &seller_email, dry_run).await,
        },
    }
}
