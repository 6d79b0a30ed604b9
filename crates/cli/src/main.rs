//! Food Mini-App CLI - drive a Mini-App session from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the menu, optionally filtered by category
//! miniapp --buyer 777 catalog --category burger
//!
//! # Add a product, adjust a quantity, review the cart
//! miniapp --buyer 777 add 1
//! miniapp --buyer 777 change 1 -1
//! miniapp --buyer 777 cart
//!
//! # Submit the cart as an order
//! miniapp --buyer 777 checkout --comment "no onions"
//! ```
//!
//! # Commands
//!
//! - `catalog` - Show the menu
//! - `add` / `change` / `clear` - Edit the persisted cart
//! - `cart` - Show the cart with totals
//! - `checkout` - Submit the cart to the backend
//! - `logout` - Forget the persisted buyer id

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use food_miniapp_client::{AppError, ClientConfig};
use food_miniapp_core::{BuyerId, ProductId};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod terminal;

use commands::CliError;

#[derive(Parser)]
#[command(name = "miniapp")]
#[command(author, version, about = "Food-ordering Mini-App in the terminal")]
struct Cli {
    /// Telegram id to act as (overrides `MINIAPP_BUYER_ID`)
    #[arg(long, global = true)]
    buyer: Option<BuyerId>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the menu
    Catalog {
        /// Only show this category (`all` for everything)
        #[arg(short, long, default_value = "all")]
        category: String,
    },
    /// Add one unit of a product to the cart
    Add {
        /// Product id
        id: ProductId,
    },
    /// Change the quantity of a product already in the cart
    Change {
        /// Product id
        id: ProductId,
        /// Signed quantity change
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Show the cart with totals
    Cart,
    /// Submit the cart as an order
    Checkout {
        /// Note stored with the order
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Empty the cart
    Clear,
    /// Forget the persisted buyer id
    Logout,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = ClientConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "food_miniapp_client=info,food_miniapp_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(CliError::App(AppError::from(e))),
    };

    if let Err(e) = result {
        e.report();
        // Flush pending Sentry events before exiting
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mut config: ClientConfig) -> Result<(), CliError> {
    if let Some(buyer) = cli.buyer {
        config.buyer_id = Some(buyer);
    }

    let mut app = commands::session::open(&config).await?;

    match cli.command {
        Commands::Catalog { category } => commands::catalog::show(&app, &category)?,
        Commands::Add { id } => commands::cart::add(&mut app, id)?,
        Commands::Change { id, delta } => commands::cart::change(&mut app, id, delta)?,
        Commands::Cart => commands::cart::show(&mut app)?,
        Commands::Checkout { comment } => {
            commands::checkout::submit(&mut app, comment.as_deref()).await?;
        }
        Commands::Clear => commands::cart::clear(&mut app)?,
        Commands::Logout => commands::session::logout(&mut app)?,
    }
    Ok(())
}
