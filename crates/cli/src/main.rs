//! Pantry CLI - Drive the admin dashboard backend from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password from -p or PANTRY_PASSWORD)
//! pantry login -i admin@pantry.test
//!
//! # Browse the catalog
//! pantry categories list
//! pantry items list --category 4
//!
//! # Work the order queue
//! pantry orders list --status pending --from 2026-10-01
//! pantry orders set-status 1042 preparing
//!
//! # Upload a product photo
//! pantry upload ./latte.png
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `whoami` - Session management
//! - `categories`, `items`, `vendors` - Catalog browsing
//! - `orders` - Order listing and status changes
//! - `dashboard` - Headline stats and sales
//! - `upload` - Image upload
//!
//! # Environment Variables
//!
//! - `PANTRY_API_BASE_URL` - Backend base URL (required)
//! - `PANTRY_SESSION_FILE` - Where the session is persisted
//! - `PANTRY_LOG_FORMAT` - `text` (default) or `json`
//! - `SENTRY_DSN` - Enables error reporting when set

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pantry_client::SalesPeriod;
use pantry_core::{CategoryId, OrderId, OrderStatus};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "pantry")]
#[command(author, version, about = "Pantry admin dashboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        /// Email or phone number
        #[arg(short, long)]
        identifier: String,

        /// Password
        #[arg(short, long, env = "PANTRY_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the cached profile
    Whoami,
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Browse items
    Items {
        #[command(subcommand)]
        action: ItemAction,
    },
    /// Browse vendors
    Vendors {
        #[command(subcommand)]
        action: VendorAction,
    },
    /// Work with orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Show dashboard stats and sales
    Dashboard {
        /// Sales bucket (`daily`, `weekly`, `monthly`, `yearly`)
        #[arg(long, default_value = "weekly")]
        period: SalesPeriod,
    },
    /// Upload an image
    Upload {
        /// Path to the image file
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List all categories
    List,
    /// Show one category
    Get { id: CategoryId },
    /// Delete a category
    Delete { id: CategoryId },
}

#[derive(Subcommand)]
enum ItemAction {
    /// List items, optionally within one category
    List {
        #[arg(long)]
        category: Option<CategoryId>,
    },
}

#[derive(Subcommand)]
enum VendorAction {
    /// List all vendors
    List,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List orders
    List {
        #[arg(long)]
        status: Option<OrderStatus>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one order
    Get { id: OrderId },
    /// Change an order's status
    SetStatus { id: OrderId, status: OrderStatus },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|d| !d.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pantry=info,pantry_client=info".into());

    let json = std::env::var("PANTRY_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().without_time());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Sentry before tracing so the layer has a client to report to
    let _sentry_guard = init_sentry();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let client = commands::client()?;

    match cli.command {
        Commands::Login {
            identifier,
            password,
        } => commands::session::login(&client, &identifier, password).await?,
        Commands::Logout => commands::session::logout(&client)?,
        Commands::Whoami => commands::session::whoami(&client)?,
        Commands::Categories { action } => match action {
            CategoryAction::List => commands::catalog::list_categories(&client).await?,
            CategoryAction::Get { id } => commands::catalog::get_category(&client, id).await?,
            CategoryAction::Delete { id } => {
                commands::catalog::delete_category(&client, id).await?;
            }
        },
        Commands::Items { action } => match action {
            ItemAction::List { category } => {
                commands::catalog::list_items(&client, category).await?;
            }
        },
        Commands::Vendors { action } => match action {
            VendorAction::List => commands::catalog::list_vendors(&client).await?,
        },
        Commands::Orders { action } => match action {
            OrderAction::List {
                status,
                from,
                to,
                page,
                limit,
            } => {
                let filter = pantry_client::OrderFilter {
                    start_date: from,
                    end_date: to,
                    page,
                    limit,
                    status,
                };
                commands::orders::list(&client, &filter).await?;
            }
            OrderAction::Get { id } => commands::orders::get(&client, id).await?,
            OrderAction::SetStatus { id, status } => {
                commands::orders::set_status(&client, id, status).await?;
            }
        },
        Commands::Dashboard { period } => commands::dashboard::show(&client, period).await?,
        Commands::Upload { path } => commands::upload::image(&client, &path).await?,
    }
    Ok(())
}
