//! TechMart CLI - storefront and back-office from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse and fill a guest cart, then sign in to merge it
//! techmart products search headphones
//! techmart cart add 5 --quantity 2
//! techmart login -e priya@techmart.in -p secret
//!
//! # Check out
//! techmart checkout --street "12 MG Road" --state Karnataka --zip 560001 --payment upi
//!
//! # Back office
//! techmart admin-login -e admin@techmart.in -p secret
//! techmart admin status 41 shipped --tracking TRK123
//! ```
//!
//! # Commands
//!
//! - `login` / `admin-login` / `logout` / `register` / `whoami` - Session
//! - `profile` - Show or edit the signed-in user's profile
//! - `products` - Browse the catalogue
//! - `cart` / `checkout` - Cart mutations and ordering
//! - `orders` / `reviews` - Order history, returns, and reviews
//! - `admin` - Back-office operations (admin accounts only)
//!
//! Results are printed to stdout as JSON; alerts go to stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use techmart_client::{ApiClient, AppContext, ClientConfig, FileStore, SessionStorage};

mod commands;

use commands::ConsoleNotifier;
use commands::admin::AdminAction;
use commands::account::ProfileAction;
use commands::orders::{OrdersAction, ReviewsAction};
use commands::shop::{CartAction, CheckoutArgs, ProductsAction};

#[derive(Parser)]
#[command(name = "techmart")]
#[command(author, version, about = "TechMart storefront and back-office")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and fold the guest cart into the account
    Login(LoginArgs),
    /// Sign in to the back office
    AdminLogin(LoginArgs),
    /// Sign out and forget the persisted session
    Logout,
    /// Create a customer account
    Register {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,

        /// Accept the terms and conditions
        #[arg(long)]
        agree_to_terms: bool,
    },
    /// Show the current session and cart
    Whoami,
    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the current cart
    Checkout(CheckoutArgs),
    /// Order history, cancellations, and returns
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Product reviews
    Reviews {
        #[command(subcommand)]
        action: ReviewsAction,
    },
    /// Back-office operations
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Args)]
struct LoginArgs {
    #[arg(short, long)]
    email: String,

    #[arg(short, long)]
    password: String,
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

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "techmart_client=info,techmart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open(config.state_path.clone())?;
    let storage = SessionStorage::new(Arc::new(store));
    let api = ApiClient::new(&config.api_url, storage, Arc::new(ConsoleNotifier))?;
    let mut context = AppContext::bootstrap(api, config.guest_cart_retention).await;

    match cli.command {
        Commands::Login(args) => {
            commands::account::login(&mut context, &args.email, &args.password).await?;
        }
        Commands::AdminLogin(args) => {
            commands::account::admin_login(&mut context, &args.email, &args.password).await?;
        }
        Commands::Logout => commands::account::logout(&mut context),
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
            confirm_password,
            agree_to_terms,
        } => {
            let form = techmart_core::RegistrationForm {
                first_name,
                last_name,
                email,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
                agree_to_terms,
            };
            commands::account::register(&mut context, &form).await?;
        }
        Commands::Whoami => commands::print_json(context.state())?,
        Commands::Profile { action } => commands::account::profile(&mut context, action).await?,
        Commands::Products { action } => commands::shop::products(&context, action).await?,
        Commands::Cart { action } => commands::shop::cart(&mut context, action).await?,
        Commands::Checkout(args) => commands::shop::checkout(&mut context, args).await?,
        Commands::Orders { action } => commands::orders::orders(&mut context, action).await?,
        Commands::Reviews { action } => commands::orders::reviews(&mut context, action).await?,
        Commands::Admin { action } => commands::admin::run(&context, action).await?,
    }
    Ok(())
}
