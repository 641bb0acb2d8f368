//! Inkpost CLI - command-line client for the Inkpost blog API.
//!
//! # Usage
//!
//! ```bash
//! # Create an account and sign in
//! inkpost register -n "Ada" -e ada@example.com -p secret
//! inkpost login -e ada@example.com -p secret
//!
//! # Work with posts
//! inkpost post create -t "Hello" -c "First post"
//! inkpost post show 1
//!
//! # Administrators only
//! inkpost users
//! ```
//!
//! The session is persisted between runs (see `INKPOST_SESSION_FILE`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use inkpost_client::ClientConfig;
use inkpost_core::PostId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::CommandError;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "inkpost")]
#[command(author, version, about = "Command-line client for the Inkpost blog")]
struct Cli {
    /// Base URL of the blog API (overrides `INKPOST_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Sign in, replacing any current session
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show the stored session without contacting the server
    Status,
    /// Show your profile
    Profile,
    /// List all users (administrators only)
    Users,
    /// Manage posts
    Post {
        #[command(subcommand)]
        action: PostAction,
    },
}

#[derive(Subcommand)]
enum PostAction {
    /// Publish a new post
    Create {
        /// Post title
        #[arg(short, long)]
        title: String,

        /// Post content
        #[arg(short, long)]
        content: String,
    },
    /// Show a post
    Show {
        /// Post ID
        id: PostId,
    },
    /// Edit a post
    Edit {
        /// Post ID
        id: PostId,

        /// New title (keeps the current one if omitted)
        #[arg(short, long)]
        title: Option<String>,

        /// New content (keeps the current one if omitted)
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Delete a post
    Delete {
        /// Post ID
        id: PostId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
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

    tracing::debug!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

/// Logs go to stderr so they never mix with command output.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let config = match load_config(cli.api_url.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            return report(&mut out, &e);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    match run(cli.command, &config, &mut out).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&mut out, &e),
    }
}

fn load_config(api_url: Option<&str>) -> Result<ClientConfig, CommandError> {
    let config = ClientConfig::from_env()?;
    Ok(match api_url {
        Some(url) => config.with_api_url(url)?,
        None => config,
    })
}

fn report(out: &mut impl Write, error: &CommandError) -> ExitCode {
    tracing::error!("Command failed: {error}");
    if let Err(e) = render::alert(out, &error.alert_message(), error.suggests_login()) {
        tracing::error!("Could not write alert: {e}");
    }
    ExitCode::FAILURE
}

async fn run(command: Commands, config: &ClientConfig, out: &mut impl Write) -> Result<(), CommandError> {
    let sessions = commands::connect(config).await?;

    match command {
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(&sessions, out, name, email, password).await?,
        Commands::Login { email, password } => {
            commands::auth::login(&sessions, out, email, password).await?;
        }
        Commands::Logout => commands::auth::logout(&sessions, out).await?,
        Commands::Status => commands::auth::status(&sessions, out).await?,
        Commands::Profile => commands::users::profile(&sessions, out).await?,
        Commands::Users => commands::users::list(&sessions, out).await?,
        Commands::Post { action } => match action {
            PostAction::Create { title, content } => {
                commands::posts::create(&sessions, out, title, content).await?;
            }
            PostAction::Show { id } => commands::posts::show(&sessions, out, &id).await?,
            PostAction::Edit { id, title, content } => {
                commands::posts::edit(&sessions, out, &id, title, content).await?;
            }
            PostAction::Delete { id, yes } => {
                let stdin = io::stdin();
                commands::posts::delete(&sessions, out, &mut stdin.lock(), &id, yes).await?;
            }
        },
    }
    Ok(())
}
