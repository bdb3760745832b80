//! jointscope entrypoint.
//!
//! Resolves the access token (flag first, then the stored one), checks
//! component readiness, and hands control to the operator loop.

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use jointscope_core::config::{ConsoleConfig, API_URL_ENV, WS_URL_ENV};
use jointscope_core::error::ConsoleError;
use jointscope_core::session::SessionContext;
use jointscope_core::token_store::TokenStore;

mod actions;
mod app;
mod channel;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "jointscope", about = "Operator console for joint functioning of the AT inference components")]
struct Cli {
    /// Access token for the cooperating session. Falls back to the stored
    /// token from a previous run.
    #[arg(short, long)]
    token: Option<String>,

    /// Base URL of the debug server API.
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Base URL of the push channel endpoint.
    #[arg(long, env = WS_URL_ENV)]
    ws_url: Option<String>,
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    let store = TokenStore::default_location();
    let token = match resolve_token(&cli, store.as_ref()) {
        Ok(token) => token,
        Err(err) => {
            error!(error = %err, "No usable access token");
            eprintln!("Supply an access token with --token.");
            std::process::exit(2);
        }
    };

    let config = match ConsoleConfig::resolve(cli.api_url.as_deref(), cli.ws_url.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Invalid endpoint configuration");
            std::process::exit(2);
        }
    };

    let session = SessionContext::create(token);
    let app = match App::new(session, config, store) {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "Failed to initialize the console");
            std::process::exit(1);
        }
    };

    if let Err(err) = app.run().await {
        error!(error = %err, "Console session ended with an error");
        std::process::exit(1);
    }
}

fn resolve_token(cli: &Cli, store: Option<&TokenStore>) -> Result<String, ConsoleError> {
    if let Some(token) = cli.token.as_deref() {
        let token = token.trim();
        if !token.is_empty() {
            if let Some(store) = store {
                store.save(token)?;
            }
            return Ok(token.to_string());
        }
    }
    store
        .and_then(|store| store.load())
        .ok_or(ConsoleError::MissingToken)
}

fn init_logging() {
    let debug_enabled = std::env::var("JOINTSCOPE_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
