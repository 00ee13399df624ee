pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod models;
pub mod services;
pub mod state;

use clap::{CommandFactory, Parser};
use tokio::signal;

use cli::{Cli, Commands, cmd_history, cmd_rates, cmd_users};
pub use config::Config;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => run_daemon(config).await,

        Some(Commands::Init) => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        Some(Commands::Rates) => cmd_rates(&config).await,

        Some(Commands::History { limit }) => cmd_history(&config, limit).await,

        Some(Commands::Users) => cmd_users(&config).await,

        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

async fn run_daemon(config: Config) -> anyhow::Result<()> {
    info!("Polypack v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = config.server.port;
    let state = api::create_app_state_from_config(config);

    let app = api::router(state).await;
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("🌐 Web API running at http://0.0.0.0:{port}");
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {e}");
        }
    });

    info!("Server running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {e}");
        }
    }

    server_handle.abort();
    info!("Server stopped");

    Ok(())
}
