//! wx-gateway: Weather Gateway Main Binary
//!
//! Main entry point for the weather gateway application.
//!
//! Usage:
//!   wx-gateway                 - Start server mode (HTTP API)
//!   wx-gateway --cli           - Start interactive chat mode
//!   wx-gateway --execute MSG   - Ask the chatbot once and exit
//!   wx-gateway --help          - Show help

mod cli;

use tracing_subscriber::EnvFilter;
use wx_api::AppState;
use wx_core::Config;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Server mode (HTTP API)
    Server,
    /// Interactive CLI mode
    Cli,
    /// One-shot chatbot message
    Execute(String),
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let mode = parse_args(std::env::args().skip(1));

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("wx-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration (env > wx-gateway.toml > defaults)
    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting wx-gateway...");
    tracing::info!("Model: {} ({:?})", config.llm.model, config.llm.provider);

    let state = AppState::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize services: {}", e))?;

    match mode {
        RunMode::Cli => {
            tracing::info!("Running in CLI mode");
            cli::run_cli(state).await
        }
        RunMode::Execute(message) => cli::run_execute(state, &message).await,
        RunMode::Server => run_server(config, state).await,
        RunMode::Help | RunMode::Version => Ok(()),
    }
}

/// Parse command line arguments
fn parse_args<I>(args: I) -> RunMode
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--cli" | "-c" => return RunMode::Cli,
            "--execute" | "-e" => {
                let message = args.collect::<Vec<_>>().join(" ");
                return RunMode::Execute(message);
            }
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("wx-gateway - Weather API gateway and chatbot");
    println!();
    println!("Usage:");
    println!("  wx-gateway                 Start server mode (HTTP API)");
    println!("  wx-gateway --cli           Start interactive chat mode");
    println!("  wx-gateway --execute MSG   Ask the chatbot once and exit");
    println!("  wx-gateway --help          Show this help message");
    println!("  wx-gateway --version       Show version");
    println!();
    println!("Environment Variables:");
    println!("  WEATHER_API_KEY      weatherapi.com API key (required)");
    println!("  WEATHER_API_URL      Weather API base URL (default: http://api.weatherapi.com/v1)");
    println!("  WEATHER_TIMEOUT_SECS Weather request timeout (default: 10)");
    println!("  LLM_API_KEY          LLM API key (required, OPENAI_API_KEY also accepted)");
    println!("  LLM_MODEL            Model name (default: gpt-3.5-turbo)");
    println!("  LLM_PROVIDER         Provider: openai or claude (default: openai)");
    println!("  LLM_BASE_URL         Custom API endpoint");
    println!("  API_PORT             HTTP API port (default: 5000)");
    println!("  API_ALLOWED_ORIGINS  Comma-separated CORS origins (default: any)");
    println!("  DB_PATH              SQLite database path (default: data/wx-gateway.db)");
}

/// Run server mode until Ctrl+C
async fn run_server(config: Config, state: AppState) -> anyhow::Result<()> {
    tracing::info!("wx-gateway initialized successfully");
    tracing::info!("Press Ctrl+C to exit");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
        tracing::info!("Shutting down...");
    };

    wx_api::start_server(&config, state, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
