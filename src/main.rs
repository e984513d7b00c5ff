use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use doublewin::cli::{self, PredictArgs, WindowArgs};
use doublewin::{api, config::Config};

#[derive(Parser)]
#[command(name = "doublewin")]
#[command(about = "HT/FT 1/2 - 2/1 predictions from recent football results")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Generate predictions for the match window
    Predict {
        /// First day to fetch (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Last day to fetch (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
        /// Read matches from a JSON file instead of the feed
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Also write predictions as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Print predictions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a team's recent results and upcoming fixtures
    Team {
        #[arg(short, long)]
        name: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(config.port);
            tracing::info!("Starting prediction API server on port {}", port);
            api::serve(config, port).await?;
        }
        Some(Commands::Predict {
            start,
            end,
            input,
            csv,
            json,
        }) => {
            tracing::info!("Generating predictions...");
            let args = PredictArgs {
                window: WindowArgs { start, end, input },
                csv,
                json,
            };
            cli::generate_predictions(&config, args).await?;
        }
        Some(Commands::Team {
            name,
            start,
            end,
            input,
        }) => {
            tracing::info!("Querying team: {}", name);
            cli::query_team(&config, &name, WindowArgs { start, end, input }).await?;
        }
        None => {
            // Default to serving
            let port = config.port;
            tracing::info!("Starting prediction API server on port {}", port);
            api::serve(config, port).await?;
        }
    }

    Ok(())
}
