//! lectern CLI: the main entry point.
//!
//! Commands:
//! - `serve`    Start the HTTP API
//! - `lessons`  List the loaded lessons
//! - `models`   Show the model catalog
//! - `preview`  Estimate context size and cost for a lesson selection
//! - `doctor`   Diagnose configuration and content directories
//! - `config`   Print a default configuration file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "lectern",
    about = "lectern: lesson-grounded tutoring API",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (defaults to ./lectern.toml)
    #[arg(short, long, global = true, env = "LECTERN_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the loaded lessons
    Lessons {
        /// Group by course and module
        #[arg(short, long)]
        grouped: bool,
    },

    /// Show the model catalog
    Models,

    /// Estimate context size and cost for a lesson selection
    Preview {
        /// Lesson ids; none selects every lesson
        ids: Vec<u32>,

        /// Price the estimate with this model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Diagnose configuration and content directories
    Doctor,

    /// Print a default configuration file
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable.
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { host, port } => commands::serve::run(config_path, host, port).await?,
        Commands::Lessons { grouped } => commands::lessons::run(config_path, grouped)?,
        Commands::Models => commands::models::run(config_path)?,
        Commands::Preview { ids, model } => commands::preview::run(config_path, &ids, model)?,
        Commands::Doctor => commands::doctor::run(config_path)?,
        Commands::Config => commands::config_cmd::run(),
    }

    Ok(())
}
