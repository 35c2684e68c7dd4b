//! # CourtDesk CLI
//!
//! ## Usage
//!
//! ```bash
//! courtdesk --config ./config/courtdesk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `courtdesk init` | Create the SQLite database and club tables |
//! | `courtdesk seed` | Load six months of demo data |
//! | `courtdesk ask "<question>"` | Run one question through the pipeline |
//! | `courtdesk serve` | Start the HTTP API |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use courtdesk::config;
use courtdesk::db;
use courtdesk::migrate;
use courtdesk::models::Outcome;
use courtdesk::oracle::AnthropicOracle;
use courtdesk::pipeline::Pipeline;
use courtdesk::seed;
use courtdesk::server;

/// CourtDesk — natural-language analytics for a tennis club.
#[derive(Parser)]
#[command(
    name = "courtdesk",
    about = "CourtDesk — ask questions about your tennis club in natural language",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/courtdesk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite file and the members, courts, coaches, and
    /// bookings tables. Idempotent.
    Init,

    /// Load demo data into an initialized database.
    ///
    /// Skips loading if members already exist.
    Seed,

    /// Ask one question from the terminal.
    ///
    /// Runs the full pipeline (synthesis, execution, narration) and prints
    /// the generated SQL and the narrated answer.
    Ask {
        /// The question, e.g. "how much revenue did we make last month?"
        question: String,
    },

    /// Start the HTTP API server.
    ///
    /// Binds to the address configured in `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Seed => {
            seed::run_seed(&cfg).await?;
        }
        Commands::Ask { question } => {
            let pool = db::connect(&cfg).await?;
            let oracle = Arc::new(AnthropicOracle::new(&cfg.oracle)?);
            let pipeline = Pipeline::new(pool, oracle, cfg);

            let outcome = pipeline.ask("cli", &question, &[]).await?;
            if let Outcome::Answer { sql, .. } = &outcome {
                println!("SQL: {}\n", sql);
            }
            let response = pipeline.respond(&question, outcome);
            println!("{}", response.answer);
        }
        Commands::Serve => {
            let pool = db::connect(&cfg).await?;
            let oracle = Arc::new(AnthropicOracle::new(&cfg.oracle)?);
            let pipeline = Arc::new(Pipeline::new(pool, oracle, cfg.clone()));
            server::run_server(&cfg, pipeline).await?;
        }
    }

    Ok(())
}
