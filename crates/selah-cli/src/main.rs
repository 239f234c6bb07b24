use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use selah_core::clock::PacificClock;
use selah_core::Database;
use selah_llm::ModelClient;
use selah_server::AppState;

#[derive(Parser)]
#[command(
    name = "selah",
    about = "Liturgical content rotation and weekly recap API",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, global = true, env = "SELAH_DB", default_value = "selah.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "3141")]
        port: u16,

        /// Shared token gating the admin seed endpoint
        #[arg(long, env = "SELAH_ADMIN_TOKEN")]
        admin_token: Option<String>,

        /// Base URL of the OpenAI-compatible model API, including /v1
        #[arg(long, env = "SELAH_MODEL_BASE_URL", default_value = "http://localhost:11434/v1")]
        model_base_url: String,

        /// Model name to request
        #[arg(long, env = "SELAH_MODEL", default_value = "llama3.2")]
        model: String,

        /// API key for the model endpoint, if it requires one
        #[arg(long, env = "SELAH_MODEL_API_KEY")]
        model_api_key: Option<String>,
    },

    /// Seed the 52-week rotation (no-op if already seeded)
    Seed {
        /// First week's Sunday, YYYY-MM-DD (default: next Sunday)
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        Commands::Seed { .. } => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve {
            port,
            admin_token,
            model_base_url,
            model,
            model_api_key,
        } => serve(
            &cli.db,
            port,
            admin_token,
            &model_base_url,
            &model,
            model_api_key,
        ),
        Commands::Seed { start_date } => seed(&cli.db, start_date),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn serve(
    db_path: &PathBuf,
    port: u16,
    admin_token: Option<String>,
    model_base_url: &str,
    model: &str,
    model_api_key: Option<String>,
) -> anyhow::Result<()> {
    let db = Database::open(db_path)?;
    let generator = ModelClient::new(model_base_url, model, model_api_key);
    let state = AppState::new(
        db,
        Arc::new(PacificClock),
        Arc::new(generator),
        admin_token,
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(selah_server::serve(state, port))
}

fn seed(db_path: &PathBuf, start_date: Option<NaiveDate>) -> anyhow::Result<()> {
    let mut db = Database::open(db_path)?;
    let created = db.seed_rotation(&PacificClock, start_date)?;
    if created == 0 {
        println!("rotation already seeded; nothing to do");
    } else {
        println!("seeded {created} weekly themes");
    }
    Ok(())
}
