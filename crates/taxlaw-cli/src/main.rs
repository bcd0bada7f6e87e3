mod config;
mod display;
mod server;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use taxlaw_core::{DocumentRequest, TaxQuery};
use taxlaw_docs::DocumentClient;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "taxlaw", version, about = "Tax law question answering over legislation")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve,
    /// Answer a single question and print the result.
    Ask {
        question: String,
        /// Print the raw JSON payload instead of a card.
        #[arg(long)]
        json: bool,
    },
    /// Download a .docx and print its paragraph text.
    Extract { url: String },
    /// Embed JSON Lines passages into the local LanceDB index.
    #[cfg(feature = "lancedb")]
    Index {
        /// File with one `{"full_reference", "text"}` object per line.
        passages: PathBuf,
    },
}

/// Run the `.env` loader, then build the log filter so `RUST_LOG` may come from `.env`.
fn log_filter_after(
    load_env: impl FnOnce() -> dotenvy::Result<PathBuf>,
) -> (dotenvy::Result<PathBuf>, EnvFilter) {
    let loaded = load_env();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    (loaded, filter)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (dotenv, filter) = log_filter_after(dotenvy::dotenv);
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "loaded .env"),
        Err(_) => tracing::warn!(".env file not found"),
    }

    let cli = Cli::parse();
    tracing::info!("taxlaw v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve => {
            let orchestrator = cli
                .settings
                .build_orchestrator()
                .await
                .context("initialising answer pipeline")?;
            let documents = DocumentClient::new(cli.settings.timeout())?;
            server::run(
                server::AppState {
                    orchestrator,
                    documents,
                },
                cli.settings.port,
            )
            .await
        }
        Command::Ask { question, json } => {
            let orchestrator = cli
                .settings
                .build_orchestrator()
                .await
                .context("initialising answer pipeline")?;
            let result = orchestrator.answer(&TaxQuery::new(question)).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                display::print_answer_card(&result);
            }
            Ok(())
        }
        Command::Extract { url } => {
            let client = DocumentClient::new(cli.settings.timeout())?;
            let doc = client
                .process(&DocumentRequest {
                    url,
                    flow_variable: "text".to_string(),
                })
                .await?;
            println!("{}", doc.text);
            Ok(())
        }
        #[cfg(feature = "lancedb")]
        Command::Index { passages } => {
            let raw = std::fs::read_to_string(&passages)
                .with_context(|| format!("reading {}", passages.display()))?;
            let sources = taxlaw_store::read_passage_sources(&raw)?;
            let index = cli.settings.lance_index().await?;
            let count = index
                .index_sources(&sources)
                .await
                .context("indexing passages")?;
            println!("Indexed {count} passages into {}", taxlaw_store::PASSAGES_TABLE);
            Ok(())
        }
    }
}
