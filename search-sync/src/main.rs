use clap::{Parser, Subcommand};
use std::env;
use std::error::Error;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use search_sync::{Dependencies, IndexingError, LogProgress};

#[derive(Parser)]
#[command(name = "search-sync")]
#[command(about = "Keeps search indexes in step with the primary record store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop and recreate the collections of every configured type
    Reset {
        /// Only reset this index
        #[arg(long)]
        index: Option<String>,
    },
    /// Backfill a type from a JSON-lines file
    Populate {
        #[arg(long)]
        index: String,

        #[arg(long = "type")]
        type_name: String,

        /// JSON-lines file, one record per line
        #[arg(long)]
        source: PathBuf,

        /// Records fetched, transformed and written per batch
        #[arg(long, default_value = "100")]
        batch_size: usize,

        /// Record field used as document id. Overrides the transformer
        /// configured for the type; defaults to "id" when none is.
        #[arg(long)]
        id_field: Option<String>,
    },
    /// List configured indexes and their types
    Indexes,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e);

        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("  Caused by: {}", err);
            source = err.source();
        }

        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(cli: Cli) -> Result<(), IndexingError> {
    let dependencies = Dependencies::new().await?;
    let index_manager = &dependencies.context.index_manager;

    match cli.command {
        Commands::Reset { index } => {
            let indexes = match index {
                Some(name) => vec![index_manager.get_index(&name)?],
                None => index_manager.indexes(),
            };

            for index in indexes {
                info!(index = %index.id(), "Resetting index");
                index.reset().await?;
            }
        }
        Commands::Populate {
            index,
            type_name,
            source,
            batch_size,
            id_field,
        } => {
            let populator = dependencies.context.json_lines_populator(
                &index,
                &type_name,
                source,
                id_field.as_deref(),
            )?;
            let mut progress = LogProgress::new(format!("{}/{}", index, type_name));

            let written = populator
                .populate_with_progress(batch_size, &mut progress)
                .await?;

            println!("Populated {} documents into {}/{}", written, index, type_name);
        }
        Commands::Indexes => {
            for index in index_manager.indexes() {
                println!("{}: {}", index.id(), index.type_names().join(", "));
            }
        }
    }

    Ok(())
}
