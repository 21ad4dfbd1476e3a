use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_kernel::settings::Settings;

#[derive(Parser)]
#[command(name = "folio", about = "FOLIO catalog service", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Recompute the derived lowercase fields over a dataset file in place.
    /// Idempotent; safe to re-run over an already-backfilled file.
    Backfill {
        /// Path to the dataset JSON file
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load FOLIO settings")?;
    folio_telemetry::init(&settings.telemetry)?;

    let cli = Cli::parse();
    match cli.command {
        Command::Serve => folio_app::run(settings).await,
        Command::Backfill { file } => {
            let (authors, books) = folio_app::dataset::backfill_file(&file)?;
            tracing::info!(
                file = %file.display(),
                authors_changed = authors,
                books_changed = books,
                "backfill complete"
            );
            Ok(())
        }
    }
}
