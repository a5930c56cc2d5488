use clap::{Args, Parser, Subcommand};
use importer::{ClubImporter, ImportContext, ImportOutcome, RosterImporter, RoundImporter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::dto::pairing::PairingRequest;
use storage::models::Actor;
use storage::services::pairing::{ClassGroups, DEFAULT_MAX_RATING_GAP, PairingOptions};
use storage::services::{load_rating_sheet, propose_pairings};
use storage::{ClubStore, Database, MemoryStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validator::Validate;

#[derive(Parser)]
#[command(name = "club-import")]
#[command(about = "Chess club roster, round and rating tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Run against an empty in-memory store instead of the database
    #[arg(long)]
    dry_run: bool,

    /// Name recorded as `modified_by` on every version written
    #[arg(long, default_value = "import")]
    actor: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import volunteers, lesson classes and players
    Roster {
        file: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
    /// Settle the games and results of one date
    Round {
        file: PathBuf,

        #[arg(long)]
        validate_only: bool,

        /// Propose pairings for the following round once settled
        #[arg(long)]
        pair_next: bool,

        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Settle every round file in a directory, in file name order
    BulkRounds {
        #[arg(long, default_value = "./rounds")]
        directory: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
    /// Propose pairings for the current roster
    Pair {
        #[arg(long)]
        date: Option<chrono::NaiveDate>,

        #[arg(long)]
        separate_classes: bool,

        #[command(flatten)]
        pairing: PairingArgs,
    },
    /// Write the rating sheet as JSON
    ExportRatings {
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct PairingArgs {
    /// Number the pairings onto boards of this letter
    #[arg(long)]
    board_letter: Option<String>,

    #[arg(long, env = "PAIRING_MAX_RATING_GAP", default_value_t = DEFAULT_MAX_RATING_GAP)]
    max_rating_gap: i32,

    #[arg(long, env = "PAIRING_CLASS_GROUPS", default_value = "")]
    class_groups: String,
}

impl PairingArgs {
    fn options(&self, separate_classes: bool) -> Result<PairingOptions, Box<dyn std::error::Error>> {
        Ok(PairingOptions {
            separate_classes,
            max_rating_gap: self.max_rating_gap,
            class_groups: self.class_groups.parse::<ClassGroups>()?,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("club_import={},importer={},storage={}", log_level, log_level, log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = open_store(cli.database_url.as_deref(), cli.dry_run).await?;
    let actor = Actor::new(cli.actor);

    match cli.command {
        Commands::Roster {
            file,
            validate_only,
        } => {
            let context = ImportContext {
                store,
                actor,
                validate_only,
            };
            import_file(&RosterImporter, &file, &context).await?;
        }
        Commands::Round {
            file,
            validate_only,
            pair_next,
            pairing,
        } => {
            let context = ImportContext {
                store,
                actor,
                validate_only,
            };
            let outcome = import_file(&RoundImporter, &file, &context).await?;

            if pair_next && let ImportOutcome::Round { mut next_round, .. } = outcome {
                next_round.board_letter = pairing.board_letter.clone();
                next_round.validate()?;
                let options = pairing.options(next_round.separate_classes)?;
                handle_pair(context.store.as_ref(), &next_round, &options).await?;
            }
        }
        Commands::BulkRounds {
            directory,
            validate_only,
        } => {
            let context = ImportContext {
                store,
                actor,
                validate_only,
            };
            handle_bulk_rounds(&directory, &context).await?;
        }
        Commands::Pair {
            date,
            separate_classes,
            pairing,
        } => {
            let options = pairing.options(separate_classes)?;
            let request = PairingRequest {
                date,
                separate_classes,
                board_letter: pairing.board_letter,
            };
            request.validate()?;
            handle_pair(store.as_ref(), &request, &options).await?;
        }
        Commands::ExportRatings { output } => {
            let sheet = load_rating_sheet(store.as_ref()).await?;
            let json = serde_json::to_string_pretty(&sheet)?;
            tokio::fs::write(&output, json).await?;
            tracing::info!("Wrote {} player(s) to {}", sheet.len(), output.display());
        }
    }

    Ok(())
}

async fn open_store(
    database_url: Option<&str>,
    dry_run: bool,
) -> Result<Arc<dyn ClubStore>, Box<dyn std::error::Error>> {
    if dry_run {
        tracing::info!("Dry run: using an empty in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let database_url = database_url.ok_or("DATABASE_URL is required unless --dry-run is set")?;

    tracing::info!("Connecting to database...");
    let db = Database::new(database_url).await?;
    db.run_migrations().await?;

    Ok(Arc::new(db.club_store()))
}

async fn import_file(
    importer: &dyn ClubImporter,
    file: &Path,
    context: &ImportContext,
) -> Result<ImportOutcome, Box<dyn std::error::Error>> {
    tracing::info!("Loading {}", file.display());

    let outcome = importer.import(file, context).await?;
    match &outcome {
        ImportOutcome::Validated => tracing::info!("✓ Validation successful!"),
        ImportOutcome::Roster(summary) => {
            for reason in &summary.skipped {
                tracing::warn!("  skipped {}", reason);
            }
            tracing::info!("✓ Roster import completed");
        }
        ImportOutcome::Round { report, .. } => {
            tracing::info!(
                "✓ Round {} settled: {} created, {} updated, {} closed, {} rating change(s)",
                report.date,
                report.created.len(),
                report.updated.len(),
                report.deactivated.len(),
                report.ratings.len()
            );
            for change in &report.ratings {
                tracing::info!(
                    "  {}: {} -> {}",
                    change.name,
                    change.previous_rating,
                    change.new_rating
                );
            }
            for board in &report.unrated_corrections {
                tracing::warn!("  board {} corrected without re-rating", board);
            }
        }
    }

    Ok(outcome)
}

async fn handle_bulk_rounds(
    directory: &Path,
    context: &ImportContext,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Scanning directory for round files: {}", directory.display());

    let mut json_files = Vec::new();
    let mut entries = tokio::fs::read_dir(directory).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            json_files.push(path);
        }
    }

    if json_files.is_empty() {
        tracing::warn!("No JSON files found in {}", directory.display());
        return Ok(());
    }

    json_files.sort();
    tracing::info!("Found {} round file(s)", json_files.len());

    let mut success_count = 0;
    let mut error_count = 0;

    for (idx, file_path) in json_files.iter().enumerate() {
        tracing::info!("[{}/{}] Processing: {}", idx + 1, json_files.len(), file_path.display());

        match import_file(&RoundImporter, file_path, context).await {
            Ok(_) => success_count += 1,
            Err(e) => {
                error_count += 1;
                tracing::error!("  ✗ Error: {}", e);
            }
        }
    }

    tracing::info!("Summary: {} succeeded, {} failed", success_count, error_count);

    if error_count > 0 {
        return Err(format!("{} file(s) failed to import", error_count).into());
    }

    Ok(())
}

async fn handle_pair(
    store: &dyn ClubStore,
    request: &PairingRequest,
    options: &PairingOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = propose_pairings(store, request, options).await?;

    for entry in &response.pairings {
        let board = entry.board.as_deref().unwrap_or("-");
        println!("{:>5}  {}  vs  {}", board, entry.white, entry.black);
    }
    for name in &response.unpaired {
        println!("unpaired  {}", name);
    }

    Ok(())
}
