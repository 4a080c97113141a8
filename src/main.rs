use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use showtimings::db::models::Coverage;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "showtimings",
    version,
    about = "Live-show song timings — canonicalize scraped tracklists, aggregate per-show durations"
)]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum CoverageArg {
    Complete,
    Unedited,
    Edited,
    Unknown,
}

impl From<CoverageArg> for Coverage {
    fn from(arg: CoverageArg) -> Self {
        match arg {
            CoverageArg::Complete => Coverage::Complete,
            CoverageArg::Unedited => Coverage::Unedited,
            CoverageArg::Edited => Coverage::Edited,
            CoverageArg::Unknown => Coverage::Unknown,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load scraped recording exports (JSON) into the database
    Ingest {
        /// Directory to walk for .json export files
        dir: PathBuf,
    },

    /// Run the full pipeline: resolve titles, aggregate, analyze
    Run {
        /// Number of parallel workers (0 = auto-detect from config)
        #[arg(short = 'j', long, default_value = "0")]
        jobs: usize,
    },

    /// Show database counts and pipeline state
    Status,

    /// Export performance facts as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Set a recording's coverage tag (overrides the scraped default)
    Coverage {
        /// Source-specific recording id
        source_id: String,

        /// New coverage tag
        #[arg(value_enum)]
        coverage: CoverageArg,
    },

    /// Review queue of ambiguous title resolutions
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },
}

#[derive(Subcommand)]
enum ReviewAction {
    /// List pending entries
    List,

    /// Confirm an entry: bind its cleaned title to a song as a manual alias
    Confirm {
        /// Review entry id
        id: i64,

        /// Canonical song name the title belongs to
        #[arg(long)]
        song: String,
    },

    /// Show distinct raw titles that resolved to nothing
    Unmatched,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = showtimings::config::AppConfig::load();

    // Resolve database path: CLI > config > XDG default
    let db_path = cli
        .db_path
        .or(config.db_path.clone())
        .unwrap_or_else(showtimings::config::default_db_path);
    log::info!("Database: {}", db_path.display());

    let db = showtimings::db::Database::open(&db_path).context("Failed to open database")?;

    match cli.command {
        Commands::Ingest { dir } => {
            let report = showtimings::ingest::ingest_dir(&db, &dir, &config.coverage)
                .context("Ingest failed")?;
            println!(
                "Ingest complete: {} recordings ({} duplicate), {} tracks from {} files ({} skipped)",
                report.recordings,
                report.duplicates,
                report.tracks,
                report.files,
                report.files_skipped
            );
        }

        Commands::Run { jobs } => {
            let workers = if jobs > 0 { jobs } else { config.resolve_workers() };
            rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build_global()
                .ok();

            // Derived state is rebuilt from scratch each run; only songs,
            // persisted aliases, and raw scrape data survive.
            db.reset_derived().context("Failed to reset derived state")?;

            let (pass, stats) =
                showtimings::resolve::resolve_tracks(&db, &config.thresholds)
                    .context("Title resolution failed")?;
            println!(
                "Resolved {} of {} tracks ({} non-songs, {} dropped)",
                pass.resolved, pass.tracks, pass.non_songs, pass.dropped
            );
            println!(
                "  {} alias, {} exact, {} fuzzy, {} flagged for review, {} new songs",
                stats.alias_hits, stats.exact_hits, stats.fuzzy_auto, stats.fuzzy_flagged,
                stats.new_songs
            );

            let pruned = showtimings::resolve::prune_rare_songs(
                &db,
                config.thresholds.rare_song_min_tracks,
            )
            .context("Rare-song pruning failed")?;
            if pruned > 0 {
                println!("Pruned {pruned} rare songs");
            }

            let agg = showtimings::aggregate::build_facts(&db).context("Aggregation failed")?;
            println!(
                "{} shows, {} facts ({} eligible), {} sandwiches detected",
                agg.shows, agg.facts, agg.facts_eligible, agg.sandwiches
            );

            let ana = showtimings::analyze::analyze(&db, &config.thresholds)
                .context("Analysis failed")?;
            println!(
                "Stats for {} songs, {} outlier facts flagged",
                ana.songs, ana.outliers
            );
        }

        Commands::Status => {
            let stats = db.db_stats().context("Failed to read database stats")?;
            println!("Songs:              {}", stats.songs);
            println!("Aliases:            {}", stats.aliases);
            println!("Recordings:         {}", stats.recordings);
            println!("Tracks:             {}", stats.tracks);
            println!("  with duration:    {}", stats.tracks_with_duration);
            println!("  unmatched:        {}", stats.unmatched_tracks);
            println!("Performance facts:  {}", stats.facts);
            println!("Review pending:     {}", stats.review_pending);
            if !stats.by_source.is_empty() {
                println!("By source:");
                for (source, count) in &stats.by_source {
                    println!("  {source}: {count}");
                }
            }
            if !stats.by_coverage.is_empty() {
                println!("By coverage:");
                for (coverage, count) in &stats.by_coverage {
                    println!("  {coverage}: {count}");
                }
            }
        }

        Commands::Export { out } => {
            let written = showtimings::export::export_json(&db, out.as_deref())
                .context("Export failed")?;
            if let Some(path) = out {
                println!("Wrote {written} facts to {}", path.display());
            }
        }

        Commands::Coverage { source_id, coverage } => {
            let found = db
                .set_coverage(&source_id, coverage.into())
                .context("Failed to update coverage")?;
            if found {
                println!("Updated coverage for {source_id} (takes effect on next run)");
            } else {
                anyhow::bail!("No recording with source id {source_id:?}");
            }
        }

        Commands::Review { action } => match action {
            ReviewAction::List => {
                let entries = db.review_entries().context("Failed to read review queue")?;
                if entries.is_empty() {
                    println!("Review queue is empty");
                }
                for e in entries {
                    let sim = e
                        .similarity
                        .map(|s| format!(" (similarity {s:.3})"))
                        .unwrap_or_default();
                    println!(
                        "#{} [{}] {:?} -> {:?}{sim}",
                        e.id, e.reason, e.raw_title, e.cleaned
                    );
                }
            }
            ReviewAction::Confirm { id, song } => {
                let song_id = db
                    .get_or_create_song(&song, "song")
                    .context("Failed to look up song")?;
                if db.confirm_review(id, song_id)? {
                    println!("Confirmed #{id} -> {song} (takes effect on next run)");
                } else {
                    anyhow::bail!("No review entry #{id}");
                }
            }
            ReviewAction::Unmatched => {
                for title in db.unmatched_titles().context("Failed to read tracks")? {
                    println!("{title}");
                }
            }
        },
    }

    Ok(())
}
