use anyhow::{bail, Context, Result};
use catalog::{PlaylistTarget, Settings, VideoCandidate};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use curator::{Curator, CuratorError, RunSummary, EXIT_FATAL, EXIT_OK};
use discovery::{distinct_channels, QuerySpec};
use pipeline::FilterPipeline;
use platform_client::{Credentials, YouTubeClient};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

/// Workspace crates raised to debug by `--verbose`.
const VERBOSE_FILTER: &str =
    "info,catalog=debug,platform_client=debug,discovery=debug,pipeline=debug,curator=debug";

/// reaction-curator - keeps playlists of reaction videos up to date
#[derive(Parser)]
#[command(name = "reaction-curator")]
#[command(about = "Searches for reaction videos and reconciles them into playlists", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "reaction-curator.toml")]
    config: PathBuf,

    /// Debug logging for the curator crates
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover, filter and reconcile every configured playlist
    Run {
        /// Only process these playlist ids (repeatable)
        #[arg(long = "playlist")]
        playlists: Vec<String>,

        /// Compute and print plans without changing any playlist
        #[arg(long)]
        dry_run: bool,

        /// Write the run summary as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Discover and filter only; print the accepted videos
    Discover {
        /// Extra search terms appended to the configured keywords (repeatable)
        #[arg(short = 'a', long = "additional-query")]
        additional_query: Vec<String>,

        /// Maximum number of candidates to fetch
        #[arg(short = 'm', long)]
        max_results: Option<usize>,

        /// List distinct channels instead of videos
        #[arg(long)]
        channels: bool,
    },

    /// Load and validate the configuration, then print what a run would do
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            let code = err
                .downcast_ref::<CuratorError>()
                .map_or(EXIT_FATAL, CuratorError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new(VERBOSE_FILTER)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> Result<u8> {
    let settings = load_settings(&cli.config)?;

    match cli.command {
        Commands::Run {
            playlists,
            dry_run,
            report,
        } => handle_run(&settings, &playlists, dry_run, report.as_deref()).await,
        Commands::Discover {
            additional_query,
            max_results,
            channels,
        } => handle_discover(&settings, &additional_query, max_results, channels).await,
        Commands::CheckConfig => handle_check_config(&settings, &cli.config),
    }
}

fn load_settings(path: &Path) -> Result<Settings> {
    Settings::load(path).with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn build_curator(settings: &Settings, dry_run: bool) -> Result<Curator> {
    let credentials = Credentials::from_env().context("Missing platform credentials")?;
    let client = YouTubeClient::new(&settings.platform, credentials)
        .context("Failed to create platform client")?;
    Ok(Curator::new(Arc::new(client), settings).with_dry_run(dry_run))
}

/// Configured targets, optionally narrowed to `only`.
fn select_targets(settings: &Settings, only: &[String]) -> Result<Vec<PlaylistTarget>> {
    let targets = settings.require_targets().map_err(CuratorError::from)?;
    if only.is_empty() {
        return Ok(targets);
    }

    for id in only {
        if !targets.iter().any(|t| &t.playlist_id == id) {
            bail!("Playlist {id} is not a configured target");
        }
    }
    Ok(targets
        .into_iter()
        .filter(|t| only.contains(&t.playlist_id))
        .collect())
}

/// Handle the 'run' command
async fn handle_run(
    settings: &Settings,
    playlists: &[String],
    dry_run: bool,
    report: Option<&Path>,
) -> Result<u8> {
    let targets = select_targets(settings, playlists)?;
    let curator = build_curator(settings, dry_run)?;

    let start = Instant::now();
    let summary = curator.run(&targets).await;

    print_summary(&summary);
    println!("{} Finished in {:.1?}", "✓".green(), start.elapsed());

    if let Some(path) = report {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialize run report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    match summary.check() {
        Err(halted @ CuratorError::Halted { .. }) => {
            eprintln!("{} {}", "error:".red().bold(), halted);
        }
        Err(partial) => eprintln!("{} {}", "warning:".yellow().bold(), partial),
        Ok(()) => {}
    }
    Ok(summary.exit_code())
}

/// Handle the 'discover' command
async fn handle_discover(
    settings: &Settings,
    additional_query: &[String],
    max_results: Option<usize>,
    channels: bool,
) -> Result<u8> {
    let curator = build_curator(settings, true)?;
    let curation = curator
        .curate(additional_query, max_results, Utc::now())
        .await?;
    let outcome = &curation.outcome;

    println!(
        "{}",
        format!(
            "Discovered {} candidates over {} pages, accepted {}",
            curation.batch.candidates.len(),
            curation.batch.pages_fetched,
            outcome.accepted_set.len()
        )
        .bold()
        .blue()
    );
    for (reason, count) in &outcome.rejection_counts {
        println!("  {} {}: {}", "✗".red(), reason, count);
    }
    if let Some(cursor) = &curation.batch.checkpoint {
        println!("  next page cursor: {cursor}");
    }
    println!();

    if channels {
        for channel in distinct_channels(&outcome.accepted) {
            println!(
                "{}  {} ({} videos)",
                channel.channel_id.cyan(),
                channel.channel_name,
                channel.video_count
            );
        }
    } else {
        let by_id: HashMap<&str, &VideoCandidate> = outcome
            .accepted
            .iter()
            .map(|c| (c.id.as_str(), c))
            .collect();
        let ranked = outcome.accepted_set.iter().filter_map(|id| by_id.get(id.as_str()));
        for (rank, video) in ranked.enumerate() {
            print_video(rank + 1, video);
        }
    }
    Ok(EXIT_OK)
}

/// Handle the 'check-config' command
fn handle_check_config(settings: &Settings, path: &Path) -> Result<u8> {
    let targets = settings.require_targets().map_err(CuratorError::from)?;
    let spec = QuerySpec::from_settings(&settings.query, &[], Utc::now());
    let pipeline = FilterPipeline::from_rules(&settings.filter);

    println!("{} {} is valid", "✓".green(), path.display());
    println!("{}", "Query:".bold().blue());
    println!("  q = {:?}", spec.query().query_string());
    println!("  order = {}", spec.query().order.as_api_param());
    if let Some(after) = spec.query().published_after {
        println!("  published after {}", catalog::format_timestamp(&after));
    }
    println!("  up to {} results", spec.max_results());

    println!("{}", "Filters:".bold().blue());
    for name in pipeline.filter_names() {
        println!("  {} {}", "•".green(), name);
    }

    println!("{}", "Targets:".bold().blue());
    for target in &targets {
        if target.additional_query.is_empty() {
            println!("  {} {}", "•".green(), target.playlist_id);
        } else {
            println!(
                "  {} {} (+ {})",
                "•".green(),
                target.playlist_id,
                target.additional_query.join(" ")
            );
        }
    }
    Ok(EXIT_OK)
}

fn print_summary(summary: &RunSummary) {
    let header = if summary.dry_run {
        "Curation plan (dry run):"
    } else {
        "Curation summary:"
    };
    println!("{}", header.bold().blue());

    for target in &summary.targets {
        println!(
            "{} {}: discovered {}, accepted {}",
            "•".green(),
            target.playlist_id.bold(),
            target.discovered,
            target.accepted
        );
        if summary.dry_run {
            for id in &target.plan.removals {
                println!("    {} {}", "-".red(), id);
            }
            for id in &target.plan.duplicates {
                println!("    {} {} (duplicate)", "~".yellow(), id);
            }
            for id in &target.plan.additions {
                println!("    {} {}", "+".green(), id);
            }
        } else {
            println!(
                "    added {}, removed {}, collapsed {}, failed {}",
                target.added.to_string().green(),
                target.removed.to_string().yellow(),
                target.collapsed,
                target.failures.len().to_string().red()
            );
            for failure in &target.failures {
                println!(
                    "    {} {:?} {}: {}",
                    "✗".red(),
                    failure.action,
                    failure.video_id,
                    failure.error
                );
            }
        }
        if let Some(halt) = &target.halted {
            println!("    {} {}", "halted:".red().bold(), halt.error);
        }
    }
    for playlist_id in &summary.skipped_targets {
        println!("{} {}: not started", "•".yellow(), playlist_id.bold());
    }

    println!(
        "Total: discovered {}, accepted {}, added {}, removed {}, failed {}",
        summary.discovered(),
        summary.accepted(),
        summary.added(),
        summary.removed(),
        summary.failed()
    );
}

fn print_video(rank: usize, video: &VideoCandidate) {
    println!(
        "{}. {} [{}] {} - {} ({})",
        rank.to_string().green(),
        video.title,
        format_duration(video.duration_seconds),
        video.published_at.format("%Y-%m-%d"),
        video.channel_name,
        video.id.cyan()
    );
}

fn format_duration(seconds: u64) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
