//! Courtside CLI - tennis court search and booking
//!
//! Usage:
//!   courtside book [options]    Search for a slot and reserve it
//!   courtside init              Write a default configuration file
//!   courtside venues            List the known venues
//!
//! Exit codes: 0 when a slot was booked or reserved, 1 when no booking was
//! made, 2 when the run could not start.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use courtside_booking::{
    BookingOrchestrator, ResolvedTarget, RunJournal, ScreenshotStore, TargetRequest,
    VenueWindowResolver,
};
use courtside_browser::{BrowserConfig, BrowserSession};
use courtside_core::config::DEFAULT_CONFIG_FILE;
use courtside_core::CourtsideConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

const CENTRAL_PARK_LINK: &str = "https://www.nycgovparks.org/tennisreservation/availability/12";

#[derive(Parser)]
#[command(name = "courtside")]
#[command(author, version, about = "Search and book municipal tennis courts")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the availability page and reserve the first open slot
    Book {
        /// Availability (or rebook) page to start from
        #[arg(short, long, default_value = CENTRAL_PARK_LINK)]
        link: String,

        /// Time row to book, matched as a substring of the row label
        #[arg(short, long, default_value = "12:00 p.m.")]
        time: String,

        /// Press the final confirmation (otherwise dry-run)
        #[arg(short, long)]
        book: bool,

        /// Venue id (required for rebook links)
        #[arg(short, long)]
        id: Option<u32>,

        /// Dates to try in order, YYYY-MM-DD (defaults to today + venue window)
        #[arg(short, long, num_args = 1..)]
        dates: Option<Vec<String>>,

        /// Configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Write a default configuration file
    Init {
        /// Where to write it
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List the venues courtside can book
    Venues,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install logger: {}", e);
    }

    let result = match cli.command {
        Commands::Book {
            link,
            time,
            book,
            id,
            dates,
            config,
        } => cmd_book(link, time, book, id, dates, &config).await,
        Commands::Init { config, force } => cmd_init(&config, force).map(|_| ExitCode::SUCCESS),
        Commands::Venues => {
            cmd_venues();
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn cmd_book(
    link: String,
    time: String,
    book: bool,
    id: Option<u32>,
    dates: Option<Vec<String>>,
    config_path: &Path,
) -> Result<ExitCode> {
    info!("==========Starting up==========");

    let config = CourtsideConfig::load_or_default(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let resolved = ResolvedTarget::resolve(
        TargetRequest {
            link,
            time_label: time,
            venue_id: id,
            dates,
        },
        &VenueWindowResolver::new(),
        Local::now().date_naive(),
    )?;
    info!("Venue: {}", resolved.venue);

    // Rebooking only presses "Make Reservation"
    let credentials = if resolved.rebook {
        None
    } else {
        Some(config.require_credentials()?)
    };

    let session = BrowserSession::launch_with_config(BrowserConfig::from(&config.browser))
        .await
        .context("Failed to launch browser")?;

    let output_dir = &config.output.screenshot_dir;
    let journal_dir = output_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(output_dir.as_path());

    let mut orchestrator = BookingOrchestrator::new(
        &session,
        resolved.venue,
        ScreenshotStore::new(output_dir),
        RunJournal::new(journal_dir.to_path_buf()),
    )
    .with_payment_frame(config.payment.frame())
    .with_delays(config.delays.clone());
    if let Some(credentials) = credentials {
        orchestrator = orchestrator.with_credentials(credentials);
    }

    orchestrator
        .load_results(&resolved.target.link, config.initial_load_attempts)
        .await
        .with_context(|| format!("Unable to load {}", resolved.target.link))?;

    let outcome = orchestrator
        .run(&resolved.target, resolved.rebook, book)
        .await;

    if let Err(e) = session.close().await {
        error!("Failed to close browser: {}", e);
    }

    if outcome.is_success() {
        println!("{}: {}", outcome.result, outcome.link);
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{}",
            outcome.error.as_deref().unwrap_or("no bookings made")
        );
        Ok(ExitCode::from(1))
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    CourtsideConfig::write_default(config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Wrote {}", config_path.display());
    println!("Fill in [credentials] before booking outside rebook mode.");
    Ok(())
}

fn cmd_venues() {
    let resolver = VenueWindowResolver::new();
    println!("{:<6} {:<16} {:<8} FORM", "ID", "NAME", "WINDOW");
    for venue in resolver.venues() {
        println!(
            "{:<6} {:<16} {:<8} {}",
            venue.id,
            venue.name,
            format!("{}d", venue.window_days),
            venue.form_variant
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_book_defaults() {
        let cli = Cli::parse_from(["courtside", "book"]);
        match cli.command {
            Commands::Book {
                link,
                time,
                book,
                id,
                dates,
                config,
            } => {
                assert_eq!(link, CENTRAL_PARK_LINK);
                assert_eq!(time, "12:00 p.m.");
                assert!(!book);
                assert_eq!(id, None);
                assert_eq!(dates, None);
                assert_eq!(config, PathBuf::from(DEFAULT_CONFIG_FILE));
            }
            _ => panic!("expected book"),
        }
    }

    #[test]
    fn test_book_with_dates_and_id() {
        let cli = Cli::parse_from([
            "courtside",
            "-v",
            "book",
            "-l",
            "https://www.nycgovparks.org/tennisreservation/rebookcp/7f3a",
            "-i",
            "11",
            "-b",
            "-d",
            "2024-05-01",
            "2024-05-02",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Book { book, id, dates, .. } => {
                assert!(book);
                assert_eq!(id, Some(11));
                assert_eq!(
                    dates,
                    Some(vec!["2024-05-01".to_string(), "2024-05-02".to_string()])
                );
            }
            _ => panic!("expected book"),
        }
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("courtside.toml");

        cmd_init(&path, false).unwrap();
        assert!(cmd_init(&path, false).is_err());
        cmd_init(&path, true).unwrap();

        let config = CourtsideConfig::load_or_default(&path).unwrap();
        assert!(config.credentials.is_some());
    }
}
