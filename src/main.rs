//! Rating-Vault main entry point
//!
//! This is the command-line interface for backing up a user's ratings and
//! public lists to CSV files.

use clap::Parser;
use rating_vault::backup::{check_user_id, run_backup, BackupOptions, BackupOutcome};
use rating_vault::config::{create_default_config, load_config, Config, LOCAL_CONFIG_FILE};
use rating_vault::output::print_statistics;
use rating_vault::{Language, SortOrder, VaultError};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rating-Vault: back up your movie ratings and lists
///
/// Downloads every rated movie and every public list of a user, page by
/// page, and saves them as CSV files under `<data-dir>/<user-id>/`.
///
/// To find your user ID, open your ratings page and copy the `user_id`
/// parameter from its URL.
#[derive(Parser, Debug)]
#[command(name = "rating-vault")]
#[command(version = "1.0.0")]
#[command(about = "Back up movie ratings and lists to CSV", long_about = None)]
struct Cli {
    /// User ID to back up
    #[arg(
        value_name = "USER_ID",
        required_unless_present = "init_config",
        value_parser = parse_user_id
    )]
    user_id: Option<String>,

    /// Path to JSON configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Listing language
    #[arg(long, value_enum)]
    lang: Option<Language>,

    /// Directory to save CSV files
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Skip user lists, only back up watched movies
    #[arg(long)]
    skip_lists: bool,

    /// Resume an interrupted backup, skipping datasets already saved
    #[arg(long)]
    resume: bool,

    /// Stop every listing after this page
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Sort order for list pages (position, title, year, rating, average_rating)
    #[arg(long, value_name = "ORDER", value_parser = parse_sort_order)]
    order_by: Option<SortOrder>,

    /// Also write a Letterboxd import file
    #[arg(long)]
    letterboxd: bool,

    /// Do not look up original titles (Spanish listings)
    #[arg(long)]
    no_original_titles: bool,

    /// Answer yes to confirmation prompts
    #[arg(short, long)]
    yes: bool,

    /// Write a default configuration file and exit
    #[arg(long)]
    init_config: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_user_id(value: &str) -> Result<String, String> {
    check_user_id(value)
        .map(|()| value.to_string())
        .map_err(|e| e.to_string())
}

fn parse_sort_order(value: &str) -> Result<SortOrder, String> {
    SortOrder::from_name(value).ok_or_else(|| {
        format!(
            "unknown sort order '{}' (expected position, title, year, rating or average_rating)",
            value
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if cli.init_config {
        return handle_init_config(&cli);
    }

    let loaded = load_config(cli.config.as_deref());
    match (&loaded.source, &loaded.hash) {
        (Some(path), Some(hash)) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            hash
        ),
        _ => tracing::debug!("Using default configuration"),
    }
    let config = apply_overrides(loaded.config, &cli);

    let Some(user_id) = cli.user_id.clone() else {
        return Err("USER_ID is required".into());
    };

    if config.lang == Language::Es {
        tracing::warn!(
            "Using the Spanish version of the site. Consider --lang en for better title matching."
        );
    }

    let options = BackupOptions {
        user_id,
        data_dir: PathBuf::from(&config.data_dir),
        skip_lists: cli.skip_lists,
        resume: cli.resume,
        order: config.order_by,
        letterboxd: config.letterboxd_export,
    };

    let assume_yes = cli.yes;
    match run_backup(&config, options, |prompt| assume_yes || ask(prompt)).await {
        Ok(BackupOutcome::Completed(stats)) => {
            if !cli.quiet {
                print_statistics(&stats);
            }
            Ok(())
        }
        Ok(BackupOutcome::Aborted) => {
            tracing::info!("Backup cancelled");
            Ok(())
        }
        Err(e) => {
            report_failure(&e);
            std::process::exit(1);
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rating_vault=info,warn"),
            1 => EnvFilter::new("rating_vault=debug,info"),
            2 => EnvFilter::new("rating_vault=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line flags take precedence over the configuration file
fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(lang) = cli.lang {
        config.lang = lang;
    }
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.display().to_string();
    }
    if let Some(max_pages) = cli.max_pages {
        config.max_pages = Some(max_pages);
    }
    if let Some(order) = cli.order_by {
        config.order_by = order;
    }
    if cli.letterboxd {
        config.letterboxd_export = true;
    }
    if cli.no_original_titles {
        config.fetch_original_titles = false;
    }
    config
}

/// Handles --init-config: writes the defaults and exits
fn handle_init_config(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));
    create_default_config(&path)?;
    println!("✓ Default configuration written to {}", path.display());
    Ok(())
}

/// Asks a yes/no question on the terminal
fn ask(prompt: &str) -> bool {
    print!("   {} [y/n] ", prompt);
    if std::io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

/// Prints a failure and its guidance to stderr
fn report_failure(error: &VaultError) {
    tracing::error!("Backup failed: {}", error);
    eprintln!("\nError: {}", error);
    if let Some(guidance) = error.guidance() {
        eprintln!("  {}", guidance);
    }
}
