//! lexdrill - spaced-repetition vocabulary practice
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use lexdrill::cli::collection::{CollectionAction, CollectionCommand, CollectionOptions};
use lexdrill::cli::define::{DefineCommand, DefineInput, DefineOptions};
use lexdrill::cli::init::{InitCommand, InitOptions};
use lexdrill::cli::practice::{PracticeCommand, PracticeOptions};
use lexdrill::cli::progress::{ProgressAction, ProgressCommand, ProgressOptions};
use lexdrill::config::{default_config_path, lexdrill_home, Config};
use lexdrill::core::{ReviewPolicy, Scheduler, Session, Shuffle};
use lexdrill::error::{exit_codes, DrillError};
use lexdrill::lookup::{FileDefinitionCache, HintLookup};
use lexdrill::storage::SqliteStore;

// =============================================================================
// CLI Definition
// =============================================================================

/// lexdrill - spaced-repetition vocabulary practice
#[derive(Parser)]
#[command(name = "lexdrill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.lexdrill/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Output as JSON
    #[arg(long, short, global = true)]
    json: bool,
    /// Suppress output
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Practice the words of a collection
    Practice {
        /// Collection to practice
        #[arg(default_value = "default")]
        collection: String,
        /// Shuffle never-seen words
        #[arg(long)]
        shuffle: bool,
        /// Shuffle never-seen words with a fixed seed
        #[arg(long)]
        seed: Option<u64>,
        /// Words per batch (overrides config)
        #[arg(long, short)]
        batch_size: Option<usize>,
    },

    /// Manage word collections
    Collection {
        #[command(subcommand)]
        action: CollectionCmd,
    },

    /// Inspect or reset practice progress
    Progress {
        #[command(subcommand)]
        action: ProgressCmd,
    },

    /// Store, show or remove a word's definition
    Define {
        /// The word
        word: String,
        /// Sense as "part: meaning" (repeatable)
        #[arg(long, short)]
        sense: Vec<String>,
        /// Example sentence (repeatable)
        #[arg(long, short)]
        example: Vec<String>,
        /// Pronunciation as "region: phonetic" (repeatable)
        #[arg(long, short)]
        phonetic: Vec<String>,
        /// Remove the stored definition
        #[arg(long)]
        remove: bool,
    },

    /// Write a default config file and create data directories
    Init {
        /// Force overwrite an existing config file
        #[arg(long, short)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum CollectionCmd {
    /// Import a word list (one word per line)
    Import {
        /// Word-list file
        path: PathBuf,
        /// Collection name (defaults to the file name up to the first '.')
        #[arg(long, short)]
        name: Option<String>,
    },
    /// Add one word to a collection
    Add {
        /// Collection name
        collection: String,
        /// Word to add
        word: String,
    },
    /// List collections
    List,
    /// Show the words of a collection
    Show {
        /// Collection name
        collection: String,
    },
    /// Delete a collection
    Delete {
        /// Collection name
        collection: String,
    },
}

#[derive(Subcommand)]
enum ProgressCmd {
    /// List practiced words with their degree
    Degree {
        /// Only words of this collection
        #[arg(long, short)]
        collection: Option<String>,
    },
    /// Show mastered / due / resting counts
    Stats {
        /// Only words of this collection
        #[arg(long, short)]
        collection: Option<String>,
    },
    /// Reset all progress
    Clean {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    init_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("lexdrill error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Install the stderr log subscriber, filtered by `LEXDRILL_LOG`.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env("LEXDRILL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.lexdrill/crash.log and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("lexdrill panic: {}", info);

        if let Some(home) = lexdrill_home() {
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match (&cli.command, cli.config.as_deref()) {
        // init may be asked to create the file it is pointed at
        (Commands::Init { .. }, Some(path)) if !path.exists() => Config::load(None)?,
        (_, path) => Config::load(path)?,
    };
    let (json, quiet) = (cli.json, cli.quiet);

    match cli.command {
        Commands::Practice {
            collection,
            shuffle,
            seed,
            batch_size,
        } => run_practice(&config, &collection, shuffle, seed, batch_size, json, quiet),
        Commands::Collection { action } => run_collection(&config, action, json, quiet),
        Commands::Progress { action } => run_progress(&config, action, json, quiet),
        Commands::Define {
            word,
            sense,
            example,
            phonetic,
            remove,
        } => {
            let input = DefineInput {
                senses: sense,
                examples: example,
                phonetics: phonetic,
            };
            run_define(&config, &word, &input, remove, json, quiet)
        }
        Commands::Init { force } => run_init(&config, cli.config.as_deref(), force, json, quiet),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

/// Print formatted command output, if any.
fn print_output(formatted: &str) {
    if !formatted.is_empty() {
        print!("{}", formatted);
    }
}

fn open_store(config: &Config) -> Result<SqliteStore, DrillError> {
    let path = config
        .database_path()
        .ok_or_else(|| DrillError::config("cannot determine data directory"))?;
    SqliteStore::open(path)
}

fn open_cache(config: &Config) -> Result<FileDefinitionCache, DrillError> {
    let dir = config
        .definitions_dir()
        .ok_or_else(|| DrillError::config("cannot determine data directory"))?;
    FileDefinitionCache::with_dir(dir)
}

fn run_practice(
    config: &Config,
    collection: &str,
    shuffle: bool,
    seed: Option<u64>,
    batch_size: Option<usize>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    config.validate()?;
    let policy = ReviewPolicy::from_config(&config.review)?;
    let scheduler = Scheduler::new(policy, batch_size.unwrap_or(config.practice.batch_size))?;
    let shuffle = match seed {
        Some(seed) => Shuffle::Seeded(seed),
        None => Shuffle::from_flag(shuffle || config.practice.shuffle),
    };

    let store = open_store(config)?;
    let lookup = HintLookup::new(open_cache(config)?);

    let session = Session::start(&store, &store, &lookup, scheduler, collection, shuffle)?;
    let mut cmd = PracticeCommand::new(session);

    let stdin = std::io::stdin();
    let output = cmd.run(stdin.lock(), std::io::stdout())?;

    print_output(&cmd.format_output(&output, &PracticeOptions { json, quiet }));
    Ok(ExitCode::from(exit_codes::SUCCESS as u8))
}

fn run_collection(
    config: &Config,
    action: CollectionCmd,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let action = match action {
        CollectionCmd::Import { path, name } => CollectionAction::Import { path, name },
        CollectionCmd::Add { collection, word } => CollectionAction::Add {
            name: collection,
            word,
        },
        CollectionCmd::List => CollectionAction::List,
        CollectionCmd::Show { collection } => CollectionAction::Show { name: collection },
        CollectionCmd::Delete { collection } => CollectionAction::Delete { name: collection },
    };

    let cmd = CollectionCommand::new(open_store(config)?);
    let output = cmd.run(&action);
    print_output(&cmd.format_output(&output, &CollectionOptions { json, quiet }));

    Ok(success_to_exit_code(output.success))
}

fn run_progress(
    config: &Config,
    action: ProgressCmd,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (action, collection) = match action {
        ProgressCmd::Degree { collection } => (ProgressAction::Degree, collection),
        ProgressCmd::Stats { collection } => (ProgressAction::Stats, collection),
        ProgressCmd::Clean { yes } => {
            if !yes {
                eprintln!("Refusing to reset all progress without --yes");
                return Ok(ExitCode::from(exit_codes::ERROR as u8));
            }
            (ProgressAction::Clean, None)
        }
    };

    let policy = ReviewPolicy::from_config(&config.review)?;
    let cmd = ProgressCommand::new(open_store(config)?, policy);
    let options = ProgressOptions {
        json,
        quiet,
        collection,
    };

    let output = cmd.run(action, &options);
    print_output(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_define(
    config: &Config,
    word: &str,
    input: &DefineInput,
    remove: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = DefineCommand::new(open_cache(config)?);
    let options = DefineOptions { json, quiet, remove };

    let output = cmd.run(word, input, &options);
    print_output(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_init(
    config: &Config,
    config_path: Option<&Path>,
    force: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => default_config_path().ok_or("cannot determine lexdrill home directory")?,
    };

    let cmd = InitCommand::new(path, config.clone());
    let options = InitOptions { json, quiet, force };

    let output = cmd.run(&options);
    print_output(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}
