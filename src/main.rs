//! # Corpus CLI (`corpus`)
//!
//! The `corpus` binary builds a normalized markdown corpus from the
//! documentation of the repositories listed in a TOML catalog.
//!
//! ## Usage
//!
//! ```bash
//! corpus --config ./corpus.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `corpus build` | Fetch every repository/version and rewrite its manifest |
//! | `corpus repos` | List catalog entries and their checkout status |
//! | `corpus convert <src> <dst>` | Convert and clean a single file |
//! | `corpus sections <file>` | Print the header sections of a markdown file |

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use doc_corpus::config;
use doc_corpus::convert::FormatConverter;
use doc_corpus::progress::ProgressMode;
use doc_corpus::{ingest, inspect, repos};

/// Builds a normalized markdown corpus from repository documentation.
#[derive(Parser)]
#[command(name = "corpus", version, about)]
struct Cli {
    /// Path to the catalog file (TOML).
    #[arg(long, global = true, default_value = "./corpus.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, convert and clean every configured repository/version.
    ///
    /// Each pass truncates and rewrites
    /// `{output_root}/{category}/{tech}/{version}/manifest.jsonl`.
    Build {
        /// Only process this repository id.
        #[arg(long)]
        repo: Option<String>,

        /// Progress on stderr: `human`, `json`, or `off`.
        /// Defaults to `human` when stderr is a terminal.
        #[arg(long)]
        progress: Option<String>,
    },

    /// List catalog entries.
    Repos,

    /// Convert and clean a single documentation file.
    Convert {
        src: PathBuf,
        dst: PathBuf,
    },

    /// Print the header sections of a markdown file as JSON lines.
    ///
    /// Does not require a catalog when `--max-level` is given.
    Sections {
        path: PathBuf,

        #[arg(long)]
        max_level: Option<usize>,
    },
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match cli.verbose {
        0 => "doc_corpus=info",
        1 => "doc_corpus=debug",
        _ => "doc_corpus=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    // Commands that don't require config
    if let Commands::Sections {
        path,
        max_level: Some(level),
    } = &cli.command
    {
        return inspect::run_sections(path, *level);
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Build { repo, progress } => {
            let mode = match progress.as_deref() {
                Some(s) => ProgressMode::parse(s).ok_or_else(|| {
                    anyhow::anyhow!("Unknown progress mode: '{}'. Use human, json, or off.", s)
                })?,
                None => ProgressMode::default_for_tty(),
            };
            let reporter = mode.reporter();
            let converter = FormatConverter::from_config(&cfg);
            let summary =
                ingest::run_build(&cfg, &converter, repo.as_deref(), reporter.as_ref()).await?;
            summary.print(&cfg.output_root);
        }
        Commands::Repos => {
            repos::list_repos(&cfg)?;
        }
        Commands::Convert { src, dst } => {
            let converter = FormatConverter::from_config(&cfg);
            inspect::run_convert(&converter, &src, &dst).await?;
        }
        Commands::Sections { path, max_level } => {
            let level = max_level.unwrap_or(cfg.defaults.max_header_level);
            inspect::run_sections(&path, level)?;
        }
    }

    Ok(())
}
