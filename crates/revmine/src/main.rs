mod config;
mod inspect;

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use revmine_core::{ExtractConfig, ExtractionOutcome, Extractor};
use revmine_logging::{init_tracing, LogFormat, Logger};
use revmine_vcs::GitProvider;

#[derive(Parser, Debug)]
#[command(
    name = "revmine",
    about = "Mine commit history for before/after code blocks",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Diagnostic log filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract diff blocks from the commit history into chunk files
    Run(RunArgs),
    /// Show the output directory and the revision ranges already extracted
    Status(StatusArgs),
    /// Segment a saved diff file and print its blocks
    Segment(SegmentArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Repository directory (default: current directory)
    #[arg(short, long)]
    repo: Option<PathBuf>,

    /// Root directory for chunk output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum commits to scan
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// First revision to scan
    #[arg(long)]
    start: Option<u64>,

    /// Records per chunk file
    #[arg(short, long)]
    threshold: Option<usize>,

    /// Unchanged lines that end a block
    #[arg(short = 'k', long)]
    context_gap: Option<usize>,

    /// Only scan commits whose message contains this (repeatable)
    #[arg(short = 'w', long = "keyword")]
    keywords: Vec<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Also append JSON log lines to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Output final result as JSON
    #[arg(long)]
    json_output: bool,

    /// Dry run: show what would happen without executing
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct StatusArgs {
    /// Repository directory (default: current directory)
    #[arg(short, long)]
    repo: Option<PathBuf>,

    /// Root directory for chunk output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json_output: bool,
}

#[derive(Args, Debug)]
struct SegmentArgs {
    /// Unified diff file
    file: PathBuf,

    /// Unchanged lines that end a block
    #[arg(short = 'k', long)]
    context_gap: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let mut config = config::load_extract_config(&working_dir)?;

    match cli.command {
        Command::Run(args) => {
            let log_format: LogFormat = args.log_format.into();
            init_tracing(&cli.log_level, log_format);
            let repo = args.repo.clone().unwrap_or(working_dir);
            apply_run_args(&mut config, &args);
            run(args, repo, config)
        }
        Command::Status(args) => {
            init_tracing(&cli.log_level, LogFormat::Pretty);
            if let Some(output) = args.output {
                config.output_root = output;
            }
            let repo = args.repo.unwrap_or(working_dir);
            let status = inspect::cache_status(&repo, &config)?;
            if args.json_output {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                inspect::print_status(&status);
            }
            Ok(())
        }
        Command::Segment(args) => {
            init_tracing(&cli.log_level, LogFormat::Pretty);
            if let Some(gap) = args.context_gap {
                config.context_gap = gap;
            }
            let (blocks, stat) = inspect::segment_file(&args.file, &config)?;
            inspect::print_blocks(&blocks, &stat);
            Ok(())
        }
    }
}

/// CLI flags take precedence over `revmine.toml`
fn apply_run_args(config: &mut ExtractConfig, args: &RunArgs) {
    if let Some(ref output) = args.output {
        config.output_root = output.clone();
    }
    if let Some(limit) = args.limit {
        config.limit = Some(limit);
    }
    if let Some(start) = args.start {
        config.start = Some(start);
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(gap) = args.context_gap {
        config.context_gap = gap;
    }
    if !args.keywords.is_empty() {
        config.keywords = args.keywords.clone();
    }
}

fn run(args: RunArgs, repo: PathBuf, config: ExtractConfig) -> Result<()> {
    config.validate()?;

    let provider = GitProvider::open(&repo)
        .with_context(|| format!("Failed to open repository at {}", repo.display()))?
        .with_decoder(config.decoder()?);

    let log_format: LogFormat = args.log_format.into();
    let logger = match args.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };

    let extractor = Extractor::new(&provider, config, Arc::new(logger));

    if args.dry_run {
        let config = extractor.config();
        println!("=== Dry Run ===");
        println!("Repository: {}", repo.display());
        println!("Output dir: {}", extractor.output_dir()?.display());
        println!("Extensions: {}", config.extensions.join(" "));
        println!("Threshold: {} record(s) per chunk", config.threshold);
        println!("Context gap: {}", config.context_gap);
        match config.limit {
            Some(limit) => println!("Limit: {} commit(s)", limit),
            None => println!("Limit: unlimited"),
        }
        if !config.keywords.is_empty() {
            println!("Keywords: {}", config.keywords.join(", "));
        }
        return Ok(());
    }

    // Handle Ctrl+C gracefully
    let interrupt_handle = extractor.interrupt_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. Finishing current commit...");
        interrupt_handle.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let outcome = extractor.run()?;

    if args.json_output {
        let json = serde_json::to_string_pretty(&outcome)?;
        println!("{}", json);
    } else {
        print_outcome(&outcome);
    }

    std::process::exit(outcome.exit_code());
}

fn print_outcome(outcome: &ExtractionOutcome) {
    let counts = outcome.counts();
    eprintln!();
    match outcome {
        ExtractionOutcome::Completed { .. } => {
            eprintln!("=== COMPLETED ===");
        }
        ExtractionOutcome::LimitReached { .. } => {
            eprintln!("=== LIMIT REACHED ===");
            eprintln!("Scan limit hit; raise --limit or pass --start to go further");
        }
        ExtractionOutcome::Interrupted { last_revision, .. } => {
            eprintln!("=== INTERRUPTED ===");
            if let Some(rev) = last_revision {
                eprintln!("Stopped after r{}", rev);
            }
        }
        ExtractionOutcome::Failed { error, .. } => {
            eprintln!("=== FAILED ===");
            eprintln!("Error: {}", error);
        }
    }
    eprintln!(
        "Commits: {} ({} processed, {} cached)",
        counts.commits, counts.processed, counts.skipped
    );
    eprintln!("Records: {} in {} chunk(s)", counts.records, counts.chunks);
    eprintln!("Duration: {:.1}s", outcome.duration_secs());
}
