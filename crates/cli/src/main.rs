//! CLI tool for turning chat exports into handoff documents.
//!
//! Reads a JSON chat export, compacts it with the heuristic or the assisted
//! strategy, and writes a Markdown handoff that can seed a new session.

mod anthropic;
mod config;
mod output;

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, ValueEnum};

use chat_handoff_core::{
    compact_export, discover_exports, latest_export, AssistedStrategy, CompactionResult,
    CompactionStrategy, HeuristicStrategy, Mode,
};

use crate::anthropic::AnthropicSummarizer;
use crate::config::FileConfig;
use crate::output::{output_filename, write_handoff};

/// Strategy selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Assisted when an API key is configured, heuristic otherwise
    Auto,
    /// Summarize older turns with the Anthropic API
    Assisted,
    /// Local pattern-based extraction only
    Heuristic,
}

/// Generate a handoff document from a chat export.
#[derive(Parser, Debug)]
#[command(name = "chat-handoff")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON export to process
    input: Option<PathBuf>,

    /// Process the most recently modified export in --input-dir
    #[arg(long, conflicts_with = "input")]
    latest: bool,

    /// List exports found in --input-dir and exit
    #[arg(long)]
    list: bool,

    /// Directory searched by --latest and --list
    #[arg(long, default_value = "exports")]
    input_dir: PathBuf,

    /// Directory the handoff is written to
    #[arg(long, default_value = "handoffs")]
    output_dir: PathBuf,

    /// Compaction strategy
    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    mode: ModeArg,

    /// Configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Number of recent turns kept verbatim
    #[arg(long)]
    verbatim_count: Option<usize>,

    /// Model used for assisted summarization
    #[arg(long)]
    model: Option<String>,

    /// Ceiling on summary length, in tokens
    #[arg(long)]
    max_output_tokens: Option<u32>,

    /// Print the document to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Print run metrics as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable logging and the progress indicator
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

/// Resolve the requested mode against the availability of an API key.
fn select_mode(requested: ModeArg, has_key: bool) -> anyhow::Result<Mode> {
    match (requested, has_key) {
        (ModeArg::Heuristic, _) => Ok(Mode::Heuristic),
        (ModeArg::Assisted, true) | (ModeArg::Auto, true) => Ok(Mode::Assisted),
        (ModeArg::Assisted, false) => bail!(
            "assisted mode requires an API key (set anthropic_api_key in the config file or ANTHROPIC_API_KEY)"
        ),
        (ModeArg::Auto, false) => {
            log::warn!("no API key configured, using heuristic mode");
            Ok(Mode::Heuristic)
        }
    }
}

fn resolve_input(args: &Args) -> anyhow::Result<PathBuf> {
    if let Some(input) = &args.input {
        return Ok(input.clone());
    }
    if args.latest {
        return latest_export(&args.input_dir).with_context(|| {
            format!("no JSON exports found under {}", args.input_dir.display())
        });
    }
    bail!("no input given: pass an export path or --latest")
}

fn report(result: &CompactionResult, path: Option<&PathBuf>, as_json: bool) -> anyhow::Result<()> {
    let metrics = &result.metrics;
    if as_json {
        let report = serde_json::json!({
            "title": result.title,
            "metrics": metrics,
            "output_path": path.map(|p| p.to_string_lossy().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n[summary]");
    println!("  Mode:        {}", metrics.mode.as_str().to_uppercase());
    println!(
        "  Turns:       {} ({} summarized, {} verbatim)",
        metrics.total_turns, metrics.summarized_turns, metrics.verbatim_turns
    );
    println!("  Input:       {} KB (JSON)", metrics.input_bytes / 1024);
    println!("  Output:      {} KB (MD)", metrics.output_bytes / 1024);
    println!("  Compression: {:.0}%", metrics.compression_ratio * 100.0);
    if let Some(path) = path {
        println!("  Saved:       {}", path.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if args.list {
        let exports = discover_exports(&args.input_dir);
        if exports.is_empty() {
            println!("No JSON exports found under {}", args.input_dir.display());
        }
        for path in exports {
            let size_kb = std::fs::metadata(&path).map(|m| m.len() / 1024).unwrap_or(0);
            println!("  {} ({} KB)", path.display(), size_kb);
        }
        return Ok(());
    }

    let input = resolve_input(&args)?;
    let file_config = FileConfig::load(&args.config);

    let mut config = file_config.compaction_config();
    if let Some(count) = args.verbatim_count {
        config.verbatim_count = count;
    }
    if let Some(model) = &args.model {
        config.model_id = model.clone();
    }
    if let Some(max_tokens) = args.max_output_tokens {
        config.max_output_tokens = max_tokens;
    }

    let api_key = file_config.resolve_api_key(std::env::var("ANTHROPIC_API_KEY").ok());
    let mode = select_mode(args.mode, api_key.is_some())?;
    log::info!("processing {} in {} mode", input.display(), mode);

    let strategy: Box<dyn CompactionStrategy> = match (mode, api_key) {
        (Mode::Assisted, Some(key)) => Box::new(
            AssistedStrategy::new(config, AnthropicSummarizer::new(key)).with_progress(!args.quiet),
        ),
        _ => Box::new(HeuristicStrategy::new(config)),
    };
    let result = compact_export(&input, strategy.as_ref())
        .with_context(|| format!("failed to generate handoff from {}", input.display()))?;

    if args.stdout {
        print!("{}", result.document);
        if args.json {
            report(&result, None, true)?;
        }
        return Ok(());
    }

    let filename = output_filename(
        &result.title,
        result.metrics.mode,
        Local::now().date_naive(),
    );
    let path = write_handoff(&args.output_dir, &filename, &result.document)?;
    report(&result, Some(&path), args.json)
}
