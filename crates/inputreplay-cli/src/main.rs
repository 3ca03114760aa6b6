//! Input-Replay CLI: inspect and dry-run replay scripts.
//!
//! Parses a script the same way an embedded engine would and either lists the
//! resulting steps or simulates a frame loop over them.

// CLI-specific lint allowances (CLI binary, not library)
#![allow(missing_docs)]
#![allow(clippy::print_stdout)] // CLI must print to stdout
#![allow(clippy::print_stderr)] // CLI must print to stderr
#![allow(clippy::exit)] // CLI uses exit codes

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use inputreplay::{load_config_file, EngineConfig, ReplayEngine, ScriptStatus};
use miette::{IntoDiagnostic, Result};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod report;

use report::{InspectReport, PlayReport, StatusReport};

/// Exit code when `--strict` is set and the script was not fully readable.
const EXIT_PARTIAL_SCRIPT: i32 = 2;

/// Color output mode
#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and `NO_COLOR` env
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Debug, Parser)]
#[command(name = "inputreplay", version, about = "Scripted input replay tooling")]
struct Cli {
    /// Control color output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    color: ColorMode,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins.
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a script and list the steps it produces
    Inspect {
        #[arg(long)]
        script: PathBuf,
        #[arg(long, help = "Engine config file (.json, .yaml or .yml)")]
        config: Option<PathBuf>,
        #[arg(long)]
        json: bool,
        #[arg(long, help = "Exit with code 2 unless the whole script was read")]
        strict: bool,
    },
    /// Simulate a frame loop and report every key event the script produces
    Play {
        #[arg(long)]
        script: PathBuf,
        #[arg(long, help = "Last frame number to simulate")]
        frames: u64,
        #[arg(long, help = "Engine config file (.json, .yaml or .yml)")]
        config: Option<PathBuf>,
        #[arg(long)]
        json: bool,
        #[arg(long, help = "Exit with code 2 unless the whole script was read")]
        strict: bool,
    },
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        #[arg(value_enum, help = "Shell to generate completions for")]
        shell: Shell,
    },
}

/// Configure color output based on CLI flag and environment
fn configure_colors(mode: ColorMode) -> bool {
    let use_color = match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable
            if std::env::var("NO_COLOR").is_ok() {
                false
            } else {
                supports_color::on(supports_color::Stream::Stderr).is_some()
            }
        }
    };

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .color(use_color)
                .unicode(use_color)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set
    use_color
}

fn init_tracing(verbose: u8, use_color: bool) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_ansi(use_color)
        .with_target(false)
        .try_init()
        .ok();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let use_color = configure_colors(cli.color);
    init_tracing(cli.verbose, use_color);
    match cli.command {
        Commands::Inspect {
            script,
            config,
            json,
            strict,
        } => cmd_inspect(&script, config.as_deref(), json, strict),
        Commands::Play {
            script,
            frames,
            config,
            json,
            strict,
        } => cmd_play(&script, frames, config.as_deref(), json, strict),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}

// =============================================================================
// Command Handlers
// =============================================================================

/// Handle the inspect command.
fn cmd_inspect(script: &Path, config: Option<&Path>, json: bool, strict: bool) -> Result<()> {
    let engine = load_engine(script, config)?;
    let report = InspectReport::from_engine(&engine);
    if json {
        let payload = serde_json::to_string(&report).into_diagnostic()?;
        println!("{payload}");
    } else {
        report.print();
    }
    exit_if_partial(&report.status, strict);
    Ok(())
}

/// Handle the play command.
fn cmd_play(
    script: &Path,
    frames: u64,
    config: Option<&Path>,
    json: bool,
    strict: bool,
) -> Result<()> {
    let mut engine = load_engine(script, config)?;
    let status = StatusReport::from_status(engine.script_status());

    let mut events = Vec::new();
    for frame in 0..=frames {
        let report = engine.advance(frame);
        events.extend(report.events.into_iter().map(|event| (frame, event)));
    }
    let report = PlayReport::new(&engine, status, frames, events);
    engine.shutdown();

    if json {
        let payload = serde_json::to_string(&report).into_diagnostic()?;
        println!("{payload}");
    } else {
        report.print();
    }
    exit_if_partial(&report.status, strict);
    Ok(())
}

/// Handle the completions command.
#[allow(clippy::unnecessary_wraps)] // Consistent with other command handlers
fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

fn load_engine(script: &Path, config: Option<&Path>) -> Result<ReplayEngine> {
    let config = match config {
        Some(path) => load_config_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = ReplayEngine::initialize(script, config);
    if let ScriptStatus::Unreadable(err) = engine.script_status() {
        eprintln!("warning: {err}; continuing with no steps");
    }
    Ok(engine)
}

fn exit_if_partial(status: &StatusReport, strict: bool) {
    if strict && !status.is_complete() {
        std::process::exit(EXIT_PARTIAL_SCRIPT);
    }
}
