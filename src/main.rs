//! Application entry point.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse `<target> <difficulty>` (usage errors exit with status 1).
//! 3. Load [`AppConfig`], apply environment overrides and validate it.
//! 4. Build the [`RunController`] and run it once.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use vocab_cards::{
    config::AppConfig,
    pipeline::RunController,
    text::{Difficulty, TargetInput},
};

#[derive(Debug, Parser)]
#[command(
    name = "vocab-cards",
    version,
    about = "Generate an example-sentence flashcard with audio and add it to Anki"
)]
struct Cli {
    /// Word, phrase or sentence to build the card around.
    target: String,

    /// Difficulty tier: a2, b1 or b2.
    difficulty: Difficulty,

    /// Settings file to use instead of the platform config directory.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Generate text and audio but leave the Anki collection untouched.
    #[arg(long)]
    dry_run: bool,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                bail!("settings file {} does not exist", path.display());
            }
            AppConfig::load_from(path)?
        }
        None => AppConfig::load()?,
    };
    config.apply_env();
    config.validate().context("configuration incomplete")?;
    Ok(config)
}

/// Parse `args` into a [`Cli`], or the exit status to stop with.
///
/// Usage errors (missing or unknown arguments, blank target) exit with 1;
/// `--help` and `--version` exit with 0.
fn parse_cli<I, T>(args: I) -> Result<Cli, u8>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return Err(if e.use_stderr() { 1 } else { 0 });
        }
    };

    if cli.target.trim().is_empty() {
        log::error!("target text must not be empty");
        return Err(1);
    }
    Ok(cli)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match parse_cli(std::env::args_os()) {
        Ok(cli) => cli,
        Err(code) => return ExitCode::from(code),
    };

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    if cli.dry_run {
        log::info!("dry run: nothing will be sent to Anki");
    }

    let mut controller = RunController::from_config(&config, cli.dry_run);
    match controller
        .run(TargetInput::new(&cli.target, cli.difficulty))
        .await
    {
        Ok(outcome) => {
            log::info!(
                "done: {} card, audio {}, {} note(s) added",
                outcome.kind.as_str(),
                if outcome.audio.is_some() { "saved" } else { "missing" },
                outcome.published.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
