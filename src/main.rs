//! codesentinel: automated LLM review of the latest commit.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use codesentinel::config;
use codesentinel::constants;
use codesentinel::diff;
use codesentinel::env;
use codesentinel::orchestrator;
use codesentinel::output;
use codesentinel::providers;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cli::args::{ChangesArgs, Cli, Command, RepoArgs, ReviewArgs};
use config::Config;
use diff::{ChangeDetector, Git};
use env::Env;
use orchestrator::{PipelineOutcome, ReviewPipeline};
use providers::rig::RigProvider;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Review(args) => run_review(*args).await,
        Command::Changes(args) => run_changes(args).await,
        Command::Version => run_version(),
    }
}

/// Log to stderr. `RUST_LOG` wins over the verbosity flags.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={level}", constants::APP_NAME)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print version and build information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}

/// Resolve `--path` to the enclosing repository root, or the directory
/// itself when it is not inside a repository.
async fn resolve_repo_root(path: &Path) -> Result<PathBuf> {
    let base_dir = std::fs::canonicalize(path)
        .with_context(|| format!("--path directory not found: {}", path.display()))?;

    let git = Git::new(&base_dir, constants::DEFAULT_GIT_TIMEOUT);
    match diff::git::find_repo_root(&git).await {
        Ok(root) => Ok(root),
        Err(e) => {
            warn!("{e}");
            Ok(base_dir)
        }
    }
}

/// Load layered configuration and apply the shared git flags.
async fn load_config(repo: &RepoArgs) -> Result<(PathBuf, Config)> {
    let repo_root = resolve_repo_root(&repo.path).await?;
    let mut config = Config::load(Some(repo_root.as_path()), &Env::real())
        .context("failed to load configuration")?;
    repo.apply(&mut config);
    Ok((repo_root, config))
}

fn build_detector(repo_root: &Path, config: &Config) -> ChangeDetector {
    let git = Arc::new(Git::new(repo_root, config.git.timeout()));
    ChangeDetector::new(git, &config.git)
}

async fn run_review(args: ReviewArgs) -> Result<()> {
    use colored::Colorize;

    let (repo_root, mut config) = load_config(&args.repo).await?;
    args.apply(&mut config);
    config.validate().context("invalid configuration")?;

    let prompt_file = config.review.prompt_file_in(&repo_root);
    let system_prompt =
        config::prompt::load_system_prompt(prompt_file.as_deref(), config.review.format);
    let provider = RigProvider::new(config.provider.clone(), system_prompt, config.review.format)
        .context("failed to set up LLM provider")?;

    let notifiers = if args.no_notify {
        Vec::new()
    } else {
        output::build_notifiers(&config).context("failed to set up notifications")?
    };

    let pipeline = ReviewPipeline::new(
        build_detector(&repo_root, &config),
        Arc::new(provider),
        &repo_root,
        config.review.clone(),
        notifiers,
    );

    match pipeline.run().await.context("review run failed")? {
        PipelineOutcome::NoChanges => {
            eprintln!("  {}", "No changes to review.".dimmed());
        }
        PipelineOutcome::Reviewed(summary) => {
            if args.print {
                println!("{}", summary.review.to_markdown());
            }
            cli::print_summary(&summary);
        }
    }

    Ok(())
}

async fn run_changes(args: ChangesArgs) -> Result<()> {
    let (repo_root, config) = load_config(&args.repo).await?;
    let changes = build_detector(&repo_root, &config).detect().await;

    if args.json {
        let json =
            serde_json::to_string_pretty(&changes).context("failed to serialize change set")?;
        println!("{json}");
    } else if args.diff {
        println!("{}", changes.diff);
    } else if changes.files.is_empty() {
        eprintln!("No changes to review.");
    } else {
        for file in &changes.files {
            println!("{file}");
        }
    }

    Ok(())
}
