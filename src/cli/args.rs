//! Clap argument types and CLI-over-config overrides.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use codesentinel::config::Config;
use codesentinel::models::{NamingPolicy, ReviewFormat};

/// Automated LLM review of the latest commit.
#[derive(Parser, Debug)]
#[command(name = "codesentinel", version = codesentinel::constants::VERSION)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Review the latest changes and deliver the result.
    Review(Box<ReviewArgs>),

    /// Show which files would be reviewed, without calling the LLM.
    Changes(ChangesArgs),

    /// Print version and build information.
    Version,
}

/// Repository and git options shared by `review` and `changes`.
#[derive(clap::Args, Debug, Clone)]
pub struct RepoArgs {
    /// Path to the repository (default: current directory).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Base branch to compare against instead of the detected default.
    #[arg(long)]
    pub base: Option<String>,

    /// Remote holding the base branch.
    #[arg(long)]
    pub remote: Option<String>,

    /// Do not `git fetch` before detecting changes.
    #[arg(long, default_value_t = false)]
    pub no_fetch: bool,
}

impl RepoArgs {
    /// Apply git flags on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref base) = self.base {
            config.git.base_branch = Some(base.clone());
        }
        if let Some(ref remote) = self.remote {
            config.git.remote = remote.clone();
        }
        if self.no_fetch {
            config.git.fetch = false;
        }
    }
}

/// Arguments for the `review` subcommand.
#[derive(Parser, Debug)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Directory review files are written to.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// File holding the system prompt.
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Reply format requested from the LLM.
    #[arg(long)]
    pub format: Option<ReviewFormat>,

    /// How review file names are chosen.
    #[arg(long)]
    pub naming: Option<NamingPolicy>,

    /// Skip email and webhook notifications.
    #[arg(long, default_value_t = false)]
    pub no_notify: bool,

    /// Write the change set and file contents to the output directory
    /// before calling the LLM.
    #[arg(long, default_value_t = false)]
    pub debug_dump: bool,

    /// Also print the review to stdout.
    #[arg(long, default_value_t = false)]
    pub print: bool,
}

impl ReviewArgs {
    /// Apply review flags on top of the loaded configuration.
    ///
    /// Only the `[review]` section is touched; the flattened git flags are
    /// applied once, by [`RepoArgs::apply`], when the config is loaded.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref dir) = self.output_dir {
            config.review.output_dir = dir.clone();
        }
        if let Some(ref file) = self.prompt_file {
            config.review.prompt_file = Some(file.clone());
        }
        if let Some(format) = self.format {
            config.review.format = format;
        }
        if let Some(naming) = self.naming {
            config.review.naming = naming;
        }
        if self.debug_dump {
            config.review.debug_dump = true;
        }
    }
}

/// Arguments for the `changes` subcommand.
#[derive(Parser, Debug)]
pub struct ChangesArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Print the change set as JSON.
    #[arg(long, default_value_t = false, conflicts_with = "diff")]
    pub json: bool,

    /// Print the diff text instead of the file list.
    #[arg(long, default_value_t = false)]
    pub diff: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn review_flags_override_config() {
        let cli = parse(&[
            "codesentinel",
            "review",
            "--base",
            "develop",
            "--remote",
            "upstream",
            "--no-fetch",
            "--output-dir",
            "out",
            "--format",
            "raw",
            "--naming",
            "timestamp",
            "--debug-dump",
        ]);
        let Command::Review(args) = cli.command else {
            panic!("expected review command");
        };

        let mut config = Config::default();
        args.repo.apply(&mut config);
        args.apply(&mut config);

        assert_eq!(config.git.base_branch.as_deref(), Some("develop"));
        assert_eq!(config.git.remote, "upstream");
        assert!(!config.git.fetch);
        assert_eq!(config.review.output_dir, PathBuf::from("out"));
        assert_eq!(config.review.format, ReviewFormat::Raw);
        assert_eq!(config.review.naming, NamingPolicy::Timestamp);
        assert!(config.review.debug_dump);
    }

    #[test]
    fn review_apply_leaves_git_section_alone() {
        let cli = parse(&[
            "codesentinel",
            "review",
            "--base",
            "develop",
            "--remote",
            "upstream",
            "--no-fetch",
        ]);
        let Command::Review(args) = cli.command else {
            panic!("expected review command");
        };

        let mut config = Config::default();
        config.git.remote = "from-env".to_string();
        args.apply(&mut config);

        assert_eq!(config.git.base_branch, None);
        assert_eq!(config.git.remote, "from-env");
        assert!(config.git.fetch);
    }

    #[test]
    fn absent_flags_keep_config() {
        let cli = parse(&["codesentinel", "review"]);
        let Command::Review(args) = cli.command else {
            panic!("expected review command");
        };

        let mut config = Config::default();
        config.git.remote = "upstream".to_string();
        config.review.format = ReviewFormat::Raw;
        args.apply(&mut config);

        assert_eq!(config.git.remote, "upstream");
        assert!(config.git.fetch);
        assert_eq!(config.review.format, ReviewFormat::Raw);
        assert_eq!(args.repo.path, PathBuf::from("."));
    }

    #[test]
    fn verbosity_counts() {
        assert_eq!(parse(&["codesentinel", "-vv", "version"]).verbose, 2);
        assert!(parse(&["codesentinel", "version", "-q"]).quiet);
        assert!(Cli::try_parse_from(["codesentinel", "-v", "-q", "version"]).is_err());
    }

    #[test]
    fn changes_json_and_diff_conflict() {
        assert!(Cli::try_parse_from(["codesentinel", "changes", "--json", "--diff"]).is_err());
    }
}
