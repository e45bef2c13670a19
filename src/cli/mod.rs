//! Command-line surface: argument definitions and their resolution against
//! the configuration file.

pub mod orchestration;

pub use orchestration::{calculate_changes, run, run_changelog, run_semver, stop_condition};

use crate::changes::TypeTag;
use crate::config::ChangelogConfig;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "changetool",
    about = "Derive changelogs and the next semantic version from conventional commits"
)]
pub struct Cli {
    #[arg(short, long, global = true, default_value = ".", help = "Path of the git worktree to examine")]
    pub path: PathBuf,

    #[arg(short, long, global = true, default_value = "-", help = "File to which to send output")]
    pub output: String,

    #[arg(short, long, global = true, help = "Custom configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Show debugging information")]
    pub debug: bool,

    #[arg(short, long, global = true, conflicts_with = "debug", help = "Be less verbose than usual")]
    pub quiet: bool,

    #[arg(short, long, global = true, value_enum, default_value_t = LogFormat::Auto, help = "How to show program output")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Log line format on stderr
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Terminal when stderr is a terminal, otherwise jsonl
    Auto,
    /// One JSON object per line
    Jsonl,
    /// Human-readable lines
    Terminal,
}

impl LogFormat {
    /// Resolve `Auto` against whether stderr is a terminal
    pub fn is_json(self, stderr_is_terminal: bool) -> bool {
        match self {
            LogFormat::Auto => !stderr_is_terminal,
            LogFormat::Jsonl => true,
            LogFormat::Terminal => false,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calculate a changelog
    Changelog(ChangelogArgs),

    /// Calculate the next semantic version
    Semver(SemverArgs),

    /// Show program version
    Version,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Changelog(_) => "changelog",
            Commands::Semver(_) => "semver",
            Commands::Version => "version",
        }
    }
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ChangelogArgs {
    #[arg(short = 'n', long, value_name = "N", help = "Maximum number of commits to check")]
    pub max_commits: Option<usize>,

    #[arg(short = 's', long, visible_alias = "since", value_name = "TAG", help = "Tag from which to start")]
    pub since_tag: Option<String>,

    #[arg(long, value_name = "REGEX", help = "Start from the newest commit with a tag matching this pattern")]
    pub since_pattern: Option<String>,

    #[arg(long, help = "Start from the most recent version tag")]
    pub from_tag: bool,

    #[arg(long, value_name = "TYPE", help = "Type assumed for commits without a conventional header")]
    pub default_type: Option<String>,

    #[arg(long, overrides_with = "no_guess", help = "Guess missing commit types from the files touched")]
    pub guess: bool,

    #[arg(long, overrides_with = "guess", help = "Never guess missing commit types")]
    pub no_guess: bool,

    #[arg(long, value_delimiter = ',', value_name = "TYPES", help = "Order in which to list commit types")]
    pub order: Option<Vec<String>>,
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct SemverArgs {
    #[command(flatten)]
    pub changes: ChangelogArgs,

    #[arg(long, value_name = "FILE", conflicts_with = "from_tag", help = "Read the previous version from the first version found in this file")]
    pub from_file: Option<PathBuf>,

    #[arg(long, value_name = "FILE", num_args = 1.., help = "Replace the version in these files")]
    pub replace_in: Vec<PathBuf>,

    #[arg(long, help = "Allow untracked files to count as clean")]
    pub allow_untracked: bool,
}

/// Walk parameters after merging flags over the configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct WalkSettings {
    pub max_commits: usize,
    pub default_type: TypeTag,
    pub guess: bool,
    pub order: Vec<TypeTag>,
}

impl ChangelogArgs {
    pub fn resolve(&self, config: &ChangelogConfig) -> WalkSettings {
        let guess = if self.no_guess {
            false
        } else if self.guess {
            true
        } else {
            config.guess
        };

        let order = match &self.order {
            Some(order) => order
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(TypeTag::new)
                .collect(),
            None => config.order_tags(),
        };

        WalkSettings {
            max_commits: self.max_commits.unwrap_or(config.max_commits),
            default_type: TypeTag::new(
                self.default_type
                    .as_deref()
                    .unwrap_or(&config.default_type),
            ),
            guess,
            order,
        }
    }
}
