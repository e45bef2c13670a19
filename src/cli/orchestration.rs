//! Command workflows
//!
//! Each command is a function over a [Repository] and an output writer so
//! the workflows run against [crate::git::MockRepository] in tests; [run]
//! wires them to the real repository and output destination.

use crate::changes::{
    commit_entries, default_guess, heuristic_guess, load, write_changelog, ChangeSet,
    StopCondition, TypeTag, WalkOptions,
};
use crate::cli::{ChangelogArgs, Cli, Commands, SemverArgs, WalkSettings};
use crate::config::{load_config, Config};
use crate::error::{ChangetoolError, Result};
use crate::git::{CommitInfo, Git2Repository, Repository};
use crate::ui;
use crate::versions::{
    find_next_version, find_previous_version_from_file, find_previous_version_from_tag,
    replace_in_file, Version,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, debug_span, info};

/// Run the parsed command line
pub fn run(cli: &Cli) -> Result<()> {
    if let Commands::Version = cli.command {
        let mut out = open_output(&cli.output)?;
        writeln!(out, "{}", env!("CARGO_PKG_VERSION"))?;
        out.flush()?;
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    debug!(path = %cli.path.display(), "Opening repository");
    let repo = Git2Repository::open(&cli.path)?;
    let mut out = open_output(&cli.output)?;

    match &cli.command {
        Commands::Changelog(args) => run_changelog(&repo, args, &config, &mut out)?,
        Commands::Semver(args) => {
            let next = run_semver(&repo, args, &config, &mut out)?;
            if !cli.quiet {
                for file in &args.replace_in {
                    ui::display_success(&format!("Updated {} to {}", file.display(), next));
                }
            }
        }
        Commands::Version => {}
    }

    out.flush()?;
    Ok(())
}

fn open_output(output: &str) -> Result<Box<dyn Write>> {
    if output == "-" {
        return Ok(Box::new(io::stdout().lock()));
    }

    debug!(file = %output, "Sending output");
    let file = File::create(output).map_err(|e| ChangetoolError::file_io(output, e))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Where the walk for `args` ends
///
/// An explicit `since_tag` wins and must name an existing tag; then a tag
/// pattern; then the most recent version tag when `from_tag` is set.
/// Otherwise the walk covers all history.
pub fn stop_condition<R: Repository + ?Sized>(
    repo: &R,
    args: &ChangelogArgs,
) -> Result<StopCondition> {
    let _span = debug_span!("finding_start_version").entered();

    if let Some(tag) = &args.since_tag {
        return match repo.tag_map().get(tag) {
            Some(id) => Ok(StopCondition::AtHash(*id)),
            None => Err(ChangetoolError::tag_not_found(tag)),
        };
    }

    if let Some(pattern) = &args.since_pattern {
        return StopCondition::tag_pattern(pattern);
    }

    if args.from_tag {
        return Ok(StopCondition::AtFirstSemver);
    }

    Ok(StopCondition::Never)
}

/// Collect the changes selected by `args`
pub fn calculate_changes<R: Repository + ?Sized>(
    repo: &R,
    args: &ChangelogArgs,
    settings: &WalkSettings,
) -> Result<ChangeSet> {
    let _span = debug_span!("calculating_changes").entered();

    let stop = {
        let _tags = debug_span!("reading_tags").entered();
        stop_condition(repo, args)?
    };

    let guess: Box<dyn Fn(&CommitInfo) -> TypeTag + '_> = if settings.guess {
        Box::new(heuristic_guess(repo, settings.default_type.clone()))
    } else {
        Box::new(default_guess(settings.default_type.clone()))
    };

    let options = WalkOptions {
        max_commits: Some(settings.max_commits),
    };

    load(repo, &stop, guess.as_ref(), options)
}

/// Write the changelog for `args` to `out`
pub fn run_changelog<R: Repository + ?Sized, W: Write>(
    repo: &R,
    args: &ChangelogArgs,
    config: &Config,
    out: &mut W,
) -> Result<()> {
    let settings = args.resolve(&config.changelog);
    let changes = calculate_changes(repo, args, &settings)?;

    write_changelog(out, &commit_entries(&settings.order, changes.commits()))?;
    Ok(())
}

fn previous_version<R: Repository + ?Sized>(repo: &R, from_file: Option<&Path>) -> Result<Version> {
    match from_file {
        Some(path) => find_previous_version_from_file(path),
        None => find_previous_version_from_tag(repo),
    }
}

/// Write the next version to `out` and rewrite `args.replace_in`
///
/// When the previous version came from a tag and no start tag was given,
/// changes are collected since that tag.
pub fn run_semver<R: Repository + ?Sized, W: Write>(
    repo: &R,
    args: &SemverArgs,
    config: &Config,
    out: &mut W,
) -> Result<semver::Version> {
    let previous = previous_version(repo, args.from_file.as_deref())?;
    debug!(previous_version = %previous, "Found previous version");

    let mut walk = args.changes.clone();
    if walk.since_tag.is_none() {
        walk.since_tag = previous.tag.clone();
    }

    let settings = walk.resolve(&config.changelog);
    let changes = calculate_changes(repo, &walk, &settings)?;

    let allow_untracked = args.allow_untracked || config.semver.allow_untracked;
    let next = find_next_version(repo, &previous, &changes, allow_untracked)?;
    info!(previous = %previous, next = %next, "Calculated next version");

    writeln!(out, "{}", next)?;

    for file in &args.replace_in {
        replace_in_file(file, &next)?;
    }

    Ok(next)
}
