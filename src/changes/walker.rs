use crate::changes::classify::classify;
use crate::changes::{ChangeSet, StopCondition, TypeTag};
use crate::error::Result;
use crate::git::{CommitInfo, Repository};
use tracing::{debug, debug_span};

/// Extra bounds on a history walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Stop after classifying this many commits
    pub max_commits: Option<usize>,
}

/// Build a [ChangeSet] from the history reachable from HEAD
///
/// Commits are visited newest committer time first. Merge commits are
/// skipped. The walk ends before the first commit `stop` accepts, when
/// `options.max_commits` commits have been classified, or when history runs
/// out. Any error reading the log discards the partial result.
pub fn load<R: Repository + ?Sized>(
    repo: &R,
    stop: &StopCondition,
    guess: &dyn Fn(&CommitInfo) -> TypeTag,
    options: WalkOptions,
) -> Result<ChangeSet> {
    let _span = debug_span!("loading_changes").entered();

    let mut change_set = ChangeSet::new();
    let mut classified = 0;

    for commit in repo.log_commits()? {
        let commit = commit?;

        debug!(this_commit = %commit.short_id(), "Examining Commit");

        if stop.accepts(repo, &commit, classified) {
            debug!(hash = %commit.short_id(), "Stop condition reached");
            break;
        }

        if options.max_commits.is_some_and(|max| classified >= max) {
            debug!(max = classified, "Maximum commit count reached");
            break;
        }

        if commit.is_merge() {
            continue;
        }

        let entry = classify(&commit, guess);
        if entry.breaking {
            change_set.add_breaking(entry.message.clone());
        }
        change_set.add_commit(entry.tag, entry.message);
        classified += 1;
    }

    debug!(number_of_changes = classified, "Number of changes");

    Ok(change_set)
}
