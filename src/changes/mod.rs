//! History classification: walk commits, sort them into types and collect
//! the result in a [ChangeSet].

pub mod classify;
pub mod present;
pub mod stop;
pub mod walker;

pub use classify::{default_guess, heuristic_guess, parse_header, standard_guess, Header};
pub use present::{commit_entries, write_changelog, CommitTypeEntry};
pub use stop::StopCondition;
pub use walker::{load, WalkOptions};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category of a commit, e.g. `feat` or `fix`
///
/// Open-ended: any identifier found in a commit header is a valid tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
    pub fn new(tag: impl Into<String>) -> Self {
        TypeTag(tag.into())
    }

    /// Sentinel for "the heuristic could not tell"
    pub fn no_clue() -> Self {
        TypeTag::new("--no clue--")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(tag: &str) -> Self {
        TypeTag::new(tag)
    }
}

impl std::str::FromStr for TypeTag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(TypeTag::new(s))
    }
}

/// Standard ordering of changelog sections
pub const DEFAULT_ORDER: [&str; 7] = ["feat", "fix", "test", "docs", "build", "refactor", "chore"];

/// [DEFAULT_ORDER] as type tags
pub fn default_order() -> Vec<TypeTag> {
    DEFAULT_ORDER.iter().map(|t| TypeTag::from(*t)).collect()
}

/// All changes found in one walk of the commit history
///
/// Only grows while the walk runs; every key maps to a non-empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    breaking_changes: Vec<String>,
    commits: BTreeMap<TypeTag, Vec<String>>,
}

impl ChangeSet {
    /// Create a new, empty change set
    pub fn new() -> Self {
        ChangeSet::default()
    }

    pub fn add_breaking(&mut self, message: impl Into<String>) {
        self.breaking_changes.push(message.into());
    }

    pub fn add_commit(&mut self, tag: TypeTag, message: impl Into<String>) {
        self.commits.entry(tag).or_default().push(message.into());
    }

    /// Messages flagged as breaking, in encounter order
    pub fn breaking_changes(&self) -> &[String] {
        &self.breaking_changes
    }

    /// Messages per type, each list in encounter order
    pub fn commits(&self) -> &BTreeMap<TypeTag, Vec<String>> {
        &self.commits
    }

    /// Messages recorded under `tag`
    pub fn messages(&self, tag: &str) -> &[String] {
        self.commits
            .get(&TypeTag::from(tag))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True when at least one commit of type `tag` was recorded
    pub fn has(&self, tag: &str) -> bool {
        !self.messages(tag).is_empty()
    }

    /// Total number of classified commits
    pub fn len(&self) -> usize {
        self.commits.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}
