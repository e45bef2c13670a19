//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the version-control
//! store, so the history engine can run against real repositories and
//! in-memory fixtures alike.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations are:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory implementation for testing
//!
//! # Usage
//!
//! Code in [crate::changes] and [crate::versions] depends on the [Repository]
//! trait only.
//!
//! ```rust
//! # use changetool::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> changetool::Result<()> {
//! for commit in repo.log_commits()? {
//!     let commit = commit?;
//!     println!("{} {}", commit.short_id(), commit.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use crate::tags::TagIndex;
use git2::Oid;
use std::collections::HashMap;

/// Number of hex digits used when a commit id is shortened for display
pub const SHORT_ID_LEN: usize = 6;

/// Commit information for classification
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// The full commit id
    pub id: Oid,
    /// Ids of the parent commits
    pub parents: Vec<Oid>,
    /// The raw commit message, header and body
    pub message: String,
}

impl CommitInfo {
    /// True when the commit has more than one parent
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Shortened hex id
    pub fn short_id(&self) -> String {
        short_id(self.id)
    }
}

/// Shorten a commit id to [SHORT_ID_LEN] hex digits
pub fn short_id(id: Oid) -> String {
    let mut hex = id.to_string();
    hex.truncate(SHORT_ID_LEN);
    hex
}

/// A reference under `refs/tags/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReference {
    /// Short tag name, e.g. `v1.2.3`
    pub name: String,
    /// The object the reference points at
    pub target: Oid,
    /// True when `target` is a tag object rather than a commit
    pub is_annotated: bool,
}

/// State of one side (index or worktree) of a file's status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Unmodified,
    Added,
    Modified,
    Deleted,
    Renamed,
    TypeChange,
    Untracked,
    Conflicted,
}

/// Status of one path in the working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub path: String,
    pub index: FileState,
    pub worktree: FileState,
}

/// Common version-control operations consumed by the history engine
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying failures (like `git2::Error`) to
/// [crate::error::ChangetoolError::Repository].
///
/// ## Tag index
///
/// Each handle owns one [TagIndex]. The provided [Repository::tag_map] and
/// [Repository::reverse_tag_map] build it on first use and return the cached
/// maps afterwards.
pub trait Repository {
    /// Iterate commits reachable from HEAD, newest committer time first
    ///
    /// Fails up front when the log cannot be constructed; individual items
    /// fail when a commit object cannot be read.
    fn log_commits(&self) -> Result<Box<dyn Iterator<Item = Result<CommitInfo>> + '_>>;

    /// Paths touched by a commit relative to its first parent
    fn commit_files(&self, id: Oid) -> Result<Vec<String>>;

    /// Enumerate every tag reference
    fn tag_references(&self) -> Result<Vec<TagReference>>;

    /// Resolve an object (typically a tag object) to the commit it targets
    fn peel_to_commit(&self, id: Oid) -> Result<Oid>;

    /// Status of every non-current path in the working tree
    fn worktree_status(&self) -> Result<Vec<FileStatus>>;

    /// Id of the commit HEAD points at
    fn head_commit_id(&self) -> Result<Oid>;

    /// The tag index owned by this handle
    fn tag_index(&self) -> &TagIndex;

    /// Tag name to commit id
    fn tag_map(&self) -> &HashMap<String, Oid> {
        self.tag_index().name_to_commit(self)
    }

    /// Commit id to the tag names attached to it
    fn reverse_tag_map(&self) -> &HashMap<Oid, Vec<String>> {
        self.tag_index().commit_to_names(self)
    }
}
