use crate::error::Result;
use crate::git::{CommitInfo, FileState, FileStatus, TagReference};
use crate::tags::TagIndex;
use git2::{Delta, ObjectType, Oid, Repository as Git2Repo, Sort, Status, StatusOptions};
use std::path::Path;
use tracing::{debug, warn};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    tags: TagIndex,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!(path = %path.as_ref().display(), "Opening repository");
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo,
            tags: TagIndex::new(),
        }
    }

    fn commit_info(&self, oid: Oid) -> Result<CommitInfo> {
        let commit = self.repo.find_commit(oid)?;

        Ok(CommitInfo {
            id: oid,
            parents: commit.parent_ids().collect(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        })
    }
}

fn index_state(status: Status) -> FileState {
    if status.is_conflicted() {
        FileState::Conflicted
    } else if status.is_index_new() {
        FileState::Added
    } else if status.is_index_modified() {
        FileState::Modified
    } else if status.is_index_deleted() {
        FileState::Deleted
    } else if status.is_index_renamed() {
        FileState::Renamed
    } else if status.is_index_typechange() {
        FileState::TypeChange
    } else {
        FileState::Unmodified
    }
}

fn worktree_state(status: Status) -> FileState {
    if status.is_conflicted() {
        FileState::Conflicted
    } else if status.is_wt_new() {
        FileState::Untracked
    } else if status.is_wt_modified() {
        FileState::Modified
    } else if status.is_wt_deleted() {
        FileState::Deleted
    } else if status.is_wt_renamed() {
        FileState::Renamed
    } else if status.is_wt_typechange() {
        FileState::TypeChange
    } else {
        FileState::Unmodified
    }
}

impl super::Repository for Git2Repository {
    fn log_commits(&self) -> Result<Box<dyn Iterator<Item = Result<CommitInfo>> + '_>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;

        Ok(Box::new(revwalk.map(move |oid_result| {
            let oid = oid_result?;
            self.commit_info(oid)
        })))
    }

    fn commit_files(&self, id: Oid) -> Result<Vec<String>> {
        let commit = self.repo.find_commit(id)?;
        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let files = diff
            .deltas()
            .filter_map(|delta| {
                let file = if delta.status() == Delta::Deleted {
                    delta.old_file()
                } else {
                    delta.new_file()
                };
                file.path().map(|p| p.to_string_lossy().into_owned())
            })
            .collect();

        Ok(files)
    }

    fn tag_references(&self) -> Result<Vec<TagReference>> {
        let mut tags = Vec::new();

        for reference in self.repo.references_glob("refs/tags/*")? {
            let reference = reference?;
            let (Some(name), Some(target)) = (reference.shorthand(), reference.target()) else {
                continue;
            };

            let object = match self.repo.find_object(target, None) {
                Ok(object) => object,
                Err(e) => {
                    warn!(tag = %name, error = %e, "skipping tag with missing target");
                    continue;
                }
            };
            let is_annotated = object.kind() == Some(ObjectType::Tag);

            tags.push(TagReference {
                name: name.to_string(),
                target,
                is_annotated,
            });
        }

        Ok(tags)
    }

    fn peel_to_commit(&self, id: Oid) -> Result<Oid> {
        let object = self.repo.find_object(id, None)?;
        Ok(object.peel_to_commit()?.id())
    }

    fn worktree_status(&self) -> Result<Vec<FileStatus>> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;

        Ok(statuses
            .iter()
            .filter(|entry| entry.status() != Status::CURRENT)
            .map(|entry| FileStatus {
                path: String::from_utf8_lossy(entry.path_bytes()).into_owned(),
                index: index_state(entry.status()),
                worktree: worktree_state(entry.status()),
            })
            .collect())
    }

    fn head_commit_id(&self) -> Result<Oid> {
        Ok(self.repo.head()?.peel_to_commit()?.id())
    }

    fn tag_index(&self) -> &TagIndex {
        &self.tags
    }
}
