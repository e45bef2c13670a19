use crate::error::Result;
use crate::git::{CommitInfo, FileState, FileStatus, Repository, TagReference};
use crate::tags::TagIndex;
use git2::Oid;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
struct MockCommit {
    info: CommitInfo,
    files: Option<Vec<String>>,
}

/// In-memory repository for testing without actual git operations
///
/// Commits are recorded in creation order and logged newest first, which
/// stands in for committer-time order.
#[derive(Debug, Default)]
pub struct MockRepository {
    commits: Vec<MockCommit>,
    tags: Vec<TagReference>,
    tag_objects: HashMap<Oid, Oid>,
    status: Vec<FileStatus>,
    corrupt: HashSet<Oid>,
    fail_tags: bool,
    fail_log: bool,
    next_id: u32,
    tag_builds: AtomicUsize,
    tag_index: TagIndex,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository::default()
    }

    fn next_oid(&mut self) -> Oid {
        self.next_id += 1;
        let mut bytes = [0u8; 20];
        bytes[0] = 0xab;
        bytes[16..].copy_from_slice(&self.next_id.to_be_bytes());
        Oid::from_bytes(&bytes).unwrap_or_else(|_| Oid::zero())
    }

    fn head(&self) -> Option<Oid> {
        self.commits.last().map(|c| c.info.id)
    }

    fn push_commit(&mut self, message: &str, parents: Vec<Oid>, files: Option<Vec<String>>) -> Oid {
        let id = self.next_oid();
        self.commits.push(MockCommit {
            info: CommitInfo {
                id,
                parents,
                message: message.to_string(),
            },
            files,
        });
        id
    }

    /// Add a commit on top of the current head touching a single C file
    pub fn commit(&mut self, message: &str) -> Oid {
        self.commit_with_files(message, &["example-file.c"])
    }

    /// Add a commit on top of the current head touching the given paths
    pub fn commit_with_files(&mut self, message: &str, files: &[&str]) -> Oid {
        let parents = self.head().into_iter().collect();
        let files = files.iter().map(|f| f.to_string()).collect();
        self.push_commit(message, parents, Some(files))
    }

    /// Add a commit whose file statistics cannot be computed
    pub fn commit_without_stats(&mut self, message: &str) -> Oid {
        let parents = self.head().into_iter().collect();
        self.push_commit(message, parents, None)
    }

    /// Add a merge commit joining the current head with `other`
    pub fn merge(&mut self, message: &str, other: Oid) -> Oid {
        let parents = self.head().into_iter().chain(Some(other)).collect();
        self.push_commit(message, parents, Some(Vec::new()))
    }

    /// Add a lightweight tag at the current head
    pub fn tag(&mut self, name: &str) {
        if let Some(head) = self.head() {
            self.tags.push(TagReference {
                name: name.to_string(),
                target: head,
                is_annotated: false,
            });
        }
    }

    /// Add an annotated tag object at the current head
    pub fn annotated_tag(&mut self, name: &str, _message: &str) {
        if let Some(head) = self.head() {
            let object = self.next_oid();
            self.tag_objects.insert(object, head);
            self.tags.push(TagReference {
                name: name.to_string(),
                target: object,
                is_annotated: true,
            });
        }
    }

    /// Add an annotated tag reference whose object cannot be resolved
    pub fn dangling_tag(&mut self, name: &str) {
        let object = self.next_oid();
        self.tags.push(TagReference {
            name: name.to_string(),
            target: object,
            is_annotated: true,
        });
    }

    /// Record a working tree entry
    pub fn set_status(&mut self, path: &str, index: FileState, worktree: FileState) {
        self.status.push(FileStatus {
            path: path.to_string(),
            index,
            worktree,
        });
    }

    /// Make tag enumeration fail
    pub fn fail_tag_enumeration(&mut self) {
        self.fail_tags = true;
    }

    /// Make log construction fail
    pub fn fail_log(&mut self) {
        self.fail_log = true;
    }

    /// Make reading the given commit fail during a walk
    pub fn corrupt_commit(&mut self, id: Oid) {
        self.corrupt.insert(id);
    }

    /// Number of times the tag references were enumerated
    pub fn tag_builds(&self) -> usize {
        self.tag_builds.load(Ordering::SeqCst)
    }
}

impl Repository for MockRepository {
    fn log_commits(&self) -> Result<Box<dyn Iterator<Item = Result<CommitInfo>> + '_>> {
        if self.fail_log {
            return Err(git2::Error::from_str("cannot construct log").into());
        }

        Ok(Box::new(self.commits.iter().rev().map(move |c| {
            if self.corrupt.contains(&c.info.id) {
                Err(git2::Error::from_str("object not found").into())
            } else {
                Ok(c.info.clone())
            }
        })))
    }

    fn commit_files(&self, id: Oid) -> Result<Vec<String>> {
        self.commits
            .iter()
            .find(|c| c.info.id == id)
            .and_then(|c| c.files.clone())
            .ok_or_else(|| git2::Error::from_str("no statistics for commit").into())
    }

    fn tag_references(&self) -> Result<Vec<TagReference>> {
        self.tag_builds.fetch_add(1, Ordering::SeqCst);
        if self.fail_tags {
            return Err(git2::Error::from_str("cannot list tags").into());
        }
        Ok(self.tags.clone())
    }

    fn peel_to_commit(&self, id: Oid) -> Result<Oid> {
        if self.commits.iter().any(|c| c.info.id == id) {
            return Ok(id);
        }
        self.tag_objects
            .get(&id)
            .copied()
            .ok_or_else(|| git2::Error::from_str("tag object not found").into())
    }

    fn worktree_status(&self) -> Result<Vec<FileStatus>> {
        Ok(self.status.clone())
    }

    fn head_commit_id(&self) -> Result<Oid> {
        self.head()
            .ok_or_else(|| git2::Error::from_str("reference 'HEAD' not found").into())
    }

    fn tag_index(&self) -> &TagIndex {
        &self.tag_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_logs_newest_first() {
        let mut repo = MockRepository::new();
        let first = repo.commit("first commit");
        let second = repo.commit("second commit");

        let ids: Vec<Oid> = repo
            .log_commits()
            .unwrap()
            .map(|c| c.unwrap().id)
            .collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(repo.head_commit_id().unwrap(), second);
    }

    #[test]
    fn test_mock_repository_parents() {
        let mut repo = MockRepository::new();
        let first = repo.commit("first");
        let second = repo.commit("second");
        let merge = repo.merge("Merge branch 'x'", first);

        let log: Vec<CommitInfo> = repo.log_commits().unwrap().map(|c| c.unwrap()).collect();
        assert_eq!(log[0].id, merge);
        assert_eq!(log[0].parents, vec![second, first]);
        assert!(log[0].is_merge());
        assert!(!log[1].is_merge());
        assert!(log[2].parents.is_empty());
    }

    #[test]
    fn test_mock_repository_tags() {
        let mut repo = MockRepository::new();
        let id = repo.commit("first");
        repo.tag("v1.0.0");
        repo.annotated_tag("v1.0.1", "annotated");

        let tags = repo.tag_references().unwrap();
        assert_eq!(tags.len(), 2);
        assert!(!tags[0].is_annotated);
        assert!(tags[1].is_annotated);
        assert_eq!(repo.peel_to_commit(tags[1].target).unwrap(), id);
    }

    #[test]
    fn test_mock_repository_files() {
        let mut repo = MockRepository::new();
        let with = repo.commit_with_files("docs", &["README.md"]);
        let without = repo.commit_without_stats("mystery");

        assert_eq!(repo.commit_files(with).unwrap(), vec!["README.md".to_string()]);
        assert!(repo.commit_files(without).is_err());
    }

    #[test]
    fn test_mock_repository_failures() {
        let mut repo = MockRepository::new();
        assert!(repo.head_commit_id().is_err());
        repo.fail_log();
        assert!(repo.log_commits().is_err());
    }

    #[test]
    fn test_mock_repository_default() {
        let repo = MockRepository::default();
        assert!(repo.tag_references().unwrap().is_empty());
        assert!(repo.worktree_status().unwrap().is_empty());
    }
}
