//! Bidirectional tag index
//!
//! Maps tag names to the commits they ultimately reference and back. The
//! index is filled at most once per repository handle, on first access, and
//! is read-only afterwards.

use crate::git::{short_id, Repository};
use git2::Oid;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, debug_span, error, warn};

#[derive(Debug, Default)]
struct TagMaps {
    name_to_commit: HashMap<String, Oid>,
    commit_to_names: HashMap<Oid, Vec<String>>,
}

impl TagMaps {
    fn insert(&mut self, name: String, commit: Oid) {
        self.commit_to_names
            .entry(commit)
            .or_default()
            .push(name.clone());
        self.name_to_commit.insert(name, commit);
    }
}

/// Lazily built tag name <-> commit id index
///
/// Concurrent first callers block until the single build completes; nobody
/// observes a partially filled index.
#[derive(Debug, Default)]
pub struct TagIndex {
    maps: OnceLock<TagMaps>,
}

impl TagIndex {
    /// Create an empty, not yet built index
    pub fn new() -> Self {
        TagIndex::default()
    }

    /// True once the index has been built
    pub fn is_built(&self) -> bool {
        self.maps.get().is_some()
    }

    /// Tag name to commit id, building the index from `repo` if needed
    pub fn name_to_commit<R: Repository + ?Sized>(&self, repo: &R) -> &HashMap<String, Oid> {
        &self.maps(repo).name_to_commit
    }

    /// Commit id to attached tag names, building the index from `repo` if needed
    pub fn commit_to_names<R: Repository + ?Sized>(&self, repo: &R) -> &HashMap<Oid, Vec<String>> {
        &self.maps(repo).commit_to_names
    }

    fn maps<R: Repository + ?Sized>(&self, repo: &R) -> &TagMaps {
        self.maps.get_or_init(|| fill(repo))
    }
}

/// Read every tag reference into a fresh pair of maps
///
/// Enumeration failure is logged and leaves the maps empty. A tag that cannot
/// be resolved to a commit is logged and skipped.
fn fill<R: Repository + ?Sized>(repo: &R) -> TagMaps {
    let _span = debug_span!("reading_tags").entered();
    let mut maps = TagMaps::default();

    let references = match repo.tag_references() {
        Ok(references) => references,
        Err(e) => {
            error!(error = %e, "error reading tag references");
            return maps;
        }
    };

    for reference in references {
        let commit = if reference.is_annotated {
            match repo.peel_to_commit(reference.target) {
                Ok(commit) => commit,
                Err(e) => {
                    warn!(tag = %reference.name, error = %e, "cannot resolve tag object");
                    continue;
                }
            }
        } else {
            reference.target
        };

        debug!(tag = %reference.name, hash = %short_id(commit), "Examining tag");
        maps.insert(reference.name, commit);
    }

    for names in maps.commit_to_names.values_mut() {
        names.sort();
    }

    debug!(count = maps.name_to_commit.len(), "tag index built");
    maps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    #[test]
    fn test_lightweight_and_annotated_tags_resolve_to_commits() {
        let mut repo = MockRepository::new();
        let first = repo.commit("feat: first");
        repo.tag("v0.1.0");
        let second = repo.commit("fix: second");
        repo.annotated_tag("v0.1.1", "release 0.1.1");

        let names = repo.tag_map();
        assert_eq!(names.get("v0.1.0"), Some(&first));
        assert_eq!(names.get("v0.1.1"), Some(&second));

        let commits = repo.reverse_tag_map();
        assert_eq!(commits.get(&first), Some(&vec!["v0.1.0".to_string()]));
        assert_eq!(commits.get(&second), Some(&vec!["v0.1.1".to_string()]));
    }

    #[test]
    fn test_maps_mirror_each_other() {
        let mut repo = MockRepository::new();
        repo.commit("one");
        repo.tag("a");
        repo.tag("b");
        repo.commit("two");
        repo.annotated_tag("c", "annotated");

        let names = repo.tag_map();
        let commits = repo.reverse_tag_map();

        for (name, commit) in names {
            assert!(commits[commit].contains(name));
        }
        let reverse_total: usize = commits.values().map(Vec::len).sum();
        assert_eq!(reverse_total, names.len());
        assert!(commits.values().all(|v| !v.is_empty()));
    }

    #[test]
    fn test_names_on_one_commit_are_sorted() {
        let mut repo = MockRepository::new();
        let id = repo.commit("one");
        repo.tag("zeta");
        repo.tag("alpha");

        assert_eq!(
            repo.reverse_tag_map()[&id],
            vec!["alpha".to_string(), "zeta".to_string()]
        );
    }

    #[test]
    fn test_enumeration_failure_yields_empty_index() {
        let mut repo = MockRepository::new();
        repo.commit("one");
        repo.tag("v1.0.0");
        repo.fail_tag_enumeration();

        assert!(repo.tag_map().is_empty());
        assert!(repo.reverse_tag_map().is_empty());
        assert!(repo.tag_index().is_built());
    }

    #[test]
    fn test_unresolvable_tag_is_skipped() {
        let mut repo = MockRepository::new();
        let first = repo.commit("one");
        repo.tag("v1.0.0");
        repo.dangling_tag("broken");
        let second = repo.commit("two");
        repo.annotated_tag("v1.1.0", "release");

        let names = repo.tag_map();
        assert_eq!(names.len(), 2);
        assert_eq!(names.get("v1.0.0"), Some(&first));
        assert_eq!(names.get("v1.1.0"), Some(&second));
        assert!(!names.contains_key("broken"));

        let reverse_total: usize = repo.reverse_tag_map().values().map(Vec::len).sum();
        assert_eq!(reverse_total, 2);
    }

    #[test]
    fn test_built_once_across_accessors() {
        let mut repo = MockRepository::new();
        repo.commit("one");
        repo.tag("v1.0.0");

        assert!(!repo.tag_index().is_built());
        for _ in 0..5 {
            let _ = repo.tag_map();
            let _ = repo.reverse_tag_map();
        }
        assert_eq!(repo.tag_builds(), 1);
    }

    #[test]
    fn test_built_once_across_threads() {
        let mut repo = MockRepository::new();
        for n in 0..20 {
            repo.commit(&format!("commit {}", n));
            repo.tag(&format!("t{}", n));
        }

        let repo = &repo;
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(move || {
                    assert_eq!(repo.tag_map().len(), 20);
                    assert_eq!(repo.reverse_tag_map().len(), 20);
                });
            }
        });

        assert_eq!(repo.tag_builds(), 1);
    }
}
