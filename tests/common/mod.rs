#![allow(dead_code)]

use changetool::git::Git2Repository;
use git2::{Oid, Repository, Signature, Time};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A real git repository in a temporary directory
///
/// Every commit and annotated tag gets a committer time 100 seconds after the
/// previous one, so history order does not depend on the wall clock.
pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
    clock: Cell<i64>,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        TestRepo {
            dir,
            repo,
            clock: Cell::new(1_600_000_000),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn path_string(&self) -> String {
        self.path().display().to_string()
    }

    pub fn open(&self) -> Git2Repository {
        Git2Repository::open(self.path()).unwrap()
    }

    fn signature(&self) -> Signature<'static> {
        let when = self.clock.get() + 100;
        self.clock.set(when);
        Signature::new("Test", "test@example.com", &Time::new(when, 0)).unwrap()
    }

    /// Commit a change to `example-file.c`
    pub fn commit(&self, message: &str) -> Oid {
        self.commit_files(message, &["example-file.c"])
    }

    /// Commit a change to every path in `files`
    pub fn commit_files(&self, message: &str, files: &[&str]) -> Oid {
        let mut index = self.repo.index().unwrap();
        for file in files {
            let full = self.path().join(file);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            let previous = fs::read_to_string(&full).unwrap_or_default();
            fs::write(&full, format!("{}{}", previous, message)).unwrap();
            index.add_path(Path::new(file)).unwrap();
        }
        index.write().unwrap();

        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = self.signature();
        let parent = self.repo.head().ok().map(|h| h.peel_to_commit().unwrap());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    fn head_object(&self) -> git2::Object<'_> {
        self.repo.head().unwrap().peel(git2::ObjectType::Commit).unwrap()
    }

    pub fn tag(&self, name: &str) {
        self.repo
            .tag_lightweight(name, &self.head_object(), false)
            .unwrap();
    }

    pub fn annotated_tag(&self, name: &str, message: &str) {
        let sig = self.signature();
        self.repo
            .tag(name, &self.head_object(), &sig, message, false)
            .unwrap();
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn head(&self) -> Oid {
        self.repo.head().unwrap().target().unwrap()
    }
}

/// Repository whose changelog has one entry per default section kind
pub fn basic_history() -> TestRepo {
    let repo = TestRepo::new();
    repo.commit("feat: initial commit\n");
    repo.commit("non-conventional commit comment\n");
    repo.commit_files(
        "another non-conventional commit, this time of doc\n",
        &["README.md"],
    );
    repo.commit("chore: do nothing real\n");
    repo
}

pub const BASIC_CHANGELOG: &str = "Feature:\n   * initial commit\n\n\
                                   Fix:\n   * non-conventional commit comment\n\n\
                                   Docs:\n   * another non-conventional commit, this time of doc\n\n\
                                   Chore:\n   * do nothing real\n\n";
