use crate::git::{CommitInfo, Repository};
use crate::versions::parse_tag_version;
use git2::Oid;
use regex::Regex;
use tracing::debug;

/// Where a history walk ends
///
/// The walk stops at the first commit the condition accepts; that commit is
/// not classified.
#[derive(Debug, Clone)]
pub enum StopCondition {
    /// Stop at this exact commit
    AtHash(Oid),
    /// Stop once this many non-merge commits have been classified
    AtCount(usize),
    /// Stop at a commit carrying a tag whose name matches
    AtTagMatch(Regex),
    /// Stop at a commit carrying a tag that parses as a semantic version
    AtFirstSemver,
    Never,
    Always,
}

impl StopCondition {
    /// Build an [StopCondition::AtTagMatch] from a regular expression
    pub fn tag_pattern(pattern: &str) -> crate::Result<Self> {
        Ok(StopCondition::AtTagMatch(Regex::new(pattern)?))
    }

    /// Decide whether the walk ends at `commit`
    ///
    /// `classified` is the number of commits already added to the change set.
    pub fn accepts<R: Repository + ?Sized>(
        &self,
        repo: &R,
        commit: &CommitInfo,
        classified: usize,
    ) -> bool {
        match self {
            StopCondition::AtHash(hash) => *hash == commit.id,
            StopCondition::AtCount(count) => classified >= *count,
            StopCondition::AtTagMatch(pattern) => tags_at(repo, commit)
                .iter()
                .any(|tag| pattern.is_match(tag)),
            StopCondition::AtFirstSemver => tags_at(repo, commit).iter().any(|tag| {
                debug!(tag = %tag, "checking tag");
                if parse_tag_version(tag).is_some() {
                    debug!(hash = %commit.short_id(), tag = %tag, "Stopping at tagged commit");
                    true
                } else {
                    false
                }
            }),
            StopCondition::Never => false,
            StopCondition::Always => true,
        }
    }
}

fn tags_at<'r, R: Repository + ?Sized>(repo: &'r R, commit: &CommitInfo) -> &'r [String] {
    repo.reverse_tag_map()
        .get(&commit.id)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    fn commit_at(repo: &MockRepository, id: Oid) -> CommitInfo {
        repo.log_commits()
            .unwrap()
            .map(|c| c.unwrap())
            .find(|c| c.id == id)
            .unwrap()
    }

    #[test]
    fn test_never_and_always() {
        let mut repo = MockRepository::new();
        let id = repo.commit("one");
        let commit = commit_at(&repo, id);

        assert!(!StopCondition::Never.accepts(&repo, &commit, 10_000));
        assert!(StopCondition::Always.accepts(&repo, &commit, 0));
    }

    #[test]
    fn test_at_hash() {
        let mut repo = MockRepository::new();
        let first = repo.commit("one");
        let second = repo.commit("two");

        let stop = StopCondition::AtHash(first);
        assert!(stop.accepts(&repo, &commit_at(&repo, first), 0));
        assert!(!stop.accepts(&repo, &commit_at(&repo, second), 0));
    }

    #[test]
    fn test_at_count() {
        let mut repo = MockRepository::new();
        let id = repo.commit("one");
        let commit = commit_at(&repo, id);

        let stop = StopCondition::AtCount(2);
        assert!(!stop.accepts(&repo, &commit, 0));
        assert!(!stop.accepts(&repo, &commit, 1));
        assert!(stop.accepts(&repo, &commit, 2));
    }

    #[test]
    fn test_at_tag_match() {
        let mut repo = MockRepository::new();
        let tagged = repo.commit("one");
        repo.tag("release-candidate");
        repo.tag("v0.1");
        let untagged = repo.commit("two");

        let stop = StopCondition::tag_pattern(r"^v[0-9.]+$").unwrap();
        assert!(stop.accepts(&repo, &commit_at(&repo, tagged), 0));
        assert!(!stop.accepts(&repo, &commit_at(&repo, untagged), 0));

        let other = StopCondition::tag_pattern("^nightly").unwrap();
        assert!(!other.accepts(&repo, &commit_at(&repo, tagged), 0));
    }

    #[test]
    fn test_invalid_tag_pattern() {
        assert!(StopCondition::tag_pattern("v(").is_err());
    }

    #[test]
    fn test_at_first_semver() {
        let mut repo = MockRepository::new();
        let versioned = repo.commit("one");
        repo.annotated_tag("v0.2", "release");
        let named = repo.commit("two");
        repo.tag("latest");

        let stop = StopCondition::AtFirstSemver;
        assert!(stop.accepts(&repo, &commit_at(&repo, versioned), 0));
        assert!(!stop.accepts(&repo, &commit_at(&repo, named), 0));
    }
}
