use crate::changes::ChangeSet;
use crate::error::{ChangetoolError, Result};
use crate::git::{short_id, FileState, FileStatus, Repository};
use crate::versions::{Version, EMBEDDED_VERSION};
use git2::Oid;
use regex::bytes::Captures;
use semver::{BuildMetadata, Prerelease};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, debug_span};

/// Represents the type of semantic version bump to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

impl VersionBump {
    /// Increments the matching component and resets the lower ones to 0.
    pub fn apply(self, version: &semver::Version) -> semver::Version {
        match self {
            VersionBump::Major => semver::Version::new(version.major + 1, 0, 0),
            VersionBump::Minor => semver::Version::new(version.major, version.minor + 1, 0),
            VersionBump::Patch => {
                semver::Version::new(version.major, version.minor, version.patch + 1)
            }
        }
    }
}

/// Bump implied by a change set, first matching rule wins:
///
/// - breaking changes: major, or minor while the major component is 0
/// - any `feat`: minor
/// - any `fix`: patch
/// - otherwise none
pub fn bump_for(changes: &ChangeSet, version: &semver::Version) -> Option<VersionBump> {
    if !changes.breaking_changes().is_empty() {
        debug!("We have breaking changes");
        if version.major > 0 {
            Some(VersionBump::Major)
        } else {
            debug!("But we're before 1.0");
            Some(VersionBump::Minor)
        }
    } else if changes.has("feat") {
        Some(VersionBump::Minor)
    } else if changes.has("fix") {
        Some(VersionBump::Patch)
    } else {
        None
    }
}

/// Apply [bump_for] to `version`
pub fn next_version_from_changes(changes: &ChangeSet, version: &semver::Version) -> semver::Version {
    match bump_for(changes, version) {
        Some(bump) => bump.apply(version),
        None => version.clone(),
    }
}

/// True when no tracked file differs from HEAD
///
/// Untracked files only disqualify the tree when `allow_untracked` is false.
pub fn is_clean(status: &[FileStatus], allow_untracked: bool) -> bool {
    status.iter().all(|file| {
        debug!(
            file = %file.path,
            worktree_status = ?file.worktree,
            staging_status = ?file.index,
            "File status"
        );
        file.index == FileState::Unmodified
            && (file.worktree == FileState::Unmodified
                || (allow_untracked && file.worktree == FileState::Untracked))
    })
}

/// Prerelease label marking a build from a modified working tree
fn dirty_label(head: Oid) -> Prerelease {
    let id = short_id(head);
    Prerelease::new(&format!("dirty.{}", id))
        .or_else(|_| Prerelease::new(&format!("dirty-{}", id)))
        .unwrap_or(Prerelease::EMPTY)
}

/// Next version from a baseline, the collected changes and tree state
///
/// The baseline loses its prerelease and build metadata before bumping. A
/// dirty tree adds a minor bump on top and labels the result
/// `dirty.<short head id>`.
pub fn next_version(
    base: &Version,
    changes: &ChangeSet,
    clean: bool,
    head: Oid,
) -> semver::Version {
    let mut next = base.semver.clone();
    next.pre = Prerelease::EMPTY;
    next.build = BuildMetadata::EMPTY;

    debug!(base_version = %next, "Base version");

    next = next_version_from_changes(changes, &next);

    if !clean {
        next = VersionBump::Minor.apply(&next);
        next.pre = dirty_label(head);
    }

    next
}

/// [next_version] with tree state and HEAD read from `repo`
pub fn find_next_version<R: Repository + ?Sized>(
    repo: &R,
    base: &Version,
    changes: &ChangeSet,
    allow_untracked: bool,
) -> Result<semver::Version> {
    let status = {
        let _span = debug_span!("getting_worktree_status").entered();
        repo.worktree_status()?
    };
    let head = repo.head_commit_id()?;

    let clean = is_clean(&status, allow_untracked);
    debug!(clean, "working directory clean status");

    Ok(next_version(base, changes, clean, head))
}

fn replace_version<'a>(line: &'a [u8], new_version: &str) -> Cow<'a, [u8]> {
    EMBEDDED_VERSION.replace(line, |caps: &Captures| {
        let mut replacement = caps[1].to_vec();
        replacement.extend_from_slice(new_version.as_bytes());
        replacement
    })
}

/// Rewrite the first version on every line of `path` to `new_version`
///
/// Lines are handled as raw bytes, so text in any encoding and its line
/// endings come through unchanged. Output goes to a temporary file next to the original which then replaces
/// it in one rename; on any failure the original is left untouched.
pub fn replace_in_file<P: AsRef<Path>>(path: P, new_version: &semver::Version) -> Result<()> {
    let path = path.as_ref();
    let io_err = |e: std::io::Error| ChangetoolError::file_io(path, e);
    let new_version = new_version.to_string();

    debug!(file = %path.display(), version = %new_version, "Replacing version");

    let input = File::open(path).map_err(io_err)?;
    let permissions = input.metadata().map_err(io_err)?.permissions();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut reader = BufReader::new(input);
        let mut out = BufWriter::new(tmp.as_file_mut());
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).map_err(io_err)? == 0 {
                break;
            }
            out.write_all(&replace_version(&line, &new_version))
                .map_err(io_err)?;
        }
        out.flush().map_err(io_err)?;
    }

    fs::set_permissions(tmp.path(), permissions).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}
