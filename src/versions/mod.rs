//! Semantic versions: lenient tag parsing, baseline resolution and the policy
//! for the next version.

pub mod policy;

pub use policy::{
    bump_for, find_next_version, is_clean, next_version, next_version_from_changes,
    replace_in_file, VersionBump,
};

use crate::error::{ChangetoolError, Result};
use crate::git::{short_id, Repository};
use lazy_static::lazy_static;
use regex::{bytes, Regex};
use semver::{BuildMetadata, Prerelease};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, debug_span};

lazy_static! {
    static ref TAG_VERSION: Regex = Regex::new(
        r"^[vV]?([0-9]+)(?:\.([0-9]+))?(?:\.([0-9]+))?(?:-([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?$"
    )
    .expect("tag version pattern is valid");

    /// A full `major.minor.patch` version embedded anywhere in a line of bytes
    pub static ref EMBEDDED_VERSION: bytes::Regex = bytes::Regex::new(
        r"(v?)([0-9]+)\.([0-9]+)\.([0-9]+)(?:-[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?(?:\+[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*)?"
    )
    .expect("embedded version pattern is valid");
}

/// A semantic version, remembering the tag it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub semver: semver::Version,
    pub tag: Option<String>,
}

impl Version {
    /// `0.0.0` with no originating tag
    pub fn zero() -> Self {
        Version {
            semver: semver::Version::new(0, 0, 0),
            tag: None,
        }
    }

    pub fn untagged(semver: semver::Version) -> Self {
        Version { semver, tag: None }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.semver)
    }
}

/// Parse a tag name as a semantic version
///
/// Accepts an optional `v`/`V` prefix and missing minor or patch components
/// (`v0.1` is `0.1.0`). Prerelease and build metadata must be valid semver.
pub fn parse_tag_version(tag: &str) -> Option<semver::Version> {
    let captures = TAG_VERSION.captures(tag)?;
    let number = |i: usize| -> Option<u64> {
        match captures.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let mut version = semver::Version::new(number(1)?, number(2)?, number(3)?);
    if let Some(pre) = captures.get(4) {
        version.pre = Prerelease::new(pre.as_str()).ok()?;
    }
    if let Some(build) = captures.get(5) {
        version.build = BuildMetadata::new(build.as_str()).ok()?;
    }

    Some(version)
}

/// Most recent version tag reachable from HEAD
///
/// Walks history newest first and stops at the first commit carrying any tag
/// that parses as a version; the greatest such version on that commit wins.
/// With no such tag the result is [Version::zero].
pub fn find_previous_version_from_tag<R: Repository + ?Sized>(repo: &R) -> Result<Version> {
    let _span = debug_span!("finding_previous_version").entered();
    debug!("finding previous version by examining tags");

    let reverse_tags = repo.reverse_tag_map();

    for commit in repo.log_commits()? {
        let commit = commit?;
        let Some(names) = reverse_tags.get(&commit.id) else {
            continue;
        };

        let best = names
            .iter()
            .filter_map(|name| parse_tag_version(name).map(|v| (v, name)))
            .max_by(|a, b| a.0.cmp(&b.0));

        if let Some((semver, name)) = best {
            debug!(hash = %short_id(commit.id), tag = %name, version = %semver, "Found version tag");
            return Ok(Version {
                semver,
                tag: Some(name.clone()),
            });
        }
    }

    debug!("no version tag found");
    Ok(Version::zero())
}

/// First full version found in a file, scanning line by line
///
/// A file without any version yields [Version::zero].
pub fn find_previous_version_from_file<P: AsRef<Path>>(path: P) -> Result<Version> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ChangetoolError::file_io(path, e))?;

    for line in BufReader::new(file).split(b'\n') {
        let line = line.map_err(|e| ChangetoolError::file_io(path, e))?;
        let Some(found) = EMBEDDED_VERSION.find(&line) else {
            continue;
        };

        let text = std::str::from_utf8(found.as_bytes()).ok();
        if let Some(version) = text.and_then(parse_tag_version) {
            debug!(file = %path.display(), version = %version, "Found version in file");
            return Ok(Version::untagged(version));
        }
    }

    Ok(Version::zero())
}
