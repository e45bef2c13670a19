use crate::changes::TypeTag;
use crate::git::{CommitInfo, Repository};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

lazy_static! {
    static ref COMMIT_HEADER: Regex =
        Regex::new(r"^([a-z_][a-z0-9_]*)(?:\(([A-Za-z0-9_][A-Za-z0-9_\-./]*)\))?(!)?: +")
            .expect("commit header pattern is valid");
}

const BREAKING_MARKER: &str = "BREAKING CHANGE";

/// Conventional-commit header found at the start of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'a> {
    pub r#type: &'a str,
    /// Parsed but not used when building change sets
    pub scope: Option<&'a str>,
    pub breaking: bool,
    /// Message with the header prefix removed
    pub rest: &'a str,
}

/// Match `type[(scope)][!]: ` at the start of `message`
pub fn parse_header(message: &str) -> Option<Header<'_>> {
    let captures = COMMIT_HEADER.captures(message)?;
    let prefix = captures.get(0)?;
    let r#type = captures.get(1)?.as_str();
    let scope = captures
        .get(2)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty());
    let breaking = captures.get(3).is_some_and(|m| m.as_str() == "!");

    Some(Header {
        r#type,
        scope,
        breaking,
        rest: &message[prefix.end()..],
    })
}

/// Classification of a single commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub tag: TypeTag,
    pub message: String,
    pub breaking: bool,
}

/// Classify one commit, asking `guess` when the message has no header
pub fn classify(commit: &CommitInfo, guess: &dyn Fn(&CommitInfo) -> TypeTag) -> Classified {
    let (tag, message, marked) = match parse_header(&commit.message) {
        Some(header) => (TypeTag::new(header.r#type), header.rest, header.breaking),
        None => (guess(commit), commit.message.as_str(), false),
    };

    Classified {
        tag,
        breaking: marked || message.contains(BREAKING_MARKER),
        message: message.to_string(),
    }
}

/// Guesser that always answers `tag`
pub fn default_guess(tag: TypeTag) -> impl Fn(&CommitInfo) -> TypeTag {
    move |_| tag.clone()
}

/// Guesser that looks at the files a commit touched, answering `fallback`
/// when no rule applies
pub fn heuristic_guess<'r, R: Repository + ?Sized>(
    repo: &'r R,
    fallback: TypeTag,
) -> impl Fn(&CommitInfo) -> TypeTag + 'r {
    move |commit| {
        let guessed = match repo.commit_files(commit.id) {
            Ok(files) => standard_guess(files.as_slice()),
            Err(e) => {
                debug!(hash = %commit.short_id(), error = %e, "No statistics for commit");
                None
            }
        };

        guessed.unwrap_or_else(|| {
            debug!(hash = %commit.short_id(), "No guess for commit");
            fallback.clone()
        })
    }
}

fn is_test_file(path: &str, base: &str) -> bool {
    path.starts_with("test") || base.starts_with("test")
}

fn is_build_file(path: &str, base: &str) -> bool {
    matches!(base, "Makefile" | ".dockerignore" | ".gitignore") || path.starts_with(".github")
}

/// Guess a commit type from the paths it touched
///
/// Returns `None` when no rule applies, including for an empty path list.
pub fn standard_guess<S: AsRef<str>>(paths: &[S]) -> Option<TypeTag> {
    if paths.is_empty() {
        return None;
    }

    let mut extensions = BTreeSet::new();
    let mut all_test = true;
    let mut all_build = true;

    for path in paths {
        let path = path.as_ref();
        let file = Path::new(path);
        let base = file.file_name().and_then(|b| b.to_str()).unwrap_or(path);
        let ext = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        all_test &= is_test_file(path, base);
        all_build &= is_build_file(path, base);
        extensions.insert(ext);
    }

    let all_docs = extensions.len() == 1 && extensions.contains(".md");

    debug!(?extensions, all_docs, all_build, all_test, "Guessing type");

    if all_test {
        Some(TypeTag::new("test"))
    } else if all_build {
        Some(TypeTag::new("build"))
    } else if all_docs {
        Some(TypeTag::new("docs"))
    } else {
        None
    }
}
