use crate::changes::{TypeTag, DEFAULT_ORDER};
use crate::error::{ChangetoolError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory and the user config directory
pub const CONFIG_FILE_NAME: &str = "changetool.toml";

/// Represents the complete configuration for changetool.
///
/// Every value is optional in the file; command-line flags override it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub semver: SemverConfig,
}

fn default_max_commits() -> usize {
    1000
}

fn default_type() -> String {
    "fix".to_string()
}

fn default_guess() -> bool {
    true
}

fn default_order() -> Vec<String> {
    DEFAULT_ORDER.iter().map(|t| t.to_string()).collect()
}

/// Settings shared by every command that walks history.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogConfig {
    #[serde(default = "default_max_commits")]
    pub max_commits: usize,

    /// Type for commits without a conventional header
    #[serde(default = "default_type")]
    pub default_type: String,

    /// Guess the type of header-less commits from the files they touched
    #[serde(default = "default_guess")]
    pub guess: bool,

    /// Section order of the rendered changelog
    #[serde(default = "default_order")]
    pub order: Vec<String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            max_commits: default_max_commits(),
            default_type: default_type(),
            guess: default_guess(),
            order: default_order(),
        }
    }
}

impl ChangelogConfig {
    pub fn order_tags(&self) -> Vec<TypeTag> {
        self.order.iter().map(TypeTag::new).collect()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct SemverConfig {
    /// Untracked files do not make the working tree dirty
    #[serde(default)]
    pub allow_untracked: bool,
}

impl Config {
    fn validate(self) -> Result<Self> {
        if self.changelog.default_type.trim().is_empty() {
            return Err(ChangetoolError::config("changelog.default_type must not be empty"));
        }
        if self.changelog.max_commits == 0 {
            return Err(ChangetoolError::config("changelog.max_commits must be positive"));
        }
        Ok(self)
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![Path::new(".").join(CONFIG_FILE_NAME)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(CONFIG_FILE_NAME));
    }
    paths
}

/// Parse a configuration document
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str::<Config>(content)
        .map_err(|e| ChangetoolError::config(e.to_string()))?
        .validate()
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `changetool.toml` in current directory
/// 3. `changetool.toml` in user config directory
/// 4. Default configuration if no file found
///
/// An explicit path that does not exist is an error; a file that exists but
/// cannot be parsed is always an error.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => match candidate_paths().into_iter().find(|p| p.exists()) {
            Some(path) => path,
            None => {
                debug!("No configuration file found, using defaults");
                return Ok(Config::default());
            }
        },
    };

    debug!(file = %path.display(), "Loading configuration");
    let content = fs::read_to_string(&path).map_err(|e| ChangetoolError::file_io(&path, e))?;
    parse_config(&content)
}
