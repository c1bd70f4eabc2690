use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::policy::EvaluatorFlags;
use crate::pr::DEFAULT_API_URL;

const DEFAULT_CONFIG_FILE: &str = ".pr-file-policy.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),
}

/// Run inputs, given on the command line or through the `INPUT_*` variables
/// GitHub Actions sets for an action's `with:` block.
///
/// Values are trimmed and an empty value counts as unset.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct Inputs {
    /// Regular expression tested against each changed file path
    #[arg(long, env = "INPUT_REGEX")]
    pub regex: Option<String>,

    /// Token for the GitHub API (falls back to GITHUB_TOKEN)
    #[arg(long, env = "INPUT_GITHUBTOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// "true" to allow newly added files matching the pattern
    #[arg(long, env = "INPUT_ALLOWADDEDFILES")]
    pub allow_added_files: Option<String>,

    /// Older name for --allow-added-files
    #[arg(long, env = "INPUT_ALLOWNEWFILES")]
    pub allow_new_files: Option<String>,

    /// "true" to allow removed files matching the pattern
    #[arg(long, env = "INPUT_ALLOWREMOVEDFILES")]
    pub allow_removed_files: Option<String>,

    /// "true" to allow files that only gained lines
    #[arg(long, env = "INPUT_ALLOWADDITIONS")]
    pub allow_additions: Option<String>,

    /// "true" to allow files that only lost lines
    #[arg(long, env = "INPUT_ALLOWDELETIONS")]
    pub allow_deletions: Option<String>,
}

/// Configuration loaded from .pr-file-policy.toml, then overridden by inputs.
/// Every field is optional in the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// REST API base URL. If None, falls back to GITHUB_API_URL, then api.github.com.
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    pub regex: Option<String>,

    #[serde(flatten)]
    pub flags: EvaluatorFlags,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Markdown summary file to append the outcome to
    pub summary: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `path`, or from .pr-file-policy.toml in the
    /// current directory when no path is given.
    /// Returns default config if the default file doesn't exist.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load_from(path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Overlay the inputs that are set onto the file values.
    pub fn apply_inputs(&mut self, inputs: &Inputs) {
        if let Some(regex) = input_value(&inputs.regex) {
            self.policy.regex = Some(regex.to_string());
        }
        if let Some(token) = input_value(&inputs.github_token) {
            self.github.token = Some(token.to_string());
        }

        let flags = &mut self.policy.flags;
        let allow_added = input_flag(&inputs.allow_added_files)
            .or_else(|| input_flag(&inputs.allow_new_files));
        if let Some(allow) = allow_added {
            flags.allow_added_files = allow;
        }
        if let Some(allow) = input_flag(&inputs.allow_removed_files) {
            flags.allow_removed_files = allow;
        }
        if let Some(allow) = input_flag(&inputs.allow_additions) {
            flags.allow_additions = allow;
        }
        if let Some(allow) = input_flag(&inputs.allow_deletions) {
            flags.allow_deletions = allow;
        }
    }

    pub fn require_regex(&self) -> Result<&str, ConfigError> {
        self.policy
            .regex
            .as_deref()
            .filter(|regex| !regex.is_empty())
            .ok_or(ConfigError::MissingInput("regex"))
    }

    /// Resolve the GitHub token: configured value takes precedence,
    /// falls back to GITHUB_TOKEN env var.
    pub fn require_token(&self) -> Result<String, ConfigError> {
        self.token_or(std::env::var("GITHUB_TOKEN").ok())
    }

    fn token_or(&self, fallback: Option<String>) -> Result<String, ConfigError> {
        let usable = |token: &String| !token.trim().is_empty();
        self.github
            .token
            .clone()
            .filter(usable)
            .or_else(|| fallback.filter(usable))
            .ok_or(ConfigError::MissingInput("githubToken"))
    }

    pub fn api_url(&self) -> String {
        self.github
            .api_url
            .clone()
            .or_else(|| std::env::var("GITHUB_API_URL").ok())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn flags(&self) -> EvaluatorFlags {
        self.policy.flags
    }
}

fn input_value(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Only the exact string "true" enables a flag.
fn input_flag(value: &Option<String>) -> Option<bool> {
    input_value(value).map(|v| v == "true")
}
