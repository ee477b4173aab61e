use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::Token;
use crate::error::TimesheetError;
use crate::providers::gitlab::{
    BuildOptions, ClientOptions, DEFAULT_EXCLUDED_BRANCHES, DEFAULT_LINK_PLACEHOLDER,
    DEFAULT_WORKDAY_HOURS,
};
use crate::report::User;

const CONFIG_FILE_STEM: &str = "timesheet";

/// Configuration file structure for the timesheet builder.
///
/// Holds the GitLab connection, the user a report is built for and the
/// report heuristics. Loaded from the working directory, the user config
/// directory or an explicit path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub gitlab: GitLabConfig,

    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitLabConfig {
    /// GitLab personal access token
    pub token: Option<String>,

    /// GitLab instance base URL
    #[serde(default = "default_gitlab_base_url")]
    pub base_url: String,

    /// REST API prefix relative to the base URL
    #[serde(default = "default_api_path")]
    pub api_path: String,

    /// Retries for connection errors, 429 and 5xx responses
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retries in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Page size for the events feed
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserConfig {
    /// Owner id stamped on built reports
    #[serde(default)]
    pub id: i64,

    /// GitLab user id whose activity is read
    pub gitlab_id: Option<u64>,

    /// Minutes east of UTC
    #[serde(default)]
    pub timezone_offset: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    /// Pushes to these branches never count as task work
    #[serde(default = "default_excluded_branches")]
    pub excluded_branches: Vec<String>,

    /// Upper bound for one report build
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Link cell text when commit links cannot be resolved
    #[serde(default = "default_link_placeholder")]
    pub link_placeholder: String,

    /// Hours credited to a lone deliverable of the day
    #[serde(default = "default_workday_hours")]
    pub workday_hours: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
    Csv,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_gitlab_base_url(),
            api_path: default_api_path(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            per_page: default_per_page(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            excluded_branches: default_excluded_branches(),
            timeout_secs: default_timeout_secs(),
            link_placeholder: default_link_placeholder(),
            workday_hours: default_workday_hours(),
        }
    }
}

fn default_gitlab_base_url() -> String {
    "https://gitlab.com".to_string()
}

fn default_api_path() -> String {
    "api/v4/".to_string()
}

fn default_max_retries() -> u32 {
    ClientOptions::default().max_retries
}

fn default_retry_delay_ms() -> u64 {
    u64::try_from(ClientOptions::default().retry_delay.as_millis()).unwrap_or(1000)
}

fn default_per_page() -> usize {
    ClientOptions::default().per_page
}

fn default_excluded_branches() -> Vec<String> {
    DEFAULT_EXCLUDED_BRANCHES
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_link_placeholder() -> String {
    DEFAULT_LINK_PLACEHOLDER.to_string()
}

fn default_workday_hours() -> f64 {
    DEFAULT_WORKDAY_HOURS
}

impl GitLabConfig {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            per_page: self.per_page,
        }
    }
}

impl ReportConfig {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            excluded_branches: self.excluded_branches.clone(),
            workday_hours: self.workday_hours,
            link_placeholder: self.link_placeholder.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./timesheet.toml
    /// 3. ./timesheet.json
    /// 4. ./timesheet.yaml
    /// 5. ./timesheet.yml
    /// 6. `<config dir>/timesheet/timesheet.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if path.exists() {
                return Self::load_from_path(path);
            }
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let candidates = ["toml", "json", "yaml", "yml"]
            .iter()
            .map(|ext| PathBuf::from(format!("{CONFIG_FILE_STEM}.{ext}")))
            .chain(Self::user_config_path());

        for candidate in candidates {
            if candidate.exists() {
                return Self::load_from_path(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// `<config dir>/timesheet/timesheet.toml`, if the platform has a config dir.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(CONFIG_FILE_STEM)
                .join(format!("{CONFIG_FILE_STEM}.toml"))
        })
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml" | "yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// The user a report is built for.
    ///
    /// # Errors
    ///
    /// Returns [`TimesheetError::Config`] if the GitLab id or the token is missing.
    pub fn to_user(&self) -> crate::error::Result<User> {
        let gitlab_id = self
            .user
            .gitlab_id
            .ok_or_else(|| TimesheetError::Config("GitLab user id is not set".to_string()))?;

        let token = self
            .gitlab
            .token
            .as_deref()
            .map(Token::from)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| TimesheetError::Config("GitLab token is not set".to_string()))?;

        Ok(User {
            id: self.user.id,
            gitlab_id,
            token,
            timezone_offset: self.user.timezone_offset,
        })
    }
}
