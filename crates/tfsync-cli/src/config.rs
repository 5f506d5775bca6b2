//! CLI configuration: TOML file plus environment overrides

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tfsync_core::OrchestratorConfig;
use tfsync_remote::HttpStoreConfig;

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "tfsync.toml";

pub const ENV_API_URL: &str = "TFSYNC_API_URL";
pub const ENV_API_TOKEN: &str = "TFSYNC_API_TOKEN";
pub const ENV_WORKSPACE_ID: &str = "TFSYNC_WORKSPACE_ID";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    #[serde(flatten)]
    pub orchestrator: OrchestratorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            orchestrator: OrchestratorConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] when it exists,
    /// then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Fails when an explicit file is missing, a file does not parse, or no
    /// API URL is configured.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Override fields from non-empty variables returned by `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(url) = get(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(token) = get(ENV_API_TOKEN) {
            self.api_token = Some(token);
        }
        if let Some(workspace) = get(ENV_WORKSPACE_ID) {
            self.orchestrator.workspace_id = workspace;
        }
    }

    /// # Errors
    ///
    /// Fails when no API URL is set.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            bail!("no API URL configured: set api_url in {DEFAULT_CONFIG_FILE} or {ENV_API_URL}");
        }
        Ok(())
    }

    #[must_use]
    pub fn store_config(&self) -> HttpStoreConfig {
        let mut store = HttpStoreConfig::new(&self.api_url)
            .with_timeout(Duration::from_secs(self.timeout_secs.max(1)));
        if let Some(token) = &self.api_token {
            store = store.with_token(token);
        }
        store
    }

    #[must_use]
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::new()
            .with_workspace_id(&self.orchestrator.workspace_id)
            .with_staging_concurrency(self.orchestrator.staging_concurrency)
            .with_test_concurrency(self.orchestrator.test_concurrency)
    }
}
