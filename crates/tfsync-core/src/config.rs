//! Orchestrator configuration

use serde::{Deserialize, Serialize};

/// Default number of concurrent staging writes
pub const DEFAULT_STAGING_CONCURRENCY: usize = 2;

/// Default number of concurrent batch-test submissions (sequential)
pub const DEFAULT_TEST_CONCURRENCY: usize = 1;

/// Settings for one test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Workspace the local project targets; used to match import claims
    pub workspace_id: String,
    /// Worker count for staging and version resolution
    pub staging_concurrency: usize,
    /// Worker count for batch-test submission
    pub test_concurrency: usize,
}

impl OrchestratorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_workspace_id(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = workspace_id.into();
        self
    }

    /// Zero is treated as one
    #[inline]
    #[must_use]
    pub fn with_staging_concurrency(mut self, n: usize) -> Self {
        self.staging_concurrency = n.max(1);
        self
    }

    /// Zero is treated as one
    #[inline]
    #[must_use]
    pub fn with_test_concurrency(mut self, n: usize) -> Self {
        self.test_concurrency = n.max(1);
        self
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            workspace_id: String::new(),
            staging_concurrency: DEFAULT_STAGING_CONCURRENCY,
            test_concurrency: DEFAULT_TEST_CONCURRENCY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_small_and_sequential_for_tests() {
        let config = OrchestratorConfig::new();
        assert_eq!(config.staging_concurrency, 2);
        assert_eq!(config.test_concurrency, 1);
        assert!(config.workspace_id.is_empty());
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let config = OrchestratorConfig::new()
            .with_staging_concurrency(0)
            .with_test_concurrency(0);
        assert_eq!(config.staging_concurrency, 1);
        assert_eq!(config.test_concurrency, 1);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: OrchestratorConfig =
            serde_json::from_str(r#"{"workspace_id":"ws-1"}"#).unwrap();
        assert_eq!(config.workspace_id, "ws-1");
        assert_eq!(config.staging_concurrency, DEFAULT_STAGING_CONCURRENCY);
    }
}
