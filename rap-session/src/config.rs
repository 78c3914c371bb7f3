//! Configuration for a RAP session.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use rap_advisor::AdvisorConfig;

use crate::types::{Result, SessionError};

/// Configuration for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session ID
    pub session_id: String,
    /// Threat monitor timing
    pub monitor: MonitorConfig,
    /// Reputation constants
    pub reputation: ReputationConfig,
    /// Advisor settings
    pub advisor: AdvisorConfig,
    /// Preload the demo split sheets and payout ledger
    pub seed_demo_data: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            monitor: MonitorConfig::default(),
            reputation: ReputationConfig::default(),
            advisor: AdvisorConfig::default(),
            seed_demo_data: false,
        }
    }
}

impl SessionConfig {
    /// Create a new config with session ID.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Default::default()
        }
    }

    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| SessionError::Config(e.to_string()))
    }

    /// Load config from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SessionError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| SessionError::Config(e.to_string()))
    }
}

/// Threat monitor timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between intrusion polls
    pub poll_interval_secs: u64,
    /// Seconds the status stays `REACTIVE` after a detection
    pub reactive_dwell_secs: u64,
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn reactive_dwell(&self) -> Duration {
        Duration::from_secs(self.reactive_dwell_secs)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 15,
            reactive_dwell_secs: 5,
        }
    }
}

/// Reputation constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationConfig {
    /// Score after onboarding
    pub starting_score: u32,
    /// Rank after onboarding
    pub starting_rank: String,
    /// Compliance rate after onboarding
    pub compliance_rate: u32,
    /// Score bonus per split created
    pub split_bonus: u32,
    /// Score bonus per low-risk audit
    pub audit_bonus: u32,
    /// Audits scoring strictly below this earn the bonus
    pub low_risk_threshold: f64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            starting_score: 820,
            starting_rank: "Elite Sovereign".to_string(),
            compliance_rate: 100,
            split_bonus: 5,
            audit_bonus: 10,
            low_risk_threshold: 4.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.monitor.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.monitor.reactive_dwell(), Duration::from_secs(5));
        assert_eq!(config.reputation.starting_score, 820);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = SessionConfig::new("test-session");
        let yaml = config.to_yaml().unwrap();
        let parsed = SessionConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.session_id, "test-session");
        assert_eq!(parsed.reputation.starting_rank, "Elite Sovereign");
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "session_id: s-1\nmonitor:\n  poll_interval_secs: 2\nseed_demo_data: true\n";
        let config = SessionConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.monitor.poll_interval_secs, 2);
        assert_eq!(config.monitor.reactive_dwell_secs, 5);
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_missing_file() {
        let result = SessionConfig::from_yaml_file("/nonexistent/rap.yaml");
        assert!(matches!(result, Err(SessionError::Config(_))));
    }
}
