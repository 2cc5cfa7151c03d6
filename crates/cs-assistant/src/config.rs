//! Assistant configuration, loadable from TOML.

use cs_maintenance::{AlertWindow, EngineSettings, RecommendationEngine, RuleTable};
use serde::Deserialize;

use crate::chat::RemoteChatConfig;

/// Top-level configuration for the assistant binary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantConfig {
    /// TOML rule catalogue. None uses the built-in catalogue.
    #[serde(default)]
    pub rules_path: Option<String>,
    /// JSON garage snapshot. None starts with demo data.
    #[serde(default)]
    pub garage_path: Option<String>,
    /// Recommendation thresholds.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Reminder alert window.
    #[serde(default)]
    pub alerts: AlertWindow,
    /// Remote chatbot backend. Enabled on localhost unless configured.
    #[serde(default)]
    pub remote: RemoteChatConfig,
}

impl AssistantConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Engine built from the configured catalogue and thresholds.
    pub fn build_engine(&self) -> anyhow::Result<RecommendationEngine> {
        let table = match &self.rules_path {
            Some(path) => RuleTable::from_file(path)?,
            None => RuleTable::default(),
        };
        Ok(RecommendationEngine::new(table, self.engine.clone()))
    }
}
