#![forbid(unsafe_code)]

use crate::tags::{CategoryRules, MatchPolicy, normalize_tag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

const DEFAULT_POPULAR_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported config extension (expected .json, .yaml or .yml)")]
    UnsupportedFormat,
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Tunables for tag matching and the popularity view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagConfig {
    pub matching: MatchPolicy,
    pub categories: CategoryRules,
    pub popular_limit: usize,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            matching: MatchPolicy::default(),
            categories: CategoryRules::default(),
            popular_limit: DEFAULT_POPULAR_LIMIT,
        }
    }
}

impl TagConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&raw)?,
            Some("yaml" | "yml") => Self::from_yaml_str(&raw)?,
            _ => return Err(ConfigError::UnsupportedFormat),
        };
        tracing::info!(path = %path.display(), "tag config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.matching.length_ratio;
        if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::Invalid("matching.length_ratio must be within [0, 1]"));
        }
        if self.popular_limit == 0 {
            return Err(ConfigError::Invalid("popular_limit must be positive"));
        }

        let fallback = self.categories.fallback.trim();
        if fallback.is_empty() {
            return Err(ConfigError::Invalid("categories.fallback must not be empty"));
        }
        let mut seen = BTreeSet::new();
        for rule in &self.categories.rules {
            let name = rule.category.trim();
            if name.is_empty() {
                return Err(ConfigError::Invalid("category name must not be empty"));
            }
            if name == fallback {
                return Err(ConfigError::Invalid("category name must differ from the fallback"));
            }
            if !seen.insert(name) {
                return Err(ConfigError::Invalid("category names must be unique"));
            }
            if rule.keywords.iter().any(|kw| normalize_tag(kw).is_empty()) {
                return Err(ConfigError::Invalid("category keywords must not be empty"));
            }
        }
        Ok(())
    }
}
