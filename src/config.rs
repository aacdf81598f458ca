use crate::analytics::AnalyticsConfig;
use crate::error::AppError;
use crate::workflow::{StageVocabulary, WorkflowStage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Engine configuration as loaded from file and environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Analytics engine tuning
    pub analytics: AnalyticsSettings,

    /// Per-tenant stage vocabulary extensions: stage name (snake_case) to
    /// additional recognized raw status strings
    #[serde(default)]
    pub vocabulary: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    /// Cache TTL for generated reports (seconds)
    pub cache_ttl: u64,

    /// Minimum paired samples before correlations are reported
    pub min_correlation_samples: usize,
}

impl Settings {
    /// Load configuration from defaults, an optional file and the environment.
    ///
    /// Layering: built-in defaults, then the TOML file named by `CONFIG_PATH`
    /// (default `config/default.toml`, optional), then environment variables
    /// with the `FLOW_ANALYTICS` prefix (e.g.
    /// `FLOW_ANALYTICS__ANALYTICS__CACHE_TTL=60`).
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(
                config::Environment::with_prefix("FLOW_ANALYTICS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Convert into the engine's runtime configuration.
    ///
    /// Vocabulary entries extend the built-in synonym table; an unknown stage
    /// name is a configuration error.
    pub fn into_analytics_config(self) -> Result<AnalyticsConfig, AppError> {
        let mut vocabulary = StageVocabulary::default();

        for (stage_name, synonyms) in &self.vocabulary {
            let stage = WorkflowStage::from_str(stage_name).map_err(|_| {
                AppError::Configuration(format!("unknown workflow stage: {stage_name}"))
            })?;
            let values: Vec<&str> = synonyms.iter().map(String::as_str).collect();
            vocabulary.extend(stage, &values);
        }

        Ok(AnalyticsConfig {
            vocabulary,
            cache_ttl: self.analytics.cache_ttl,
            min_correlation_samples: self.analytics.min_correlation_samples,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            analytics: AnalyticsSettings {
                cache_ttl: 300,
                min_correlation_samples: 2,
            },
            vocabulary: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_extension_applied() {
        let mut settings = Settings::default();
        settings
            .vocabulary
            .insert("in_qa".to_string(), vec!["Validation".to_string()]);

        let config = settings.into_analytics_config().unwrap();
        assert!(config.vocabulary.matches(WorkflowStage::InQa, "validation"));
        // built-ins survive
        assert!(config.vocabulary.matches(WorkflowStage::InQa, "dev test"));
    }

    #[test]
    fn test_unknown_stage_is_configuration_error() {
        let mut settings = Settings::default();
        settings
            .vocabulary
            .insert("in_limbo".to_string(), vec!["??".to_string()]);

        let err = settings.into_analytics_config().unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }
}
