//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{assistant, endpoints, history, routing, search};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation
    #[default]
    Development,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// External classifier configuration
    #[serde(default)]
    pub classifier: ClassifierSettings,

    /// Multi-source price search configuration
    #[serde(default)]
    pub search: SearchSettings,

    /// Conversation context store configuration
    #[serde(default)]
    pub context: ContextSettings,

    /// Assistant surface configuration
    #[serde(default)]
    pub assistant: AssistantSettings,
}

/// External classifier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Enable the language-model classifier. When disabled (or when the API
    /// key is empty) routing uses the rule-based scorer only.
    #[serde(default)]
    pub enabled: bool,

    /// API key; typically provided via SHOPSAVER_CLASSIFIER__API_KEY
    #[serde(default)]
    pub api_key: String,

    /// OpenAI-compatible API base
    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_classifier_model")]
    pub model: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,
}

fn default_classifier_endpoint() -> String {
    endpoints::OPENAI_DEFAULT.to_string()
}

fn default_classifier_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_classifier_timeout() -> u64 {
    routing::CLASSIFIER_TIMEOUT_SECS
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            endpoint: default_classifier_endpoint(),
            model: default_classifier_model(),
            timeout_secs: default_classifier_timeout(),
        }
    }
}

impl ClassifierSettings {
    /// Whether a usable classifier is configured
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.api_key.is_empty()
    }
}

/// Price search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Per-source result limit
    #[serde(default = "default_per_source_limit")]
    pub per_source_limit: usize,

    /// Per-source timeout (seconds)
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

fn default_per_source_limit() -> usize {
    search::DEFAULT_PER_SOURCE_LIMIT
}

fn default_source_timeout() -> u64 {
    search::SOURCE_TIMEOUT_SECS
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            per_source_limit: default_per_source_limit(),
            timeout_secs: default_source_timeout(),
        }
    }
}

/// Conversation context settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSettings {
    /// Per-user history cap
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Turns sent to the classifier as context
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Idle-user eviction age (seconds)
    #[serde(default = "default_idle_eviction")]
    pub idle_eviction_secs: u64,
}

fn default_max_turns() -> usize {
    history::MAX_TURNS_PER_USER
}

fn default_context_window() -> usize {
    routing::CONTEXT_WINDOW_TURNS
}

fn default_idle_eviction() -> u64 {
    history::IDLE_EVICTION_SECS
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            context_window: default_context_window(),
            idle_eviction_secs: default_idle_eviction(),
        }
    }
}

/// Assistant surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantSettings {
    /// Bound on concurrently processed inbound messages
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Response length cap (characters)
    #[serde(default = "default_max_response")]
    pub max_response_chars: usize,
}

fn default_max_concurrent() -> usize {
    assistant::DEFAULT_MAX_CONCURRENT
}

fn default_max_response() -> usize {
    assistant::MAX_RESPONSE_CHARS
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            max_response_chars: default_max_response(),
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from an optional TOML file layered with environment
    /// variables (prefix `SHOPSAVER`, `__` as section separator).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let config = builder
            .add_source(Environment::with_prefix("SHOPSAVER").separator("__"))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;

        tracing::info!(
            environment = ?settings.environment,
            classifier_enabled = settings.classifier.is_configured(),
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.context.max_turns == 0 {
            return Err(ConfigError::InvalidValue {
                field: "context.max_turns".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.context.context_window > self.context.max_turns {
            return Err(ConfigError::InvalidValue {
                field: "context.context_window".to_string(),
                message: format!(
                    "cannot exceed max_turns ({})",
                    self.context.max_turns
                ),
            });
        }

        if self.classifier.timeout_secs == 0 || self.classifier.timeout_secs > 60 {
            return Err(ConfigError::InvalidValue {
                field: "classifier.timeout_secs".to_string(),
                message: "must be between 1 and 60".to_string(),
            });
        }

        if self.search.timeout_secs == 0 || self.search.timeout_secs > 60 {
            return Err(ConfigError::InvalidValue {
                field: "search.timeout_secs".to_string(),
                message: "must be between 1 and 60".to_string(),
            });
        }

        if self.search.per_source_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.per_source_limit".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.assistant.max_concurrent == 0 {
            return Err(ConfigError::InvalidValue {
                field: "assistant.max_concurrent".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.environment.is_production() && self.classifier.enabled
            && self.classifier.api_key.is_empty()
        {
            return Err(ConfigError::InvalidValue {
                field: "classifier.api_key".to_string(),
                message: "required when the classifier is enabled in production"
                    .to_string(),
            });
        }

        Ok(())
    }
}
