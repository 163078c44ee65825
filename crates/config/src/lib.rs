//! Configuration for the shopping assistant
//!
//! Settings are loaded from an optional TOML file layered with
//! `SHOPSAVER_`-prefixed environment variables, then validated. Tuned
//! numeric contract values live in [`constants`].

pub mod constants;
pub mod settings;

pub use settings::{
    AssistantSettings, ClassifierSettings, ContextSettings, RuntimeEnvironment, SearchSettings,
    Settings,
};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
