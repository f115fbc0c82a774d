//! Shared domain types and configuration for shelfscan.
//!
//! The intake crate folds OCR extraction passes into [`MergedRecord`]s; the
//! types they exchange live here so the CLI and any future review surface can
//! depend on them without pulling in the HTTP stack.

pub mod app_config;
pub mod config;
pub mod extraction;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, LogConfig};
pub use config::{load_app_config, load_app_config_from_env, load_log_config_from_env};
pub use extraction::{FieldExtraction, FinalizedRecord, MergedRecord};
pub use products::{FieldRule, ProductField, ProductFields};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
