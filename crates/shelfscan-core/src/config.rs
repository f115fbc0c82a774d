use std::env::VarError;

use crate::app_config::{AppConfig, Environment, LogConfig};
use crate::ConfigError;

const DEFAULT_ENV: &str = "development";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load only the logging settings (`SHELFSCAN_ENV`, `SHELFSCAN_LOG_LEVEL`).
///
/// Does not require `SHELFSCAN_OCR_URL`, so offline commands can use it.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if `SHELFSCAN_ENV` is not recognized.
pub fn load_log_config_from_env() -> Result<LogConfig, ConfigError> {
    build_log_config(&|key: &str| std::env::var(key))
}

fn build_log_config<F>(lookup: &F) -> Result<LogConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let env = parse_environment(
        &lookup("SHELFSCAN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string()),
    )?;
    let log_level =
        lookup("SHELFSCAN_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    Ok(LogConfig { env, log_level })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a
/// `HashMap` lookup instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let ocr_url = require("SHELFSCAN_OCR_URL")?;
    if !(ocr_url.starts_with("http://") || ocr_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHELFSCAN_OCR_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{ocr_url}'"),
        });
    }

    let logging = build_log_config(&lookup)?;
    let ocr_api_key = lookup("SHELFSCAN_OCR_API_KEY")
        .ok()
        .filter(|v| !v.is_empty());

    let ocr_timeout_secs = parse_u64("SHELFSCAN_OCR_TIMEOUT_SECS", "30")?;
    if ocr_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHELFSCAN_OCR_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let ocr_user_agent = or_default("SHELFSCAN_OCR_USER_AGENT", "shelfscan/0.1 (inventory-intake)");
    let ocr_max_retries = parse_u32("SHELFSCAN_OCR_MAX_RETRIES", "2")?;
    let ocr_retry_backoff_base_ms = parse_u64("SHELFSCAN_OCR_RETRY_BACKOFF_BASE_MS", "500")?;
    let ocr_default_provider = or_default("SHELFSCAN_OCR_DEFAULT_PROVIDER", "ocr");

    Ok(AppConfig {
        logging,
        ocr_url,
        ocr_api_key,
        ocr_timeout_secs,
        ocr_user_agent,
        ocr_max_retries,
        ocr_retry_backoff_base_ms,
        ocr_default_provider,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHELFSCAN_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}
