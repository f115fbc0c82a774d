#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl Environment {
    /// Production logs go to a collector, so they are written without ANSI
    /// color codes.
    #[must_use]
    pub fn ansi_logs(&self) -> bool {
        !matches!(self, Environment::Production)
    }
}

/// Logging settings, loadable on their own for commands that never talk to
/// the extraction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub env: Environment,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub logging: LogConfig,
    /// Base URL of the extraction service, e.g. `https://ocr.internal`.
    pub ocr_url: String,
    pub ocr_api_key: Option<String>,
    pub ocr_timeout_secs: u64,
    pub ocr_user_agent: String,
    pub ocr_max_retries: u32,
    pub ocr_retry_backoff_base_ms: u64,
    /// Provider label used when the service omits one from its response.
    pub ocr_default_provider: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("logging", &self.logging)
            .field("ocr_url", &self.ocr_url)
            .field(
                "ocr_api_key",
                &self.ocr_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("ocr_timeout_secs", &self.ocr_timeout_secs)
            .field("ocr_user_agent", &self.ocr_user_agent)
            .field("ocr_max_retries", &self.ocr_max_retries)
            .field("ocr_retry_backoff_base_ms", &self.ocr_retry_backoff_base_ms)
            .field("ocr_default_provider", &self.ocr_default_provider)
            .finish()
    }
}
