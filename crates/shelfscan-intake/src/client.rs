use std::time::Duration;

use reqwest::{Client, Url};
use shelfscan_core::{AppConfig, FieldExtraction};

use crate::error::IntakeError;
use crate::normalize::normalize_extraction;
use crate::rate_limit::retry_with_backoff;
use crate::source::ExtractionSource;
use crate::types::{CapturedImage, RawExtraction};

const EXTRACT_PATH: &str = "v1/extract";

/// HTTP client for the remote OCR/vision extraction service.
///
/// Each call uploads one image as the raw request body to
/// `POST {base_url}/v1/extract` and expects
/// `{ "fields": {...}, "confidence": n, "provider": "..." }` back.
///
/// Transient errors (429, network failures) are retried with exponential
/// backoff up to `max_retries` additional attempts; other failures surface
/// immediately so the session can move on to the next image.
pub struct OcrClient {
    client: Client,
    extract_url: Url,
    api_key: Option<String>,
    default_provider: String,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay for exponential backoff: `backoff_base_ms * 2^(attempt-1)`.
    backoff_base_ms: u64,
}

impl OcrClient {
    /// Creates a client with the given timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`IntakeError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, IntakeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let extract_url = Url::parse(&normalised)
            .and_then(|base| base.join(EXTRACT_PATH))
            .map_err(|e| IntakeError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            extract_url,
            api_key: None,
            default_provider: "ocr".to_owned(),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// See [`OcrClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, IntakeError> {
        let client = Self::new(
            &config.ocr_url,
            config.ocr_timeout_secs,
            &config.ocr_user_agent,
            config.ocr_max_retries,
            config.ocr_retry_backoff_base_ms,
        )?
        .with_default_provider(&config.ocr_default_provider);

        Ok(match &config.ocr_api_key {
            Some(key) => client.with_api_key(key),
            None => client,
        })
    }

    /// Sends `key` as a bearer token on every request.
    #[must_use]
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_owned());
        self
    }

    /// Provider label for responses that do not name one.
    #[must_use]
    pub fn with_default_provider(mut self, provider: &str) -> Self {
        provider.clone_into(&mut self.default_provider);
        self
    }

    #[must_use]
    pub fn extract_url(&self) -> &Url {
        &self.extract_url
    }

    /// Uploads `image` and returns the unvalidated service payload.
    ///
    /// # Errors
    ///
    /// - [`IntakeError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`IntakeError::UnexpectedStatus`]: any other non-2xx status (not retried).
    /// - [`IntakeError::Http`]: network or TLS failure after all retries exhausted.
    /// - [`IntakeError::Deserialize`]: body is not a valid extraction payload.
    pub async fn extract_raw(&self, image: &CapturedImage) -> Result<RawExtraction, IntakeError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let mut request = self
                .client
                .post(self.extract_url.clone())
                .header(reqwest::header::CONTENT_TYPE, image.content_type)
                .body(image.bytes.clone());
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(1);
                return Err(IntakeError::RateLimited { retry_after_secs });
            }

            if !status.is_success() {
                return Err(IntakeError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: self.extract_url.to_string(),
                });
            }

            let body = response.text().await?;
            serde_json::from_str::<RawExtraction>(&body).map_err(|e| IntakeError::Deserialize {
                context: format!("extraction response for {}", image.label),
                source: e,
            })
        })
        .await
    }
}

impl ExtractionSource for OcrClient {
    async fn extract(&self, image: &CapturedImage) -> Result<FieldExtraction, IntakeError> {
        let raw = self.extract_raw(image).await?;
        let extraction = normalize_extraction(&raw, &self.default_provider);
        tracing::debug!(
            image = %image.label,
            provider = %extraction.provider,
            confidence = extraction.confidence,
            fields = extraction.fields.len(),
            "extraction pass complete"
        );
        Ok(extraction)
    }
}
