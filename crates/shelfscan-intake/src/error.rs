use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by extraction service (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid extraction service URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to read image {path}: {source}")]
    ImageIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
