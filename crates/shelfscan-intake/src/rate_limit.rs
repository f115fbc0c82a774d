//! Retry utilities for the extraction-service client.
//!
//! Transient failures (429, network errors) are retried with exponential
//! backoff and jitter. Everything else is returned immediately: a bad status or
//! an unparseable body will not improve on a second attempt, and the session
//! driver already tolerates a failed image.

use std::future::Future;
use std::time::Duration;

use crate::error::IntakeError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` if `err` represents a transient condition worth retrying.
///
/// Retriable:
/// - [`IntakeError::RateLimited`]: HTTP 429.
/// - [`IntakeError::Http`]: timeout or connection failure.
///
/// Not retriable:
/// - [`IntakeError::UnexpectedStatus`], [`IntakeError::Deserialize`],
///   [`IntakeError::InvalidBaseUrl`], [`IntakeError::ImageIo`].
pub(crate) fn is_retriable(err: &IntakeError) -> bool {
    match err {
        IntakeError::RateLimited { .. } => true,
        IntakeError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        IntakeError::UnexpectedStatus { .. }
        | IntakeError::Deserialize { .. }
        | IntakeError::InvalidBaseUrl { .. }
        | IntakeError::ImageIo { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Attempt | Sleep before next attempt |
/// |---------|---------------------------|
/// | 1       | 500 ms × 2⁰ ± 25 % jitter |
/// | 2       | 500 ms × 2¹ ± 25 % jitter |
/// | 3       | 500 ms × 2² ± 25 % jitter |
///
/// A `RateLimited` error with a `Retry-After` longer than the computed delay
/// waits for the server's value instead. Delay is capped at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, IntakeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, IntakeError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;

                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (computed as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let server_hint = match &err {
                    IntakeError::RateLimited { retry_after_secs } => {
                        retry_after_secs.saturating_mul(1_000)
                    }
                    _ => 0,
                };
                let delay_ms = jittered.max(server_hint).min(MAX_DELAY_MS);

                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient extraction error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
