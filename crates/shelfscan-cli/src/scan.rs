//! `scan` command: live intake session against the configured OCR service.

use std::path::PathBuf;

use shelfscan_intake::{run_intake_session, CapturedImage, OcrClient};

/// Loads every image, runs one session over them in argument order, and
/// prints the resulting `IntakeReview` as JSON.
///
/// # Errors
///
/// Returns an error if the OCR client cannot be built or an image file cannot
/// be read. Per-image extraction failures are reported in the review, not
/// propagated.
pub(crate) async fn run_scan(
    config: &shelfscan_core::AppConfig,
    images: &[PathBuf],
    provider: Option<&str>,
) -> anyhow::Result<()> {
    let mut client = OcrClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build OCR client: {e}"))?;
    if let Some(label) = provider {
        client = client.with_default_provider(label);
    }

    let mut captured = Vec::with_capacity(images.len());
    for path in images {
        captured.push(CapturedImage::from_path(path).await?);
    }

    tracing::info!(
        images = captured.len(),
        endpoint = %client.extract_url(),
        "starting intake session"
    );
    let review = run_intake_session(&client, &captured).await;

    if let Some(warning) = review.warning() {
        eprintln!("warning: {warning}");
        for failure in &review.failures {
            eprintln!("  #{} {}: {}", failure.index, failure.label, failure.reason);
        }
    }
    println!("{}", serde_json::to_string_pretty(&review)?);

    Ok(())
}
