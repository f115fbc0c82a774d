//! `merge` command: offline fold of saved extraction payloads.

use std::path::PathBuf;

use shelfscan_core::FinalizedRecord;
use shelfscan_intake::{finalize, fold_all, normalize_extraction, RawExtraction};

/// Normalizes `payloads` and folds them in slice order.
pub(crate) fn merge_payloads(
    payloads: &[RawExtraction],
    default_provider: &str,
) -> FinalizedRecord {
    let extractions: Vec<_> = payloads
        .iter()
        .map(|raw| normalize_extraction(raw, default_provider))
        .collect();
    finalize(&fold_all(&extractions))
}

/// Reads each payload file, folds them in argument order, and prints the
/// finalized record as JSON.
///
/// # Errors
///
/// Returns an error if any file cannot be read or is not a valid extraction
/// payload. Nothing is printed in that case.
pub(crate) async fn run_merge(paths: &[PathBuf], default_provider: &str) -> anyhow::Result<()> {
    let mut payloads = Vec::with_capacity(paths.len());
    for path in paths {
        let body = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        let raw: RawExtraction = serde_json::from_str(&body)
            .map_err(|e| anyhow::anyhow!("invalid extraction payload in {}: {e}", path.display()))?;
        payloads.push(raw);
    }

    let record = merge_payloads(&payloads, default_provider);
    tracing::info!(
        payloads = payloads.len(),
        confidence = record.confidence,
        requires_review = record.requires_review,
        "merged extraction payloads"
    );
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}
