//! Intake session driver.
//!
//! One session per product being scanned. Images go to the extraction source
//! strictly one at a time in capture order, and each result is folded into the
//! session's [`MergedRecord`] before the next image is sent.
//! [`crate::merge::fold`] is order-dependent, so the driver is an ordered
//! stream folded into a single accumulator with at most one call in flight.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use shelfscan_core::{FieldExtraction, FinalizedRecord, MergedRecord};
use uuid::Uuid;

use crate::error::IntakeError;
use crate::merge::{finalize, fold};
use crate::source::ExtractionSource;
use crate::types::CapturedImage;

/// Message shown to the operator when at least one image failed.
pub const PARTIAL_FAILURE_WARNING: &str = "could not extract data from one or more images";

/// An image whose extraction call failed outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageFailure {
    /// Zero-based capture position.
    pub index: usize,
    pub label: String,
    pub reason: String,
}

/// Everything the review form needs once processing is done.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeReview {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub review: FinalizedRecord,
    /// Images sent to the extraction source.
    pub attempted: usize,
    /// Images whose extraction succeeded and was folded.
    pub extracted: usize,
    pub failures: Vec<ImageFailure>,
}

impl IntakeReview {
    /// Operator-facing warning, present when any image failed.
    #[must_use]
    pub fn warning(&self) -> Option<&'static str> {
        (!self.failures.is_empty()).then_some(PARTIAL_FAILURE_WARNING)
    }
}

/// Mutable state of one in-progress intake session.
///
/// Dropping the session abandons it; nothing is persisted.
#[derive(Debug)]
pub struct IntakeSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    record: MergedRecord,
    attempted: usize,
    extracted: usize,
    failures: Vec<ImageFailure>,
}

impl Default for IntakeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            record: MergedRecord::new(),
            attempted: 0,
            extracted: 0,
            failures: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn record(&self) -> &MergedRecord {
        &self.record
    }

    /// Folds a successful extraction pass into the running record.
    pub fn record_extraction(&mut self, extraction: &FieldExtraction) {
        self.attempted += 1;
        self.extracted += 1;
        let record = std::mem::take(&mut self.record);
        self.record = fold(record, extraction);
    }

    /// Notes that the image at `index` could not be processed. The running
    /// record is left as it was.
    pub fn record_failure(&mut self, index: usize, label: &str, error: &IntakeError) {
        self.attempted += 1;
        tracing::warn!(
            session_id = %self.id,
            image = label,
            index,
            error = %error,
            "extraction failed for image; continuing with remaining images"
        );
        self.failures.push(ImageFailure {
            index,
            label: label.to_owned(),
            reason: error.to_string(),
        });
    }

    /// Current review snapshot without ending the session.
    #[must_use]
    pub fn snapshot(&self) -> FinalizedRecord {
        finalize(&self.record)
    }

    /// Ends processing and hands the result over for review.
    #[must_use]
    pub fn into_review(self) -> IntakeReview {
        let review = finalize(&self.record);
        tracing::info!(
            session_id = %self.id,
            attempted = self.attempted,
            extracted = self.extracted,
            failed = self.failures.len(),
            confidence = review.confidence,
            requires_review = review.requires_review,
            "intake session complete"
        );
        IntakeReview {
            session_id: self.id,
            started_at: self.started_at,
            completed_at: Utc::now(),
            review,
            attempted: self.attempted,
            extracted: self.extracted,
            failures: self.failures,
        }
    }
}

/// Runs a full intake session over `images` in capture order.
///
/// Each image is extracted and folded before the next one is sent. A failed
/// image is recorded in [`IntakeReview::failures`] and skipped; results from
/// the other images still count. When every image fails the review comes back
/// empty with confidence `0.0` and `requires_review = true`.
pub async fn run_intake_session<S>(source: &S, images: &[CapturedImage]) -> IntakeReview
where
    S: ExtractionSource + Sync,
{
    let session = IntakeSession::new();
    tracing::info!(
        session_id = %session.id(),
        images = images.len(),
        "starting intake session"
    );

    stream::iter(images.iter().enumerate())
        .then(move |(index, image)| async move { (index, image, source.extract(image).await) })
        .fold(session, |mut session, (index, image, outcome)| async move {
            match outcome {
                Ok(extraction) => session.record_extraction(&extraction),
                Err(e) => session.record_failure(index, &image.label, &e),
            }
            session
        })
        .await
        .into_review()
}
