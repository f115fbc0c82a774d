//! OCR intake pipeline for shelfscan.
//!
//! Sends captured product photos to an extraction service one at a time,
//! normalizes each confidence-scored payload, and folds the passes into a
//! single best-effort record for human review.

pub mod client;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod session;
pub mod source;
pub mod types;
pub mod validate;

mod rate_limit;

pub use client::OcrClient;
pub use error::IntakeError;
pub use merge::{finalize, fold, fold_all, REVIEW_THRESHOLD};
pub use normalize::normalize_extraction;
pub use session::{run_intake_session, ImageFailure, IntakeReview, IntakeSession};
pub use source::ExtractionSource;
pub use types::{CapturedImage, RawExtraction};
