use serde::{Deserialize, Serialize};

use crate::products::ProductFields;

/// The validated output of one extraction pass over one captured image.
///
/// `confidence` is a single scalar for the whole pass, already clamped into
/// `[0, 1]` by the normalization step that builds this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExtraction {
    pub fields: ProductFields,
    pub confidence: f64,
    /// Backend that produced the pass. Informational; carried to the output.
    pub provider: String,
}

impl FieldExtraction {
    #[must_use]
    pub fn new(fields: ProductFields, confidence: f64, provider: impl Into<String>) -> Self {
        Self {
            fields,
            confidence,
            provider: provider.into(),
        }
    }

    /// A pass that detected nothing.
    #[must_use]
    pub fn empty(confidence: f64, provider: impl Into<String>) -> Self {
        Self::new(ProductFields::default(), confidence, provider)
    }
}

/// Running state of an intake session after zero or more folds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub fields: ProductFields,
    /// Maximum confidence seen across all folded passes. Never decreases.
    pub highest_confidence: f64,
    /// Provider of the pass that set `highest_confidence`.
    pub best_provider: Option<String>,
    /// Passes folded so far, empty ones included. Diagnostic only.
    pub folds: usize,
}

impl MergedRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Read-only snapshot handed to the review form once processing is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedRecord {
    pub fields: ProductFields,
    pub confidence: f64,
    pub requires_review: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_provider: Option<String>,
}
