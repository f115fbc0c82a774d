//! Extraction merger: folds confidence-scored extraction passes into one
//! product record.
//!
//! Resolution is per field and never blends strings: every chosen value was
//! produced verbatim by one of the folded passes. Conflicts are settled by the
//! field's [`FieldRule`], comparing the incoming pass against the record's
//! running highest confidence as it stood before the fold. Because that
//! comparison uses one global maximum rather than the confidence that set each
//! individual value, folding the same passes in a different order can produce
//! a different record. Callers must fold in capture order.

use shelfscan_core::{FieldExtraction, FieldRule, FinalizedRecord, MergedRecord, ProductField};

use crate::validate::is_well_formed_barcode;

/// Confidence below which a human must verify the record before commit.
pub const REVIEW_THRESHOLD: f64 = 0.8;

/// Folds `incoming` into `record` and returns the updated record.
///
/// - Fields absent from `incoming` are left untouched.
/// - Fields absent from `record` adopt the incoming value.
/// - Conflicts resolve by [`ProductField::rule`].
///
/// `highest_confidence` becomes the max of the prior value and
/// `incoming.confidence`; `best_provider` switches to `incoming.provider` only
/// when the incoming confidence is strictly higher.
///
/// A pass that detected no fields at all only bumps `folds`: it neither
/// raises the confidence nor claims `best_provider`.
#[must_use]
pub fn fold(mut record: MergedRecord, incoming: &FieldExtraction) -> MergedRecord {
    record.folds += 1;
    if incoming.fields.is_empty() {
        return record;
    }

    let prior_highest = record.highest_confidence;
    let beats_prior = incoming.confidence > prior_highest;

    for (field, candidate) in incoming.fields.iter() {
        let adopt = match record.fields.get(field) {
            None => true,
            Some(existing) => prefers_incoming(field, existing, candidate, beats_prior),
        };

        if adopt {
            tracing::trace!(%field, provider = %incoming.provider, "adopting incoming value");
            record.fields.set(field, candidate);
        }
    }

    if beats_prior {
        record.highest_confidence = incoming.confidence;
        record.best_provider = Some(incoming.provider.clone());
    }

    record
}

/// Folds `extractions` in iteration order, starting from an empty record.
#[must_use]
pub fn fold_all<'a, I>(extractions: I) -> MergedRecord
where
    I: IntoIterator<Item = &'a FieldExtraction>,
{
    extractions.into_iter().fold(MergedRecord::new(), fold)
}

/// Produces the review snapshot for `record`.
///
/// A record that never received a pass finalizes to confidence `0.0` and
/// always requires review.
#[must_use]
pub fn finalize(record: &MergedRecord) -> FinalizedRecord {
    let confidence = record.highest_confidence;
    FinalizedRecord {
        fields: record.fields.clone(),
        confidence,
        requires_review: confidence < REVIEW_THRESHOLD,
        best_provider: record.best_provider.clone(),
    }
}

fn prefers_incoming(field: ProductField, existing: &str, incoming: &str, beats_prior: bool) -> bool {
    match field.rule() {
        FieldRule::Barcode => {
            match (is_well_formed_barcode(incoming), is_well_formed_barcode(existing)) {
                (true, false) => true,
                (false, true) => false,
                _ => beats_prior,
            }
        }
        FieldRule::Descriptive => {
            let incoming_len = incoming.chars().count();
            let existing_len = existing.chars().count();
            // Ratios in integer form: 1.2 == 6/5.
            if incoming_len * 5 > existing_len * 6 {
                true
            } else if incoming_len * 6 >= existing_len * 5 {
                beats_prior
            } else {
                false
            }
        }
        FieldRule::Attribute => beats_prior,
    }
}
