//! Normalization from raw service payloads to [`shelfscan_core::FieldExtraction`].
//!
//! Per-field coercion lives in [`crate::validate`]; this module maps keys to
//! [`ProductField`]s and picks the right coercion for each.

use serde_json::Value;
use shelfscan_core::{FieldExtraction, ProductField, ProductFields};

use crate::types::RawExtraction;
use crate::validate::{
    clamp_confidence, coerce_price, coerce_quantity, normalize_barcode, stringify_value,
};

/// Normalizes a raw payload into a [`FieldExtraction`] that is safe to fold.
///
/// - Unknown keys are dropped (logged at debug).
/// - Values that coerce to nothing leave the field absent, never `""`.
/// - When a payload repeats a field under two aliases (`name` and `title`),
///   the first key in map order that yields a value wins.
/// - A missing or blank provider falls back to `default_provider`.
#[must_use]
pub fn normalize_extraction(raw: &RawExtraction, default_provider: &str) -> FieldExtraction {
    let mut fields = ProductFields::default();

    for (key, value) in &raw.fields {
        let Some(field) = ProductField::from_key(key) else {
            tracing::debug!(key = %key, "ignoring unknown extraction field");
            continue;
        };

        if fields.get(field).is_some() {
            continue;
        }

        if let Some(coerced) = coerce_field(field, value) {
            fields.set(field, coerced);
        }
    }

    let provider = raw
        .provider
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(default_provider);

    FieldExtraction::new(fields, clamp_confidence(raw.confidence.as_ref()), provider)
}

fn coerce_field(field: ProductField, value: &Value) -> Option<String> {
    match field {
        ProductField::Barcode => stringify_value(value).and_then(|s| normalize_barcode(&s)),
        ProductField::Price => coerce_price(value),
        ProductField::Quantity => coerce_quantity(value),
        ProductField::ProductName
        | ProductField::Brand
        | ProductField::Sku
        | ProductField::Description
        | ProductField::Category
        | ProductField::SizeVariant => stringify_value(value),
    }
}
