use serde::{Deserialize, Serialize};

/// The closed set of product attributes an extraction pass can report.
///
/// Each variant carries its own [`FieldRule`], so the merge step never has to
/// dispatch on field-name strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    #[serde(alias = "name", alias = "title")]
    ProductName,
    Brand,
    Sku,
    #[serde(alias = "upc", alias = "ean")]
    Barcode,
    Price,
    #[serde(alias = "qty")]
    Quantity,
    Description,
    Category,
    #[serde(alias = "size", alias = "variant")]
    SizeVariant,
}

/// How a field resolves a conflict between two present values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Well-formed 12/13 digit codes beat malformed ones; otherwise confidence decides.
    Barcode,
    /// Significantly longer text wins; near-equal lengths fall back to confidence.
    Descriptive,
    /// Confidence alone decides.
    Attribute,
}

impl ProductField {
    /// Every field, in display order.
    pub const ALL: [ProductField; 9] = [
        ProductField::ProductName,
        ProductField::Brand,
        ProductField::Sku,
        ProductField::Barcode,
        ProductField::Price,
        ProductField::Quantity,
        ProductField::Description,
        ProductField::Category,
        ProductField::SizeVariant,
    ];

    /// Canonical wire key, e.g. `"size_variant"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductField::ProductName => "product_name",
            ProductField::Brand => "brand",
            ProductField::Sku => "sku",
            ProductField::Barcode => "barcode",
            ProductField::Price => "price",
            ProductField::Quantity => "quantity",
            ProductField::Description => "description",
            ProductField::Category => "category",
            ProductField::SizeVariant => "size_variant",
        }
    }

    /// Resolves a key reported by an extraction backend, accepting the same
    /// aliases as deserialization. Matching is case-insensitive.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "product_name" | "name" | "title" => Some(ProductField::ProductName),
            "brand" => Some(ProductField::Brand),
            "sku" => Some(ProductField::Sku),
            "barcode" | "upc" | "ean" => Some(ProductField::Barcode),
            "price" => Some(ProductField::Price),
            "quantity" | "qty" => Some(ProductField::Quantity),
            "description" => Some(ProductField::Description),
            "category" => Some(ProductField::Category),
            "size_variant" | "size" | "variant" => Some(ProductField::SizeVariant),
            _ => None,
        }
    }

    #[must_use]
    pub fn rule(self) -> FieldRule {
        match self {
            ProductField::Barcode => FieldRule::Barcode,
            ProductField::ProductName
            | ProductField::Sku
            | ProductField::Description
            | ProductField::Category
            | ProductField::SizeVariant => FieldRule::Descriptive,
            // A longer brand read ("RAW Rolling Co") must not displace a
            // more confident one.
            ProductField::Brand | ProductField::Price | ProductField::Quantity => {
                FieldRule::Attribute
            }
        }
    }
}

impl std::fmt::Display for ProductField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One optional string per [`ProductField`].
///
/// A present value is never empty: [`ProductFields::set`] treats an empty
/// string as a request to clear the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    /// Two-decimal string, e.g. `"12.99"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_variant: Option<String>,
}

impl ProductFields {
    fn slot(&self, field: ProductField) -> &Option<String> {
        match field {
            ProductField::ProductName => &self.product_name,
            ProductField::Brand => &self.brand,
            ProductField::Sku => &self.sku,
            ProductField::Barcode => &self.barcode,
            ProductField::Price => &self.price,
            ProductField::Quantity => &self.quantity,
            ProductField::Description => &self.description,
            ProductField::Category => &self.category,
            ProductField::SizeVariant => &self.size_variant,
        }
    }

    fn slot_mut(&mut self, field: ProductField) -> &mut Option<String> {
        match field {
            ProductField::ProductName => &mut self.product_name,
            ProductField::Brand => &mut self.brand,
            ProductField::Sku => &mut self.sku,
            ProductField::Barcode => &mut self.barcode,
            ProductField::Price => &mut self.price,
            ProductField::Quantity => &mut self.quantity,
            ProductField::Description => &mut self.description,
            ProductField::Category => &mut self.category,
            ProductField::SizeVariant => &mut self.size_variant,
        }
    }

    /// Returns the present, non-empty value for `field`.
    #[must_use]
    pub fn get(&self, field: ProductField) -> Option<&str> {
        self.slot(field).as_deref().filter(|s| !s.is_empty())
    }

    /// Stores `value` for `field`. An empty string clears the field.
    pub fn set(&mut self, field: ProductField, value: impl Into<String>) {
        let value = value.into();
        *self.slot_mut(field) = if value.is_empty() { None } else { Some(value) };
    }

    /// Builder-style [`ProductFields::set`], handy for fixtures.
    #[must_use]
    pub fn with(mut self, field: ProductField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Iterates present fields in [`ProductField::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductField, &str)> + '_ {
        ProductField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|value| (field, value)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_key_accepts_aliases_case_insensitively() {
        assert_eq!(ProductField::from_key("Name"), Some(ProductField::ProductName));
        assert_eq!(ProductField::from_key("UPC"), Some(ProductField::Barcode));
        assert_eq!(ProductField::from_key(" qty "), Some(ProductField::Quantity));
        assert_eq!(ProductField::from_key("size"), Some(ProductField::SizeVariant));
        assert_eq!(ProductField::from_key("weight"), None);
    }

    #[test]
    fn from_key_roundtrips_canonical_keys() {
        for field in ProductField::ALL {
            assert_eq!(ProductField::from_key(field.as_str()), Some(field));
        }
    }

    #[test]
    fn rules_are_fixed_per_field() {
        assert_eq!(ProductField::Barcode.rule(), FieldRule::Barcode);
        assert_eq!(ProductField::ProductName.rule(), FieldRule::Descriptive);
        assert_eq!(ProductField::Description.rule(), FieldRule::Descriptive);
        assert_eq!(ProductField::Sku.rule(), FieldRule::Descriptive);
        assert_eq!(ProductField::Category.rule(), FieldRule::Descriptive);
        assert_eq!(ProductField::SizeVariant.rule(), FieldRule::Descriptive);
        assert_eq!(ProductField::Brand.rule(), FieldRule::Attribute);
        assert_eq!(ProductField::Price.rule(), FieldRule::Attribute);
        assert_eq!(ProductField::Quantity.rule(), FieldRule::Attribute);
    }

    #[test]
    fn set_empty_string_clears_field() {
        let mut fields = ProductFields::default().with(ProductField::Brand, "RAW");
        assert_eq!(fields.get(ProductField::Brand), Some("RAW"));

        fields.set(ProductField::Brand, "");
        assert!(fields.brand.is_none());
        assert!(fields.is_empty());
    }

    #[test]
    fn get_ignores_empty_string_written_directly() {
        let fields = ProductFields {
            sku: Some(String::new()),
            ..ProductFields::default()
        };
        assert_eq!(fields.get(ProductField::Sku), None);
        assert_eq!(fields.len(), 0);
    }

    #[test]
    fn iter_yields_present_fields_in_display_order() {
        let fields = ProductFields::default()
            .with(ProductField::Description, "Pack of 32")
            .with(ProductField::ProductName, "RAW Papers");
        let keys: Vec<_> = fields.iter().map(|(f, _)| f).collect();
        assert_eq!(
            keys,
            vec![ProductField::ProductName, ProductField::Description]
        );
    }

    #[test]
    fn serde_skips_absent_fields_and_accepts_aliases() {
        let fields = ProductFields::default().with(ProductField::Barcode, "123456789012");
        let json = serde_json::to_string(&fields).expect("serialization failed");
        assert_eq!(json, r#"{"barcode":"123456789012"}"#);

        let field: ProductField = serde_json::from_str(r#""ean""#).expect("alias should parse");
        assert_eq!(field, ProductField::Barcode);
    }
}
