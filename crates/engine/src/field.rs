//! Field provenance — a value paired with its confidence and origin.
//!
//! Every reviewable value carries where it came from (AI extraction vs
//! human correction), the extraction model's self-reported confidence,
//! and — once a human has overridden an AI value — the original AI value.

use serde::{Deserialize, Serialize};

/// Fields extracted below this confidence are flagged for manual review.
/// Fixed policy constant, only meaningful while origin is AI.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.70;

/// Where a field's current value came from.
///
/// Wire name is `source` with lowercase values, matching the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Ai,
    Human,
}

/// A single extracted value plus its provenance metadata.
///
/// `original_value` is set exactly once — the first time a human overrides
/// an AI-origin value — and never overwritten afterwards. Once origin is
/// human, confidence no longer participates in gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field<T> {
    pub value: T,
    pub confidence: f64,
    #[serde(rename = "source")]
    pub origin: Origin,
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub original_value: Option<T>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> Field<T> {
    /// An AI-extracted field.
    pub fn ai(value: T, confidence: f64) -> Self {
        Self {
            value,
            confidence,
            origin: Origin::Ai,
            original_value: None,
        }
    }

    /// A human-entered field (never an AI guess; confidence is nominal).
    pub fn human(value: T) -> Self {
        Self {
            value,
            confidence: 1.0,
            origin: Origin::Human,
            original_value: None,
        }
    }

    /// Apply a human edit, returning the new field. Pure and total.
    ///
    /// The first edit of an AI field captures the pre-edit AI value into
    /// `original_value`; subsequent edits leave the snapshot untouched.
    pub fn with_value(self, new_value: T) -> Self {
        match self.origin {
            Origin::Ai => Self {
                original_value: Some(self.value),
                value: new_value,
                confidence: self.confidence,
                origin: Origin::Human,
            },
            Origin::Human => Self {
                value: new_value,
                ..self
            },
        }
    }

    /// True while the field is an unreviewed AI guess below the threshold.
    pub fn is_low_confidence(&self) -> bool {
        self.origin == Origin::Ai && self.confidence < LOW_CONFIDENCE_THRESHOLD
    }
}

/// Numeric coercion for free-text edits of numeric fields.
///
/// Empty input coerces to `0.0`; anything unparsable coerces to `NaN`.
/// NaN deliberately propagates into recomputed amounts — a garbage input
/// must be surfaced to the reviewer, not silently zeroed.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_edit_captures_original_and_flips_origin() {
        let field = Field::ai("Acme Corp".to_string(), 0.85);
        let edited = field.with_value("Acme Corporation".to_string());
        assert_eq!(edited.origin, Origin::Human);
        assert_eq!(edited.value, "Acme Corporation");
        assert_eq!(edited.original_value.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn second_edit_keeps_first_snapshot() {
        let field = Field::ai(100.0, 0.9)
            .with_value(110.0)
            .with_value(120.0);
        assert_eq!(field.value, 120.0);
        assert_eq!(field.original_value, Some(100.0));
        assert_eq!(field.origin, Origin::Human);
    }

    #[test]
    fn human_field_never_gains_original_value() {
        let field = Field::human("note".to_string()).with_value("edited".to_string());
        assert!(field.original_value.is_none());
        assert_eq!(field.origin, Origin::Human);
    }

    #[test]
    fn low_confidence_only_while_ai() {
        let field = Field::ai(5.0, 0.6);
        assert!(field.is_low_confidence());
        let edited = field.with_value(6.0);
        assert!(!edited.is_low_confidence());
        assert!(!Field::ai(5.0, 0.70).is_low_confidence());
    }

    #[test]
    fn coerce_number_boundary() {
        assert_eq!(coerce_number("12.5"), 12.5);
        assert_eq!(coerce_number(" -3 "), -3.0);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("   "), 0.0);
        assert!(coerce_number("abc").is_nan());
        assert!(coerce_number("12,5").is_nan());
    }

    #[test]
    fn wire_serializes_origin_as_source() {
        let field = Field::ai("x".to_string(), 0.8);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["source"].as_str(), Some("ai"));
        assert!(json.get("original_value").is_none());
    }

    proptest! {
        // Idempotent capture: however many edits follow, the snapshot is
        // always the original AI value.
        #[test]
        fn original_value_is_sticky(initial in any::<i64>(), edits in proptest::collection::vec(any::<i64>(), 1..8)) {
            let mut field = Field::ai(initial, 0.5);
            for e in &edits {
                field = field.with_value(*e);
            }
            prop_assert_eq!(field.original_value, Some(initial));
            prop_assert_eq!(field.value, *edits.last().unwrap());
            prop_assert_eq!(field.origin, Origin::Human);
        }
    }
}
