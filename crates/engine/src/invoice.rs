//! The invoice aggregate — header fields, line items, derived totals.
//!
//! The aggregate is an immutable snapshot: every edit returns a new
//! `Invoice`. Line-item order is display-relevant and preserved across
//! edits; item ids are stable and never reused.

use serde::{Deserialize, Serialize};

use crate::field::{Field, Origin};

/// Backend validation verdict attached to an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    Invalid,
}

/// Non-fatal backend validation result. Surfaced as inline warnings;
/// never blocks editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub status: ValidationStatus,
    pub reasons: Vec<String>,
}

/// One invoice line. All four columns carry provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub description: Field<String>,
    pub quantity: Field<f64>,
    pub unit_price: Field<f64>,
    pub amount: Field<f64>,
}

impl LineItem {
    /// A blank, user-added row. Never an AI guess, so every field is
    /// human-origin from birth.
    pub fn blank() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            description: Field::human(String::new()),
            quantity: Field::human(1.0),
            unit_price: Field::human(0.0),
            amount: Field::human(0.0),
        }
    }
}

/// Header fields of the aggregate, used for flag lookups and audit keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    VendorName,
    InvoiceNumber,
    Date,
    TotalAmount,
    TaxAmount,
}

/// An edit to one line-item column.
#[derive(Debug, Clone)]
pub enum LineItemEdit {
    Description(String),
    Quantity(f64),
    UnitPrice(f64),
    Amount(f64),
}

/// Derived money view, recomputed on demand and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// The invoice under review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<i64>,
    pub vendor_name: Field<String>,
    pub invoice_number: Field<String>,
    pub date: Field<String>,
    pub total_amount: Field<f64>,
    pub tax_amount: Field<f64>,
    pub currency: String,
    pub line_items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
}

impl Invoice {
    // ── Header edits ────────────────────────────────────────────────

    pub fn edit_vendor_name(&self, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.vendor_name = next.vendor_name.with_value(value.into());
        next
    }

    pub fn edit_invoice_number(&self, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.invoice_number = next.invoice_number.with_value(value.into());
        next
    }

    pub fn edit_date(&self, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.date = next.date.with_value(value.into());
        next
    }

    pub fn edit_total_amount(&self, value: f64) -> Self {
        let mut next = self.clone();
        next.total_amount = next.total_amount.with_value(value);
        next
    }

    pub fn edit_tax_amount(&self, value: f64) -> Self {
        let mut next = self.clone();
        next.tax_amount = next.tax_amount.with_value(value);
        next
    }

    // ── Line-item edits ─────────────────────────────────────────────

    /// Apply an edit to the line item with the given id.
    ///
    /// Unknown ids are a no-op (the id set is closed — it comes from the
    /// aggregate itself), returning the invoice unchanged.
    ///
    /// Editing quantity or unit price recomputes the amount as
    /// `quantity * unit_price` and marks it human-origin: the
    /// recomputation is a user-driven correction, not an AI re-extraction.
    /// NaN operands propagate into the amount unzeroed.
    pub fn update_line_item(&self, id: &str, edit: LineItemEdit) -> Self {
        let mut next = self.clone();
        for item in &mut next.line_items {
            if item.id != id {
                continue;
            }
            let recompute = matches!(edit, LineItemEdit::Quantity(_) | LineItemEdit::UnitPrice(_));
            match edit {
                LineItemEdit::Description(v) => {
                    item.description = item.description.clone().with_value(v);
                }
                LineItemEdit::Quantity(v) => {
                    item.quantity = item.quantity.clone().with_value(v);
                }
                LineItemEdit::UnitPrice(v) => {
                    item.unit_price = item.unit_price.clone().with_value(v);
                }
                LineItemEdit::Amount(v) => {
                    item.amount = item.amount.clone().with_value(v);
                }
            }
            if recompute {
                item.amount.value = item.quantity.value * item.unit_price.value;
                item.amount.origin = Origin::Human;
            }
            break;
        }
        next
    }

    /// Remove a line item. Unknown ids are a no-op.
    pub fn remove_line_item(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.line_items.retain(|item| item.id != id);
        next
    }

    /// Append a fresh, zeroed, human-origin row with a generated id.
    pub fn add_line_item(&self) -> Self {
        let mut next = self.clone();
        next.line_items.push(LineItem::blank());
        next
    }

    // ── Derived views ───────────────────────────────────────────────

    /// Implied tax rate from the extracted header amounts.
    ///
    /// `tax / (total - tax)`; when the denominator is zero (or the rate
    /// otherwise fails to be finite) there is no tax signal and the rate
    /// is 0 — never NaN or Infinity in the displayed totals.
    pub fn implied_tax_rate(&self) -> f64 {
        let denom = self.total_amount.value - self.tax_amount.value;
        if denom == 0.0 {
            return 0.0;
        }
        let rate = self.tax_amount.value / denom;
        if rate.is_finite() {
            rate
        } else {
            0.0
        }
    }

    /// Subtotal, estimated tax, and total — recomputed on every call.
    pub fn derived_totals(&self) -> DerivedTotals {
        let subtotal: f64 = self.line_items.iter().map(|i| i.amount.value).sum();
        let tax = subtotal * self.implied_tax_rate();
        DerivedTotals {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    /// True when a backend validation reason mentions this header field.
    pub fn is_field_flagged(&self, field: HeaderField) -> bool {
        let needle = match field {
            HeaderField::VendorName => "vendor",
            HeaderField::InvoiceNumber => "number",
            HeaderField::Date => "date",
            HeaderField::TotalAmount => "total",
            HeaderField::TaxAmount => "tax",
        };
        self.validation
            .as_ref()
            .map(|v| v.reasons.iter().any(|r| r.to_lowercase().contains(needle)))
            .unwrap_or(false)
    }
}
