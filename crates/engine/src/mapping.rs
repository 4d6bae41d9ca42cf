//! Extraction payload → review aggregate.
//!
//! Schema validation happens in `fincore-protocol` (`ExtractedInvoice`);
//! this module attaches the review-side provenance: fixed per-field AI
//! confidences mirroring what the extraction model reports for each slot.
//! A payload missing its core fields fails fast with a descriptive error
//! instead of producing a silently-defaulted aggregate.

use fincore_protocol::ExtractedInvoice;

use crate::error::MappingError;
use crate::field::Field;
use crate::invoice::{Invoice, LineItem};

// Per-slot extraction confidences, as reported by the backend model.
const VENDOR_CONFIDENCE: f64 = 0.85;
const INVOICE_NUMBER_CONFIDENCE: f64 = 0.85;
const DATE_CONFIDENCE: f64 = 0.90;
const TOTAL_CONFIDENCE: f64 = 0.90;
const TAX_CONFIDENCE: f64 = 0.60;
const LINE_ITEM_CONFIDENCE: f64 = 0.80;

/// Map a completed task's raw `data` payload into a review aggregate.
pub fn map_extraction(raw: serde_json::Value) -> Result<Invoice, MappingError> {
    let extracted: ExtractedInvoice =
        serde_json::from_value(raw).map_err(|e| MappingError::Schema(e.to_string()))?;
    Ok(from_extraction(extracted))
}

/// Build the aggregate from an already-validated payload. Every field is
/// AI-origin; line items without an id get a generated one.
pub fn from_extraction(extracted: ExtractedInvoice) -> Invoice {
    let line_items = extracted
        .line_items
        .into_iter()
        .map(|item| LineItem {
            id: item
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            description: Field::ai(item.description, LINE_ITEM_CONFIDENCE),
            quantity: Field::ai(item.quantity, LINE_ITEM_CONFIDENCE),
            unit_price: Field::ai(item.unit_price, LINE_ITEM_CONFIDENCE),
            amount: Field::ai(item.amount, LINE_ITEM_CONFIDENCE),
        })
        .collect();

    Invoice {
        document_id: extracted.document_id,
        invoice_id: extracted.invoice_id,
        vendor_name: Field::ai(extracted.vendor, VENDOR_CONFIDENCE),
        invoice_number: Field::ai(extracted.invoice_number, INVOICE_NUMBER_CONFIDENCE),
        date: Field::ai(extracted.date, DATE_CONFIDENCE),
        total_amount: Field::ai(extracted.total, TOTAL_CONFIDENCE),
        tax_amount: Field::ai(extracted.tax, TAX_CONFIDENCE),
        currency: extracted.currency,
        line_items,
        validation: None,
    }
}
