//! `fincore-engine` — the review reconciliation engine.
//!
//! Pure logic crate: field-level provenance tracking, the invoice
//! aggregate with derived totals, schema-validated mapping of extraction
//! payloads, and the submission policy (verification gate + audit log).
//! No HTTP, no IO, no clocks beyond the audit timestamp.
//!
//! Every edit produces a new [`Invoice`] snapshot; nothing is mutated in
//! place. Callers hold exactly one current snapshot per review session.

pub mod error;
pub mod field;
pub mod invoice;
pub mod mapping;
pub mod recon;

pub use error::MappingError;
pub use field::{coerce_number, Field, Origin, LOW_CONFIDENCE_THRESHOLD};
pub use invoice::{
    DerivedTotals, HeaderField, Invoice, LineItem, LineItemEdit, Validation, ValidationStatus,
};
pub use mapping::map_extraction;
pub use recon::{AuditLog, FieldChange, ReviewSubmission};
