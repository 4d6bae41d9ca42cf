//! Submission policy — the verification gate and the audit log.
//!
//! The gate is a minimum-acknowledgment policy: approval requires that the
//! reviewer's attention was explicitly directed at the date and total
//! fields. It never inspects values or confidences — correctness checking
//! is the backend validator's job.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::field::{Field, Origin};
use crate::invoice::Invoice;

/// Header fields that must be acknowledged before approval.
pub const REQUIRED_ACKNOWLEDGEMENTS: [&str; 2] = ["date", "total_amount"];

/// One recorded human change: `from` is the original AI value (absent for
/// fields that were human from birth), `to` the submitted value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<serde_json::Value>,
    pub to: serde_json::Value,
}

/// The ordered record of human-made changes attached to a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// RFC 3339 submission timestamp.
    pub timestamp: String,
    pub changes: Vec<FieldChange>,
}

/// The `POST /invoice/approve` body.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewSubmission {
    pub data: Invoice,
    #[serde(rename = "auditLog")]
    pub audit_log: AuditLog,
}

impl Invoice {
    /// Whether the explicit-acknowledgment gate is satisfied.
    ///
    /// True iff every key in [`REQUIRED_ACKNOWLEDGEMENTS`] is present in
    /// the verified set. Field values and confidences are irrelevant.
    pub fn can_approve(&self, verified: &HashSet<String>) -> bool {
        REQUIRED_ACKNOWLEDGEMENTS
            .iter()
            .all(|key| verified.contains(*key))
    }

    /// Build the audit log for submission: one entry per header field
    /// whose origin is human, then one per edited line-item field
    /// (`line_item:{id}:{column}`), in display order.
    pub fn build_audit_log(&self) -> AuditLog {
        let mut changes = Vec::new();

        push_change(&mut changes, "vendor", &self.vendor_name);
        push_change(&mut changes, "number", &self.invoice_number);
        push_change(&mut changes, "date", &self.date);
        push_change(&mut changes, "total", &self.total_amount);
        push_change(&mut changes, "tax", &self.tax_amount);

        for item in &self.line_items {
            push_change(
                &mut changes,
                &format!("line_item:{}:description", item.id),
                &item.description,
            );
            push_change(
                &mut changes,
                &format!("line_item:{}:quantity", item.id),
                &item.quantity,
            );
            push_change(
                &mut changes,
                &format!("line_item:{}:unit_price", item.id),
                &item.unit_price,
            );
            push_change(
                &mut changes,
                &format!("line_item:{}:amount", item.id),
                &item.amount,
            );
        }

        AuditLog {
            timestamp: chrono::Utc::now().to_rfc3339(),
            changes,
        }
    }

    /// True when any field — header or line item — is an unreviewed AI
    /// guess below the confidence threshold. Drives the review warning.
    pub fn has_low_confidence(&self) -> bool {
        self.vendor_name.is_low_confidence()
            || self.invoice_number.is_low_confidence()
            || self.date.is_low_confidence()
            || self.total_amount.is_low_confidence()
            || self.tax_amount.is_low_confidence()
            || self.line_items.iter().any(|item| {
                item.description.is_low_confidence()
                    || item.quantity.is_low_confidence()
                    || item.unit_price.is_low_confidence()
                    || item.amount.is_low_confidence()
            })
    }

    /// Package the aggregate and its audit log for `POST /invoice/approve`.
    pub fn into_submission(self) -> ReviewSubmission {
        let audit_log = self.build_audit_log();
        ReviewSubmission {
            data: self,
            audit_log,
        }
    }
}

fn push_change<T: Serialize>(changes: &mut Vec<FieldChange>, key: &str, field: &Field<T>) {
    if field.origin != Origin::Human {
        return;
    }
    let to = serde_json::to_value(&field.value).unwrap_or(serde_json::Value::Null);
    let from = field
        .original_value
        .as_ref()
        .map(|v| serde_json::to_value(v).unwrap_or(serde_json::Value::Null));
    changes.push(FieldChange {
        field: key.to_string(),
        from,
        to,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::LineItemEdit;
    use crate::mapping::map_extraction;

    fn acme() -> Invoice {
        map_extraction(serde_json::json!({
            "vendor": "Acme",
            "total": 100,
            "tax": 10,
            "date": "2026-01-15",
            "line_items": [
                { "id": "li-1", "description": "Widgets", "quantity": 2, "unit_price": 50, "amount": 100 }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn gate_requires_both_acknowledgements() {
        let inv = acme();
        let mut verified = HashSet::new();
        assert!(!inv.can_approve(&verified));
        verified.insert("date".to_string());
        assert!(!inv.can_approve(&verified));
        verified.insert("total_amount".to_string());
        assert!(inv.can_approve(&verified));
        // extra keys don't hurt
        verified.insert("vendor_name".to_string());
        assert!(inv.can_approve(&verified));
    }

    #[test]
    fn gate_ignores_values_and_confidence() {
        // even a pristine, never-edited invoice approves once acknowledged
        let inv = acme();
        let verified: HashSet<String> =
            ["date", "total_amount"].iter().map(|s| s.to_string()).collect();
        assert!(inv.can_approve(&verified));
    }

    #[test]
    fn audit_log_one_entry_per_edited_field() {
        let inv = acme()
            .edit_vendor_name("Acme Corporation")
            .edit_vendor_name("Acme Corp.");
        let log = inv.build_audit_log();
        let vendor_entries: Vec<_> =
            log.changes.iter().filter(|c| c.field == "vendor").collect();
        assert_eq!(vendor_entries.len(), 1);
        assert_eq!(
            vendor_entries[0].from,
            Some(serde_json::json!("Acme"))
        );
        assert_eq!(vendor_entries[0].to, serde_json::json!("Acme Corp."));
    }

    #[test]
    fn audit_log_empty_for_untouched_invoice() {
        assert!(acme().build_audit_log().changes.is_empty());
    }

    #[test]
    fn audit_log_covers_line_items() {
        let inv = acme().update_line_item("li-1", LineItemEdit::Quantity(3.0));
        let log = inv.build_audit_log();
        let fields: Vec<&str> = log.changes.iter().map(|c| c.field.as_str()).collect();
        assert!(fields.contains(&"line_item:li-1:quantity"));
        // the recomputed amount is human-origin too
        assert!(fields.contains(&"line_item:li-1:amount"));
        let qty = log
            .changes
            .iter()
            .find(|c| c.field == "line_item:li-1:quantity")
            .unwrap();
        assert_eq!(qty.from, Some(serde_json::json!(2.0)));
        assert_eq!(qty.to, serde_json::json!(3.0));
    }

    #[test]
    fn low_confidence_scans_everything() {
        let inv = acme();
        // tax confidence is 0.60 < 0.70
        assert!(inv.has_low_confidence());
        let edited = inv.edit_tax_amount(12.0);
        assert!(!edited.has_low_confidence());
    }

    #[test]
    fn submission_wire_shape() {
        let inv = acme().edit_date("2026-01-16");
        let body = serde_json::to_value(inv.into_submission()).unwrap();
        assert!(body["data"]["vendor_name"]["value"].is_string());
        assert!(body["auditLog"]["timestamp"].is_string());
        assert_eq!(body["auditLog"]["changes"][0]["field"], "date");
    }
}
