//! Backend REST wire types — the contract with the extraction service.
//!
//! This crate is the single source of truth for the backend wire format:
//! upload acknowledgement, task-result envelope, the extraction payload,
//! and the dashboard read models. Field names follow the backend exactly
//! (`totalSpend`, `task_id`, …) — renames happen here, nowhere else.
//!
//! No HTTP, no domain logic. Deserialization of the extraction payload is
//! deliberately strict about the core fields (`vendor`, `total`): a payload
//! missing them fails with a serde error instead of defaulting silently.

use serde::{Deserialize, Serialize};

/// Default API base when no override is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1";

/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "FINCORE_API_URL";

// =============================================================================
// Upload & task polling
// =============================================================================

/// Response of `POST /upload`.
///
/// The backend also returns `status`, `document_id` and `filename`; the
/// client only acts on `task_id` but keeps the rest for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAck {
    pub task_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub document_id: Option<i64>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Task lifecycle as reported by `GET /result/{task_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Processing,
    Completed,
    Failed,
}

/// Response envelope of `GET /result/{task_id}`.
///
/// `data` is kept as raw JSON here; the engine owns the schema-validated
/// mapping into the review aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// =============================================================================
// Extraction payload
// =============================================================================

fn default_quantity() -> f64 {
    1.0
}

fn default_currency() -> String {
    "$".to_string()
}

/// A raw extracted line item as the backend emits it.
///
/// `id` is optional — older backend versions omit it and the client
/// generates one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedLineItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub amount: f64,
}

/// The extraction payload carried in a `completed` task envelope.
///
/// `vendor` and `total` are required: an extraction without them is not a
/// reviewable invoice and must surface as a mapping error. Everything else
/// is genuinely optional in the backend schema and carries an explicit
/// default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedInvoice {
    #[serde(default)]
    pub document_id: Option<i64>,
    #[serde(default)]
    pub invoice_id: Option<i64>,
    pub vendor: String,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub date: String,
    pub total: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub line_items: Vec<ExtractedLineItem>,
}

// =============================================================================
// Dashboard read models
// =============================================================================

/// `GET /dashboard/stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_spend: f64,
    pub pending_reviews: i64,
    pub monthly_growth: f64,
}

/// One row of `GET /dashboard/invoices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardInvoice {
    pub id: i64,
    pub vendor: String,
    #[serde(default)]
    pub date: Option<String>,
    pub total: f64,
    pub currency: String,
    /// "Approved" or "Pending Review" — backend-rendered, displayed as-is.
    pub status: String,
}

/// One point of `GET /dashboard/chart` (monthly spend).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub spend: f64,
}

/// One slice of `GET /dashboard/status-distribution`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSlice {
    pub name: String,
    pub value: i64,
    pub color: String,
}

/// Filter parameters shared by the invoices listing and export endpoints.
#[derive(Debug, Clone, Default)]
pub struct InvoiceQuery {
    pub vendor: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl InvoiceQuery {
    /// Render as query pairs, omitting unset filters.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref v) = self.vendor {
            pairs.push(("vendor", v.clone()));
        }
        if let Some(ref d) = self.start_date {
            pairs.push(("start_date", d.clone()));
        }
        if let Some(ref d) = self.end_date {
            pairs.push(("end_date", d.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_envelope_processing_has_no_data() {
        let env: TaskEnvelope = serde_json::from_str(r#"{"status":"processing"}"#).unwrap();
        assert_eq!(env.status, TaskStatus::Processing);
        assert!(env.data.is_none());
        assert!(env.error.is_none());
    }

    #[test]
    fn task_envelope_failed_carries_error() {
        let env: TaskEnvelope =
            serde_json::from_str(r#"{"status":"failed","error":"Corrupt file"}"#).unwrap();
        assert_eq!(env.status, TaskStatus::Failed);
        assert_eq!(env.error.as_deref(), Some("Corrupt file"));
    }

    #[test]
    fn extracted_invoice_minimal_payload() {
        let raw = serde_json::json!({
            "vendor": "Acme",
            "total": 100,
            "tax": 10,
            "line_items": []
        });
        let inv: ExtractedInvoice = serde_json::from_value(raw).unwrap();
        assert_eq!(inv.vendor, "Acme");
        assert_eq!(inv.total, 100.0);
        assert_eq!(inv.tax, 10.0);
        assert_eq!(inv.currency, "$");
        assert_eq!(inv.invoice_number, "");
        assert!(inv.line_items.is_empty());
    }

    #[test]
    fn extracted_invoice_missing_vendor_is_an_error() {
        let raw = serde_json::json!({ "total": 100 });
        assert!(serde_json::from_value::<ExtractedInvoice>(raw).is_err());
    }

    #[test]
    fn extracted_line_item_defaults() {
        let item: ExtractedLineItem = serde_json::from_str("{}").unwrap();
        assert!(item.id.is_none());
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.unit_price, 0.0);
        assert_eq!(item.amount, 0.0);
    }

    #[test]
    fn dashboard_stats_camel_case_wire() {
        let stats: DashboardStats = serde_json::from_str(
            r#"{"totalSpend":1234.5,"pendingReviews":3,"monthlyGrowth":12.5}"#,
        )
        .unwrap();
        assert_eq!(stats.total_spend, 1234.5);
        assert_eq!(stats.pending_reviews, 3);
        assert_eq!(stats.monthly_growth, 12.5);
    }

    #[test]
    fn invoice_query_omits_unset_filters() {
        let q = InvoiceQuery {
            vendor: Some("Acme".into()),
            start_date: None,
            end_date: Some("2026-01-31".into()),
        };
        let pairs = q.to_query_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("vendor", "Acme".to_string()));
        assert_eq!(pairs[1], ("end_date", "2026-01-31".to_string()));
    }
}
