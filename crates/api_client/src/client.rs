//! Blocking HTTP client for the extraction backend.
//!
//! Covers the full review surface: upload → result poll → approve, plus
//! the dashboard reads and the export download.

use std::path::Path;
use std::time::Duration;

use fincore_protocol::{
    ChartPoint, DashboardInvoice, DashboardStats, InvoiceQuery, StatusSlice, TaskEnvelope,
    UploadAck, API_BASE_ENV, DEFAULT_API_BASE,
};

use crate::error::ApiError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend API client (blocking).
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    api_base: String,
}

impl ApiClient {
    /// Create a client against an explicit base URL (no trailing slash).
    pub fn new(api_base: impl Into<String>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("fincore/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from the environment override, falling back to the
    /// default local backend.
    pub fn from_env() -> Self {
        let base = std::env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::new(base)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    // ── Review flow ─────────────────────────────────────────────────

    /// Upload an invoice file for extraction. Returns the opaque task id.
    pub fn upload(&self, file: &Path) -> Result<String, ApiError> {
        let url = format!("{}/upload", self.api_base);
        let form = reqwest::blocking::multipart::Form::new()
            .file("file", file)
            .map_err(|e| ApiError::Io(e.to_string()))?;

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let response = check_status(response)?;
        let ack: UploadAck = response.json().map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(ack.task_id)
    }

    /// Query extraction status by task id.
    pub fn task_status(&self, task_id: &str) -> Result<TaskEnvelope, ApiError> {
        let url = format!("{}/result/{}", self.api_base, task_id);
        let resp = self.get(&url)?;
        resp.json().map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Submit the reviewed invoice plus its audit log.
    pub fn approve_invoice(&self, body: &serde_json::Value) -> Result<(), ApiError> {
        let url = format!("{}/invoice/approve", self.api_base);
        self.post_json(&url, body)?;
        Ok(())
    }

    // ── Dashboard ───────────────────────────────────────────────────

    pub fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let url = format!("{}/dashboard/stats", self.api_base);
        let resp = self.get(&url)?;
        resp.json().map_err(|e| ApiError::Parse(e.to_string()))
    }

    pub fn dashboard_invoices(
        &self,
        query: &InvoiceQuery,
    ) -> Result<Vec<DashboardInvoice>, ApiError> {
        let url = format!("{}/dashboard/invoices", self.api_base);
        let resp = self.get_with_query(&url, query)?;
        resp.json().map_err(|e| ApiError::Parse(e.to_string()))
    }

    pub fn dashboard_chart(&self) -> Result<Vec<ChartPoint>, ApiError> {
        let url = format!("{}/dashboard/chart", self.api_base);
        let resp = self.get(&url)?;
        resp.json().map_err(|e| ApiError::Parse(e.to_string()))
    }

    pub fn status_distribution(&self) -> Result<Vec<StatusSlice>, ApiError> {
        let url = format!("{}/dashboard/status-distribution", self.api_base);
        let resp = self.get(&url)?;
        resp.json().map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Download the spreadsheet export to a local file. Returns the byte
    /// count written.
    pub fn export_invoices(&self, query: &InvoiceQuery, out: &Path) -> Result<u64, ApiError> {
        let url = format!("{}/dashboard/export", self.api_base);
        let resp = self.get_with_query(&url, query)?;
        let bytes = resp.bytes().map_err(|e| ApiError::Network(e.to_string()))?;
        std::fs::write(out, &bytes).map_err(|e| ApiError::Io(e.to_string()))?;
        Ok(bytes.len() as u64)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, ApiError> {
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response)
    }

    fn get_with_query(
        &self,
        url: &str,
        query: &InvoiceQuery,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let response = self
            .http
            .get(url)
            .query(&query.to_query_pairs())
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response)
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response)
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ApiError> {
    let status = response.status().as_u16();
    if response.status().is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    if status == 400 || status == 422 {
        return Err(ApiError::Validation(body));
    }
    Err(ApiError::Http(status, body))
}
