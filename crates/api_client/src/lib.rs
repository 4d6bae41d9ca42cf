//! Backend API client — shared between the review session and CLI.
//!
//! This crate is the single HTTP surface of the workspace: file upload,
//! extraction-result polling, review submission, dashboard reads, export.
//!
//! Blocking reqwest client (no Tokio runtime required). No retries here —
//! the review session owns the polling cadence; the client does one
//! request per call with a fixed timeout.

mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;
