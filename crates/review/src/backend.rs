use std::path::Path;

use fincore_api_client::{ApiClient, ApiError};
use fincore_engine::ReviewSubmission;
use fincore_protocol::TaskEnvelope;

/// The backend surface the session needs. `ApiClient` is the production
/// implementation; tests script this trait directly.
pub trait ReviewBackend {
    /// Submit a file for extraction. Returns the task id.
    fn upload(&self, file: &Path) -> Result<String, ApiError>;

    /// Query extraction status for a task.
    fn task_status(&self, task_id: &str) -> Result<TaskEnvelope, ApiError>;

    /// Submit the reviewed invoice and its audit log.
    fn submit_review(&self, submission: &ReviewSubmission) -> Result<(), ApiError>;
}

impl ReviewBackend for ApiClient {
    fn upload(&self, file: &Path) -> Result<String, ApiError> {
        ApiClient::upload(self, file)
    }

    fn task_status(&self, task_id: &str) -> Result<TaskEnvelope, ApiError> {
        ApiClient::task_status(self, task_id)
    }

    fn submit_review(&self, submission: &ReviewSubmission) -> Result<(), ApiError> {
        let body = serde_json::to_value(submission).map_err(|e| ApiError::Parse(e.to_string()))?;
        self.approve_invoice(&body)
    }
}
