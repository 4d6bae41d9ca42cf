use std::fmt;

use fincore_api_client::ApiError;

/// Error type for review session operations.
#[derive(Debug)]
pub enum SessionError {
    /// Retry requested but no file is retained from a previous submission
    NoFile,
    /// Approve or discard requested outside the completed state
    NoInvoice,
    /// A submission is already in flight
    Busy,
    /// The verification gate is not satisfied
    VerificationIncomplete,
    /// The backend rejected the submission
    Backend(ApiError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NoFile => write!(f, "No file to retry"),
            SessionError::NoInvoice => write!(f, "No reviewed invoice to act on"),
            SessionError::Busy => write!(f, "A submission is already in progress"),
            SessionError::VerificationIncomplete => {
                write!(f, "Verify the date and total amount before approving")
            }
            SessionError::Backend(err) => write!(f, "Submission failed: {}", err),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        SessionError::Backend(err)
    }
}
