//! The review session — upload, poll, reconcile, approve.
//!
//! A `ReviewSession` owns the lifecycle of one invoice under review:
//! file submission, extraction polling with a bounded attempt budget,
//! the human edit phase, the verification gate, and final submission.
//! The backend and the observer are both trait seams so the whole
//! machine is testable without a network.

mod backend;
mod error;
mod session;

pub use backend::ReviewBackend;
pub use error::SessionError;
pub use session::{
    PollOutcome, ReviewSession, SessionObserver, SessionState, DEFAULT_MAX_POLL_ATTEMPTS,
    PROCESSING_FAILED_MESSAGE, TIMEOUT_MESSAGE, UPLOAD_FAILED_MESSAGE,
};
