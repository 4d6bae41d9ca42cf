//! The upload/processing state machine.
//!
//! One session handles one file at a time. Each submission opens a new
//! cycle; poll responses carry the cycle id they were issued under, and
//! responses from a superseded cycle are discarded. Attempts are bounded
//! so a backend that never resolves cannot poll forever.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fincore_api_client::ApiError;
use fincore_engine::{map_extraction, Invoice};
use fincore_protocol::{TaskEnvelope, TaskStatus};

use crate::backend::ReviewBackend;
use crate::error::SessionError;

/// Poll attempts before the session gives up on a task.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 120;

/// Error-state message after a failed upload.
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload file";
/// Error-state message when a failed task carries no backend message.
pub const PROCESSING_FAILED_MESSAGE: &str = "No invoice data found";
/// Error-state message after the poll budget is exhausted.
pub const TIMEOUT_MESSAGE: &str = "Processing timed out";

/// Session lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Uploading,
    Processing { task_id: String, attempts: u32 },
    Completed,
    Error { message: String },
}

/// Resolution of one status poll, tagged with the cycle it belongs to
/// when applied.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// Extraction still running (or a transient failure already reported
    /// to the observer).
    Pending,
    /// Extraction finished with a payload to map.
    Completed(serde_json::Value),
    /// Extraction failed; message from the backend when it sent one.
    Failed(Option<String>),
}

/// Hook for everything the session would otherwise write to a console:
/// state transitions, swallowed poll failures, discarded stale responses.
/// All methods default to no-ops.
pub trait SessionObserver {
    fn state_changed(&self, _state: &SessionState) {}
    fn poll_error(&self, _attempt: u32, _error: &ApiError) {}
    fn stale_response_discarded(&self) {}
}

struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// One invoice review from file selection through approval.
pub struct ReviewSession<B: ReviewBackend> {
    backend: B,
    observer: Box<dyn SessionObserver>,
    state: SessionState,
    cycle: u64,
    max_poll_attempts: u32,
    file: Option<PathBuf>,
    invoice: Option<Invoice>,
    verified: HashSet<String>,
}

impl<B: ReviewBackend> ReviewSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            observer: Box::new(NoopObserver),
            state: SessionState::Idle,
            cycle: 0,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            file: None,
            invoice: None,
            verified: HashSet::new(),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_max_poll_attempts(mut self, max: u32) -> Self {
        self.max_poll_attempts = max;
        self
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The mapped invoice, present only in the completed state.
    pub fn invoice(&self) -> Option<&Invoice> {
        self.invoice.as_ref()
    }

    /// Replace the invoice with an edited snapshot. Only meaningful in
    /// the completed state; ignored otherwise.
    pub fn set_invoice(&mut self, invoice: Invoice) {
        if self.state == SessionState::Completed {
            self.invoice = Some(invoice);
        }
    }

    pub fn verified_fields(&self) -> &HashSet<String> {
        &self.verified
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Submit a file for extraction. Allowed from idle, error, and
    /// completed (starting over discards the previous review).
    pub fn select_file(&mut self, file: &Path) -> Result<(), SessionError> {
        match self.state {
            SessionState::Uploading | SessionState::Processing { .. } => {
                return Err(SessionError::Busy);
            }
            _ => {}
        }

        self.cycle += 1;
        self.file = Some(file.to_path_buf());
        self.invoice = None;
        self.verified.clear();
        self.set_state(SessionState::Uploading);

        match self.backend.upload(file) {
            Ok(task_id) => {
                self.set_state(SessionState::Processing {
                    task_id,
                    attempts: 0,
                });
            }
            Err(_) => {
                self.set_state(SessionState::Error {
                    message: UPLOAD_FAILED_MESSAGE.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Re-submit the file retained from the last submission.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        let file = self.file.clone().ok_or(SessionError::NoFile)?;
        self.select_file(&file)
    }

    // ── Polling ─────────────────────────────────────────────────────

    /// One status request. No-op outside the processing state.
    pub fn poll_tick(&mut self) {
        let (task_id, attempt) = match &mut self.state {
            SessionState::Processing { task_id, attempts } => {
                *attempts += 1;
                (task_id.clone(), *attempts)
            }
            _ => return,
        };

        let cycle = self.cycle;
        let outcome = match self.backend.task_status(&task_id) {
            Ok(envelope) => outcome_from_envelope(envelope),
            Err(err) => {
                // Transient failures keep the session polling.
                self.observer.poll_error(attempt, &err);
                PollOutcome::Pending
            }
        };
        self.apply_status(cycle, outcome);
    }

    /// Apply a poll outcome obtained under the given cycle. Outcomes from
    /// a superseded cycle, or arriving outside the processing state, are
    /// discarded.
    pub fn apply_status(&mut self, cycle: u64, outcome: PollOutcome) {
        let attempts = match &self.state {
            SessionState::Processing { attempts, .. } if cycle == self.cycle => *attempts,
            _ => {
                self.observer.stale_response_discarded();
                return;
            }
        };

        match outcome {
            PollOutcome::Pending => {
                if attempts >= self.max_poll_attempts {
                    self.set_state(SessionState::Error {
                        message: TIMEOUT_MESSAGE.to_string(),
                    });
                }
            }
            PollOutcome::Completed(payload) => match map_extraction(payload) {
                Ok(invoice) => {
                    self.invoice = Some(invoice);
                    self.set_state(SessionState::Completed);
                }
                Err(err) => {
                    self.set_state(SessionState::Error {
                        message: err.to_string(),
                    });
                }
            },
            PollOutcome::Failed(message) => {
                self.set_state(SessionState::Error {
                    message: message.unwrap_or_else(|| PROCESSING_FAILED_MESSAGE.to_string()),
                });
            }
        }
    }

    /// Drive `poll_tick` until the session leaves the processing state.
    /// The sleeper is injected; production passes `thread::sleep`.
    pub fn run_poll_loop(&mut self, interval: Duration, mut sleep: impl FnMut(Duration)) {
        while matches!(self.state, SessionState::Processing { .. }) {
            self.poll_tick();
            if matches!(self.state, SessionState::Processing { .. }) {
                sleep(interval);
            }
        }
    }

    // ── Review and approval ─────────────────────────────────────────

    /// Record that the reviewer explicitly looked at a field.
    pub fn acknowledge(&mut self, field: impl Into<String>) {
        self.verified.insert(field.into());
    }

    /// Submit the reviewed invoice. Requires the completed state and a
    /// satisfied verification gate. On success the session resets to
    /// idle and the aggregate is discarded.
    pub fn approve(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Completed {
            return Err(SessionError::NoInvoice);
        }
        let invoice = self.invoice.clone().ok_or(SessionError::NoInvoice)?;
        if !invoice.can_approve(&self.verified) {
            return Err(SessionError::VerificationIncomplete);
        }

        let submission = invoice.into_submission();
        self.backend.submit_review(&submission)?;

        self.invoice = None;
        self.verified.clear();
        self.file = None;
        self.set_state(SessionState::Idle);
        Ok(())
    }

    /// Drop the reviewed invoice without submitting.
    pub fn discard(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Completed {
            return Err(SessionError::NoInvoice);
        }
        self.invoice = None;
        self.verified.clear();
        self.set_state(SessionState::Idle);
        Ok(())
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.observer.state_changed(&self.state);
    }
}

fn outcome_from_envelope(envelope: TaskEnvelope) -> PollOutcome {
    match envelope.status {
        TaskStatus::Processing => PollOutcome::Pending,
        TaskStatus::Completed => match envelope.data {
            Some(data) => PollOutcome::Completed(data),
            // A completed task without a payload is a failed extraction.
            None => PollOutcome::Failed(envelope.error),
        },
        TaskStatus::Failed => PollOutcome::Failed(envelope.error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fincore_engine::ReviewSubmission;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Backend with a scripted queue of status responses.
    struct Scripted {
        upload: RefCell<VecDeque<Result<String, ApiError>>>,
        statuses: RefCell<VecDeque<Result<TaskEnvelope, ApiError>>>,
        submitted: RefCell<Vec<serde_json::Value>>,
    }

    impl Scripted {
        fn new() -> Self {
            Self {
                upload: RefCell::new(VecDeque::new()),
                statuses: RefCell::new(VecDeque::new()),
                submitted: RefCell::new(Vec::new()),
            }
        }

        fn uploads_ok(self, task_id: &str) -> Self {
            self.upload.borrow_mut().push_back(Ok(task_id.to_string()));
            self
        }

        fn upload_fails(self) -> Self {
            self.upload
                .borrow_mut()
                .push_back(Err(ApiError::Network("connection refused".into())));
            self
        }

        fn then_status(self, envelope: TaskEnvelope) -> Self {
            self.statuses.borrow_mut().push_back(Ok(envelope));
            self
        }

        fn then_status_err(self, err: ApiError) -> Self {
            self.statuses.borrow_mut().push_back(Err(err));
            self
        }
    }

    impl ReviewBackend for Rc<Scripted> {
        fn upload(&self, _file: &Path) -> Result<String, ApiError> {
            self.upload
                .borrow_mut()
                .pop_front()
                .unwrap_or(Ok("task-default".to_string()))
        }

        fn task_status(&self, _task_id: &str) -> Result<TaskEnvelope, ApiError> {
            self.statuses.borrow_mut().pop_front().unwrap_or(Ok(TaskEnvelope {
                status: TaskStatus::Processing,
                data: None,
                error: None,
            }))
        }

        fn submit_review(&self, submission: &ReviewSubmission) -> Result<(), ApiError> {
            let body =
                serde_json::to_value(submission).map_err(|e| ApiError::Parse(e.to_string()))?;
            self.submitted.borrow_mut().push(body);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingObserver {
        transitions: RefCell<Vec<String>>,
        poll_errors: RefCell<u32>,
        stale: RefCell<u32>,
    }

    impl SessionObserver for Rc<CountingObserver> {
        fn state_changed(&self, state: &SessionState) {
            self.transitions.borrow_mut().push(format!("{state:?}"));
        }
        fn poll_error(&self, _attempt: u32, _error: &ApiError) {
            *self.poll_errors.borrow_mut() += 1;
        }
        fn stale_response_discarded(&self) {
            *self.stale.borrow_mut() += 1;
        }
    }

    fn processing() -> TaskEnvelope {
        TaskEnvelope {
            status: TaskStatus::Processing,
            data: None,
            error: None,
        }
    }

    fn completed(data: serde_json::Value) -> TaskEnvelope {
        TaskEnvelope {
            status: TaskStatus::Completed,
            data: Some(data),
            error: None,
        }
    }

    fn failed(error: Option<&str>) -> TaskEnvelope {
        TaskEnvelope {
            status: TaskStatus::Failed,
            data: None,
            error: error.map(str::to_string),
        }
    }

    fn acme_payload() -> serde_json::Value {
        serde_json::json!({
            "vendor": "Acme",
            "total": 110,
            "tax": 10,
            "date": "2026-01-15",
            "line_items": [
                { "id": "li-1", "description": "Widgets",
                  "quantity": 2, "unit_price": 50, "amount": 100 }
            ]
        })
    }

    #[test]
    fn happy_path_upload_poll_complete() {
        let backend = Rc::new(
            Scripted::new()
                .uploads_ok("task-1")
                .then_status(processing())
                .then_status(completed(acme_payload())),
        );
        let mut session = ReviewSession::new(backend);

        session.select_file(Path::new("inv.pdf")).unwrap();
        assert_eq!(
            *session.state(),
            SessionState::Processing { task_id: "task-1".into(), attempts: 0 }
        );

        session.poll_tick();
        assert!(matches!(session.state(), SessionState::Processing { attempts: 1, .. }));

        session.poll_tick();
        assert_eq!(*session.state(), SessionState::Completed);
        let invoice = session.invoice().unwrap();
        assert_eq!(invoice.vendor_name.value, "Acme");
        assert_eq!(invoice.total_amount.value, 110.0);
    }

    #[test]
    fn upload_failure_sets_error_state() {
        let backend = Rc::new(Scripted::new().upload_fails());
        let mut session = ReviewSession::new(backend);
        session.select_file(Path::new("inv.pdf")).unwrap();
        assert_eq!(
            *session.state(),
            SessionState::Error { message: "Failed to upload file".into() }
        );
    }

    #[test]
    fn retry_resubmits_retained_file() {
        let backend = Rc::new(Scripted::new().upload_fails().uploads_ok("task-2"));
        let mut session = ReviewSession::new(backend);
        session.select_file(Path::new("inv.pdf")).unwrap();
        assert!(matches!(session.state(), SessionState::Error { .. }));

        session.retry().unwrap();
        assert!(matches!(
            session.state(),
            SessionState::Processing { task_id, .. } if task_id == "task-2"
        ));
    }

    #[test]
    fn retry_without_file_is_an_error() {
        let mut session = ReviewSession::new(Rc::new(Scripted::new()));
        assert!(matches!(session.retry(), Err(SessionError::NoFile)));
    }

    #[test]
    fn select_file_rejected_while_processing() {
        let backend = Rc::new(Scripted::new().uploads_ok("task-1"));
        let mut session = ReviewSession::new(backend);
        session.select_file(Path::new("a.pdf")).unwrap();
        assert!(matches!(
            session.select_file(Path::new("b.pdf")),
            Err(SessionError::Busy)
        ));
    }

    #[test]
    fn failed_task_uses_backend_message() {
        let backend = Rc::new(
            Scripted::new()
                .uploads_ok("task-1")
                .then_status(failed(Some("Corrupt file"))),
        );
        let mut session = ReviewSession::new(backend);
        session.select_file(Path::new("inv.pdf")).unwrap();
        session.poll_tick();
        assert_eq!(
            *session.state(),
            SessionState::Error { message: "Corrupt file".into() }
        );
    }

    #[test]
    fn failed_task_without_message_uses_default() {
        let backend = Rc::new(
            Scripted::new().uploads_ok("task-1").then_status(failed(None)),
        );
        let mut session = ReviewSession::new(backend);
        session.select_file(Path::new("inv.pdf")).unwrap();
        session.poll_tick();
        assert_eq!(
            *session.state(),
            SessionState::Error { message: "No invoice data found".into() }
        );
    }

    #[test]
    fn malformed_payload_surfaces_mapping_error() {
        let backend = Rc::new(
            Scripted::new()
                .uploads_ok("task-1")
                .then_status(completed(serde_json::json!({ "total": 100 }))),
        );
        let mut session = ReviewSession::new(backend);
        session.select_file(Path::new("inv.pdf")).unwrap();
        session.poll_tick();
        match session.state() {
            SessionState::Error { message } => assert!(message.contains("vendor")),
            other => panic!("expected error state, got {other:?}"),
        }
    }

    #[test]
    fn polling_is_bounded() {
        let backend = Rc::new(Scripted::new().uploads_ok("task-1"));
        let mut session = ReviewSession::new(backend).with_max_poll_attempts(3);
        session.select_file(Path::new("inv.pdf")).unwrap();

        session.poll_tick();
        session.poll_tick();
        assert!(matches!(session.state(), SessionState::Processing { .. }));
        session.poll_tick();
        assert_eq!(
            *session.state(),
            SessionState::Error { message: "Processing timed out".into() }
        );
    }

    #[test]
    fn transient_poll_failures_are_swallowed_and_observed() {
        let backend = Rc::new(
            Scripted::new()
                .uploads_ok("task-1")
                .then_status_err(ApiError::Network("timeout".into()))
                .then_status(completed(acme_payload())),
        );
        let observer = Rc::new(CountingObserver::default());
        let mut session =
            ReviewSession::new(backend).with_observer(Box::new(Rc::clone(&observer)));

        session.select_file(Path::new("inv.pdf")).unwrap();
        session.poll_tick();
        assert!(matches!(session.state(), SessionState::Processing { .. }));
        session.poll_tick();
        assert_eq!(*session.state(), SessionState::Completed);
        assert_eq!(*observer.poll_errors.borrow(), 1);
    }

    #[test]
    fn outcome_from_superseded_cycle_is_discarded() {
        let backend = Rc::new(Scripted::new().uploads_ok("task-1"));
        let observer = Rc::new(CountingObserver::default());
        let mut session =
            ReviewSession::new(backend).with_observer(Box::new(Rc::clone(&observer)));

        session.select_file(Path::new("a.pdf")).unwrap();
        let state_before = session.state().clone();

        // A completion issued under a cycle that no longer exists must
        // not complete the current one.
        session.apply_status(0, PollOutcome::Completed(acme_payload()));
        assert_eq!(*session.state(), state_before);
        assert!(session.invoice().is_none());
        assert_eq!(*observer.stale.borrow(), 1);
    }

    #[test]
    fn late_duplicate_after_completion_is_discarded() {
        let backend = Rc::new(
            Scripted::new()
                .uploads_ok("task-1")
                .then_status(completed(acme_payload())),
        );
        let observer = Rc::new(CountingObserver::default());
        let mut session =
            ReviewSession::new(backend).with_observer(Box::new(Rc::clone(&observer)));

        session.select_file(Path::new("a.pdf")).unwrap();
        session.poll_tick();
        assert_eq!(*session.state(), SessionState::Completed);

        // Same cycle, but the session already left processing.
        session.apply_status(1, PollOutcome::Failed(Some("late".into())));
        assert_eq!(*session.state(), SessionState::Completed);
        assert_eq!(*observer.stale.borrow(), 1);
    }

    #[test]
    fn run_poll_loop_sleeps_between_ticks() {
        let backend = Rc::new(
            Scripted::new()
                .uploads_ok("task-1")
                .then_status(processing())
                .then_status(processing())
                .then_status(completed(acme_payload())),
        );
        let mut session = ReviewSession::new(backend);
        session.select_file(Path::new("inv.pdf")).unwrap();

        let mut sleeps = 0u32;
        session.run_poll_loop(Duration::from_millis(10), |_| sleeps += 1);
        assert_eq!(*session.state(), SessionState::Completed);
        // Three ticks, sleep only between them
        assert_eq!(sleeps, 2);
    }

    #[test]
    fn approve_requires_acknowledgements() {
        let backend = Rc::new(
            Scripted::new()
                .uploads_ok("task-1")
                .then_status(completed(acme_payload())),
        );
        let mut session = ReviewSession::new(Rc::clone(&backend));
        session.select_file(Path::new("inv.pdf")).unwrap();
        session.poll_tick();

        assert!(matches!(
            session.approve(),
            Err(SessionError::VerificationIncomplete)
        ));

        session.acknowledge("date");
        session.acknowledge("total_amount");
        session.approve().unwrap();

        assert_eq!(*session.state(), SessionState::Idle);
        assert!(session.invoice().is_none());
        let bodies = backend.submitted.borrow();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["data"]["vendor_name"]["value"], "Acme");
        assert!(bodies[0]["auditLog"]["changes"].is_array());
    }

    #[test]
    fn approve_outside_completed_is_rejected() {
        let mut session = ReviewSession::new(Rc::new(Scripted::new()));
        assert!(matches!(session.approve(), Err(SessionError::NoInvoice)));
    }

    #[test]
    fn edits_flow_through_to_submission() {
        let backend = Rc::new(
            Scripted::new()
                .uploads_ok("task-1")
                .then_status(completed(acme_payload())),
        );
        let mut session = ReviewSession::new(Rc::clone(&backend));
        session.select_file(Path::new("inv.pdf")).unwrap();
        session.poll_tick();

        let edited = session.invoice().unwrap().edit_vendor_name("Acme Corp.");
        session.set_invoice(edited);
        session.acknowledge("date");
        session.acknowledge("total_amount");
        session.approve().unwrap();

        let bodies = backend.submitted.borrow();
        let changes = bodies[0]["auditLog"]["changes"].as_array().unwrap();
        assert_eq!(changes[0]["field"], "vendor");
        assert_eq!(changes[0]["from"], "Acme");
        assert_eq!(changes[0]["to"], "Acme Corp.");
    }

    #[test]
    fn discard_resets_to_idle() {
        let backend = Rc::new(
            Scripted::new()
                .uploads_ok("task-1")
                .then_status(completed(acme_payload())),
        );
        let mut session = ReviewSession::new(Rc::clone(&backend));
        session.select_file(Path::new("inv.pdf")).unwrap();
        session.poll_tick();
        session.acknowledge("date");

        session.discard().unwrap();
        assert_eq!(*session.state(), SessionState::Idle);
        assert!(session.invoice().is_none());
        assert!(session.verified_fields().is_empty());
        assert!(backend.submitted.borrow().is_empty());
    }

    #[test]
    fn new_submission_clears_previous_review() {
        let backend = Rc::new(
            Scripted::new()
                .uploads_ok("task-1")
                .uploads_ok("task-2")
                .then_status(completed(acme_payload())),
        );
        let mut session = ReviewSession::new(backend);
        session.select_file(Path::new("a.pdf")).unwrap();
        session.poll_tick();
        session.acknowledge("date");
        assert_eq!(*session.state(), SessionState::Completed);

        session.select_file(Path::new("b.pdf")).unwrap();
        assert!(session.invoice().is_none());
        assert!(session.verified_fields().is_empty());
        assert!(matches!(
            session.state(),
            SessionState::Processing { task_id, .. } if task_id == "task-2"
        ));
    }
}
