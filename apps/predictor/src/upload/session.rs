//! Upload session: owns the selected file and drives one submission at a time.
//!
//! ```text
//! Idle ──select──> FileSelected ──submit──> Submitting ──ok──> Succeeded
//!  ^                    │                       │
//!  └──────clear─────────┘                       └──err──> Failed
//!
//! Succeeded / Failed ──select──> FileSelected
//! Succeeded / Failed ──submit──> Submitting   (same file, manual retry)
//! ```
//!
//! A submission runs as two tasks: the narrator's ticker and a single-shot
//! request task. The request task settles the session when the service
//! answers, and that settlement is the only thing that stops the ticker.
//! The request task only holds a weak reference, so a result that arrives
//! after the session is gone is dropped. A service that panics settles the
//! attempt as a failure with the generic message.

#![allow(dead_code)]

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis_client::AnalysisService;
use crate::errors::UploadError;
use crate::models::{AnalysisResult, CandidateFile};
use crate::navigation::Navigator;
use crate::upload::narrator::{NarrationStage, ProgressNarrator};
use crate::upload::validator::{validate, ValidationResult};

/// Identifies one submission attempt. Used to correlate logs and to discard
/// results that no longer belong to the current attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(Uuid);

impl AttemptId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FileSelected,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone)]
pub enum SessionState {
    Idle,
    FileSelected {
        file: CandidateFile,
    },
    Submitting {
        file: CandidateFile,
        attempt: AttemptId,
    },
    Succeeded {
        file: CandidateFile,
        result: AnalysisResult,
    },
    Failed {
        file: CandidateFile,
        message: String,
    },
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        match self {
            SessionState::Idle => Phase::Idle,
            SessionState::FileSelected { .. } => Phase::FileSelected,
            SessionState::Submitting { .. } => Phase::Submitting,
            SessionState::Succeeded { .. } => Phase::Succeeded,
            SessionState::Failed { .. } => Phase::Failed,
        }
    }

    pub fn file(&self) -> Option<&CandidateFile> {
        match self {
            SessionState::Idle => None,
            SessionState::FileSelected { file }
            | SessionState::Submitting { file, .. }
            | SessionState::Succeeded { file, .. }
            | SessionState::Failed { file, .. } => Some(file),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Pending,
    Success(AnalysisResult),
    Failure(String),
}

/// What `submit` did.
#[derive(Debug)]
pub enum SubmitStatus {
    Started(AttemptHandle),
    /// A submission was already in flight; nothing new was sent.
    AlreadyInFlight(AttemptId),
}

/// Handle to the request task of one attempt.
#[derive(Debug)]
pub struct AttemptHandle {
    pub attempt: AttemptId,
    task: JoinHandle<Option<SubmissionOutcome>>,
}

impl AttemptHandle {
    /// Waits for the attempt to settle. `None` when the result was discarded
    /// because the session no longer exists.
    pub async fn finished(self) -> Option<SubmissionOutcome> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(attempt_id = %self.attempt, error = %e, "Submission task did not complete");
                None
            }
        }
    }
}

struct Inner {
    state: SessionState,
    error: Option<String>,
    drag_active: bool,
    narrator: ProgressNarrator,
}

pub struct UploadSession {
    inner: Arc<Mutex<Inner>>,
    service: Arc<dyn AnalysisService>,
    navigator: Arc<dyn Navigator>,
}

impl UploadSession {
    pub fn new(service: Arc<dyn AnalysisService>, navigator: Arc<dyn Navigator>) -> Self {
        Self::with_narrator(service, navigator, ProgressNarrator::new())
    }

    pub fn with_narrator(
        service: Arc<dyn AnalysisService>,
        navigator: Arc<dyn Navigator>,
        narrator: ProgressNarrator,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: SessionState::Idle,
                error: None,
                drag_active: false,
                narrator,
            })),
            service,
            navigator,
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().state.phase()
    }

    pub fn held_file(&self) -> Option<CandidateFile> {
        self.inner.lock().state.file().cloned()
    }

    /// The single user-visible message for the current attempt, if any.
    pub fn error_text(&self) -> Option<String> {
        self.inner.lock().error.clone()
    }

    pub fn outcome(&self) -> Option<SubmissionOutcome> {
        match &self.inner.lock().state {
            SessionState::Submitting { .. } => Some(SubmissionOutcome::Pending),
            SessionState::Succeeded { result, .. } => Some(SubmissionOutcome::Success(result.clone())),
            SessionState::Failed { message, .. } => Some(SubmissionOutcome::Failure(message.clone())),
            _ => None,
        }
    }

    /// Whether the submit affordance should be enabled.
    pub fn can_submit(&self) -> bool {
        let inner = self.inner.lock();
        inner.state.file().is_some() && inner.state.phase() != Phase::Submitting
    }

    pub fn narration(&self) -> watch::Receiver<Option<NarrationStage>> {
        self.inner.lock().narrator.subscribe()
    }

    pub fn is_drag_active(&self) -> bool {
        self.inner.lock().drag_active
    }

    pub fn drag_enter(&self) {
        self.inner.lock().drag_active = true;
    }

    pub fn drag_leave(&self) {
        self.inner.lock().drag_active = false;
    }

    /// Handles a drop: only the first file counts.
    pub fn drop_files(&self, files: Vec<CandidateFile>) -> Result<(), UploadError> {
        self.inner.lock().drag_active = false;
        match files.into_iter().next() {
            Some(file) => self.select_file(file),
            None => Ok(()),
        }
    }

    /// Validates and, if accepted, holds `file`, discarding any previous
    /// file or finished attempt. A rejected file leaves the state untouched.
    ///
    /// Ignored while a submission is in flight; the selection control is
    /// not offered then.
    pub fn select_file(&self, file: CandidateFile) -> Result<(), UploadError> {
        let verdict = validate(&file);
        let mut inner = self.inner.lock();

        if inner.state.phase() == Phase::Submitting {
            debug!(file_name = %file.name, "Selection ignored while submitting");
            return Ok(());
        }

        match verdict {
            ValidationResult::Accepted => {
                info!(
                    file_name = %file.name,
                    mime_type = %file.mime_type,
                    size_bytes = file.size_bytes,
                    "File selected"
                );
                inner.error = None;
                inner.state = SessionState::FileSelected { file };
                Ok(())
            }
            ValidationResult::Rejected(rejection) => {
                let err = UploadError::from(rejection);
                warn!(
                    file_name = %file.name,
                    mime_type = %file.mime_type,
                    size_bytes = file.size_bytes,
                    reason = %err,
                    "File rejected"
                );
                inner.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Drops the held file. Only meaningful before anything was submitted.
    pub fn clear_file(&self) {
        let mut inner = self.inner.lock();
        if inner.state.phase() == Phase::FileSelected {
            inner.state = SessionState::Idle;
            debug!("File cleared");
        }
    }

    /// Starts a submission of the held file.
    ///
    /// Must be called from within a Tokio runtime. At most one submission is
    /// in flight per session; calling this again meanwhile sends nothing.
    pub fn submit(&self) -> Result<SubmitStatus, UploadError> {
        let (file, attempt) = {
            let mut inner = self.inner.lock();
            let held = match &inner.state {
                SessionState::Idle => None,
                SessionState::Submitting { attempt, .. } => {
                    debug!(attempt_id = %attempt, "Submission already in flight");
                    return Ok(SubmitStatus::AlreadyInFlight(*attempt));
                }
                SessionState::FileSelected { file }
                | SessionState::Succeeded { file, .. }
                | SessionState::Failed { file, .. } => Some(file.clone()),
            };
            let Some(file) = held else {
                let err = UploadError::NoFileSelected;
                inner.error = Some(err.user_message());
                warn!("Submit without a file");
                return Err(err);
            };

            let attempt = AttemptId::new();
            inner.state = SessionState::Submitting {
                file: file.clone(),
                attempt,
            };
            inner.error = None;
            inner.narrator.start();
            (file, attempt)
        };

        info!(attempt_id = %attempt, file_name = %file.name, "Submitting resume for analysis");

        let session = Arc::downgrade(&self.inner);
        let service = Arc::clone(&self.service);
        let navigator = Arc::clone(&self.navigator);
        let span = info_span!("submission", attempt_id = %attempt);

        let task = tokio::spawn(
            async move {
                let result = AssertUnwindSafe(service.analyze(&file))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        warn!("Analysis service panicked");
                        Err(UploadError::ServiceError(String::new()))
                    });
                settle(&session, attempt, result, navigator.as_ref())
            }
            .instrument(span),
        );

        Ok(SubmitStatus::Started(AttemptHandle { attempt, task }))
    }

    /// Leaves the upload view. Any in-flight result is discarded on arrival.
    pub fn abandon(self) {
        if self.phase() == Phase::Submitting {
            info!("Upload view left with a submission in flight");
        }
    }
}

/// Applies the service's answer to the session that started `attempt`.
fn settle(
    session: &Weak<Mutex<Inner>>,
    attempt: AttemptId,
    result: Result<AnalysisResult, UploadError>,
    navigator: &dyn Navigator,
) -> Option<SubmissionOutcome> {
    let Some(inner) = session.upgrade() else {
        debug!("Session is gone; discarding analysis result");
        return None;
    };
    let mut guard = inner.lock();

    let file = match std::mem::replace(&mut guard.state, SessionState::Idle) {
        SessionState::Submitting {
            file,
            attempt: current,
        } if current == attempt => file,
        other => {
            guard.state = other;
            debug!("Attempt is no longer current; discarding analysis result");
            return None;
        }
    };

    guard.narrator.stop();

    match result {
        Ok(payload) => {
            info!(matches = payload.len(), "Analysis succeeded");
            guard.state = SessionState::Succeeded {
                file,
                result: payload.clone(),
            };
            drop(guard);
            navigator.show_results(payload.clone());
            Some(SubmissionOutcome::Success(payload))
        }
        Err(err) => {
            let message = err.user_message();
            warn!(error = %err, "Analysis failed");
            guard.error = Some(message.clone());
            guard.state = SessionState::Failed {
                file,
                message: message.clone(),
            };
            Some(SubmissionOutcome::Failure(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;
    use tokio::sync::oneshot;

    use crate::models::file::{DOCX_MIME, PDF_MIME};
    use crate::models::RoleMatch;
    use crate::upload::validator::MAX_FILE_SIZE_BYTES;

    enum Scripted {
        Immediate(Result<AnalysisResult, UploadError>),
        Held(oneshot::Receiver<()>, Result<AnalysisResult, UploadError>),
    }

    #[derive(Default)]
    struct ScriptedService {
        calls: AtomicUsize,
        script: Mutex<VecDeque<Scripted>>,
    }

    impl ScriptedService {
        fn respond(&self, result: Result<AnalysisResult, UploadError>) {
            self.script.lock().push_back(Scripted::Immediate(result));
        }

        fn respond_when_released(
            &self,
            result: Result<AnalysisResult, UploadError>,
        ) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.script.lock().push_back(Scripted::Held(rx, result));
            tx
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnalysisService for ScriptedService {
        async fn analyze(&self, _file: &CandidateFile) -> Result<AnalysisResult, UploadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().pop_front();
            match next {
                Some(Scripted::Immediate(result)) => result,
                Some(Scripted::Held(release, result)) => {
                    let _ = release.await;
                    result
                }
                None => Err(UploadError::NetworkFailure("no scripted response".into())),
            }
        }
    }

    struct PanickingService;

    #[async_trait]
    impl AnalysisService for PanickingService {
        async fn analyze(&self, _file: &CandidateFile) -> Result<AnalysisResult, UploadError> {
            panic!("service blew up");
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        shown: Mutex<Vec<AnalysisResult>>,
    }

    impl Navigator for RecordingNavigator {
        fn show_results(&self, result: AnalysisResult) {
            self.shown.lock().push(result);
        }
    }

    fn setup() -> (UploadSession, Arc<ScriptedService>, Arc<RecordingNavigator>) {
        let service = Arc::new(ScriptedService::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let session = UploadSession::new(service.clone(), navigator.clone());
        (session, service, navigator)
    }

    fn pdf(name: &str) -> CandidateFile {
        CandidateFile::in_memory(name, PDF_MIME, Bytes::from_static(b"%PDF-1.7"))
    }

    fn payload() -> AnalysisResult {
        AnalysisResult {
            matches: vec![RoleMatch {
                company_name: "Hooli".to_string(),
                role_title: "Platform Engineer".to_string(),
                fit_score: 81,
                strengths: vec!["Go".to_string()],
                gaps: vec!["Terraform".to_string()],
                summary: "Good infrastructure depth.".to_string(),
            }],
        }
    }

    fn started(status: SubmitStatus) -> AttemptHandle {
        match status {
            SubmitStatus::Started(handle) => handle,
            SubmitStatus::AlreadyInFlight(_) => panic!("expected a new submission"),
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let (session, _, _) = setup();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.can_submit());
        assert!(session.outcome().is_none());
    }

    #[test]
    fn test_accepted_file_enters_file_selected_and_clears_error() {
        let (session, _, _) = setup();
        let bad = CandidateFile::in_memory("cv.txt", "text/plain", Bytes::new());
        assert_eq!(session.select_file(bad), Err(UploadError::UnsupportedType));
        assert_eq!(session.error_text().as_deref(), Some("Only PDF or DOCX allowed"));

        session.select_file(pdf("cv.pdf")).unwrap();
        assert_eq!(session.phase(), Phase::FileSelected);
        assert!(session.error_text().is_none());
        assert!(session.can_submit());
    }

    #[test]
    fn test_rejected_file_keeps_previous_selection() {
        let (session, _, _) = setup();
        session.select_file(pdf("keep.pdf")).unwrap();

        let huge = CandidateFile::on_disk(
            "huge.docx",
            DOCX_MIME,
            MAX_FILE_SIZE_BYTES + 1,
            PathBuf::from("huge.docx"),
        );
        assert_eq!(session.select_file(huge), Err(UploadError::TooLarge));
        assert_eq!(session.phase(), Phase::FileSelected);
        assert_eq!(session.held_file().unwrap().name, "keep.pdf");
        assert_eq!(session.error_text().as_deref(), Some("Max size: 10MB"));
    }

    #[test]
    fn test_clear_file_only_from_file_selected() {
        let (session, _, _) = setup();
        session.clear_file();
        assert_eq!(session.phase(), Phase::Idle);

        session.select_file(pdf("cv.pdf")).unwrap();
        session.clear_file();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.held_file().is_none());
    }

    #[tokio::test]
    async fn test_submit_without_file_makes_no_call() {
        let (session, service, _) = setup();
        let err = session.submit().unwrap_err();
        assert_eq!(err, UploadError::NoFileSelected);
        assert_eq!(session.error_text().as_deref(), Some("Choose a file first"));
        tokio::task::yield_now().await;
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_double_submit_sends_one_request() {
        let (session, service, navigator) = setup();
        let release = service.respond_when_released(Ok(payload()));
        session.select_file(pdf("cv.pdf")).unwrap();

        let handle = started(session.submit().unwrap());
        assert_eq!(session.phase(), Phase::Submitting);
        assert!(!session.can_submit());
        assert_eq!(session.outcome(), Some(SubmissionOutcome::Pending));

        match session.submit().unwrap() {
            SubmitStatus::AlreadyInFlight(attempt) => assert_eq!(attempt, handle.attempt),
            SubmitStatus::Started(_) => panic!("second submission started"),
        }

        release.send(()).unwrap();
        let outcome = handle.finished().await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::Success(payload()));
        assert_eq!(service.call_count(), 1);
        assert_eq!(navigator.shown.lock().len(), 1);
        assert_eq!(session.phase(), Phase::Succeeded);
    }

    #[tokio::test]
    async fn test_success_hands_full_payload_to_navigator() {
        let (session, service, navigator) = setup();
        service.respond(Ok(payload()));
        session.select_file(pdf("cv.pdf")).unwrap();

        started(session.submit().unwrap()).finished().await;

        assert_eq!(navigator.shown.lock().as_slice(), &[payload()]);
        assert!(session.narration().borrow().is_none());
    }

    #[tokio::test]
    async fn test_failure_then_retry_with_same_file() {
        let (session, service, navigator) = setup();
        service.respond(Err(UploadError::ServiceError("Resume unreadable".into())));
        service.respond(Ok(payload()));
        session.select_file(pdf("cv.pdf")).unwrap();

        let outcome = started(session.submit().unwrap()).finished().await;
        assert_eq!(
            outcome,
            Some(SubmissionOutcome::Failure("Resume unreadable".to_string()))
        );
        assert_eq!(session.phase(), Phase::Failed);
        assert_eq!(session.error_text().as_deref(), Some("Resume unreadable"));
        assert!(session.narration().borrow().is_none());
        assert!(session.can_submit());
        assert!(navigator.shown.lock().is_empty());

        let handle = started(session.submit().unwrap());
        assert_eq!(session.phase(), Phase::Submitting);
        assert!(session.error_text().is_none());
        handle.finished().await;

        assert_eq!(service.call_count(), 2);
        assert_eq!(session.phase(), Phase::Succeeded);
    }

    #[tokio::test]
    async fn test_network_failure_without_message_uses_fallback() {
        let (session, service, _) = setup();
        service.respond(Err(UploadError::NetworkFailure(String::new())));
        session.select_file(pdf("cv.pdf")).unwrap();

        started(session.submit().unwrap()).finished().await;
        assert_eq!(session.error_text().as_deref(), Some("Failed to analyze resume"));
    }

    #[tokio::test]
    async fn test_resubmit_after_success_navigates_again() {
        let (session, service, navigator) = setup();
        service.respond(Ok(payload()));
        service.respond(Ok(AnalysisResult::default()));
        session.select_file(pdf("cv.pdf")).unwrap();

        started(session.submit().unwrap()).finished().await;
        assert_eq!(session.phase(), Phase::Succeeded);
        started(session.submit().unwrap()).finished().await;

        assert_eq!(
            navigator.shown.lock().as_slice(),
            &[payload(), AnalysisResult::default()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_service_settles_as_failure() {
        let navigator = Arc::new(RecordingNavigator::default());
        let session = UploadSession::new(Arc::new(PanickingService), navigator.clone());
        session.select_file(pdf("cv.pdf")).unwrap();
        let narration = session.narration();

        let outcome = started(session.submit().unwrap()).finished().await;
        assert_eq!(
            outcome,
            Some(SubmissionOutcome::Failure("Failed to analyze resume".to_string()))
        );
        assert_eq!(session.phase(), Phase::Failed);
        assert_eq!(session.error_text().as_deref(), Some("Failed to analyze resume"));
        assert!(session.can_submit());
        assert!(narration.borrow().is_none());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(narration.borrow().is_none());
        assert!(navigator.shown.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_narration_runs_while_waiting_and_stops_on_settle() {
        let (session, service, _) = setup();
        let release = service.respond_when_released(Ok(payload()));
        session.select_file(pdf("cv.pdf")).unwrap();
        let narration = session.narration();

        let handle = started(session.submit().unwrap());
        assert_eq!(narration.borrow().unwrap().index, 0);

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(narration.borrow().unwrap().index, 2);

        release.send(()).unwrap();
        handle.finished().await;
        assert!(narration.borrow().is_none());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(narration.borrow().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubmit_restarts_narration_at_zero() {
        let (session, service, _) = setup();
        service.respond(Err(UploadError::NetworkFailure("reset".into())));
        let release = service.respond_when_released(Ok(payload()));
        session.select_file(pdf("cv.pdf")).unwrap();

        started(session.submit().unwrap()).finished().await;
        let handle = started(session.submit().unwrap());
        assert_eq!(session.narration().borrow().unwrap().index, 0);

        release.send(()).unwrap();
        handle.finished().await;
    }

    #[tokio::test]
    async fn test_new_selection_after_success_discards_result() {
        let (session, service, _) = setup();
        service.respond(Ok(payload()));
        session.select_file(pdf("first.pdf")).unwrap();
        started(session.submit().unwrap()).finished().await;

        session.select_file(pdf("second.pdf")).unwrap();
        assert_eq!(session.phase(), Phase::FileSelected);
        assert!(session.outcome().is_none());
        assert_eq!(session.held_file().unwrap().name, "second.pdf");
    }

    #[tokio::test]
    async fn test_selection_ignored_while_submitting() {
        let (session, service, _) = setup();
        let release = service.respond_when_released(Ok(payload()));
        session.select_file(pdf("first.pdf")).unwrap();
        let handle = started(session.submit().unwrap());

        session.select_file(pdf("second.pdf")).unwrap();
        assert_eq!(session.phase(), Phase::Submitting);
        assert_eq!(session.held_file().unwrap().name, "first.pdf");

        release.send(()).unwrap();
        handle.finished().await;
    }

    #[tokio::test]
    async fn test_result_after_session_dropped_is_ignored() {
        let (session, service, navigator) = setup();
        let release = service.respond_when_released(Ok(payload()));
        session.select_file(pdf("cv.pdf")).unwrap();

        let handle = started(session.submit().unwrap());
        session.abandon();

        release.send(()).unwrap();
        assert!(handle.finished().await.is_none());
        assert!(navigator.shown.lock().is_empty());
    }

    #[test]
    fn test_drag_and_drop_selects_first_file() {
        let (session, _, _) = setup();
        session.drag_enter();
        assert!(session.is_drag_active());

        session
            .drop_files(vec![pdf("dropped.pdf"), pdf("ignored.pdf")])
            .unwrap();
        assert!(!session.is_drag_active());
        assert_eq!(session.held_file().unwrap().name, "dropped.pdf");

        session.drag_enter();
        session.drag_leave();
        assert!(!session.is_drag_active());
    }

    #[test]
    fn test_empty_drop_changes_nothing() {
        let (session, _, _) = setup();
        session.drag_enter();
        session.drop_files(vec![]).unwrap();
        assert!(!session.is_drag_active());
        assert_eq!(session.phase(), Phase::Idle);
    }
}
