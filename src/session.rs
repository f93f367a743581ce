use crate::backend::{Collaborators, Response, Submission};
use crate::console::Console;
use crate::error::{Error, Result};
use crate::execution::{ExecutionClient, RunOutcome, RunRequest};
use crate::language::LanguageId;
use crate::notify::{Notification, Notifier};
use crate::question::{Question, QuestionId, TestId};
use crate::store::CodeBufferStore;
use crate::timer::{AttemptTimer, TimerStatus};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const SUBMIT_SLOT: &str = "submit";
const RUN_SLOT: &str = "run";

/// Lifecycle of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the question set.
    Loading,
    /// The student is working.
    Active,
    /// The submission is on its way to the registrar.
    Submitting,
    /// Submitted; nothing else will happen.
    Terminated,
}

fn one_hour() -> Duration {
    Duration::from_secs(3600)
}

fn five_min() -> Duration {
    Duration::from_secs(300)
}

fn one_sec() -> Duration {
    Duration::from_secs(1)
}

#[serde_with::serde_as]
#[derive(Deserialize)]
struct RawSessionConfig {
    #[serde_as(as = "serde_with::DurationSeconds<f64>")]
    #[serde(default = "one_hour")]
    duration: Duration,
    #[serde_as(as = "serde_with::DurationSeconds<f64>")]
    #[serde(default = "five_min")]
    critical_below: Duration,
    #[serde_as(as = "serde_with::DurationSeconds<f64>")]
    #[serde(default = "one_sec")]
    tick: Duration,
}

/// Tunables of an attempt.
///
/// Deserializing rejects a zero `tick`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawSessionConfig")]
pub struct SessionConfig {
    /// Length of the attempt.
    pub duration: Duration,
    /// Below this the timer is shown as critical.
    pub critical_below: Duration,
    /// Real time between two timer ticks.  Each tick is one second of
    /// attempt time.
    pub tick: Duration,
}

impl TryFrom<RawSessionConfig> for SessionConfig {
    type Error = String;
    fn try_from(raw: RawSessionConfig) -> std::result::Result<Self, String> {
        if raw.tick.is_zero() {
            return Err("tick must be a positive number of seconds".to_owned());
        }
        Ok(Self {
            duration: raw.duration,
            critical_below: raw.critical_below,
            tick: raw.tick,
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration: one_hour(),
            critical_below: five_min(),
            tick: one_sec(),
        }
    }
}

/// Why a submission is being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// The student pressed submit and answered the confirmation prompt.
    Manual { confirmed: bool },
    /// The timer ran out.
    Expiry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    /// The student declined the confirmation.
    Cancelled,
    Submitted,
}

/// A run captured at request time.
///
/// It carries its question's identifier so that the result lands on that
/// question, wherever the student has navigated to in the meantime.
pub struct RunTicket {
    request: RunRequest,
    case_count: usize,
    client: ExecutionClient,
}

impl RunTicket {
    pub fn question_id(&self) -> &QuestionId {
        &self.request.question_id
    }

    pub fn request(&self) -> &RunRequest {
        &self.request
    }

    pub async fn execute(self) -> RunCompletion {
        let outcome = self.client.run(&self.request, self.case_count).await;
        RunCompletion {
            question_id: self.request.question_id,
            outcome,
        }
    }
}

/// The answer to a [RunTicket].
#[derive(Debug, Clone, PartialEq)]
pub struct RunCompletion {
    pub question_id: QuestionId,
    pub outcome: RunOutcome,
}

/// The state machine of one attempt.
///
/// Every method runs to completion on the caller's event loop; the only
/// suspending operations are the collaborator calls.
pub struct SessionController {
    id: uuid::Uuid,
    test_id: TestId,
    backend: Collaborators,
    notifier: Arc<dyn Notifier>,
    state: SessionState,
    questions: Vec<Question>,
    current: usize,
    store: CodeBufferStore,
    consoles: HashMap<QuestionId, Console>,
    pending_run: Option<QuestionId>,
    timer: AttemptTimer,
    started_at: DateTime<Utc>,
    submitted: Option<Submission>,
}

impl SessionController {
    pub fn new(
        test_id: TestId,
        config: &SessionConfig,
        backend: Collaborators,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            test_id,
            backend,
            notifier,
            state: SessionState::Loading,
            questions: vec![],
            current: 0,
            store: CodeBufferStore::default(),
            consoles: HashMap::new(),
            pending_run: None,
            timer: AttemptTimer::new(config.duration, config.critical_below),
            started_at: Utc::now(),
            submitted: None,
        }
    }

    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn test_id(&self) -> &TestId {
        &self.test_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn timer(&self) -> &AttemptTimer {
        &self.timer
    }

    pub fn store(&self) -> &CodeBufferStore {
        &self.store
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn current_language(&self) -> Option<LanguageId> {
        self.current_question()
            .map(|q| self.store.get_active_language(&q.id))
    }

    pub fn current_code(&self) -> Option<&str> {
        self.current_question().map(|q| self.store.resolve(&q.id).1)
    }

    /// The result pane of `question`, once a run was requested for it.
    pub fn console(&self, question: &QuestionId) -> Option<&Console> {
        self.consoles.get(question)
    }

    pub fn current_console(&self) -> Option<&Console> {
        self.current_question().and_then(|q| self.console(&q.id))
    }

    /// The question whose run is in flight.
    pub fn pending_run(&self) -> Option<&QuestionId> {
        self.pending_run.as_ref()
    }

    /// The submission accepted by the registrar.
    pub fn submission(&self) -> Option<&Submission> {
        self.submitted.as_ref()
    }

    fn ensure_active(&self) -> Result<()> {
        match self.state {
            SessionState::Active => Ok(()),
            s => Err(Error::NotActive(s)),
        }
    }

    fn current_id(&self) -> Result<QuestionId> {
        self.current_question()
            .map(|q| q.id.clone())
            .ok_or(Error::NoSuchQuestion(self.current))
    }

    /// Fetch the question set and mark the attempt as started.
    ///
    /// A failed fetch keeps the session in `Loading`; a failed start
    /// notification is only logged.
    pub async fn load(&mut self) -> Result<()> {
        if self.state != SessionState::Loading {
            return Ok(());
        }
        info!("session {} loading test {}", self.id, self.test_id);

        let questions = match self.backend.provider.questions(&self.test_id).await {
            Ok(q) => q,
            Err(e) => {
                error!("failed to load test {}: {}", self.test_id, e);
                self.notifier.notify(Notification::error("Failed to load test"));
                return Err(e);
            }
        };
        if questions.is_empty() {
            warn!("test {} has no questions", self.test_id);
        }

        if let Err(e) = self.backend.provider.start(&self.test_id).await {
            warn!("start already called or failed: {}", e);
        }

        self.store = CodeBufferStore::new(&questions);
        self.questions = questions;
        self.current = 0;
        self.state = SessionState::Active;
        info!(
            "session {} active with {} questions",
            self.id,
            self.questions.len()
        );
        Ok(())
    }

    /// Show question `index`.  Nothing about any question's code changes.
    pub fn navigate(&mut self, index: usize) -> Result<()> {
        self.ensure_active()?;
        if index >= self.questions.len() {
            return Err(Error::NoSuchQuestion(index));
        }
        debug!("navigating from question {} to {}", self.current, index);
        self.current = index;
        Ok(())
    }

    pub fn next(&mut self) -> Result<()> {
        self.navigate(self.current + 1)
    }

    pub fn prev(&mut self) -> Result<()> {
        match self.current.checked_sub(1) {
            Some(i) => self.navigate(i),
            None => Err(Error::FirstQuestion),
        }
    }

    /// Replace the current question's code in its active language.
    pub fn edit<T: Into<String>>(&mut self, text: T) -> Result<()> {
        self.ensure_active()?;
        let q = self.current_id()?;
        let language = self.store.get_active_language(&q);
        self.store.set_code(&q, language, text);
        Ok(())
    }

    /// Switch the current question to `language`.
    pub fn switch_language(&mut self, language: LanguageId) -> Result<()> {
        self.ensure_active()?;
        let q = self.current_id()?;
        debug!("question {} switched to {}", q, language);
        self.store.set_active_language(&q, language);
        Ok(())
    }

    /// Select a case in the current question's result pane.
    pub fn select_case(&mut self, index: usize) -> bool {
        let q = match self.current_question() {
            Some(q) => q.id.clone(),
            None => return false,
        };
        self.consoles
            .get_mut(&q)
            .map_or(false, |c| c.select(index))
    }

    /// Capture a run of the current question.
    ///
    /// Returns `None` if a run is already in flight, or there is nothing
    /// runnable; the request is then dropped without reaching the judge.
    pub fn begin_run(&mut self) -> Option<RunTicket> {
        if self.state != SessionState::Active {
            debug!("run ignored while {:?}", self.state);
            return None;
        }
        if let Some(q) = &self.pending_run {
            debug!("run ignored, question {} still running", q);
            return None;
        }
        let q = self.current_question()?;
        if !q.is_coding {
            self.notifier.notify(
                Notification::info("Only coding questions can be run").in_slot(RUN_SLOT),
            );
            return None;
        }

        let (language, code) = self.store.resolve(&q.id);
        let request = RunRequest {
            test_id: self.test_id.clone(),
            question_id: q.id.clone(),
            code: code.to_owned(),
            language,
        };
        let case_count = q.test_cases.len();
        let q = q.id.clone();

        self.consoles.entry(q.clone()).or_default().start_run();
        self.pending_run = Some(q);
        Some(RunTicket {
            request,
            case_count,
            client: self.backend.execution.clone(),
        })
    }

    /// Apply a finished run to the question it was issued for.
    pub fn complete_run(&mut self, done: RunCompletion) {
        if self.pending_run.as_ref() == Some(&done.question_id) {
            self.pending_run = None;
        } else {
            warn!("unexpected result for question {}", done.question_id);
        }
        if self.state == SessionState::Terminated {
            debug!("dropping result for question {} after submission", done.question_id);
            return;
        }

        let headline = done.outcome.headline();
        info!("question {}: {}", done.question_id, headline);
        if let RunOutcome::Failed(_) = &done.outcome {
            self.notifier
                .notify(Notification::error(headline.to_string()).in_slot(RUN_SLOT));
        }
        self.consoles
            .entry(done.question_id)
            .or_default()
            .replace(done.outcome);
    }

    /// The submission as it would be sent right now.
    ///
    /// It has one entry per question, untouched questions included.
    pub fn build_submission(&self) -> Submission {
        let responses = self
            .questions
            .iter()
            .map(|q| {
                let (language, code) = self.store.resolve(&q.id);
                Response {
                    code: code.to_owned(),
                    language,
                }
            })
            .collect();
        Submission {
            responses,
            started_at: self.started_at,
        }
    }

    /// Submit the attempt.
    ///
    /// On failure the session goes back to `Active` with all code intact.
    pub async fn submit(&mut self, trigger: SubmitTrigger) -> Result<SubmitStatus> {
        if trigger == (SubmitTrigger::Manual { confirmed: false }) {
            debug!("submission cancelled");
            return Ok(SubmitStatus::Cancelled);
        }
        self.ensure_active()?;

        self.state = SessionState::Submitting;
        let submission = self.build_submission();
        info!(
            "session {} submitting {} responses ({:?})",
            self.id,
            submission.responses.len(),
            trigger
        );

        match self
            .backend
            .registrar
            .submit(&self.test_id, &submission)
            .await
        {
            Ok(()) => {
                self.state = SessionState::Terminated;
                self.submitted = Some(submission);
                self.notifier.notify(
                    Notification::success("Test submitted successfully!").in_slot(SUBMIT_SLOT),
                );
                info!("session {} submitted", self.id);
                Ok(SubmitStatus::Submitted)
            }
            Err(e) => {
                self.state = SessionState::Active;
                error!("submission of session {} failed: {}", self.id, e);
                let msg = match &e {
                    Error::SubmitFail(Some(m)) if !m.is_empty() => m.clone(),
                    _ => "Failed to submit test".to_owned(),
                };
                self.notifier
                    .notify(Notification::error(msg).in_slot(SUBMIT_SLOT));
                Err(e)
            }
        }
    }

    /// One second of attempt time has passed.
    ///
    /// At zero an `Active` session is submitted through the same path as
    /// a manual submission, and again on every later tick until that works.
    pub async fn tick(&mut self) -> TimerStatus {
        let status = self.timer.tick();
        if status == TimerStatus::Expired && self.state == SessionState::Active {
            info!("time is up for session {}", self.id);
            if let Err(e) = self.submit(SubmitTrigger::Expiry).await {
                warn!("forced submission failed: {}", e);
            }
        }
        status
    }
}
