//! In-memory collaborators for dry runs and tests.

use crate::backend::{Submission, SubmissionRegistrar, TestProvider};
use crate::error::{Error, Result};
use crate::execution::{CaseResult, ExecutionService, RunRequest};
use crate::lockdown::{Disposition, GuardedAction, Listener, ListenerId, LockdownHost};
use crate::question::{Question, QuestionId, TestCase, TestId};
use async_std::channel::{self, Receiver, Sender};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases runs held by [MockBackend::hold_runs].
pub struct RunGate(Sender<()>);

impl RunGate {
    /// Let one held run finish.
    pub fn release(&self) {
        let _ = self.0.try_send(());
    }
}

/// A test provider, judge and registrar in one, backed by a fixed
/// question set.
///
/// The judge accepts code equal to a question's reference solution
/// (ignoring surrounding whitespace) and answers everything else with
/// "Wrong Answer".  Scripted verdicts take precedence.
#[derive(Default)]
pub struct MockBackend {
    questions: Vec<Question>,
    references: HashMap<QuestionId, String>,
    scripted: Mutex<HashMap<QuestionId, Vec<CaseResult>>>,
    fail_load: AtomicBool,
    fail_start: AtomicBool,
    fail_run: Mutex<Option<String>>,
    fail_submits: AtomicUsize,
    submit_answer: Mutex<Option<String>>,
    gate: Mutex<Option<Receiver<()>>>,
    loads: AtomicUsize,
    starts: AtomicUsize,
    runs: Mutex<Vec<RunRequest>>,
    submissions: Mutex<Vec<(TestId, Submission)>>,
}

impl MockBackend {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            ..Self::default()
        }
    }

    pub fn with_reference<T: AsRef<str>>(mut self, question: &QuestionId, code: T) -> Self {
        self.references
            .insert(question.clone(), code.as_ref().to_owned());
        self
    }

    /// Answer every run of `question` with `cases`.
    pub fn script(&self, question: &QuestionId, cases: Vec<CaseResult>) {
        lock(&self.scripted).insert(question.clone(), cases);
    }

    pub fn fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    /// Make runs fail with `message` until reset with `None`.
    pub fn fail_run(&self, message: Option<&str>) {
        *lock(&self.fail_run) = message.map(str::to_owned);
    }

    /// Make the next `n` submissions fail with "Submission failed".
    pub fn fail_submits(&self, n: usize) {
        self.fail_submits_with(n, Some("Submission failed"));
    }

    /// Make the next `n` submissions fail with `answer` from the registrar,
    /// or as if it was unreachable when `answer` is `None`.
    pub fn fail_submits_with(&self, n: usize, answer: Option<&str>) {
        *lock(&self.submit_answer) = answer.map(str::to_owned);
        self.fail_submits.store(n, Ordering::SeqCst);
    }

    /// Hold every following run until released through the gate.
    pub fn hold_runs(&self) -> RunGate {
        let (tx, rx) = channel::unbounded();
        *lock(&self.gate) = Some(rx);
        RunGate(tx)
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// Every run request that reached the judge.
    pub fn runs(&self) -> Vec<RunRequest> {
        lock(&self.runs).clone()
    }

    /// Every accepted submission.
    pub fn submissions(&self) -> Vec<(TestId, Submission)> {
        lock(&self.submissions).clone()
    }

    fn judge(&self, request: &RunRequest, q: &Question) -> Vec<CaseResult> {
        if let Some(cases) = lock(&self.scripted).get(&q.id) {
            return cases.clone();
        }
        let accepted = self
            .references
            .get(&q.id)
            .map_or(false, |r| r.trim() == request.code.trim());
        q.test_cases
            .iter()
            .map(|tc| judge_case(tc, accepted))
            .collect()
    }
}

fn judge_case(tc: &TestCase, accepted: bool) -> CaseResult {
    let (status, actual) = if accepted {
        ("Accepted", tc.expected_output.clone())
    } else {
        ("Wrong Answer", String::new())
    };
    let hide = |s: String| if tc.is_hidden { "Hidden".to_owned() } else { s };
    CaseResult {
        input: hide(tc.input.clone()),
        expected_output: hide(tc.expected_output.clone()),
        actual_output: hide(actual),
        passed: accepted,
        status: status.to_owned(),
        time_ms: 1.0,
        memory_kb: 1024,
        is_hidden: tc.is_hidden,
        ..CaseResult::default()
    }
}

#[async_trait::async_trait]
impl TestProvider for MockBackend {
    async fn questions(&self, _test: &TestId) -> Result<Vec<Question>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(Error::LoadFail("mock provider unavailable".to_owned()));
        }
        Ok(self.questions.clone())
    }

    async fn start(&self, _test: &TestId) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(Error::StartFail("mock registrar unavailable".to_owned()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ExecutionService for MockBackend {
    async fn run(&self, request: &RunRequest) -> Result<Vec<CaseResult>> {
        lock(&self.runs).push(request.clone());

        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            let _ = gate.recv().await;
        }

        if let Some(m) = lock(&self.fail_run).clone() {
            return Err(Error::ExecutionFail(m));
        }
        let q = self
            .questions
            .iter()
            .find(|q| q.id == request.question_id && q.is_coding)
            .ok_or_else(|| Error::ExecutionFail("Coding question not found".to_owned()))?;
        Ok(self.judge(request, q))
    }
}

#[async_trait::async_trait]
impl SubmissionRegistrar for MockBackend {
    async fn submit(&self, test: &TestId, submission: &Submission) -> Result<()> {
        let failing = self
            .fail_submits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::SubmitFail(lock(&self.submit_answer).clone()));
        }
        lock(&self.submissions).push((test.clone(), submission.clone()));
        Ok(())
    }
}

/// A lockdown host that keeps its listeners in memory.
#[derive(Default)]
pub struct RecordingHost {
    next: AtomicU64,
    listeners: Mutex<HashMap<ListenerId, (GuardedAction, Listener)>>,
    refuse_fullscreen: bool,
    fullscreen: AtomicBool,
    fullscreen_requests: AtomicUsize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that never grants fullscreen.
    pub fn refusing_fullscreen() -> Self {
        Self {
            refuse_fullscreen: true,
            ..Self::default()
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.load(Ordering::SeqCst)
    }

    pub fn fullscreen_requests(&self) -> usize {
        self.fullscreen_requests.load(Ordering::SeqCst)
    }

    /// Deliver `action` to its listeners, as the user attempting it would.
    pub fn dispatch(&self, action: GuardedAction) -> Disposition {
        let listeners = lock(&self.listeners)
            .values()
            .filter(|(a, _)| *a == action)
            .map(|(_, l)| l.clone())
            .collect::<Vec<_>>();
        let mut d = Disposition::Allow;
        for l in listeners {
            if l(action) == Disposition::Block {
                d = Disposition::Block;
            }
        }
        d
    }
}

impl LockdownHost for RecordingHost {
    fn add_listener(&self, action: GuardedAction, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next.fetch_add(1, Ordering::SeqCst));
        lock(&self.listeners).insert(id, (action, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        lock(&self.listeners).remove(&id);
    }

    fn request_fullscreen(&self) -> Result<()> {
        self.fullscreen_requests.fetch_add(1, Ordering::SeqCst);
        if self.refuse_fullscreen {
            return Err(Error::FullscreenFail("denied by the host".to_owned()));
        }
        self.fullscreen.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn exit_fullscreen(&self) {
        self.fullscreen.store(false, Ordering::SeqCst);
    }
}
