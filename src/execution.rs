use crate::error::{Error, Result};
use crate::language::LanguageId;
use crate::question::{QuestionId, TestId};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The judge's verdict for one test case.
///
/// Compile errors and runtime exceptions are data here: `passed` is false
/// and `stderr` carries the message.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResult {
    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(default)]
    pub input: String,
    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(default)]
    pub expected_output: String,
    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(default)]
    pub actual_output: String,
    #[serde(default)]
    pub passed: bool,
    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(default)]
    pub status: String,
    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(default)]
    pub stderr: String,
    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(default)]
    pub stdout: String,
    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(default, rename = "time")]
    pub time_ms: f64,
    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(default, rename = "memory")]
    pub memory_kb: u64,
    #[serde(default)]
    pub is_hidden: bool,
    /// Set when the judge could not execute this case at all.
    #[serde(default)]
    pub error: Option<String>,
}

impl CaseResult {
    /// Blank everything a hidden case must not reveal.
    fn redact(mut self) -> Self {
        if self.is_hidden {
            self.input.clear();
            self.expected_output.clear();
            self.actual_output.clear();
            self.stdout.clear();
        }
        self
    }
}

/// The single aggregate status of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Headline {
    Accepted,
    /// Status of the first failing case.
    Rejected(String),
    /// The run could not be carried out.
    Error(String),
}

impl Headline {
    /// Whether every case passed.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl std::fmt::Display for Headline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => f.write_str("Accepted"),
            Self::Rejected(s) => f.write_str(s),
            Self::Error(m) => write!(f, "Error: {}", m),
        }
    }
}

/// Verdicts of one run, in test case order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunResult {
    cases: Vec<CaseResult>,
}

impl RunResult {
    /// Wrap the verdicts of a run, one per test case in order.
    pub fn new(cases: Vec<CaseResult>) -> Self {
        Self { cases }
    }

    /// The verdicts, in test case order.
    pub fn cases(&self) -> &[CaseResult] {
        &self.cases
    }

    /// Number of judged cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Number of passed cases.
    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    /// Index of the first case that did not pass.
    pub fn first_failure(&self) -> Option<usize> {
        self.cases.iter().position(|c| !c.passed)
    }

    /// "Accepted" when every case passed, else the status of the first
    /// failing case ("Failed" if it has none).
    pub fn headline(&self) -> Headline {
        match self.first_failure() {
            None => Headline::Accepted,
            Some(i) => {
                let status = &self.cases[i].status;
                if status.is_empty() {
                    Headline::Rejected("Failed".to_owned())
                } else {
                    Headline::Rejected(status.clone())
                }
            }
        }
    }

    /// The case to inspect first: the first failing one, or the first.
    pub fn default_selection(&self) -> usize {
        self.first_failure().unwrap_or(0)
    }
}

/// What a run produced: a full verdict list or one synthetic failure.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunResult),
    Failed(String),
}

impl RunOutcome {
    /// The one-line summary shown above the case list.
    pub fn headline(&self) -> Headline {
        match self {
            Self::Completed(r) => r.headline(),
            Self::Failed(m) => Headline::Error(m.clone()),
        }
    }

    /// The verdicts, if the run got that far.
    pub fn result(&self) -> Option<&RunResult> {
        match self {
            Self::Completed(r) => Some(r),
            Self::Failed(_) => None,
        }
    }
}

/// A request to run one question's code against all of its test cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub test_id: TestId,
    pub question_id: QuestionId,
    pub code: String,
    pub language: LanguageId,
}

/// The external judge.  It executes every test case, hidden ones included.
#[async_trait::async_trait]
pub trait ExecutionService: Send + Sync {
    async fn run(&self, request: &RunRequest) -> Result<Vec<CaseResult>>;
}

/// Stateless wrapper around an [ExecutionService].
///
/// It never lets a partial verdict list through: either the list covers
/// every test case of the question, or the whole run is a failure.
#[derive(Clone)]
pub struct ExecutionClient {
    service: Arc<dyn ExecutionService>,
}

impl ExecutionClient {
    /// A client talking to `service`.
    pub fn new(service: Arc<dyn ExecutionService>) -> Self {
        Self { service }
    }

    /// Run `request` and check the verdicts against `case_count`.
    pub async fn try_run(&self, request: &RunRequest, case_count: usize) -> Result<RunResult> {
        debug!(
            "running question {} in {} ({} test cases)",
            request.question_id, request.language, case_count
        );
        let cases = self.service.run(request).await?;
        if cases.len() != case_count {
            return Err(Error::ResultCountMismatch {
                expected: case_count,
                got: cases.len(),
            });
        }
        Ok(RunResult::new(cases.into_iter().map(CaseResult::redact).collect()))
    }

    /// Like [ExecutionClient::try_run], folding any failure into
    /// [RunOutcome::Failed].
    pub async fn run(&self, request: &RunRequest, case_count: usize) -> RunOutcome {
        match self.try_run(request, case_count).await {
            Ok(r) => RunOutcome::Completed(r),
            Err(e) => {
                warn!("run of question {} failed: {}", request.question_id, e);
                let msg = match e {
                    Error::ExecutionFail(m) => m,
                    e => e.to_string(),
                };
                RunOutcome::Failed(msg)
            }
        }
    }
}
