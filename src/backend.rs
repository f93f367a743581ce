use crate::error::Result;
use crate::execution::{ExecutionClient, ExecutionService};
use crate::language::LanguageId;
use crate::question::{Question, TestId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Source of the question set, and the attempt-start registrar.
#[async_trait::async_trait]
pub trait TestProvider: Send + Sync {
    /// The questions of `test`, in their stable order.
    async fn questions(&self, test: &TestId) -> Result<Vec<Question>>;
    /// Record that the attempt has started.  Calling it twice is harmless.
    async fn start(&self, test: &TestId) -> Result<()>;
}

/// Receiver of the final submission.
#[async_trait::async_trait]
pub trait SubmissionRegistrar: Send + Sync {
    async fn submit(&self, test: &TestId, submission: &Submission) -> Result<()>;
}

/// What is submitted for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub code: String,
    pub language: LanguageId,
}

/// The whole attempt: one [Response] per question, in question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub responses: Vec<Response>,
    pub started_at: DateTime<Utc>,
}

/// The external services an attempt talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub provider: Arc<dyn TestProvider>,
    pub execution: ExecutionClient,
    pub registrar: Arc<dyn SubmissionRegistrar>,
}

impl Collaborators {
    pub fn new(
        provider: Arc<dyn TestProvider>,
        execution: Arc<dyn ExecutionService>,
        registrar: Arc<dyn SubmissionRegistrar>,
    ) -> Self {
        Self {
            provider,
            execution: ExecutionClient::new(execution),
            registrar,
        }
    }

    /// Use one object for all three roles.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: TestProvider + ExecutionService + SubmissionRegistrar + 'static,
    {
        Self::new(backend.clone(), backend.clone(), backend)
    }
}
