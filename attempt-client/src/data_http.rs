use crate::data::HttpConfig;
use crate::prelude::*;
use attempt_session::{
    CaseResult, Error as SessionError, ExecutionService, Question, RunRequest, Submission,
    SubmissionRegistrar, TestId, TestProvider,
};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::fmt::{self, Display, Formatter};

/// The platform's student API.
pub struct HttpBackend {
    client: reqwest::Client,
    base: String,
    token: Option<String>,
}

/// Why a call got no usable envelope.
#[derive(Debug, PartialEq)]
enum Failure {
    /// The server was not reached, or its answer was unreadable.
    Transport(String),
    /// The server answered with an error status.
    Rejected { status: u16, message: Option<String> },
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "{}", e),
            Self::Rejected {
                message: Some(m), ..
            } => write!(f, "{}", m),
            Self::Rejected { status, .. } => write!(f, "request failed with status {}", status),
        }
    }
}

#[derive(Deserialize)]
struct Ack {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct TestData {
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct TestEnvelope {
    #[serde(default)]
    success: bool,
    data: Option<TestData>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct RunEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    results: Vec<CaseResult>,
    #[serde(default)]
    message: Option<String>,
}

/// The failure of a call answered with `status` and `body`.
fn rejected(status: u16, body: &str) -> Failure {
    let message = serde_json::from_str::<Ack>(body)
        .ok()
        .and_then(|a| a.message)
        .filter(|m| !m.is_empty());
    Failure::Rejected { status, message }
}

fn questions_of(env: TestEnvelope) -> attempt_session::Result<Vec<Question>> {
    match (env.success, env.data) {
        (true, Some(d)) => Ok(d.questions),
        _ => Err(SessionError::LoadFail(
            env.message.unwrap_or_else(|| "test not available".to_owned()),
        )),
    }
}

fn started(ack: Ack) -> attempt_session::Result<()> {
    if !ack.success {
        return Err(SessionError::StartFail(ack.message.unwrap_or_default()));
    }
    Ok(())
}

fn results_of(env: RunEnvelope) -> attempt_session::Result<Vec<CaseResult>> {
    if !env.success {
        if let Some(m) = env.message {
            warn!("judge refused the run: {}", m);
        }
        return Err(SessionError::ExecutionFail("Execution failed".to_owned()));
    }
    Ok(env.results)
}

fn submitted(ack: Ack) -> attempt_session::Result<()> {
    if !ack.success {
        return Err(SessionError::SubmitFail(Some(
            ack.message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Submission failed".to_owned()),
        )));
    }
    Ok(())
}

/// Only an answer from the registrar is worth showing to the student.
fn submit_failure(f: Failure) -> SessionError {
    match f {
        Failure::Transport(e) => {
            error!("cannot reach the registrar: {}", e);
            SessionError::SubmitFail(None)
        }
        Failure::Rejected { status, message } => {
            warn!("registrar answered {}", status);
            SessionError::SubmitFail(message)
        }
    }
}

impl HttpBackend {
    pub fn new(cfg: &HttpConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: cfg.base_url.trim_end_matches('/').to_owned(),
            token: cfg.token.clone().filter(|t| !t.is_empty()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/institution/student/{}", self.base, path)
    }

    async fn call<T: DeserializeOwned>(&self, req: RequestBuilder) -> std::result::Result<T, Failure> {
        let req = match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        };
        let transport = |e: reqwest::Error| Failure::Transport(e.to_string());
        let resp = req.send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(rejected(status.as_u16(), &body));
        }
        resp.json::<T>().await.map_err(transport)
    }
}

#[async_trait::async_trait]
impl TestProvider for HttpBackend {
    async fn questions(&self, test: &TestId) -> attempt_session::Result<Vec<Question>> {
        debug!("fetching questions of test {}", test);
        let req = self.client.get(self.url(&format!("tests/{}", test)));
        let env = self
            .call(req)
            .await
            .map_err(|f| SessionError::LoadFail(f.to_string()))?;
        questions_of(env)
    }

    async fn start(&self, test: &TestId) -> attempt_session::Result<()> {
        let req = self
            .client
            .post(self.url(&format!("tests/{}/start", test)))
            .json(&serde_json::json!({}));
        let ack = self
            .call(req)
            .await
            .map_err(|f| SessionError::StartFail(f.to_string()))?;
        started(ack)
    }
}

#[async_trait::async_trait]
impl ExecutionService for HttpBackend {
    async fn run(&self, request: &RunRequest) -> attempt_session::Result<Vec<CaseResult>> {
        let req = self.client.post(self.url("run-code")).json(request);
        let env = self
            .call(req)
            .await
            .map_err(|f| SessionError::ExecutionFail(f.to_string()))?;
        results_of(env)
    }
}

#[async_trait::async_trait]
impl SubmissionRegistrar for HttpBackend {
    async fn submit(&self, test: &TestId, submission: &Submission) -> attempt_session::Result<()> {
        let req = self
            .client
            .post(self.url(&format!("tests/{}/submit", test)))
            .json(submission);
        let ack = self.call(req).await.map_err(submit_failure)?;
        submitted(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode<T: DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).expect("should decode the envelope")
    }

    #[test]
    fn test_run_refused_is_execution_failed() {
        let env = decode(r#"{"success": false, "message": "Coding question not found"}"#);
        match results_of(env) {
            Err(SessionError::ExecutionFail(m)) => assert_eq!(m, "Execution failed"),
            r => panic!("unexpected {:?}", r.map(|v| v.len())),
        }
    }

    #[test]
    fn test_run_results_decode() {
        let env = decode(
            r#"{"success": true, "results": [
                {"input": "1", "expectedOutput": "1", "actualOutput": "1",
                 "passed": true, "status": "Accepted", "time": null, "memory": 512}
            ]}"#,
        );
        let results = results_of(env).expect("should accept the results");
        assert_eq!(results.len(), 1);
        assert!(results[0].passed);
        assert_eq!(results[0].time_ms, 0.0);
        assert_eq!(results[0].memory_kb, 512);
    }

    #[test]
    fn test_rejected_surfaces_message() {
        let f = rejected(403, r#"{"success": false, "message": "Test has ended"}"#);
        assert_eq!(f.to_string(), "Test has ended");
        let f = rejected(502, "<html>Bad Gateway</html>");
        assert_eq!(f.to_string(), "request failed with status 502");
    }

    #[test]
    fn test_test_refused_is_load_fail() {
        let env = decode(r#"{"success": false, "message": "Not assigned"}"#);
        match questions_of(env) {
            Err(SessionError::LoadFail(m)) => assert_eq!(m, "Not assigned"),
            r => panic!("unexpected {:?}", r.map(|v| v.len())),
        }
        let env = decode(r#"{"success": true}"#);
        assert!(matches!(questions_of(env), Err(SessionError::LoadFail(_))));
    }

    #[test]
    fn test_test_questions_decode() {
        let env = decode(
            r#"{"success": true, "data": {"questions": [
                {"_id": "q1", "text": "sum", "isCoding": true,
                 "testCases": [{"input": "1 2", "output": "3", "isHidden": false}]}
            ]}}"#,
        );
        let qs = questions_of(env).expect("should accept the questions");
        assert_eq!(qs[0].id.as_str(), "q1");
        assert_eq!(qs[0].test_cases[0].expected_output, "3");
    }

    #[test]
    fn test_submit_refused_falls_back() {
        let ack = decode(r#"{"success": false}"#);
        match submitted(ack) {
            Err(SessionError::SubmitFail(Some(m))) => assert_eq!(m, "Submission failed"),
            r => panic!("unexpected {:?}", r),
        }
        let ack = decode(r#"{"success": false, "message": "Deadline passed"}"#);
        assert!(matches!(
            submitted(ack),
            Err(SessionError::SubmitFail(Some(m))) if m == "Deadline passed"
        ));
        assert!(submitted(decode(r#"{"success": true}"#)).is_ok());
    }

    #[test]
    fn test_submit_transport_failure_has_no_message() {
        let e = submit_failure(Failure::Transport("connection refused".to_owned()));
        assert!(matches!(e, SessionError::SubmitFail(None)));
        let e = submit_failure(rejected(500, "{}"));
        assert!(matches!(e, SessionError::SubmitFail(None)));
        let e = submit_failure(rejected(409, r#"{"message": "Already submitted"}"#));
        assert!(matches!(e, SessionError::SubmitFail(Some(m)) if m == "Already submitted"));
    }
}
