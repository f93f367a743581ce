use attempt_session::mock::MockBackend;
use attempt_session::{
    CaseResult, ExecutionClient, Headline, LanguageId, Question, QuestionId, RunOutcome,
    RunRequest, TestCase, TestId,
};
use std::sync::Arc;

fn coding_question(id: &str, cases: &[(&str, &str, bool)]) -> Question {
    Question {
        id: QuestionId::new(id),
        text: String::new(),
        is_coding: true,
        starter_code: None,
        options: vec![],
        test_cases: cases
            .iter()
            .map(|&(i, o, h)| TestCase {
                input: i.to_owned(),
                expected_output: o.to_owned(),
                is_hidden: h,
            })
            .collect(),
    }
}

fn request(q: &Question, code: &str) -> RunRequest {
    RunRequest {
        test_id: TestId::new("t1"),
        question_id: q.id.clone(),
        code: code.to_owned(),
        language: LanguageId::Python,
    }
}

fn case(passed: bool, status: &str) -> CaseResult {
    CaseResult {
        passed,
        status: status.to_owned(),
        ..CaseResult::default()
    }
}

#[async_std::test]
async fn test_all_passed_is_accepted() {
    let q = coding_question("q1", &[("1", "1", false), ("2", "2", false)]);
    let backend = Arc::new(MockBackend::new(vec![q.clone()]).with_reference(&q.id, "print(1)"));
    let client = ExecutionClient::new(backend.clone());

    let r = client
        .try_run(&request(&q, "print(1)\n"), 2)
        .await
        .expect("should be able to run the reference solution");
    assert_eq!(r.headline(), Headline::Accepted);
    assert_eq!(r.passed_count(), 2);
    assert_eq!(r.default_selection(), 0);
    assert_eq!(backend.runs().len(), 1);
}

#[async_std::test]
async fn test_first_failure_is_headline() {
    let q = coding_question("q1", &[("a", "a", false), ("b", "b", false), ("c", "c", false)]);
    let backend = Arc::new(MockBackend::new(vec![q.clone()]));
    backend.script(
        &q.id,
        vec![
            case(true, "Accepted"),
            case(false, "Runtime Error"),
            case(false, "Wrong Answer"),
        ],
    );
    let client = ExecutionClient::new(backend);

    let r = client.try_run(&request(&q, "x"), 3).await.unwrap();
    assert_eq!(r.headline(), Headline::Rejected("Runtime Error".to_owned()));
    assert_eq!(r.first_failure(), Some(1));
    assert_eq!(r.default_selection(), 1);
}

#[async_std::test]
async fn test_failure_is_synthetic() {
    let q = coding_question("q1", &[("1", "1", false)]);
    let backend = Arc::new(MockBackend::new(vec![q.clone()]));
    backend.fail_run(Some("Network Error"));
    let client = ExecutionClient::new(backend);

    let outcome = client.run(&request(&q, "x"), 1).await;
    assert_eq!(outcome, RunOutcome::Failed("Network Error".to_owned()));
    assert_eq!(outcome.headline().to_string(), "Error: Network Error");
    assert!(outcome.result().is_none());
}

#[async_std::test]
async fn test_short_result_list_is_rejected() {
    let q = coding_question("q1", &[("1", "1", false), ("2", "2", false)]);
    let backend = Arc::new(MockBackend::new(vec![q.clone()]));
    backend.script(&q.id, vec![case(true, "Accepted")]);
    let client = ExecutionClient::new(backend);

    let outcome = client.run(&request(&q, "x"), 2).await;
    match outcome {
        RunOutcome::Failed(m) => assert!(m.contains("1 results for 2"), "{}", m),
        o => panic!("a partial verdict list should not be surfaced: {:?}", o),
    }
}

#[async_std::test]
async fn test_hidden_cases_are_blank() {
    let q = coding_question("q1", &[("1", "1", false), ("secret", "42", true)]);
    let backend = Arc::new(MockBackend::new(vec![q.clone()]).with_reference(&q.id, "ok"));
    let client = ExecutionClient::new(backend);

    let r = client.try_run(&request(&q, "ok"), 2).await.unwrap();
    let hidden = &r.cases()[1];
    assert!(hidden.is_hidden);
    assert!(hidden.passed, "hidden cases are still judged");
    assert!(hidden.input.is_empty());
    assert!(hidden.expected_output.is_empty());
    assert!(hidden.actual_output.is_empty());
    assert_eq!(r.cases()[0].input, "1");
}

#[test]
fn test_decode_wire_case() {
    let json = r#"{
        "input": "Hidden",
        "passed": false,
        "status": "Execution Error",
        "error": "Execution failed: timeout",
        "isHidden": true,
        "stderr": null,
        "time": null,
        "memory": 2048
    }"#;
    let c: CaseResult = serde_json::from_str(json).expect("should decode a sparse case");
    assert_eq!(c.status, "Execution Error");
    assert!(c.stderr.is_empty());
    assert_eq!(c.time_ms, 0.0);
    assert_eq!(c.memory_kb, 2048);
    assert!(c.expected_output.is_empty());
    assert_eq!(c.error.as_deref(), Some("Execution failed: timeout"));
}
