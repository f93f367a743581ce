use attempt_session::{CaseDetail, CaseResult, Console, ConsoleView, Headline, RunOutcome, RunResult};

fn case(input: &str, passed: bool, status: &str, hidden: bool) -> CaseResult {
    CaseResult {
        input: input.to_owned(),
        expected_output: "out".to_owned(),
        actual_output: if passed { "out".to_owned() } else { String::new() },
        passed,
        status: status.to_owned(),
        time_ms: 12.0,
        memory_kb: 512,
        is_hidden: hidden,
        ..CaseResult::default()
    }
}

fn completed(cases: Vec<CaseResult>) -> RunOutcome {
    RunOutcome::Completed(RunResult::new(cases))
}

#[test]
fn test_idle_and_running() {
    let mut c = Console::new();
    assert_eq!(c.view(), ConsoleView::Idle);
    assert_eq!(c.view().to_string(), "Ready to Verify Solution\n");
    c.start_run();
    assert!(c.is_running());
    assert_eq!(c.view(), ConsoleView::Running);
}

#[test]
fn test_selects_first_failure() {
    let mut c = Console::new();
    c.replace(completed(vec![
        case("1", true, "Accepted", false),
        case("2", true, "Accepted", false),
        case("3", false, "Wrong Answer", false),
    ]));
    assert_eq!(c.selected(), 2);
    assert_eq!(c.headline(), Some(Headline::Rejected("Wrong Answer".to_owned())));
}

#[test]
fn test_selection_resets_on_new_run() {
    let mut c = Console::new();
    c.replace(completed(vec![
        case("1", true, "Accepted", false),
        case("2", true, "Accepted", false),
    ]));
    assert!(c.select(1));
    assert_eq!(c.selected(), 1);
    assert!(!c.select(2), "there is no third case");
    assert_eq!(c.selected(), 1);

    c.replace(completed(vec![
        case("1", true, "Accepted", false),
        case("2", true, "Accepted", false),
    ]));
    assert_eq!(c.selected(), 0);
}

#[test]
fn test_hidden_case_is_redacted() {
    let mut c = Console::new();
    c.replace(completed(vec![
        case("1", true, "Accepted", false),
        case("secret", false, "Wrong Answer", true),
    ]));
    match c.view() {
        ConsoleView::Results {
            detail: Some(CaseDetail::Hidden { passed, .. }),
            selected,
            ..
        } => {
            assert!(!passed);
            assert_eq!(selected, 1);
        }
        v => panic!("hidden case should be redacted: {:?}", v),
    }
    let text = c.view().to_string();
    assert!(text.contains("This is a hidden test case"));
    assert!(!text.contains("secret"));
}

#[test]
fn test_visible_case_rendering() {
    let mut c = Console::new();
    c.replace(completed(vec![case("", false, "Runtime Error", false)]));
    let text = c.view().to_string();
    assert!(text.starts_with("Runtime Error\n"));
    assert!(text.contains("Input:\nNone"));
    assert!(text.contains("Output:\n(Empty)"));
    assert!(text.contains("Expected:\nout"));
    assert!(text.contains("Time: 12ms  Memory: 512kb"));
}

#[test]
fn test_failed_run() {
    let mut c = Console::new();
    c.replace(RunOutcome::Failed("Network Error".to_owned()));
    assert_eq!(c.view(), ConsoleView::Failed(Headline::Error("Network Error".to_owned())));
    assert_eq!(c.selected(), 0);
    assert!(!c.select(0));
}
