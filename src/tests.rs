use crate::{
    AttemptTimer, CaseResult, CodeBufferStore, Headline, LanguageId, Question, QuestionId,
    RunResult, TimerStatus,
};
use std::time::Duration;

fn question(id: &str, starter: Option<&str>) -> Question {
    Question {
        id: QuestionId::new(id),
        text: format!("question {}", id),
        is_coding: true,
        starter_code: starter.map(str::to_owned),
        options: vec![],
        test_cases: vec![],
    }
}

fn case(passed: bool, status: &str) -> CaseResult {
    CaseResult {
        passed,
        status: status.to_owned(),
        ..CaseResult::default()
    }
}

#[test]
fn test_language_parse() {
    for l in LanguageId::ALL {
        assert_eq!(l.as_str().parse::<LanguageId>().unwrap(), l);
    }
    assert_eq!("c++".parse::<LanguageId>().unwrap(), LanguageId::Cpp);
    assert!("rust".parse::<LanguageId>().is_err());
    assert_eq!(LanguageId::default(), LanguageId::JavaScript);
}

#[test]
fn test_templates_are_distinct() {
    for a in LanguageId::ALL {
        for b in LanguageId::ALL {
            if a != b {
                assert_ne!(a.template(), b.template());
            }
        }
    }
}

#[test]
fn test_store_resolution_order() {
    let q = question("q1", Some("// starter"));
    let mut store = CodeBufferStore::new(&[q.clone()]);

    assert_eq!(store.get_code(&q.id, LanguageId::JavaScript), "// starter");
    assert_eq!(
        store.get_code(&q.id, LanguageId::Python),
        LanguageId::Python.template()
    );

    store.set_code(&q.id, LanguageId::JavaScript, "written");
    assert_eq!(store.get_code(&q.id, LanguageId::JavaScript), "written");
}

#[test]
fn test_store_empty_starter_falls_back_to_template() {
    let q = question("q1", Some(""));
    let store = CodeBufferStore::new(&[q.clone()]);
    assert_eq!(
        store.get_code(&q.id, LanguageId::JavaScript),
        LanguageId::JavaScript.template()
    );
}

#[test]
fn test_store_keeps_empty_writes() {
    let q = question("q1", Some("// starter"));
    let mut store = CodeBufferStore::new(&[q.clone()]);
    store.set_code(&q.id, LanguageId::JavaScript, "");
    assert_eq!(store.get_code(&q.id, LanguageId::JavaScript), "");
}

#[test]
fn test_store_touched() {
    let q = question("q1", None);
    let mut store = CodeBufferStore::new(&[q.clone()]);
    assert!(!store.is_touched(&q.id));
    store.set_active_language(&q.id, LanguageId::C);
    assert!(store.is_touched(&q.id));
}

#[test]
fn test_timer_format_and_critical() {
    let mut t = AttemptTimer::new(Duration::from_secs(301), Duration::from_secs(300));
    assert_eq!(t.to_string(), "05:01");
    assert!(!t.is_critical());
    assert_eq!(t.tick(), TimerStatus::Running(300));
    assert!(!t.is_critical());
    assert_eq!(t.tick(), TimerStatus::Running(299));
    assert!(t.is_critical());
    assert_eq!(t.to_string(), "04:59");
}

#[test]
fn test_headline_fallback_status() {
    let r = RunResult::new(vec![case(true, "Accepted"), case(false, "")]);
    assert_eq!(r.headline(), Headline::Rejected("Failed".to_owned()));
    assert_eq!(r.default_selection(), 1);
}

#[test]
fn test_headline_empty_run_is_accepted() {
    let r = RunResult::new(vec![]);
    assert_eq!(r.headline(), Headline::Accepted);
    assert_eq!(r.default_selection(), 0);
}

#[test]
fn test_headline_display() {
    assert_eq!(Headline::Accepted.to_string(), "Accepted");
    assert_eq!(
        Headline::Error("timeout".to_owned()).to_string(),
        "Error: timeout"
    );
}
