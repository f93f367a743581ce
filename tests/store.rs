use attempt_session::{CodeBufferStore, LanguageId, Question, QuestionId};

fn question(id: &str, starter: Option<&str>) -> Question {
    Question {
        id: QuestionId::new(id),
        text: String::new(),
        is_coding: true,
        starter_code: starter.map(str::to_owned),
        options: vec![],
        test_cases: vec![],
    }
}

#[test]
fn test_default_language() {
    let q = question("q1", None);
    let store = CodeBufferStore::new(&[q.clone()]);
    assert_eq!(store.get_active_language(&q.id), LanguageId::JavaScript);
    assert_eq!(
        store.resolve(&q.id),
        (LanguageId::JavaScript, LanguageId::JavaScript.template())
    );
}

#[test]
fn test_switch_away_and_back() {
    let qs = [question("q1", Some("// q1")), question("q2", Some("// q2"))];
    let mut store = CodeBufferStore::new(&qs);

    for q in &qs {
        for l in LanguageId::ALL {
            store.set_active_language(&q.id, l);
            store.set_code(&q.id, l, format!("{} in {}", q.id, l));
        }
    }

    for q in &qs {
        for l in LanguageId::ALL {
            for other in LanguageId::ALL {
                store.set_active_language(&q.id, other);
            }
            store.set_active_language(&q.id, l);
            assert_eq!(
                store.resolve(&q.id),
                (l, format!("{} in {}", q.id, l).as_str()),
                "code of {} in {} should survive language switches",
                q.id,
                l
            );
        }
    }
}

#[test]
fn test_last_write_wins() {
    let q = question("q1", None);
    let mut store = CodeBufferStore::new(&[q.clone()]);
    store.set_code(&q.id, LanguageId::Python, "a");
    store.set_code(&q.id, LanguageId::Python, "ab");
    store.set_code(&q.id, LanguageId::Python, "abc");
    assert_eq!(store.get_code(&q.id, LanguageId::Python), "abc");
}

#[test]
fn test_no_cross_question_leak() {
    let qs = [question("q1", Some("// q1")), question("q2", Some("// q2"))];
    let mut store = CodeBufferStore::new(&qs);

    store.set_active_language(&qs[0].id, LanguageId::Java);
    store.set_code(&qs[0].id, LanguageId::Java, "class Main {}");
    store.set_code(&qs[0].id, LanguageId::JavaScript, "console.log(1)");

    assert_eq!(store.get_active_language(&qs[1].id), LanguageId::JavaScript);
    assert_eq!(store.get_code(&qs[1].id, LanguageId::JavaScript), "// q2");
    assert_eq!(
        store.get_code(&qs[1].id, LanguageId::Java),
        LanguageId::Java.template()
    );
}

#[test]
fn test_starter_only_for_default_language() {
    let q = question("q1", Some("// starter"));
    let mut store = CodeBufferStore::new(&[q.clone()]);
    store.set_active_language(&q.id, LanguageId::Cpp);
    assert_eq!(store.resolve(&q.id).1, LanguageId::Cpp.template());
    store.set_active_language(&q.id, LanguageId::JavaScript);
    assert_eq!(store.resolve(&q.id).1, "// starter");
}

#[test]
fn test_unknown_question_uses_template() {
    let store = CodeBufferStore::default();
    let q = QuestionId::new("nowhere");
    assert_eq!(
        store.get_code(&q, LanguageId::C),
        LanguageId::C.template()
    );
}
