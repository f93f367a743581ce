use crate::language::LanguageId;
use crate::question::{Question, QuestionId};
use std::collections::HashMap;

/// The latest source text of every question, per language.
///
/// Code is keyed by `(question, language)`.  A slot only exists once the
/// student has written into it; every other slot resolves to the question's
/// starter code (default language only) or to the language template.
#[derive(Debug, Default, Clone)]
pub struct CodeBufferStore {
    starters: HashMap<QuestionId, String>,
    active: HashMap<QuestionId, LanguageId>,
    code: HashMap<(QuestionId, LanguageId), String>,
}

impl CodeBufferStore {
    /// Create a store seeded with the starter code of `questions`.
    pub fn new(questions: &[Question]) -> Self {
        let mut store = Self::default();
        for q in questions {
            store.register(q);
        }
        store
    }

    /// Remember the starter code of a question.  Written code is kept.
    pub fn register(&mut self, q: &Question) {
        match q.starter() {
            Some(s) => {
                self.starters.insert(q.id.clone(), s.to_owned());
            }
            None => {
                self.starters.remove(&q.id);
            }
        }
    }

    /// Resolve the code of `question` in `language`.
    pub fn get_code(&self, question: &QuestionId, language: LanguageId) -> &str {
        if let Some(s) = self.code.get(&(question.clone(), language)) {
            return s;
        }
        if language == LanguageId::DEFAULT {
            if let Some(s) = self.starters.get(question) {
                return s;
            }
        }
        language.template()
    }

    /// Overwrite the code of `question` in `language`.  Last write wins.
    pub fn set_code<T: Into<String>>(&mut self, question: &QuestionId, language: LanguageId, text: T) {
        self.code.insert((question.clone(), language), text.into());
    }

    /// The language the student is currently using for `question`.
    pub fn get_active_language(&self, question: &QuestionId) -> LanguageId {
        self.active.get(question).copied().unwrap_or_default()
    }

    /// Switch `question` to `language`.  Code in other languages is kept.
    pub fn set_active_language(&mut self, question: &QuestionId, language: LanguageId) {
        self.active.insert(question.clone(), language);
    }

    /// The code and language the student would submit for `question`.
    pub fn resolve(&self, question: &QuestionId) -> (LanguageId, &str) {
        let language = self.get_active_language(question);
        (language, self.get_code(question, language))
    }

    /// Whether the student has written anything for `question`.
    pub fn is_touched(&self, question: &QuestionId) -> bool {
        self.active.contains_key(question) || self.code.keys().any(|(q, _)| q == question)
    }
}
