use serde::{Deserialize, Serialize};

/// Identifier of a question, as assigned by the test provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Create a question ID from its wire form.
    pub fn new<T: AsRef<str>>(id: T) -> Self {
        Self(id.as_ref().to_owned())
    }

    /// The wire form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the test being attempted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(String);

impl TestId {
    /// Create a test ID from its wire form.
    pub fn new<T: AsRef<str>>(id: T) -> Self {
        Self(id.as_ref().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One test case of a coding question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    #[serde(default, rename = "output", alias = "expectedOutput")]
    pub expected_output: String,
    /// Hidden cases are judged but never shown to the student.
    #[serde(default)]
    pub is_hidden: bool,
}

/// A question of the test.  Read-only for the whole attempt; its position in
/// the question set is its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "_id", alias = "id")]
    pub id: QuestionId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_coding: bool,
    /// Starter code for [LanguageId::DEFAULT][crate::LanguageId::DEFAULT].
    #[serde(default)]
    pub starter_code: Option<String>,
    /// Choices of a multiple-choice question.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

impl Question {
    /// Starter code, if the provider supplied a non-empty one.
    pub fn starter(&self) -> Option<&str> {
        self.starter_code.as_deref().filter(|s| !s.is_empty())
    }

    /// Test cases the student is allowed to see, in order.
    pub fn examples(&self) -> impl Iterator<Item = &TestCase> {
        self.test_cases.iter().filter(|tc| !tc.is_hidden)
    }
}
