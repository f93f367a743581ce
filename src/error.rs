use crate::session::SessionState;

/// The error type of `attempt_session`.
///
/// The various errors that can be returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error fetching the question set of the test.
    #[error("cannot load the question set: {0}")]
    LoadFail(String),
    /// An error notifying the registrar that the attempt has started.
    #[error("cannot mark the attempt as started: {0}")]
    StartFail(String),
    /// An error reaching the execution service or reported by it.
    #[error("cannot run the code: {0}")]
    ExecutionFail(String),
    /// The execution service returned a malformed verdict list.
    #[error("judge returned {got} results for {expected} test cases")]
    ResultCountMismatch { expected: usize, got: usize },
    /// An error registering the submission.  Carries the registrar's
    /// message when it answered, `None` when it could not be reached.
    #[error("cannot submit the attempt: {}", .0.as_deref().unwrap_or("registrar unreachable"))]
    SubmitFail(Option<String>),
    /// The operation requires the session to be `Active`.
    #[error("operation not allowed while the session is {0:?}")]
    NotActive(SessionState),
    /// A question index outside of the question set.
    #[error("no question at index {0}")]
    NoSuchQuestion(usize),
    /// Going back from the first question.
    #[error("already at the first question")]
    FirstQuestion,
    /// An unknown language identifier.
    #[error("unknown language {0}")]
    UnknownLanguage(String),
    /// The host refused to enter fullscreen presentation.
    #[error("cannot enter fullscreen: {0}")]
    FullscreenFail(String),
}

/// Alias for a [Result][std::result::Result] with the error type [Error].
pub type Result<T> = std::result::Result<T, Error>;
