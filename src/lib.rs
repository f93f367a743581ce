#![doc = include_str!("../README.md")]

mod backend;
mod console;
mod error;
mod execution;
mod language;
mod lockdown;
pub mod mock;
mod notify;
mod question;
mod runtime;
mod session;
mod store;
mod timer;

#[cfg(test)]
mod tests;

pub use backend::{Collaborators, Response, Submission, SubmissionRegistrar, TestProvider};
pub use console::{CaseDetail, CaseTab, Console, ConsoleView};
pub use error::{Error, Result};
pub use execution::{
    CaseResult, ExecutionClient, ExecutionService, Headline, RunOutcome, RunRequest, RunResult,
};
pub use language::LanguageId;
pub use lockdown::{
    Disposition, GuardedAction, Listener, ListenerId, Lockdown, LockdownHost, LockdownScope,
    SECURITY_SLOT,
};
pub use notify::{Level, Notification, Notifier, Toast, ToastCenter};
pub use question::{Question, QuestionId, TestCase, TestId};
pub use runtime::{Attempt, AttemptReport, Event, Observer, MIN_TICK};
pub use session::{
    RunCompletion, RunTicket, SessionConfig, SessionController, SessionState, SubmitStatus,
    SubmitTrigger,
};
pub use store::CodeBufferStore;
pub use timer::{AttemptTimer, TimerStatus};
