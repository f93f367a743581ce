use crate::execution::{CaseResult, Headline, RunOutcome};
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
enum ConsoleState {
    Idle,
    Running,
    Done(RunOutcome),
}

/// The result pane of one question.
///
/// Everything it shows is derived from the latest run; the only state of
/// its own is which case is selected.
#[derive(Debug, Clone, PartialEq)]
pub struct Console {
    state: ConsoleState,
    selected: usize,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub fn new() -> Self {
        Self {
            state: ConsoleState::Idle,
            selected: 0,
        }
    }

    /// Forget the previous run while a new one is pending.
    pub fn start_run(&mut self) {
        self.state = ConsoleState::Running;
        self.selected = 0;
    }

    /// Show `outcome`, selecting its first failing case.
    pub fn replace(&mut self, outcome: RunOutcome) {
        self.selected = outcome.result().map_or(0, |r| r.default_selection());
        self.state = ConsoleState::Done(outcome);
    }

    /// Select case `index`.  Returns false if there is no such case.
    pub fn select(&mut self, index: usize) -> bool {
        match &self.state {
            ConsoleState::Done(RunOutcome::Completed(r)) if index < r.len() => {
                self.selected = index;
                true
            }
            _ => false,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_running(&self) -> bool {
        self.state == ConsoleState::Running
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        match &self.state {
            ConsoleState::Done(o) => Some(o),
            _ => None,
        }
    }

    pub fn headline(&self) -> Option<Headline> {
        self.outcome().map(RunOutcome::headline)
    }

    pub fn view(&self) -> ConsoleView<'_> {
        match &self.state {
            ConsoleState::Idle => ConsoleView::Idle,
            ConsoleState::Running => ConsoleView::Running,
            ConsoleState::Done(RunOutcome::Failed(m)) => ConsoleView::Failed(Headline::Error(m.clone())),
            ConsoleState::Done(RunOutcome::Completed(r)) => ConsoleView::Results {
                headline: r.headline(),
                tabs: r
                    .cases()
                    .iter()
                    .enumerate()
                    .map(|(index, c)| CaseTab {
                        index,
                        passed: c.passed,
                    })
                    .collect(),
                selected: self.selected,
                detail: r.cases().get(self.selected).map(CaseDetail::of),
            },
        }
    }
}

/// One entry of the case list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseTab {
    pub index: usize,
    pub passed: bool,
}

/// What may be shown about the selected case.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseDetail<'a> {
    Visible(&'a CaseResult),
    Hidden {
        passed: bool,
        stderr: &'a str,
        time_ms: f64,
        memory_kb: u64,
    },
}

impl<'a> CaseDetail<'a> {
    fn of(c: &'a CaseResult) -> Self {
        if c.is_hidden {
            Self::Hidden {
                passed: c.passed,
                stderr: &c.stderr,
                time_ms: c.time_ms,
                memory_kb: c.memory_kb,
            }
        } else {
            Self::Visible(c)
        }
    }
}

/// Rendering of a [Console].
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleView<'a> {
    Idle,
    Running,
    Failed(Headline),
    Results {
        headline: Headline,
        tabs: Vec<CaseTab>,
        selected: usize,
        detail: Option<CaseDetail<'a>>,
    },
}

fn or_placeholder<'a>(s: &'a str, placeholder: &'a str) -> &'a str {
    if s.is_empty() {
        placeholder
    } else {
        s
    }
}

impl Display for ConsoleView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => writeln!(f, "Ready to Verify Solution"),
            Self::Running => writeln!(f, "Running..."),
            Self::Failed(h) => writeln!(f, "{}", h),
            Self::Results {
                headline,
                tabs,
                selected,
                detail,
            } => {
                writeln!(f, "{}", headline)?;
                for t in tabs {
                    let mark = if t.index == *selected { '>' } else { ' ' };
                    let verdict = if t.passed { "pass" } else { "FAIL" };
                    writeln!(f, "{} Case {} [{}]", mark, t.index + 1, verdict)?;
                }
                match detail {
                    None => Ok(()),
                    Some(CaseDetail::Visible(c)) => {
                        writeln!(f, "Time: {}ms  Memory: {}kb", c.time_ms, c.memory_kb)?;
                        if !c.stderr.is_empty() {
                            writeln!(f, "Runtime Error:\n{}", c.stderr)?;
                        }
                        writeln!(f, "Input:\n{}", or_placeholder(&c.input, "None"))?;
                        writeln!(f, "Output:\n{}", or_placeholder(&c.actual_output, "(Empty)"))?;
                        writeln!(f, "Expected:\n{}", c.expected_output)
                    }
                    Some(CaseDetail::Hidden {
                        stderr,
                        time_ms,
                        memory_kb,
                        ..
                    }) => {
                        writeln!(f, "Time: {}ms  Memory: {}kb", time_ms, memory_kb)?;
                        if !stderr.is_empty() {
                            writeln!(f, "Runtime Error:\n{}", stderr)?;
                        }
                        writeln!(f, "This is a hidden test case")
                    }
                }
            }
        }
    }
}
