//! Line-oriented front end of an attempt.

use crate::prelude::*;
use async_std::channel::Sender;
use attempt_session::{
    Disposition, Event, GuardedAction, LanguageId, Level, Listener, ListenerId, LockdownHost,
    Notification, Notifier, Observer, SessionController, SessionState, ToastCenter,
};
use std::collections::HashMap;
use std::fmt::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A terminal can't go fullscreen, and it only sees guarded actions when
/// the student types them.
#[derive(Default)]
pub struct TerminalHost {
    next: AtomicU64,
    listeners: Mutex<HashMap<ListenerId, (GuardedAction, Listener)>>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, action: GuardedAction) -> Disposition {
        let listeners = lock(&self.listeners)
            .values()
            .filter(|(a, _)| *a == action)
            .map(|(_, l)| l.clone())
            .collect::<Vec<_>>();
        listeners
            .into_iter()
            .map(|l| l(action))
            .fold(Disposition::Allow, |d, x| {
                if x == Disposition::Block {
                    x
                } else {
                    d
                }
            })
    }
}

impl LockdownHost for TerminalHost {
    fn add_listener(&self, action: GuardedAction, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next.fetch_add(1, Ordering::SeqCst));
        lock(&self.listeners).insert(id, (action, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        lock(&self.listeners).remove(&id);
    }

    fn request_fullscreen(&self) -> attempt_session::Result<()> {
        Err(attempt_session::Error::FullscreenFail(
            "terminal has no fullscreen mode".to_owned(),
        ))
    }
}

/// How long repeats of a slotted notification stay quiet.
const COALESCE_WINDOW: Duration = Duration::from_secs(4);

/// Prints notifications as they arrive.
///
/// A notification with a slot is printed at most once per window; repeats
/// inside the window are counted and reported with the next print.
pub struct Toaster {
    center: ToastCenter,
    window: Duration,
    shown: Mutex<HashMap<&'static str, Instant>>,
}

impl Default for Toaster {
    fn default() -> Self {
        Self::with_window(COALESCE_WINDOW)
    }
}

impl Toaster {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_window(window: Duration) -> Self {
        Self {
            center: ToastCenter::new(),
            window,
            shown: Mutex::new(HashMap::new()),
        }
    }

    /// The line to print for `n`, if any.
    fn admit(&self, n: Notification) -> Option<String> {
        let tag = match n.level {
            Level::Info => "info",
            Level::Success => "ok",
            Level::Error => "error",
        };
        let line = format!("[{}] {}", tag, n.message);
        let slot = match n.slot {
            Some(slot) => slot,
            None => return Some(line),
        };

        let now = Instant::now();
        let mut shown = lock(&self.shown);
        if let Some(at) = shown.get(slot) {
            if now.duration_since(*at) < self.window {
                self.center.push(n);
                return None;
            }
        }
        shown.insert(slot, now);

        // Repeats collected since the last print, plus this one.
        let repeats = self
            .center
            .snapshot()
            .iter()
            .find(|t| t.notification.slot == Some(slot))
            .map_or(0, |t| t.count);
        self.center.dismiss(slot);
        if repeats > 0 {
            Some(format!("{} (x{})", line, repeats + 1))
        } else {
            Some(line)
        }
    }
}

impl Notifier for Toaster {
    fn notify(&self, n: Notification) {
        if let Some(line) = self.admit(n) {
            println!("{}", line);
        }
    }
}

/// What `show` and `code` print.
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub frame: String,
    pub code: String,
    pub timer: String,
}

pub type SharedSnapshot = Arc<Mutex<Snapshot>>;

fn render(s: &SessionController) -> String {
    let mut out = String::new();
    let q = match s.current_question() {
        Some(q) => q,
        None => return "No questions in this test\n".to_owned(),
    };
    let _ = writeln!(
        out,
        "== Question {} of {} ==",
        s.current_index() + 1,
        s.questions().len()
    );
    let _ = writeln!(out, "{}", q.text);
    if !q.is_coding {
        for (i, o) in q.options.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, o);
        }
        return out;
    }
    for (i, tc) in q.examples().enumerate() {
        let _ = writeln!(out, "Example {}:", i + 1);
        let _ = writeln!(out, "  Input: {}", tc.input);
        let _ = writeln!(out, "  Output: {}", tc.expected_output);
    }
    if let Some(l) = s.current_language() {
        let _ = writeln!(out, "Language: {}", l.display_name());
    }
    let _ = writeln!(out, "-- Console --");
    match s.current_console() {
        Some(c) => {
            let _ = write!(out, "{}", c.view());
        }
        None => {
            let _ = writeln!(out, "Ready to Verify Solution");
        }
    }
    out
}

/// Redraws whenever something other than the clock changed.
pub struct Screen {
    shared: SharedSnapshot,
    warned: bool,
}

impl Screen {
    pub fn new(shared: SharedSnapshot) -> Self {
        Self {
            shared,
            warned: false,
        }
    }
}

impl Observer for Screen {
    fn changed(&mut self, s: &SessionController) {
        let frame = render(s);
        let timer = s.timer().to_string();
        let redraw = {
            let mut snap = lock(&self.shared);
            snap.code = s.current_code().unwrap_or_default().to_owned();
            snap.timer = timer.clone();
            let redraw = snap.frame != frame;
            snap.frame = frame.clone();
            redraw
        };
        if redraw && s.state() == SessionState::Active {
            println!("{}[{}]", frame, timer);
        }
        if s.timer().is_critical() && !self.warned {
            self.warned = true;
            println!("[time] {} left", timer);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Show,
    Question(usize),
    Next,
    Prev,
    Lang(LanguageId),
    Langs,
    Edit(PathBuf),
    Code,
    Run,
    Case(usize),
    Submit,
    Guarded(GuardedAction),
    Quit,
}

fn ordinal(arg: Option<&str>, line: &str) -> Result<usize> {
    arg.and_then(|a| a.parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| Error::BadCommand(line.to_owned()))
}

impl FromStr for Command {
    type Err = Error;
    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let cmd = words.next().unwrap_or("help");
        let arg = words.next();
        Ok(match cmd {
            "help" | "?" => Self::Help,
            "show" => Self::Show,
            "q" => Self::Question(ordinal(arg, line)?),
            "next" => Self::Next,
            "prev" => Self::Prev,
            "lang" => Self::Lang(
                arg.ok_or_else(|| Error::BadCommand(line.to_owned()))?
                    .parse()
                    .map_err(Error::SessionError)?,
            ),
            "langs" => Self::Langs,
            "edit" => Self::Edit(
                arg.map(PathBuf::from)
                    .ok_or_else(|| Error::BadCommand(line.to_owned()))?,
            ),
            "code" => Self::Code,
            "run" => Self::Run,
            "case" => Self::Case(ordinal(arg, line)?),
            "submit" => Self::Submit,
            "copy" => Self::Guarded(GuardedAction::Copy),
            "paste" => Self::Guarded(GuardedAction::Paste),
            "cut" => Self::Guarded(GuardedAction::Cut),
            "menu" => Self::Guarded(GuardedAction::ContextMenu),
            "quit" | "exit" => Self::Quit,
            _ => return Err(Error::BadCommand(line.to_owned())),
        })
    }
}

const HELP: &str = "\
commands: show, q <n>, next, prev, lang <id>, langs, edit <path>, code,
          run, case <n>, submit, copy, paste, cut, menu, quit";

async fn read_line() -> Option<String> {
    let mut line = String::new();
    match async_std::io::stdin().read_line(&mut line).await {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_owned()),
        Err(e) => {
            error!("cannot read stdin: {}", e);
            None
        }
    }
}

async fn confirm() -> bool {
    println!("Are you sure you want to submit the test? [y/N]");
    matches!(read_line().await.as_deref(), Some("y" | "Y" | "yes"))
}

/// Turn what the student types into events, until stdin closes.
pub async fn read_commands(tx: Sender<Event>, host: Arc<TerminalHost>, shared: SharedSnapshot) {
    println!("{}", HELP);
    while let Some(line) = read_line().await {
        if line.is_empty() {
            continue;
        }
        let ev = match line.parse::<Command>() {
            Err(e) => {
                println!("{}", e);
                continue;
            }
            Ok(Command::Help) => {
                println!("{}", HELP);
                continue;
            }
            Ok(Command::Show) => {
                let snap = lock(&shared).clone();
                println!("{}[{}]", snap.frame, snap.timer);
                continue;
            }
            Ok(Command::Code) => {
                println!("{}", lock(&shared).code);
                continue;
            }
            Ok(Command::Langs) => {
                for l in LanguageId::ALL {
                    println!("{:<12}{}", l.as_str(), l.display_name());
                }
                continue;
            }
            Ok(Command::Guarded(a)) => {
                if host.dispatch(a) == Disposition::Allow {
                    println!("{} done", a.event_name());
                }
                continue;
            }
            Ok(Command::Edit(path)) => match util::load_file(&path) {
                Ok(text) => Event::Edit(text),
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            },
            Ok(Command::Question(i)) => Event::Navigate(i),
            Ok(Command::Next) => Event::Next,
            Ok(Command::Prev) => Event::Prev,
            Ok(Command::Lang(l)) => Event::SwitchLanguage(l),
            Ok(Command::Run) => Event::Run,
            Ok(Command::Case(i)) => Event::SelectCase(i),
            Ok(Command::Submit) => Event::Submit {
                confirmed: confirm().await,
            },
            Ok(Command::Quit) => Event::Leave,
        };
        if tx.send(ev).await.is_err() {
            return;
        }
    }
    debug!("stdin closed");
    let _ = tx.send(Event::Leave).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let c = "q 2".parse::<Command>().expect("should parse q");
        assert_eq!(c, Command::Question(1));
        let c = "lang py".parse::<Command>().expect("should parse lang");
        assert_eq!(c, Command::Lang(LanguageId::Python));
        let c = "menu".parse::<Command>().expect("should parse menu");
        assert_eq!(c, Command::Guarded(GuardedAction::ContextMenu));
    }

    #[test]
    fn test_parse_bad_commands() {
        assert!("q 0".parse::<Command>().is_err(), "questions count from 1");
        assert!("case".parse::<Command>().is_err(), "case needs a number");
        assert!("lang cobol".parse::<Command>().is_err());
        assert!("frobnicate".parse::<Command>().is_err());
    }

    #[test]
    fn test_toaster_quiets_repeats() {
        let t = Toaster::new();
        let blocked = || Notification::error("Action not allowed during test!").in_slot("security-warning");

        assert_eq!(
            t.admit(blocked()).as_deref(),
            Some("[error] Action not allowed during test!")
        );
        assert_eq!(t.admit(blocked()), None);
        assert_eq!(t.admit(blocked()), None);
        assert_eq!(
            t.admit(Notification::info("other")).as_deref(),
            Some("[info] other"),
            "notifications without a slot are always printed"
        );
    }

    #[test]
    fn test_toaster_reports_repeats_after_window() {
        let t = Toaster::with_window(Duration::ZERO);
        let blocked = || Notification::error("Action not allowed during test!").in_slot("security-warning");

        assert!(t.admit(blocked()).is_some());
        assert_eq!(
            t.admit(blocked()).as_deref(),
            Some("[error] Action not allowed during test!"),
            "the toast is dismissed once printed"
        );
        assert!(t.center.snapshot().is_empty());

        let t = Toaster::with_window(Duration::from_secs(3600));
        assert!(t.admit(blocked()).is_some());
        assert_eq!(t.admit(blocked()), None);
        assert_eq!(t.center.snapshot()[0].count, 1);
        lock(&t.shown).clear();
        assert_eq!(
            t.admit(blocked()).as_deref(),
            Some("[error] Action not allowed during test! (x2)")
        );
        assert!(t.center.snapshot().is_empty());
    }

    #[test]
    fn test_terminal_refuses_fullscreen() {
        let host = TerminalHost::new();
        assert!(host.request_fullscreen().is_err());
        assert_eq!(host.dispatch(GuardedAction::Copy), Disposition::Allow);
    }
}
