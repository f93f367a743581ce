use crate::backend::Submission;
use crate::error::Result;
use crate::language::LanguageId;
use crate::lockdown::Lockdown;
use crate::session::{RunCompletion, SessionController, SessionState, SubmitTrigger};
use async_std::channel::{self, Receiver, Sender};
use async_std::task::{self, JoinHandle};
use futures::stream::StreamExt;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Everything that can happen to an attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Navigate(usize),
    Next,
    Prev,
    Edit(String),
    SwitchLanguage(LanguageId),
    SelectCase(usize),
    Run,
    RunFinished(RunCompletion),
    /// The student pressed submit; `confirmed` is the prompt's answer.
    Submit { confirmed: bool },
    Tick,
    /// The student left the attempt without submitting.
    Leave,
}

/// Gets to look at the session after every event.
pub trait Observer: Send {
    fn changed(&mut self, session: &SessionController);
}

impl<F: FnMut(&SessionController) + Send> Observer for F {
    fn changed(&mut self, session: &SessionController) {
        self(session)
    }
}

/// How an attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptReport {
    pub state: SessionState,
    pub submission: Option<Submission>,
}

fn spawn_ticker(period: Duration, tx: Sender<Event>) -> JoinHandle<()> {
    task::spawn(async move {
        let mut ticks = async_std::stream::interval(period);
        while ticks.next().await.is_some() {
            if tx.send(Event::Tick).await.is_err() {
                break;
            }
        }
    })
}

/// The event loop of one attempt.
///
/// Events are handled one at a time, each to completion.  The timer and
/// finished runs come back through the same queue as student input.
pub struct Attempt {
    controller: SessionController,
    lockdown: Arc<Lockdown>,
    tick: Duration,
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

/// The shortest real time between two ticks.
pub const MIN_TICK: Duration = Duration::from_millis(1);

impl Attempt {
    /// An attempt driving `controller`, ticking every `tick`.
    ///
    /// A `tick` shorter than [MIN_TICK] is raised to it, so the timer
    /// always runs down.
    pub fn new(controller: SessionController, lockdown: Arc<Lockdown>, tick: Duration) -> Self {
        let tick = if tick < MIN_TICK {
            warn!("tick of {:?} raised to {:?}", tick, MIN_TICK);
            MIN_TICK
        } else {
            tick
        };
        let (tx, rx) = channel::unbounded();
        Self {
            controller,
            lockdown,
            tick,
            tx,
            rx,
        }
    }

    /// A handle for feeding events into the attempt.
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Conduct the attempt until it is submitted or left.
    ///
    /// The lockdown and the timer live exactly as long as this call, on
    /// every exit path.
    pub async fn run<O: Observer>(mut self, observer: &mut O) -> Result<AttemptReport> {
        let scope = self.lockdown.scope();
        let ticker = spawn_ticker(self.tick, self.tx.clone());

        let r = self.drive(observer).await;

        ticker.cancel().await;
        drop(scope);
        info!("session {} torn down", self.controller.id());
        r
    }

    async fn drive<O: Observer>(&mut self, observer: &mut O) -> Result<AttemptReport> {
        self.controller.load().await?;
        observer.changed(&self.controller);

        while let Ok(ev) = self.rx.recv().await {
            let leave = ev == Event::Leave;
            self.handle(ev).await;
            observer.changed(&self.controller);
            if leave || self.controller.state() == SessionState::Terminated {
                break;
            }
        }

        Ok(AttemptReport {
            state: self.controller.state(),
            submission: self.controller.submission().cloned(),
        })
    }

    async fn handle(&mut self, ev: Event) {
        let c = &mut self.controller;
        let r = match ev {
            Event::Navigate(i) => c.navigate(i),
            Event::Next => c.next(),
            Event::Prev => c.prev(),
            Event::Edit(text) => c.edit(text),
            Event::SwitchLanguage(l) => c.switch_language(l),
            Event::SelectCase(i) => {
                c.select_case(i);
                Ok(())
            }
            Event::Run => {
                if let Some(ticket) = c.begin_run() {
                    let tx = self.tx.clone();
                    task::spawn(async move {
                        let done = ticket.execute().await;
                        if tx.send(Event::RunFinished(done)).await.is_err() {
                            debug!("attempt gone before the run finished");
                        }
                    });
                }
                Ok(())
            }
            Event::RunFinished(done) => {
                c.complete_run(done);
                Ok(())
            }
            Event::Submit { confirmed } => c.submit(SubmitTrigger::Manual { confirmed }).await.map(|_| ()),
            Event::Tick => {
                c.tick().await;
                Ok(())
            }
            Event::Leave => {
                info!("session {} left in state {:?}", c.id(), c.state());
                Ok(())
            }
        };
        if let Err(e) = r {
            warn!("{}", e);
        }
    }
}
