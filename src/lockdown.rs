use crate::error::Result;
use crate::notify::{Notification, Notifier};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, PoisonError};

/// Slot shared by every "blocked action" warning.
pub const SECURITY_SLOT: &str = "security-warning";

const BLOCKED_MESSAGE: &str = "Action not allowed during test!";

/// A user action intercepted while the attempt is locked down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardedAction {
    ContextMenu,
    Copy,
    Paste,
    Cut,
}

impl GuardedAction {
    pub const ALL: [GuardedAction; 4] = [
        GuardedAction::ContextMenu,
        GuardedAction::Copy,
        GuardedAction::Paste,
        GuardedAction::Cut,
    ];

    /// Name of the host event carrying this action.
    pub fn event_name(self) -> &'static str {
        match self {
            Self::ContextMenu => "contextmenu",
            Self::Copy => "copy",
            Self::Paste => "paste",
            Self::Cut => "cut",
        }
    }
}

/// What a listener decided about an intercepted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Allow,
    Block,
}

pub type Listener = Arc<dyn Fn(GuardedAction) -> Disposition + Send + Sync>;

/// Handle of an installed listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The process-wide surface the lockdown attaches to.
pub trait LockdownHost: Send + Sync {
    fn add_listener(&self, action: GuardedAction, listener: Listener) -> ListenerId;
    fn remove_listener(&self, id: ListenerId);
    fn request_fullscreen(&self) -> Result<()>;
    fn exit_fullscreen(&self) {}
}

/// Blocks clipboard and context-menu actions for the attempt's lifetime.
///
/// [Lockdown::activate] and [Lockdown::deactivate] are idempotent; at most
/// one listener set is installed at any time.
pub struct Lockdown {
    host: Arc<dyn LockdownHost>,
    notifier: Arc<dyn Notifier>,
    installed: Mutex<Vec<ListenerId>>,
}

impl Lockdown {
    pub fn new(host: Arc<dyn LockdownHost>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            host,
            notifier,
            installed: Mutex::new(vec![]),
        }
    }

    /// Install a blocking listener for every [GuardedAction] and ask the
    /// host for fullscreen.  Does nothing if already active.
    pub fn activate(&self) {
        {
            let mut installed = self.installed.lock().unwrap_or_else(PoisonError::into_inner);
            if !installed.is_empty() {
                debug!("lockdown already active");
                return;
            }
            for action in GuardedAction::ALL {
                let notifier = self.notifier.clone();
                let listener: Listener = Arc::new(move |a: GuardedAction| {
                    debug!("blocked {} during the attempt", a.event_name());
                    notifier.notify(Notification::error(BLOCKED_MESSAGE).in_slot(SECURITY_SLOT));
                    Disposition::Block
                });
                installed.push(self.host.add_listener(action, listener));
            }
        }
        info!("lockdown activated");

        // Not being fullscreen must not keep the student out of the attempt.
        if let Err(e) = self.host.request_fullscreen() {
            warn!("{}", e);
        }
    }

    /// Remove the listeners installed by [Lockdown::activate] and leave
    /// fullscreen.  Does nothing if not active.
    pub fn deactivate(&self) {
        let ids = {
            let mut installed = self.installed.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *installed)
        };
        if ids.is_empty() {
            return;
        }
        for id in ids {
            self.host.remove_listener(id);
        }
        self.host.exit_fullscreen();
        info!("lockdown released");
    }

    pub fn is_active(&self) -> bool {
        !self
            .installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Activate, and deactivate again when the returned scope is dropped.
    pub fn scope(self: &Arc<Self>) -> LockdownScope {
        self.activate();
        LockdownScope {
            lockdown: self.clone(),
        }
    }
}

/// An active lockdown, released on drop.
pub struct LockdownScope {
    lockdown: Arc<Lockdown>,
}

impl Drop for LockdownScope {
    fn drop(&mut self) {
        self.lockdown.deactivate();
    }
}
