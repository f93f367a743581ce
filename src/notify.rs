use std::sync::{Mutex, PoisonError};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

/// A transient message for the student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Notifications sharing a slot replace each other instead of piling up.
    pub slot: Option<&'static str>,
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn info<T: Into<String>>(message: T) -> Self {
        Self {
            slot: None,
            level: Level::Info,
            message: message.into(),
        }
    }

    pub fn success<T: Into<String>>(message: T) -> Self {
        Self {
            slot: None,
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error<T: Into<String>>(message: T) -> Self {
        Self {
            slot: None,
            level: Level::Error,
            message: message.into(),
        }
    }

    pub fn in_slot(mut self, slot: &'static str) -> Self {
        self.slot = Some(slot);
        self
    }
}

/// Where notifications go.
pub trait Notifier: Send + Sync {
    fn notify(&self, n: Notification);
}

/// A notification currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub notification: Notification,
    /// How many notifications were coalesced into this one.
    pub count: usize,
}

/// Keeps the visible notifications, coalescing those that share a slot.
#[derive(Debug, Default)]
pub struct ToastCenter {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `n`.  Returns false if it was merged into an existing toast.
    pub fn push(&self, n: Notification) -> bool {
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = n.slot {
            if let Some(t) = toasts.iter_mut().find(|t| t.notification.slot == Some(slot)) {
                t.notification = n;
                t.count += 1;
                return false;
            }
        }
        toasts.push(Toast {
            notification: n,
            count: 1,
        });
        true
    }

    /// Remove the toast in `slot`.
    pub fn dismiss(&self, slot: &str) {
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        toasts.retain(|t| t.notification.slot != Some(slot));
    }

    /// Remove and return every toast.
    pub fn drain(&self) -> Vec<Toast> {
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *toasts)
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for ToastCenter {
    fn notify(&self, n: Notification) {
        self.push(n);
    }
}
