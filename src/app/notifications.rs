//! Notification emitter contract and the default toast slot.
//!
//! The mutation path emits exactly one [`Notification`] per settled favorite
//! toggle. How it is displayed is up to the receiver; [`ToastSlot`] keeps only
//! the most recent one, the way a single toast container does.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Default display time for toasts that do not set their own.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Error,
    Success,
    Warning,
    Info,
}

/// A `{kind, title, timeoutMs?}` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Notification {
    #[must_use]
    pub fn new(kind: NotificationKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            timeout_ms: None,
        }
    }

    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, title)
    }

    #[must_use]
    pub fn error(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, title)
    }

    /// Title for a settled favorite toggle on `name`.
    #[must_use]
    pub fn favorite_title(name: &str, favorite: bool) -> String {
        format!("{name} favorite {}", if favorite { "added" } else { "removed" })
    }
}

/// Receiver of notification events.
pub trait NotificationEmitter {
    fn receive(&mut self, notification: Notification);
}

impl NotificationEmitter for Vec<Notification> {
    fn receive(&mut self, notification: Notification) {
        self.push(notification);
    }
}

impl<E: NotificationEmitter> NotificationEmitter for Rc<RefCell<E>> {
    fn receive(&mut self, notification: Notification) {
        self.borrow_mut().receive(notification);
    }
}

/// Holds the latest notification, filling in the default timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastSlot {
    current: Option<Notification>,
    default_timeout_ms: u64,
}

impl Default for ToastSlot {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

impl ToastSlot {
    #[must_use]
    pub const fn new(default_timeout_ms: u64) -> Self {
        Self {
            current: None,
            default_timeout_ms,
        }
    }

    #[must_use]
    pub const fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Dismisses the visible toast.
    pub fn clear(&mut self) {
        self.current = None;
    }
}

impl NotificationEmitter for ToastSlot {
    fn receive(&mut self, mut notification: Notification) {
        notification.timeout_ms.get_or_insert(self.default_timeout_ms);
        tracing::debug!(kind = ?notification.kind, title = %notification.title, "toast shown");
        self.current = Some(notification);
    }
}
