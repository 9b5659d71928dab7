//! Session runtime: executes actions and delivers worker responses.
//!
//! A [`Session`] owns the [`AppState`] and everything the state machine talks
//! to. Worker requests are serialized to JSON and parked in an outbox; the
//! caller decides when, and in which order, they are delivered. Delivering
//! out of order is how late responses are exercised.
//!
//! ```text
//! dispatch(Event) → handle_event → Actions ─┬─ PostToWorker → outbox (JSON)
//!                                           └─ Notify       → emitter
//!
//! deliver_next / deliver_last / pump:
//!     outbox → CatalogWorker::handle_payload → WorkerResponse → dispatch
//! ```
//!
//! Events raised by the visibility observer are queued and handled on the
//! next [`Session::pump`] or [`Session::drain_queued`].

use crate::app::notifications::NotificationEmitter;
use crate::app::scroll::{ObserverScope, VisibilityObserver};
use crate::app::{handle_event, Action, AppState, Event};
use crate::domain::error::{PokedexError, Result};
use crate::ui::{DetailSnapshot, ListSnapshot, TypesSnapshot};
use crate::worker::{CatalogWorker, WorkerMessage, WorkerResponse};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Element id the visibility observer watches.
pub const SENTINEL_TARGET: &str = "list-sentinel";

pub struct Session {
    state: AppState,
    worker: CatalogWorker,
    outbox: VecDeque<String>,
    queued: Rc<RefCell<VecDeque<Event>>>,
    emitter: Box<dyn NotificationEmitter>,
    observer: Option<ObserverScope>,
}

impl Session {
    #[must_use]
    pub fn new(state: AppState, worker: CatalogWorker, emitter: Box<dyn NotificationEmitter>) -> Self {
        Self {
            state,
            worker,
            outbox: VecDeque::new(),
            queued: Rc::new(RefCell::new(VecDeque::new())),
            emitter,
            observer: None,
        }
    }

    /// Starts observing the sentinel, then handles [`Event::Mount`].
    ///
    /// Sightings are queued as [`Event::SentinelVisible`]. A previous
    /// observer, if any, is stopped first.
    ///
    /// # Errors
    ///
    /// Propagates errors from handling the mount event.
    pub fn mount(&mut self, observer: Box<dyn VisibilityObserver>) -> Result<bool> {
        self.observer = None;
        let queued = Rc::clone(&self.queued);
        self.observer = Some(ObserverScope::start(
            observer,
            SENTINEL_TARGET,
            Box::new(move || queued.borrow_mut().push_back(Event::SentinelVisible)),
        ));
        self.dispatch(&Event::Mount)
    }

    /// Stops the observer. Pending requests stay in the outbox.
    pub fn unmount(&mut self) {
        self.observer = None;
    }

    /// Handles one event and executes its actions.
    ///
    /// Returns whether the view should re-render.
    ///
    /// # Errors
    ///
    /// Returns the handler's error, or [`PokedexError::Worker`] if a request
    /// cannot be serialized. Actions are not executed when handling fails.
    pub fn dispatch(&mut self, event: &Event) -> Result<bool> {
        let (render, actions) = handle_event(&mut self.state, event)?;
        tracing::debug!(action_count = actions.len(), render, "event handled");
        for action in actions {
            self.execute(action)?;
        }
        Ok(render)
    }

    fn execute(&mut self, action: Action) -> Result<()> {
        match action {
            Action::PostToWorker(message) => self.post(&message),
            Action::Notify(notification) => {
                self.emitter.receive(notification);
                Ok(())
            }
        }
    }

    fn post(&mut self, message: &WorkerMessage) -> Result<()> {
        let payload = serde_json::to_string(message)
            .map_err(|e| PokedexError::Worker(format!("failed to encode request: {e}")))?;
        tracing::debug!(kind = message.kind(), pending = self.outbox.len() + 1, "request queued");
        self.outbox.push_back(payload);
        Ok(())
    }

    /// Number of requests waiting for delivery.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    /// Requests waiting for delivery, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`PokedexError::Worker`] if a parked payload no longer decodes.
    pub fn pending_requests(&self) -> Result<Vec<WorkerMessage>> {
        self.outbox
            .iter()
            .map(|payload| {
                serde_json::from_str(payload)
                    .map_err(|e| PokedexError::Worker(format!("corrupt pending request: {e}")))
            })
            .collect()
    }

    /// Delivers the oldest pending request. Returns `Ok(None)` if none.
    ///
    /// # Errors
    ///
    /// See [`Session::deliver_at`].
    pub fn deliver_next(&mut self) -> Result<Option<bool>> {
        self.deliver_at(0)
    }

    /// Delivers the newest pending request. Returns `Ok(None)` if none.
    ///
    /// # Errors
    ///
    /// See [`Session::deliver_at`].
    pub fn deliver_last(&mut self) -> Result<Option<bool>> {
        match self.outbox.len() {
            0 => Ok(None),
            len => self.deliver_at(len - 1),
        }
    }

    /// Runs the request at `index` through the worker and dispatches its
    /// response. Returns the render flag, or `None` if `index` is out of range.
    ///
    /// # Errors
    ///
    /// Returns [`PokedexError::Worker`] if the response cannot be decoded,
    /// or any error from dispatching it.
    pub fn deliver_at(&mut self, index: usize) -> Result<Option<bool>> {
        let Some(payload) = self.outbox.remove(index) else {
            return Ok(None);
        };

        let _span = tracing::debug_span!("deliver_response", index).entered();
        let reply = self.worker.handle_payload(&payload)?;
        let response: WorkerResponse = serde_json::from_str(&reply)
            .map_err(|e| PokedexError::Worker(format!("failed to decode response: {e}")))?;

        self.dispatch(&Event::WorkerResponse(response)).map(Some)
    }

    /// Handles every event raised by the observer since the last drain.
    ///
    /// # Errors
    ///
    /// Stops at the first event that fails to dispatch.
    pub fn drain_queued(&mut self) -> Result<bool> {
        let mut render = false;
        loop {
            let next = self.queued.borrow_mut().pop_front();
            let Some(event) = next else {
                return Ok(render);
            };
            render |= self.dispatch(&event)?;
        }
    }

    /// Drains queued events and delivers requests in FIFO order until both
    /// are empty. Returns the number of responses delivered.
    ///
    /// # Errors
    ///
    /// Stops at the first delivery or dispatch that fails.
    pub fn pump(&mut self) -> Result<usize> {
        let mut delivered = 0;
        loop {
            self.drain_queued()?;
            if self.deliver_next()?.is_none() {
                return Ok(delivered);
            }
            delivered += 1;
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn list_snapshot(&self) -> ListSnapshot {
        self.state.list_snapshot()
    }

    /// Snapshot of the open detail view, if one is open.
    #[must_use]
    pub fn detail_snapshot(&self) -> Option<DetailSnapshot> {
        self.state
            .active_detail
            .as_deref()
            .map(|name| self.state.detail_snapshot(name))
    }

    #[must_use]
    pub fn types_snapshot(&self) -> TypesSnapshot {
        self.state.types_snapshot()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.outbox.is_empty() {
            tracing::debug!(pending = self.outbox.len(), "session dropped with pending requests");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("pending", &self.outbox.len())
            .field("observing", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::notifications::Notification;
    use crate::app::scroll::ManualObserver;
    use crate::catalog::{ItemRecord, JsonCatalog};

    fn session(count: u32) -> Session {
        let records = (1..=count)
            .map(|id| ItemRecord::new(id, &format!("mon-{id}"), &["Normal"]))
            .collect();
        Session::new(
            AppState::new(),
            CatalogWorker::new(Box::new(JsonCatalog::in_memory(records))),
            Box::new(Vec::<Notification>::new()),
        )
    }

    #[test]
    fn mount_queues_types_and_first_page() {
        let mut session = session(3);
        let observer = ManualObserver::new();
        session.mount(Box::new(observer.clone())).unwrap();

        assert_eq!(observer.target().as_deref(), Some(SENTINEL_TARGET));
        let pending = session.pending_requests().unwrap();
        assert_eq!(pending.iter().map(WorkerMessage::kind).collect::<Vec<_>>(), ["fetch_types", "fetch_list"]);

        assert_eq!(session.pump().unwrap(), 2);
        assert_eq!(session.list_snapshot().items.len(), 3);
        assert_eq!(session.types_snapshot().types, vec!["Normal".to_string()]);
    }

    #[test]
    fn observer_sighting_is_queued_until_drained() {
        let mut session = session(20);
        let observer = ManualObserver::new();
        session.mount(Box::new(observer.clone())).unwrap();
        session.pump().unwrap();

        assert!(observer.reveal());
        assert_eq!(session.pending(), 0);
        session.drain_queued().unwrap();
        assert_eq!(session.pending(), 1);

        session.pump().unwrap();
        assert_eq!(session.list_snapshot().items.len(), 18);
    }

    #[test]
    fn unmount_stops_observer() {
        let mut session = session(1);
        let observer = ManualObserver::new();
        session.mount(Box::new(observer.clone())).unwrap();

        session.unmount();
        assert!(!observer.is_observing());
        assert!(!observer.reveal());
    }

    #[test]
    fn deliver_on_empty_outbox() {
        let mut session = session(1);
        assert_eq!(session.deliver_next().unwrap(), None);
        assert_eq!(session.deliver_last().unwrap(), None);
    }
}
