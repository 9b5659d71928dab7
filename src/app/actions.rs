//! Side effects produced by the event handler.
//!
//! [`handle_event`](super::handle_event) never performs I/O. It returns a list
//! of actions, and the session executes them in order after the state
//! transition is complete.
//!
//! # Example
//!
//! ```rust
//! use pokedex_sync::app::Action;
//! use pokedex_sync::app::notifications::Notification;
//! use pokedex_sync::worker::WorkerMessage;
//!
//! let actions = vec![
//!     Action::PostToWorker(WorkerMessage::fetch_types()),
//!     Action::Notify(Notification::success("Pikachu favorite added")),
//! ];
//! assert_eq!(actions.len(), 2);
//! ```

use super::notifications::Notification;
use crate::worker::WorkerMessage;

/// Commands executed by the session after an event is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Hands a request to the catalog worker.
    PostToWorker(WorkerMessage),

    /// Forwards a notification to the emitter.
    Notify(Notification),
}
