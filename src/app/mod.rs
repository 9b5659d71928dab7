//! Application layer: the client-side sync core.
//!
//! Sits between the session runtime and the worker. Everything here is
//! synchronous and free of I/O; requests leave as [`Action`]s and come back as
//! [`Event::WorkerResponse`].
//!
//! ```text
//! Event → handle_event → AppState mutation → Actions → worker
//!            ↑                                           ↓
//!            └────────────── WorkerResponse ─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`filters`]: filter state store and page keys
//! - [`query`]: request tokens, reset guard, per-key error state
//! - [`cache`]: page merge cache and the pure merge policy
//! - [`reconciler`]: in-place patching after confirmed mutations
//! - [`scroll`]: infinite-scroll trigger and visibility observer
//! - [`notifications`]: notification events and the toast slot
//! - [`modes`]: view and paging mode enums
//! - [`actions`], [`handler`], [`state`]: the event loop plumbing

pub mod actions;
pub mod cache;
pub mod filters;
pub mod handler;
pub mod modes;
pub mod notifications;
pub mod query;
pub mod reconciler;
pub mod scroll;
pub mod state;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use modes::{ScrollPhase, ViewMode};
pub use state::AppState;
