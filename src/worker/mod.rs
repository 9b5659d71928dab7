//! Catalog worker and its message protocol.
//!
//! - `messages`: request/response types with trace context propagation
//! - `handler`: [`CatalogWorker`], which serves requests against a catalog

pub mod handler;
pub mod messages;

pub use handler::CatalogWorker;
pub use messages::{TraceContext, WorkerMessage, WorkerResponse};
