//! Catalog worker: serves [`WorkerMessage`]s against a [`Catalog`].
//!
//! The worker is the only component that calls the catalog. It never fails:
//! every catalog error becomes a typed failure response carrying the identity
//! of the request, so the session can settle the matching token.

use crate::catalog::{Catalog, ListFilter, ListQuery};
use crate::domain::error::Result;
use crate::worker::{WorkerMessage, WorkerResponse};

/// Owns the catalog backend and turns requests into responses.
pub struct CatalogWorker {
    catalog: Box<dyn Catalog>,
}

impl CatalogWorker {
    #[must_use]
    pub fn new(catalog: Box<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /// Runs `result` through the shared success/failure logging.
    fn respond<T, F, E>(operation: &str, result: Result<T>, on_success: F, on_failure: E) -> WorkerResponse
    where
        F: FnOnce(T) -> WorkerResponse,
        E: FnOnce(String) -> WorkerResponse,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation, "catalog operation succeeded");
                on_success(value)
            }
            Err(e) => {
                tracing::debug!(operation, error = %e, "catalog operation failed");
                on_failure(e.to_string())
            }
        }
    }

    /// Handles one request. Attaches the request's trace context for the
    /// duration of the call.
    pub fn handle_message(&mut self, message: WorkerMessage) -> WorkerResponse {
        let _context_guard = message.trace_context().and_then(|context| context.attach());
        let _span = tracing::debug_span!("worker_handle_message", message_type = message.kind()).entered();

        match message {
            WorkerMessage::FetchList { request, .. } => {
                let query = ListQuery {
                    limit: request.limit,
                    offset: request.offset,
                    search: Some(request.key.search.clone()).filter(|s| !s.is_empty()),
                    filter: ListFilter {
                        is_favorite: request.key.is_favorite,
                        item_type: request.key.item_type.clone(),
                    },
                };
                let failed = request.clone();
                Self::respond(
                    "list",
                    self.catalog.list(&query),
                    |edges| WorkerResponse::ListLoaded { request, edges },
                    |message| WorkerResponse::ListFailed { request: failed, message },
                )
            }

            WorkerMessage::FetchDetail { name, token, .. } => {
                let failed = name.clone();
                Self::respond(
                    "by_name",
                    self.catalog.by_name(&name),
                    |detail| WorkerResponse::DetailLoaded { name, token, detail },
                    |message| WorkerResponse::DetailFailed { name: failed, token, message },
                )
            }

            WorkerMessage::FetchTypes { .. } => Self::respond(
                "types",
                self.catalog.types(),
                |types| WorkerResponse::TypesLoaded { types },
                |message| WorkerResponse::TypesFailed { message },
            ),

            WorkerMessage::SetFavorite { id, favorite, .. } => {
                let result = if favorite {
                    self.catalog.favorite(id)
                } else {
                    self.catalog.unfavorite(id)
                };
                Self::respond(
                    if favorite { "favorite" } else { "unfavorite" },
                    result,
                    |item| WorkerResponse::FavoriteSet { item, favorite },
                    |message| WorkerResponse::FavoriteFailed { id, favorite, message },
                )
            }
        }
    }

    /// Decodes a JSON request, handles it and encodes the response.
    ///
    /// Undecodable payloads yield a `WorkerResponse::Error`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the response cannot be serialized.
    pub fn handle_payload(&mut self, payload: &str) -> Result<String> {
        let response = match serde_json::from_str::<WorkerMessage>(payload) {
            Ok(message) => self.handle_message(message),
            Err(e) => {
                tracing::error!(error = %e, "failed to decode worker message");
                WorkerResponse::Error {
                    message: format!("invalid request: {e}"),
                }
            }
        };

        serde_json::to_string(&response)
            .map_err(|e| crate::PokedexError::Worker(format!("failed to encode response: {e}")))
    }
}

impl std::fmt::Debug for CatalogWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogWorker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::filters::PageKey;
    use crate::app::query::QueryExecutor;
    use crate::catalog::{ItemRecord, JsonCatalog};

    fn worker() -> CatalogWorker {
        CatalogWorker::new(Box::new(JsonCatalog::in_memory(vec![
            ItemRecord::new(1, "Bulbasaur", &["Grass"]),
            ItemRecord::new(4, "Charmander", &["Fire"]),
            ItemRecord::new(5, "Charmeleon", &["Fire"]),
        ])))
    }

    #[test]
    fn list_maps_page_key_to_query() {
        let mut executor = QueryExecutor::new();
        let request = executor.issue_reset(&PageKey::search("char"));

        match worker().handle_message(WorkerMessage::fetch_list(request.clone())) {
            WorkerResponse::ListLoaded { request: echoed, edges } => {
                assert_eq!(echoed, request);
                assert_eq!(edges.iter().map(|i| i.id).collect::<Vec<_>>(), vec![4, 5]);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn missing_detail_fails_with_token() {
        let mut executor = QueryExecutor::new();
        let token = executor.issue_detail("Mew");
        let response = worker().handle_message(WorkerMessage::fetch_detail("Mew".into(), token));
        assert!(matches!(
            response,
            WorkerResponse::DetailFailed { ref name, token: t, .. } if name == "Mew" && t == token
        ));
    }

    #[test]
    fn favorite_round_trip() {
        let mut worker = worker();
        let response = worker.handle_message(WorkerMessage::set_favorite(4, true));
        assert!(matches!(response, WorkerResponse::FavoriteSet { ref item, favorite: true } if item.is_favorite));

        let response = worker.handle_message(WorkerMessage::set_favorite(99, false));
        assert!(matches!(response, WorkerResponse::FavoriteFailed { id: 99, favorite: false, .. }));
    }

    #[test]
    fn bad_payload_yields_error_response() {
        let encoded = worker().handle_payload("{\"Nope\":{}}").unwrap();
        let response: WorkerResponse = serde_json::from_str(&encoded).unwrap();
        assert!(matches!(response, WorkerResponse::Error { .. }));
    }
}
