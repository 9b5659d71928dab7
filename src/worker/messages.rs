//! Request/response protocol between the session and the catalog worker.
//!
//! Messages are plain serde types so they can cross any transport boundary as
//! JSON. Each request carries an optional [`TraceContext`], letting the worker
//! open its spans as children of the span that issued the request.

use crate::app::query::{ListRequest, RequestToken};
use crate::domain::{Item, ItemId};
use serde::{Deserialize, Serialize};

/// Trace and parent span ids captured from the issuing span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// 32 hex digits.
    pub trace_id: String,

    /// 16 hex digits.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Captures the OpenTelemetry context of the current `tracing` span.
    ///
    /// Returns `None` outside a sampled span, e.g. when tracing is not
    /// initialized.
    pub fn capture() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let context = tracing::Span::current().context();
        let span = context.span();
        let span_context = span.span_context();
        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }

    /// Makes this context the active remote parent until the guard drops.
    #[must_use]
    pub fn attach(&self) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{
            SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
        };

        let remote = SpanContext::new(
            TraceId::from_hex(&self.trace_id).ok()?,
            SpanId::from_hex(&self.parent_span_id).ok()?,
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );

        Some(
            opentelemetry::Context::current()
                .with_remote_span_context(remote)
                .attach(),
        )
    }
}

/// Generates constructors that stamp the current trace context.
macro_rules! traced_constructors {
    ($( $fn_name:ident => $variant:ident { $($field:ident: $ty:ty),* $(,)? } ),* $(,)?) => {
        impl WorkerMessage {
            $(
                #[doc = concat!("Builds a `", stringify!($variant), "` request in the current trace.")]
                #[must_use]
                pub fn $fn_name($($field: $ty),*) -> Self {
                    Self::$variant {
                        $($field,)*
                        trace_context: TraceContext::capture(),
                    }
                }
            )*
        }
    };
}

traced_constructors! {
    fetch_list => FetchList { request: ListRequest },
    fetch_detail => FetchDetail { name: String, token: RequestToken },
    fetch_types => FetchTypes {},
    set_favorite => SetFavorite { id: ItemId, favorite: bool },
}

/// Requests handled by the catalog worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerMessage {
    /// One paged `list` call.
    FetchList {
        request: ListRequest,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// A `byName` call for the detail view.
    FetchDetail {
        name: String,
        token: RequestToken,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// The `types` call made once at mount.
    FetchTypes {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// `favorite(id)` when `favorite` is true, `unfavorite(id)` otherwise.
    SetFavorite {
        id: ItemId,
        favorite: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },
}

impl WorkerMessage {
    #[must_use]
    pub const fn trace_context(&self) -> Option<&TraceContext> {
        match self {
            Self::FetchList { trace_context, .. }
            | Self::FetchDetail { trace_context, .. }
            | Self::FetchTypes { trace_context }
            | Self::SetFavorite { trace_context, .. } => trace_context.as_ref(),
        }
    }

    /// Short label for spans and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FetchList { .. } => "fetch_list",
            Self::FetchDetail { .. } => "fetch_detail",
            Self::FetchTypes { .. } => "fetch_types",
            Self::SetFavorite { .. } => "set_favorite",
        }
    }
}

/// Results sent back from the worker.
///
/// Every request produces exactly one response. Failures carry the original
/// request identity so the session can settle the right token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerResponse {
    ListLoaded { request: ListRequest, edges: Vec<Item> },
    ListFailed { request: ListRequest, message: String },

    DetailLoaded { name: String, token: RequestToken, detail: Item },
    DetailFailed { name: String, token: RequestToken, message: String },

    TypesLoaded { types: Vec<String> },
    TypesFailed { message: String },

    /// The mutation succeeded; `item` is the server's updated copy.
    FavoriteSet { item: Item, favorite: bool },
    FavoriteFailed { id: ItemId, favorite: bool, message: String },

    /// The request could not be decoded or routed.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::filters::PageKey;
    use crate::app::query::QueryExecutor;

    #[test]
    fn constructors_without_tracing_have_no_context() {
        let message = WorkerMessage::fetch_types();
        assert!(message.trace_context().is_none());
        assert_eq!(message.kind(), "fetch_types");
    }

    #[test]
    fn list_request_survives_json() {
        let mut executor = QueryExecutor::new();
        let request = executor.issue_reset(&PageKey::search("char"));
        let message = WorkerMessage::fetch_list(request.clone());

        let json = serde_json::to_string(&message).unwrap();
        assert!(!json.contains("trace_context"));
        let decoded: WorkerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, WorkerMessage::FetchList { request, trace_context: None });
    }

    #[test]
    fn malformed_trace_context_does_not_attach() {
        let context = TraceContext {
            trace_id: "not-hex".into(),
            parent_span_id: "0000000000000001".into(),
        };
        assert!(context.attach().is_none());
    }
}
