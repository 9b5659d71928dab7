//! Query executor bookkeeping: request tokens, in-flight guards and error state.
//!
//! The executor never performs I/O. It decides *whether* a list or detail
//! request should be issued, stamps it with a token, and later decides whether
//! the matching response may touch the cache. Responses can settle in any
//! order; only the one carrying the latest token for its key is applied.
//!
//! # Tokens
//!
//! Tokens come from one strictly increasing counter shared by every key, so a
//! larger token is always a newer request. Each list request also carries an
//! `epoch`: the reset token that was current for its key when it was issued.
//! A fetch-more whose epoch no longer matches was overtaken by a reset and is
//! dropped silently, like any other stale response.

use super::filters::{FilterState, PageKey, PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Monotonic request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One paged list fetch, as sent to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    pub key: PageKey,
    pub offset: usize,
    pub limit: usize,
    pub token: RequestToken,

    /// Reset token current for `key` when this request was issued.
    pub epoch: RequestToken,
}

impl ListRequest {
    /// `offset == 0` requests replace the cache entry.
    #[must_use]
    pub const fn is_reset(&self) -> bool {
        self.offset == 0
    }
}

/// Whether a settled response may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The response is current for its key.
    Applied,

    /// A newer request superseded this one; discard without surfacing anything.
    Stale,
}

impl Settlement {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Clone, Default)]
struct ListStatus {
    latest_reset: Option<RequestToken>,
    reset_in_flight: bool,
    error: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct DetailStatus {
    latest: Option<RequestToken>,
    loading: bool,
    error: Option<String>,
}

/// Token and in-flight bookkeeping for list and detail queries.
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    next_token: u64,
    lists: HashMap<PageKey, ListStatus>,
    details: HashMap<String, DetailStatus>,
}

impl QueryExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    /// Issues a reset for `key` if the filters ask for one.
    ///
    /// Returns `None` when no refetch is pending or a reset for the active key
    /// is already outstanding.
    pub fn reset_if_needed(&mut self, filters: &FilterState) -> Option<ListRequest> {
        if !filters.refetch_pending {
            return None;
        }

        let key = filters.page_key();
        if self.is_reset_in_flight(&key) {
            tracing::debug!(key = %key, "reset already in flight, not reissuing");
            return None;
        }

        Some(self.issue_reset(&key))
    }

    /// Unconditionally issues a new reset for `key`.
    ///
    /// The new token supersedes every outstanding request for the key and
    /// clears any persisted error.
    pub fn issue_reset(&mut self, key: &PageKey) -> ListRequest {
        let token = self.next_token();
        let status = self.lists.entry(key.clone()).or_default();
        status.latest_reset = Some(token);
        status.reset_in_flight = true;
        status.error = None;

        tracing::debug!(key = %key, token = %token, "reset issued");

        ListRequest {
            key: key.clone(),
            offset: 0,
            limit: PAGE_SIZE,
            token,
            epoch: token,
        }
    }

    /// Issues a fetch-more for `key` starting at `offset`.
    ///
    /// Returns `None` if no reset was ever issued for the key, since there is
    /// nothing to extend.
    pub fn issue_more(&mut self, key: &PageKey, offset: usize) -> Option<ListRequest> {
        let epoch = self.lists.get(key)?.latest_reset?;
        let token = self.next_token();

        tracing::debug!(key = %key, offset, token = %token, epoch = %epoch, "fetch-more issued");

        Some(ListRequest {
            key: key.clone(),
            offset,
            limit: PAGE_SIZE,
            token,
            epoch,
        })
    }

    /// Records the outcome of a list request.
    ///
    /// `outcome` is `Ok(())` when the fetch returned edges (possibly none) and
    /// `Err(message)` on transport or server failure. Failures on a current
    /// request leave the key in a persistent error state.
    pub fn settle_list(&mut self, request: &ListRequest, outcome: Result<(), &str>) -> Settlement {
        let _span = tracing::debug_span!("settle_list",
            key = %request.key,
            token = %request.token,
            offset = request.offset
        )
        .entered();

        let Some(status) = self.lists.get_mut(&request.key) else {
            tracing::debug!("response for unknown key dropped");
            return Settlement::Stale;
        };

        let current = if request.is_reset() {
            status.latest_reset == Some(request.token)
        } else {
            status.latest_reset == Some(request.epoch)
        };

        if !current {
            tracing::debug!(latest = ?status.latest_reset.map(RequestToken::value), "stale response dropped");
            return Settlement::Stale;
        }

        if request.is_reset() {
            status.reset_in_flight = false;
        }

        if let Err(message) = outcome {
            tracing::debug!(error = %message, "list fetch failed, key now in error state");
            status.error = Some(message.to_string());
        }

        Settlement::Applied
    }

    #[must_use]
    pub fn is_reset_in_flight(&self, key: &PageKey) -> bool {
        self.lists.get(key).is_some_and(|s| s.reset_in_flight)
    }

    /// Latest reset token issued for `key`.
    #[must_use]
    pub fn latest_reset(&self, key: &PageKey) -> Option<RequestToken> {
        self.lists.get(key).and_then(|s| s.latest_reset)
    }

    /// Persisted error for `key`, if its last current fetch failed.
    #[must_use]
    pub fn list_error(&self, key: &PageKey) -> Option<&str> {
        self.lists.get(key).and_then(|s| s.error.as_deref())
    }

    /// Issues a detail fetch for `name`, superseding any outstanding one.
    pub fn issue_detail(&mut self, name: &str) -> RequestToken {
        let token = self.next_token();
        let status = self.details.entry(name.to_string()).or_default();
        status.latest = Some(token);
        status.loading = true;
        status.error = None;

        tracing::debug!(name, token = %token, "detail fetch issued");
        token
    }

    /// Records the outcome of a detail fetch; same staleness rule as lists.
    pub fn settle_detail(
        &mut self,
        name: &str,
        token: RequestToken,
        outcome: Result<(), &str>,
    ) -> Settlement {
        let Some(status) = self.details.get_mut(name) else {
            return Settlement::Stale;
        };

        if status.latest != Some(token) {
            tracing::debug!(name, token = %token, "stale detail response dropped");
            return Settlement::Stale;
        }

        status.loading = false;
        status.error = outcome.err().map(str::to_string);
        Settlement::Applied
    }

    #[must_use]
    pub fn is_detail_loading(&self, name: &str) -> bool {
        self.details.get(name).is_some_and(|s| s.loading)
    }

    #[must_use]
    pub fn detail_error(&self, name: &str) -> Option<&str> {
        self.details.get(name).and_then(|s| s.error.as_deref())
    }
}
