//! Infinite-scroll trigger and the sentinel visibility capability.
//!
//! [`ScrollTrigger`] tracks one [`ScrollPhase`] per page key and decides when
//! a sentinel sighting should turn into a fetch-more. A sighting only fetches
//! when the key is `Ready`, no fetch-more is outstanding, and the cached entry
//! has caught up with the current limit (`cached_len >= limit`). Once the entry
//! falls short of the limit the list is exhausted and further sightings are
//! ignored.
//!
//! Sentinel visibility itself comes from a [`VisibilityObserver`]. The
//! observer is held by an [`ObserverScope`], which guarantees `stop()` when
//! the owning view goes away.

use super::filters::PageKey;
use super::modes::ScrollPhase;
use super::query::RequestToken;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, Default)]
struct KeyScroll {
    phase: ScrollPhase,
    more_in_flight: Option<RequestToken>,
}

/// Per-key paging state machine.
#[derive(Debug, Clone, Default)]
pub struct ScrollTrigger {
    keys: HashMap<PageKey, KeyScroll>,
}

impl ScrollTrigger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self, key: &PageKey) -> ScrollPhase {
        self.keys.get(key).map_or(ScrollPhase::Initial, |k| k.phase)
    }

    #[must_use]
    pub fn is_fetching_more(&self, key: &PageKey) -> bool {
        self.keys.get(key).is_some_and(|k| k.more_in_flight.is_some())
    }

    /// A reset was issued; any fetch-more for the key is abandoned.
    pub fn begin_reset(&mut self, key: &PageKey) {
        let state = self.keys.entry(key.clone()).or_default();
        state.phase = ScrollPhase::LoadingFirstPage;
        state.more_in_flight = None;
    }

    /// The current reset settled.
    pub fn finish_reset(&mut self, key: &PageKey, succeeded: bool) {
        let state = self.keys.entry(key.clone()).or_default();
        state.phase = if succeeded { ScrollPhase::Ready } else { ScrollPhase::Error };
    }

    /// Evaluates a sentinel sighting for `key`.
    ///
    /// Returns `true` when a fetch-more should be issued.
    #[must_use]
    pub fn should_fetch_more(&self, key: &PageKey, cached_len: usize, limit: usize) -> bool {
        if cached_len < limit {
            tracing::trace!(key = %key, cached_len, limit, "list exhausted or catching up");
            return false;
        }

        let state = self.keys.get(key).copied().unwrap_or_default();
        if state.phase != ScrollPhase::Ready || state.more_in_flight.is_some() {
            tracing::trace!(key = %key, phase = ?state.phase, "sentinel ignored");
            return false;
        }

        true
    }

    /// Marks a fetch-more as outstanding. Call before handing the request off.
    pub fn begin_more(&mut self, key: &PageKey, token: RequestToken) {
        let state = self.keys.entry(key.clone()).or_default();
        state.phase = ScrollPhase::LoadingMore;
        state.more_in_flight = Some(token);
    }

    /// Clears the in-flight flag if `token` is the outstanding fetch-more.
    ///
    /// Returns `false` for a response that no longer owns the flag.
    pub fn finish_more(&mut self, key: &PageKey, token: RequestToken, succeeded: bool) -> bool {
        let Some(state) = self.keys.get_mut(key) else {
            return false;
        };
        if state.more_in_flight != Some(token) {
            return false;
        }

        state.more_in_flight = None;
        state.phase = if succeeded { ScrollPhase::Ready } else { ScrollPhase::Error };
        true
    }
}

/// Capability reporting when a sentinel element becomes fully visible.
pub trait VisibilityObserver {
    /// Begins watching `target`, invoking `on_visible` on each sighting.
    fn start(&mut self, target: &str, on_visible: Box<dyn FnMut()>);

    /// Stops watching. Must be safe to call more than once.
    fn stop(&mut self);
}

/// Owns a started observer and stops it on drop.
pub struct ObserverScope {
    observer: Box<dyn VisibilityObserver>,
}

impl ObserverScope {
    /// Starts `observer` on `target` and ties its lifetime to the returned scope.
    pub fn start(
        mut observer: Box<dyn VisibilityObserver>,
        target: &str,
        on_visible: Box<dyn FnMut()>,
    ) -> Self {
        tracing::debug!(target, "visibility observer started");
        observer.start(target, on_visible);
        Self { observer }
    }
}

impl Drop for ObserverScope {
    fn drop(&mut self) {
        tracing::debug!("visibility observer stopped");
        self.observer.stop();
    }
}

impl fmt::Debug for ObserverScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverScope").finish_non_exhaustive()
    }
}

#[derive(Default)]
struct ManualState {
    target: Option<String>,
    on_visible: Option<Box<dyn FnMut()>>,
}

/// Observer driven by explicit [`ManualObserver::reveal`] calls.
///
/// Clones share state, so a caller can keep one handle while the session owns
/// the other.
#[derive(Clone, Default)]
pub struct ManualObserver {
    inner: Rc<RefCell<ManualState>>,
}

impl ManualObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports the sentinel as visible. Returns `false` when not observing.
    pub fn reveal(&self) -> bool {
        let callback = self.inner.borrow_mut().on_visible.take();
        let Some(mut callback) = callback else {
            return false;
        };

        callback();

        let mut state = self.inner.borrow_mut();
        if state.target.is_some() && state.on_visible.is_none() {
            state.on_visible = Some(callback);
        }
        true
    }

    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.inner.borrow().target.is_some()
    }

    #[must_use]
    pub fn target(&self) -> Option<String> {
        self.inner.borrow().target.clone()
    }
}

impl VisibilityObserver for ManualObserver {
    fn start(&mut self, target: &str, on_visible: Box<dyn FnMut()>) {
        let mut state = self.inner.borrow_mut();
        state.target = Some(target.to_string());
        state.on_visible = Some(on_visible);
    }

    fn stop(&mut self) {
        let mut state = self.inner.borrow_mut();
        state.target = None;
        state.on_visible = None;
    }
}

impl fmt::Debug for ManualObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualObserver")
            .field("target", &self.target())
            .finish()
    }
}
