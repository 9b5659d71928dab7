//! Event handling and state transitions.
//!
//! [`handle_event`] is the single entry point through which the session's
//! state changes. It pattern-matches an [`Event`], mutates [`AppState`], and
//! returns whether a re-render is needed together with the [`Action`]s to
//! execute.
//!
//! # Flows
//!
//! - **Filter change**: filter store action → reset issued if the key has
//!   none in flight → `ListLoaded` replaces the entry → `reset_limit`.
//! - **Sentinel**: scroll trigger check → fetch-more → `ListLoaded` appends →
//!   `increase_limit`.
//! - **Favorite toggle**: mutation sent → `FavoriteSet` patches the active
//!   entry in place and any open detail → one notification. Filters are not
//!   touched on this path.
//!
//! # Example
//!
//! ```rust
//! use pokedex_sync::app::{handle_event, AppState, Event, Action};
//!
//! let mut state = AppState::new();
//! let (render, actions) = handle_event(&mut state, &Event::Mount)?;
//! assert!(render);
//! assert!(actions.iter().all(|a| matches!(a, Action::PostToWorker(_))));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use super::notifications::Notification;
use super::query::ListRequest;
use super::reconciler::{self, Reconciliation};
use super::{Action, AppState};
use crate::domain::error::{PokedexError, Result};
use crate::domain::{Item, ItemId};
use crate::worker::{WorkerMessage, WorkerResponse};

/// Inputs to the session state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The list view was mounted: load types and the first page.
    Mount,

    SetSearch(String),

    /// An empty string clears the type filter.
    SetType(Option<String>),

    SetIsFavorite(bool),

    /// Raw view value; unknown values are ignored.
    SetView(String),

    /// The scroll sentinel became fully visible.
    SentinelVisible,

    /// Flip the favorite flag of a loaded item.
    ToggleFavorite { id: ItemId },

    OpenDetail { name: String },
    CloseDetail,

    WorkerResponse(WorkerResponse),
}

/// Processes an event, mutates state and returns `(render, actions)`.
///
/// # Errors
///
/// Returns [`PokedexError::ItemNotLoaded`] when a favorite toggle names an
/// item that is neither in the active list nor in a loaded detail.
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    match event {
        Event::Mount => {
            state.types.loading = true;
            state.types.error = None;
            let key = state.active_key();
            let request = state.executor.issue_reset(&key);
            Ok((
                true,
                vec![
                    Action::PostToWorker(WorkerMessage::fetch_types()),
                    start_reset(state, request),
                ],
            ))
        }
        Event::SetSearch(search) => {
            state.filters.set_search(search.as_str());
            Ok((true, refetch(state)))
        }
        Event::SetType(item_type) => {
            let item_type = item_type.clone().filter(|t| !t.is_empty());
            state.filters.set_type(item_type);
            Ok((true, refetch(state)))
        }
        Event::SetIsFavorite(is_favorite) => {
            state.filters.set_is_favorite(*is_favorite);
            Ok((true, refetch(state)))
        }
        Event::SetView(view) => {
            let before = state.filters.state().view;
            state.filters.set_view(view);
            Ok((state.filters.state().view != before, vec![]))
        }
        Event::SentinelVisible => Ok(fetch_more(state)),
        Event::ToggleFavorite { id } => {
            if state.favorites_in_flight.contains(id) {
                tracing::debug!(item_id = id, "favorite mutation already in flight");
                return Ok((false, vec![]));
            }

            let (name, is_favorite) = state
                .loaded_item(*id)
                .ok_or(PokedexError::ItemNotLoaded(*id))?;

            tracing::debug!(item_id = id, name = %name, favorite = !is_favorite, "favorite toggle sent");
            state.favorites_in_flight.insert(*id);
            Ok((false, vec![Action::PostToWorker(WorkerMessage::set_favorite(*id, !is_favorite))]))
        }
        Event::OpenDetail { name } => {
            state.active_detail = Some(name.clone());
            let token = state.executor.issue_detail(name);
            Ok((true, vec![Action::PostToWorker(WorkerMessage::fetch_detail(name.clone(), token))]))
        }
        Event::CloseDetail => {
            let was_open = state.active_detail.take().is_some();
            Ok((was_open, vec![]))
        }
        Event::WorkerResponse(response) => handle_response(state, response),
    }
}

/// Marks a reset as outstanding and wraps it for the worker.
fn start_reset(state: &mut AppState, request: ListRequest) -> Action {
    state.scroll.begin_reset(&request.key);
    Action::PostToWorker(WorkerMessage::fetch_list(request))
}

/// Issues a reset for the active key if a filter change asked for one.
fn refetch(state: &mut AppState) -> Vec<Action> {
    state
        .executor
        .reset_if_needed(state.filters.state())
        .map(|request| start_reset(state, request))
        .into_iter()
        .collect()
}

fn fetch_more(state: &mut AppState) -> (bool, Vec<Action>) {
    let key = state.active_key();
    let cached_len = state.cache.len_of(&key);
    let limit = state.filters.state().limit;

    if !state.scroll.should_fetch_more(&key, cached_len, limit) {
        return (false, vec![]);
    }

    let Some(request) = state.executor.issue_more(&key, cached_len) else {
        return (false, vec![]);
    };

    state.scroll.begin_more(&key, request.token);
    (true, vec![Action::PostToWorker(WorkerMessage::fetch_list(request))])
}

/// Settles a list request. Shared by success and failure.
fn settle_list(state: &mut AppState, request: &ListRequest, outcome: std::result::Result<Vec<Item>, &str>) -> bool {
    let settlement = state
        .executor
        .settle_list(request, outcome.as_ref().map(|_| ()).map_err(|m| *m));
    if !settlement.is_applied() {
        return false;
    }

    let succeeded = outcome.is_ok();
    let is_active = request.key == state.active_key();

    if let Ok(edges) = outcome {
        let entry = state.cache.merge(&request.key, request.offset, edges);
        tracing::debug!(key = %request.key, entry_len = entry.len(), "list settled");
    }

    if request.is_reset() {
        state.scroll.finish_reset(&request.key, succeeded);
        if is_active {
            state.filters.reset_limit();
        }
    } else if state.scroll.finish_more(&request.key, request.token, succeeded) && is_active {
        state.filters.increase_limit();
    }

    is_active
}

fn handle_response(state: &mut AppState, response: &WorkerResponse) -> Result<(bool, Vec<Action>)> {
    match response {
        WorkerResponse::ListLoaded { request, edges } => {
            Ok((settle_list(state, request, Ok(edges.clone())), vec![]))
        }
        WorkerResponse::ListFailed { request, message } => {
            Ok((settle_list(state, request, Err(message.as_str())), vec![]))
        }
        WorkerResponse::DetailLoaded { name, token, detail } => {
            let settlement = state.executor.settle_detail(name, *token, Ok(()));
            if settlement.is_applied() {
                state.details.insert(name.clone(), detail.clone());
            }
            Ok((settlement.is_applied(), vec![]))
        }
        WorkerResponse::DetailFailed { name, token, message } => {
            let settlement = state.executor.settle_detail(name, *token, Err(message.as_str()));
            Ok((settlement.is_applied(), vec![]))
        }
        WorkerResponse::TypesLoaded { types } => {
            state.types.loading = false;
            state.types.types.clone_from(types);
            Ok((true, vec![]))
        }
        WorkerResponse::TypesFailed { message } => {
            tracing::debug!(error = %message, "types failed to load");
            state.types.loading = false;
            state.types.error = Some(message.clone());
            Ok((true, vec![]))
        }
        WorkerResponse::FavoriteSet { item, favorite } => {
            state.favorites_in_flight.remove(&item.id);

            let key = state.active_key();
            let outcome = reconciler::apply(&mut state.cache, &key, item);
            let patched_details = state.patch_details(item);
            tracing::debug!(
                item_id = item.id,
                in_list = matches!(outcome, Reconciliation::Replaced { .. }),
                patched_details,
                "favorite confirmed"
            );

            let title = Notification::favorite_title(&item.name, *favorite);
            Ok((true, vec![Action::Notify(Notification::success(title))]))
        }
        WorkerResponse::FavoriteFailed { id, favorite, message } => {
            state.favorites_in_flight.remove(id);
            tracing::debug!(item_id = id, error = %message, "favorite mutation failed");

            let name = state
                .loaded_item(*id)
                .map_or_else(|| format!("#{id}"), |(name, _)| name);
            let title = Notification::favorite_title(&name, *favorite);
            Ok((false, vec![Action::Notify(Notification::error(title))]))
        }
        WorkerResponse::Error { message } => {
            tracing::error!("Worker error: {}", message);
            Ok((false, vec![]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::filters::{PageKey, PAGE_SIZE};
    use crate::app::modes::ScrollPhase;
    use crate::app::notifications::NotificationKind;

    fn item(id: ItemId) -> Item {
        Item::new(id, &format!("item-{id}"), &["Fire"], "")
    }

    fn batch(ids: impl IntoIterator<Item = ItemId>) -> Vec<Item> {
        ids.into_iter().map(item).collect()
    }

    fn ids(state: &AppState, key: &PageKey) -> Vec<ItemId> {
        state.cache.get(key).unwrap_or_default().iter().map(|i| i.id).collect()
    }

    /// Pulls the single list request out of `actions`.
    fn list_request(actions: &[Action]) -> ListRequest {
        let requests: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                Action::PostToWorker(WorkerMessage::FetchList { request, .. }) => Some(request.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(requests.len(), 1, "expected one list request in {actions:?}");
        requests[0].clone()
    }

    fn loaded(state: &mut AppState, request: ListRequest, edges: Vec<Item>) -> (bool, Vec<Action>) {
        handle_event(state, &Event::WorkerResponse(WorkerResponse::ListLoaded { request, edges })).unwrap()
    }

    fn mounted_with(edges: Vec<Item>) -> AppState {
        let mut state = AppState::new();
        let (_, actions) = handle_event(&mut state, &Event::Mount).unwrap();
        let request = list_request(&actions);
        loaded(&mut state, request, edges);
        state
    }

    #[test]
    fn mount_requests_types_and_first_page() {
        let mut state = AppState::new();
        let (render, actions) = handle_event(&mut state, &Event::Mount).unwrap();
        assert!(render);
        assert!(actions.contains(&Action::PostToWorker(WorkerMessage::fetch_types())));

        let request = list_request(&actions);
        assert_eq!((request.offset, request.limit), (0, PAGE_SIZE));
        assert_eq!(request.key, PageKey::default());
        assert_eq!(state.scroll.phase(&request.key), ScrollPhase::LoadingFirstPage);
        assert!(state.list_snapshot().loading);
    }

    #[test]
    fn scenario_a_partial_page_stops_paging() {
        let mut state = mounted_with(batch(1..=9));
        let key = PageKey::default();

        let (_, actions) = handle_event(&mut state, &Event::SentinelVisible).unwrap();
        let more = list_request(&actions);
        assert_eq!((more.offset, more.limit), (9, 9));

        loaded(&mut state, more, batch(10..=14));
        assert_eq!(ids(&state, &key), (1..=14).collect::<Vec<_>>());
        assert_eq!(state.filters.state().limit, 18);

        let (render, actions) = handle_event(&mut state, &Event::SentinelVisible).unwrap();
        assert!(!render);
        assert!(actions.is_empty());
    }

    #[test]
    fn repeated_sentinel_while_fetching_issues_one_request() {
        let mut state = mounted_with(batch(1..=9));
        let (_, first) = handle_event(&mut state, &Event::SentinelVisible).unwrap();
        let (_, second) = handle_event(&mut state, &Event::SentinelVisible).unwrap();
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert!(state.list_snapshot().loading_more);
    }

    #[test]
    fn scenario_b_search_resets_into_new_key() {
        let mut state = mounted_with(batch(1..=9));
        let (_, actions) = handle_event(&mut state, &Event::SetSearch("char".into())).unwrap();
        assert!(state.filters.state().refetch_pending);

        let reset = list_request(&actions);
        assert_eq!(reset.key, PageKey::search("char"));
        assert_eq!(reset.offset, 0);

        loaded(&mut state, reset, batch([4, 5]));
        assert_eq!(ids(&state, &PageKey::search("char")), vec![4, 5]);
        assert_eq!(ids(&state, &PageKey::default()), (1..=9).collect::<Vec<_>>());
        assert_eq!(state.filters.state().limit, PAGE_SIZE);
        assert!(!state.filters.state().refetch_pending);
    }

    #[test]
    fn scenario_d_late_older_reset_is_discarded() {
        let mut state = AppState::new();
        let key = PageKey::default();
        let first = state.executor.issue_reset(&key);
        let second = state.executor.issue_reset(&key);
        assert!(first.token < second.token);

        let (render, _) = loaded(&mut state, second, batch([2, 4, 6]));
        assert!(render);
        let (render, _) = loaded(&mut state, first, batch([1, 3, 5, 7]));
        assert!(!render);

        assert_eq!(ids(&state, &key), vec![2, 4, 6]);
    }

    #[test]
    fn filter_change_with_reset_in_flight_is_not_reissued() {
        let mut state = mounted_with(batch(1..=9));
        let (_, first) = handle_event(&mut state, &Event::SetSearch("a".into())).unwrap();
        handle_event(&mut state, &Event::SetSearch("ab".into())).unwrap();
        let (_, again) = handle_event(&mut state, &Event::SetSearch("a".into())).unwrap();

        assert_eq!(first.len(), 1);
        assert!(again.is_empty());
    }

    #[test]
    fn abandoned_key_settling_late_does_not_reset_limit() {
        let mut state = mounted_with(batch(1..=9));
        let (_, actions) = handle_event(&mut state, &Event::SetSearch("x".into())).unwrap();
        let abandoned = list_request(&actions);
        let (_, actions) = handle_event(&mut state, &Event::SetSearch(String::new())).unwrap();
        let current = list_request(&actions);

        loaded(&mut state, current, batch(1..=9));
        let (_, actions) = handle_event(&mut state, &Event::SentinelVisible).unwrap();
        loaded(&mut state, list_request(&actions), batch(10..=18));
        assert_eq!(state.filters.state().limit, 18);

        loaded(&mut state, abandoned, batch([7]));
        assert_eq!(state.filters.state().limit, 18);
        assert_eq!(ids(&state, &PageKey::search("x")), vec![7]);

        let (_, actions) = handle_event(&mut state, &Event::SentinelVisible).unwrap();
        assert_eq!(list_request(&actions).offset, 18);
    }

    #[test]
    fn fetch_more_failure_enters_error_and_stops_paging() {
        let mut state = mounted_with(batch(1..=9));
        let (_, actions) = handle_event(&mut state, &Event::SentinelVisible).unwrap();
        let more = list_request(&actions);

        handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::ListFailed { request: more, message: "timeout".into() }),
        )
        .unwrap();

        let snapshot = state.list_snapshot();
        assert_eq!(snapshot.error.as_deref(), Some("timeout"));
        assert_eq!(snapshot.items.len(), 9);
        assert_eq!(state.filters.state().limit, 18);

        let (_, actions) = handle_event(&mut state, &Event::SentinelVisible).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn reset_error_clears_on_next_filter_change() {
        let mut state = AppState::new();
        let (_, actions) = handle_event(&mut state, &Event::Mount).unwrap();
        let reset = list_request(&actions);
        handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::ListFailed { request: reset, message: "down".into() }),
        )
        .unwrap();
        assert!(state.list_snapshot().error.is_some());

        handle_event(&mut state, &Event::SetSearch("bulba".into())).unwrap();
        handle_event(&mut state, &Event::SetSearch(String::new())).unwrap();
        assert!(state.list_snapshot().error.is_none());
        assert!(state.list_snapshot().loading);
    }

    #[test]
    fn empty_type_clears_filter() {
        let mut state = mounted_with(batch(1..=3));
        handle_event(&mut state, &Event::SetType(Some("Fire".into()))).unwrap();
        assert_eq!(state.filters.state().item_type.as_deref(), Some("Fire"));
        handle_event(&mut state, &Event::SetType(Some(String::new()))).unwrap();
        assert!(state.filters.state().item_type.is_none());
    }

    #[test]
    fn set_view_renders_only_on_change() {
        let mut state = AppState::new();
        assert!(handle_event(&mut state, &Event::SetView("list".into())).unwrap().0);
        assert!(!handle_event(&mut state, &Event::SetView("tiles".into())).unwrap().0);
        assert!(!state.filters.state().refetch_pending);
    }

    #[test]
    fn scenario_c_favorite_patches_in_place() {
        let mut state = mounted_with(batch([3, 8, 5, 1]));
        let (_, actions) = handle_event(&mut state, &Event::ToggleFavorite { id: 5 }).unwrap();
        assert_eq!(actions, vec![Action::PostToWorker(WorkerMessage::set_favorite(5, true))]);

        let mut updated = item(5);
        updated.is_favorite = true;
        let (_, actions) = handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::FavoriteSet { item: updated, favorite: true }),
        )
        .unwrap();

        let entry = state.cache.get(&PageKey::default()).unwrap();
        assert_eq!(entry.iter().map(|i| i.id).collect::<Vec<_>>(), vec![3, 8, 5, 1]);
        assert!(entry[2].is_favorite);
        assert_eq!(
            actions,
            vec![Action::Notify(Notification::success("item-5 favorite added"))]
        );
        assert!(!state.filters.state().refetch_pending);
    }

    #[test]
    fn toggle_is_guarded_while_in_flight() {
        let mut state = mounted_with(batch(1..=3));
        let (_, first) = handle_event(&mut state, &Event::ToggleFavorite { id: 2 }).unwrap();
        let (_, second) = handle_event(&mut state, &Event::ToggleFavorite { id: 2 }).unwrap();
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn toggle_unknown_item_is_an_error() {
        let mut state = mounted_with(batch(1..=3));
        let err = handle_event(&mut state, &Event::ToggleFavorite { id: 42 }).unwrap_err();
        assert!(matches!(err, PokedexError::ItemNotLoaded(42)));
    }

    #[test]
    fn favorite_failure_notifies_once_and_changes_nothing() {
        let mut state = mounted_with(batch(1..=3));
        handle_event(&mut state, &Event::ToggleFavorite { id: 2 }).unwrap();
        let before = state.cache.clone();

        let (_, actions) = handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::FavoriteFailed {
                id: 2,
                favorite: true,
                message: "rejected".into(),
            }),
        )
        .unwrap();

        assert_eq!(state.cache, before);
        assert_eq!(actions.len(), 1);
        assert!(matches!(
            &actions[0],
            Action::Notify(n) if n.kind == NotificationKind::Error && n.title == "item-2 favorite added"
        ));
        assert!(state.favorites_in_flight.is_empty());
    }

    #[test]
    fn detail_flow_with_stale_response() {
        let mut state = AppState::new();
        let (_, first) = handle_event(&mut state, &Event::OpenDetail { name: "item-1".into() }).unwrap();
        let (_, second) = handle_event(&mut state, &Event::OpenDetail { name: "item-1".into() }).unwrap();

        let token_of = |actions: &[Action]| match &actions[0] {
            Action::PostToWorker(WorkerMessage::FetchDetail { token, .. }) => *token,
            other => panic!("unexpected action {other:?}"),
        };
        let (old, new) = (token_of(&first[..]), token_of(&second[..]));

        let mut fresh = item(1);
        fresh.max_cp = Some(100);
        handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::DetailLoaded { name: "item-1".into(), token: new, detail: fresh }),
        )
        .unwrap();
        let (render, _) = handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::DetailLoaded { name: "item-1".into(), token: old, detail: item(1) }),
        )
        .unwrap();

        assert!(!render);
        let snapshot = state.detail_snapshot("item-1");
        assert!(!snapshot.loading);
        assert_eq!(snapshot.data.and_then(|d| d.max_cp), Some(100));
    }

    #[test]
    fn favorite_from_detail_patches_detail() {
        let mut state = AppState::new();
        let (_, actions) = handle_event(&mut state, &Event::OpenDetail { name: "item-9".into() }).unwrap();
        let Action::PostToWorker(WorkerMessage::FetchDetail { token, .. }) = &actions[0] else {
            panic!("expected detail fetch");
        };
        let mut detail = item(9);
        detail.sound = Some("cry.mp3".into());
        handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::DetailLoaded { name: "item-9".into(), token: *token, detail }),
        )
        .unwrap();

        handle_event(&mut state, &Event::ToggleFavorite { id: 9 }).unwrap();
        let mut updated = item(9);
        updated.is_favorite = true;
        handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::FavoriteSet { item: updated, favorite: true }),
        )
        .unwrap();

        let data = state.detail_snapshot("item-9").data.unwrap();
        assert!(data.is_favorite);
        assert_eq!(data.sound.as_deref(), Some("cry.mp3"));
    }

    #[test]
    fn types_failure_is_reported() {
        let mut state = AppState::new();
        handle_event(&mut state, &Event::Mount).unwrap();
        assert!(state.types_snapshot().loading);
        handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::TypesFailed { message: "nope".into() }),
        )
        .unwrap();
        let snapshot = state.types_snapshot();
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_some());
    }
}
