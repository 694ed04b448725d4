use std::sync::Arc;

use shared::domain::{EntityKey, PageCursor};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    reducer::{reduce, CatalogEvent, PageKind},
    state::{CoordinatorState, ScrollMetrics},
    CatalogApi, HttpCatalogApi,
};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 256;

/// Runs the fetch chains behind each presentation intent and folds their
/// outcomes into one [`CoordinatorState`].
///
/// Intents may overlap; network calls are never serialized against each
/// other, but every state change is applied by a single dispatcher and
/// published to snapshot subscribers in the order it happened.
pub struct CatalogCoordinator {
    api: Arc<dyn CatalogApi>,
    state: Mutex<CoordinatorState>,
    snapshots: broadcast::Sender<CoordinatorState>,
}

impl CatalogCoordinator {
    pub fn new(api_root: impl Into<String>) -> Arc<Self> {
        let api = HttpCatalogApi::new(api_root);
        info!(root = api.root(), "using http catalog api");
        Self::new_with_api(Arc::new(api))
    }

    pub fn new_with_api(api: Arc<dyn CatalogApi>) -> Arc<Self> {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            state: Mutex::new(CoordinatorState::default()),
            snapshots,
        })
    }

    pub async fn snapshot(&self) -> CoordinatorState {
        self.state.lock().await.clone()
    }

    pub fn subscribe_snapshots(&self) -> broadcast::Receiver<CoordinatorState> {
        self.snapshots.subscribe()
    }

    pub async fn initialize(&self) {
        self.dispatch(CatalogEvent::PageRequested(PageKind::First))
            .await;
        let result = self.api.fetch_first_page().await;
        match &result {
            Ok(page) => info!(
                entries = page.entries.len(),
                has_next = page.next.is_some(),
                "loaded first catalog page"
            ),
            Err(err) => warn!(url = %err.url, status = ?err.status, "failed to load catalog: {err}"),
        }
        self.dispatch(CatalogEvent::PageLoaded {
            kind: PageKind::First,
            result,
        })
        .await;
    }

    pub async fn load_more(&self) {
        let Some(cursor) = self.begin_next_page().await else {
            return;
        };

        let result = self.api.fetch_page(&cursor).await;
        match &result {
            Ok(page) => info!(
                cursor = %cursor,
                entries = page.entries.len(),
                has_next = page.next.is_some(),
                "loaded next catalog page"
            ),
            Err(err) => warn!(cursor = %cursor, status = ?err.status, "failed to load more entries: {err}"),
        }
        self.dispatch(CatalogEvent::PageLoaded {
            kind: PageKind::Next,
            result,
        })
        .await;
    }

    /// Forwards a scroll report from the presentation layer; pages forward
    /// only once the visible window reaches the end of the list.
    pub async fn on_scroll(&self, metrics: ScrollMetrics) {
        if metrics.is_near_bottom() {
            self.load_more().await;
        }
    }

    pub async fn set_query(&self, text: impl Into<String>) {
        self.dispatch(CatalogEvent::QueryChanged(text.into())).await;
    }

    pub async fn search(&self, query: &str) {
        let Some(key) = EntityKey::from_query(query) else {
            warn!("ignoring search with an empty query");
            return;
        };

        let seq = self
            .dispatch(CatalogEvent::LookupRequested { key: key.clone() })
            .await
            .lookup_seq;

        let result = self.api.lookup_entry(&key).await;
        match &result {
            Err(err) if err.is_not_found() => {
                info!(query = %key, "no entry with that name, falling back to list")
            }
            Err(err) => {
                warn!(query = %key, status = ?err.status, "entry lookup failed, falling back to list: {err}")
            }
            Ok(_) => {}
        }

        let state = self
            .dispatch(CatalogEvent::LookupCompleted {
                seq,
                key: key.clone(),
                result,
            })
            .await;

        if state.lookup_seq != seq {
            debug!(query = %key, "lookup superseded by a newer request");
            return;
        }
        // Lookups by alias (e.g. a numeric id) resolve to the canonical name.
        if let Some(filter) = state.filter_result {
            self.fetch_detail(filter.name()).await;
        }
    }

    /// Enriches the active filter with supplementary data. Ignored unless
    /// `query` names the entry currently shown.
    pub async fn fetch_detail(&self, query: &str) {
        let Some(key) = EntityKey::from_query(query) else {
            return;
        };

        {
            let mut guard = self.state.lock().await;
            let matches_filter = guard
                .filter_result
                .as_ref()
                .is_some_and(|filter| filter.name().eq_ignore_ascii_case(key.as_str()));
            if !matches_filter {
                debug!(query = %key, "skipping detail fetch without a matching filter");
                return;
            }
            self.apply(&mut guard, CatalogEvent::DetailRequested { key: key.clone() });
        }

        let result = self.api.fetch_detail(&key).await;
        match &result {
            Ok(detail) => info!(query = %key, height = detail.height, "loaded entry detail"),
            Err(err) => warn!(query = %key, status = ?err.status, "failed to load entry detail: {err}"),
        }
        self.dispatch(CatalogEvent::DetailCompleted { key, result })
            .await;
    }

    pub async fn select_entry(&self, name: &str) {
        self.set_query(name).await;
        self.search(name).await;
    }

    pub async fn clear_filter(&self) {
        self.dispatch(CatalogEvent::FilterCleared).await;
    }

    async fn begin_next_page(&self) -> Option<PageCursor> {
        let mut guard = self.state.lock().await;
        if guard.is_page_fetch_in_flight() {
            debug!("page fetch already in flight");
            return None;
        }
        let Some(cursor) = guard.cursor.clone() else {
            debug!("catalog exhausted, no further page");
            return None;
        };
        self.apply(&mut guard, CatalogEvent::PageRequested(PageKind::Next));
        Some(cursor)
    }

    async fn dispatch(&self, event: CatalogEvent) -> CoordinatorState {
        let mut guard = self.state.lock().await;
        self.apply(&mut guard, event)
    }

    fn apply(&self, state: &mut CoordinatorState, event: CatalogEvent) -> CoordinatorState {
        debug!(
            event = event.name(),
            key = event.key().map(EntityKey::as_str),
            "dispatching catalog event"
        );
        *state = reduce(std::mem::take(state), event);
        let _ = self.snapshots.send(state.clone());
        state.clone()
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
