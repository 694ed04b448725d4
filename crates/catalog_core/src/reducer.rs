//! Pure state transitions. Every mutation of [`CoordinatorState`] goes through
//! [`reduce`]; the coordinator only decides which fetches to run and feeds their
//! typed outcomes back in as events.

use shared::{
    domain::{CatalogPage, EntityKey, EntryDetail, FilteredEntry},
    error::FetchResult,
};

use crate::state::{CoordinatorState, NOT_FOUND_NOTICE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Page one, replacing whatever the catalog held.
    First,
    /// Continuation through the cursor, appended to the catalog.
    Next,
}

#[derive(Debug, Clone)]
pub enum CatalogEvent {
    QueryChanged(String),
    PageRequested(PageKind),
    PageLoaded {
        kind: PageKind,
        result: FetchResult<CatalogPage>,
    },
    LookupRequested {
        key: EntityKey,
    },
    LookupCompleted {
        seq: u64,
        key: EntityKey,
        result: FetchResult<FilteredEntry>,
    },
    DetailRequested {
        key: EntityKey,
    },
    DetailCompleted {
        key: EntityKey,
        result: FetchResult<EntryDetail>,
    },
    FilterCleared,
}

impl CatalogEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CatalogEvent::QueryChanged(_) => "query_changed",
            CatalogEvent::PageRequested(_) => "page_requested",
            CatalogEvent::PageLoaded { .. } => "page_loaded",
            CatalogEvent::LookupRequested { .. } => "lookup_requested",
            CatalogEvent::LookupCompleted { .. } => "lookup_completed",
            CatalogEvent::DetailRequested { .. } => "detail_requested",
            CatalogEvent::DetailCompleted { .. } => "detail_completed",
            CatalogEvent::FilterCleared => "filter_cleared",
        }
    }

    /// Entry the event concerns, if any.
    pub fn key(&self) -> Option<&EntityKey> {
        match self {
            CatalogEvent::LookupRequested { key }
            | CatalogEvent::LookupCompleted { key, .. }
            | CatalogEvent::DetailRequested { key }
            | CatalogEvent::DetailCompleted { key, .. } => Some(key),
            _ => None,
        }
    }
}

pub fn reduce(mut state: CoordinatorState, event: CatalogEvent) -> CoordinatorState {
    match event {
        CatalogEvent::QueryChanged(text) => {
            state.query = text;
        }
        CatalogEvent::PageRequested(_) => {
            state.pending_fetches += 1;
            state.page_fetches += 1;
        }
        CatalogEvent::PageLoaded { kind, result } => {
            state.pending_fetches = state.pending_fetches.saturating_sub(1);
            state.page_fetches = state.page_fetches.saturating_sub(1);
            if let Ok(page) = result {
                match kind {
                    PageKind::First => state.catalog = page.entries,
                    PageKind::Next => state.catalog.extend(page.entries),
                }
                state.cursor = page.next;
            }
        }
        CatalogEvent::LookupRequested { .. } => {
            state.pending_fetches += 1;
            state.lookup_seq += 1;
            state.notice = None;
        }
        CatalogEvent::LookupCompleted { seq, result, .. } => {
            state.pending_fetches = state.pending_fetches.saturating_sub(1);
            // A newer lookup or a cleared filter supersedes this answer.
            if seq == state.lookup_seq {
                match result {
                    Ok(entry) => {
                        state.filter_result = Some(entry);
                        state.detail = None;
                    }
                    Err(_) => {
                        state.filter_result = None;
                        state.detail = None;
                        state.notice = Some(NOT_FOUND_NOTICE.to_string());
                    }
                }
            }
        }
        CatalogEvent::DetailRequested { .. } => {
            state.pending_fetches += 1;
        }
        CatalogEvent::DetailCompleted { key, result } => {
            state.pending_fetches = state.pending_fetches.saturating_sub(1);
            if let Ok(detail) = result {
                let matches_filter = state.filter_result.as_ref().is_some_and(|filter| {
                    filter.name() == detail.name
                        && filter.name().eq_ignore_ascii_case(key.as_str())
                });
                if matches_filter {
                    state.detail = Some(detail);
                }
            }
        }
        CatalogEvent::FilterCleared => {
            state.filter_result = None;
            state.detail = None;
            state.query.clear();
            state.notice = None;
            state.lookup_seq += 1;
        }
    }

    state.is_loading = state.pending_fetches > 0;
    state
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
