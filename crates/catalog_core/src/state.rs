//! Screen state owned by the coordinator and read by the presentation layer.

use serde::Serialize;
use shared::domain::{CatalogEntry, EntryDetail, FilteredEntry, PageCursor};

pub const NOT_FOUND_NOTICE: &str = "No entry found with that name, showing the full list again";

/// Distance from the end of the rendered list, in the presentation layer's
/// units, under which the next page is requested.
pub const NEAR_BOTTOM_THRESHOLD: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveView {
    List,
    Filtered,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorState {
    pub catalog: Vec<CatalogEntry>,
    pub filter_result: Option<FilteredEntry>,
    pub detail: Option<EntryDetail>,
    pub cursor: Option<PageCursor>,
    pub is_loading: bool,
    pub query: String,
    pub notice: Option<String>,
    #[serde(skip)]
    pub(crate) pending_fetches: u32,
    #[serde(skip)]
    pub(crate) page_fetches: u32,
    #[serde(skip)]
    pub(crate) lookup_seq: u64,
}

impl CoordinatorState {
    pub fn view(&self) -> ActiveView {
        if self.filter_result.is_some() {
            ActiveView::Filtered
        } else {
            ActiveView::List
        }
    }

    pub fn has_more_pages(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn is_page_fetch_in_flight(&self) -> bool {
        self.page_fetches > 0
    }

    /// Submitting or clearing a filter only makes sense with some query text.
    pub fn can_submit_query(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub viewport_height: f64,
    pub offset: f64,
    pub content_height: f64,
}

impl ScrollMetrics {
    pub fn is_near_bottom(&self) -> bool {
        self.viewport_height + self.offset >= self.content_height - NEAR_BOTTOM_THRESHOLD
    }
}
