use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{CatalogPage, EntityKey, EntryDetail, FilteredEntry, PageCursor},
    error::{FetchError, FetchResult},
    protocol::{DetailResponse, EntityResponse, ListPageResponse},
};
use tracing::debug;
use url::Url;

mod coordinator;
pub mod reducer;
pub mod state;
pub use coordinator::CatalogCoordinator;
pub use state::{ActiveView, CoordinatorState, ScrollMetrics};

pub const DEFAULT_API_ROOT: &str = "https://pokeapi.co/api/v2/pokemon";

/// Upstream catalog calls consumed by the coordinator.
///
/// Every failure (transport, non-2xx status, undecodable body) is reported as
/// a [`FetchError`]; implementations never panic on bad upstream data.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_first_page(&self) -> FetchResult<CatalogPage>;
    async fn fetch_page(&self, cursor: &PageCursor) -> FetchResult<CatalogPage>;
    async fn lookup_entry(&self, key: &EntityKey) -> FetchResult<FilteredEntry>;
    async fn fetch_detail(&self, key: &EntityKey) -> FetchResult<EntryDetail>;
}

pub struct HttpCatalogApi {
    http: Client,
    root: String,
}

impl HttpCatalogApi {
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            root,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Appends `key` to the root as exactly one percent-encoded path segment,
    /// so separators or dot segments in search text cannot select another
    /// resource.
    fn entity_url(&self, key: &EntityKey) -> FetchResult<String> {
        if matches!(key.as_str(), "." | "..") {
            return Err(FetchError::new(&self.root, format!("invalid entry name '{key}'")));
        }
        let mut url = Url::parse(&self.root)
            .map_err(|err| FetchError::new(&self.root, format!("invalid catalog root: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::new(&self.root, "catalog root cannot carry a path"))?
            .pop_if_empty()
            .push(key.as_str());
        Ok(url.into())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        debug!(url, "GET catalog resource");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::new(url, err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                FetchError::new(url, format!("unexpected status {status}"))
                    .with_status(status.as_u16()),
            );
        }

        response
            .json::<T>()
            .await
            .map_err(|err| FetchError::new(url, format!("malformed body: {err}")))
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn fetch_first_page(&self) -> FetchResult<CatalogPage> {
        let page: ListPageResponse = self.get_json(&self.root).await?;
        Ok(page.into())
    }

    async fn fetch_page(&self, cursor: &PageCursor) -> FetchResult<CatalogPage> {
        let page: ListPageResponse = self.get_json(cursor.as_str()).await?;
        Ok(page.into())
    }

    async fn lookup_entry(&self, key: &EntityKey) -> FetchResult<FilteredEntry> {
        let url = self.entity_url(key)?;
        let entity: EntityResponse = self.get_json(&url).await?;
        Ok(entity.into_filtered_entry(url))
    }

    async fn fetch_detail(&self, key: &EntityKey) -> FetchResult<EntryDetail> {
        let url = self.entity_url(key)?;
        let detail: DetailResponse = self.get_json(&url).await?;
        Ok(detail.into_detail())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
