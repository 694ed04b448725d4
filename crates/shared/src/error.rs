use thiserror::Error;

/// The single failure kind of the upstream catalog API: the call did not
/// produce a usable body, whatever the cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("upstream call to {url} failed: {reason}")]
pub struct FetchError {
    pub url: String,
    pub status: Option<u16>,
    pub reason: String,
}

impl FetchError {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: None,
            reason: reason.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
