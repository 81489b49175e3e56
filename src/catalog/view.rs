use folio_model::{Article, ListQuery};
use std::sync::Arc;

use crate::errors::{ErrorKind, RequestError};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch articles";

/// Why the latest list fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub message: String,
    pub status: Option<u16>,
    pub kind: ErrorKind,
}

impl From<&RequestError> for FetchFailure {
    fn from(err: &RequestError) -> Self {
        Self {
            message: FETCH_FAILED_MESSAGE.to_string(),
            status: err.status(),
            kind: err.kind(),
        }
    }
}

/// Snapshot of the catalog published after every state change.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogView {
    /// Result of the most recent applied fetch. Kept across failures.
    pub articles: Arc<Vec<Article>>,
    pub loading: bool,
    pub error: Option<FetchFailure>,
    pub search_input: String,
    pub tags_input: String,
    pub include_unpublished: bool,
    pub user: Option<String>,
    /// Query of the fetch whose result is shown.
    pub query: ListQuery,
    /// Sequence number of the last dispatched fetch.
    pub issued_seq: u64,
    /// Sequence number of the fetch whose result is shown; 0 before any.
    pub applied_seq: u64,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self {
            articles: Arc::new(Vec::new()),
            loading: true,
            error: None,
            search_input: String::new(),
            tags_input: String::new(),
            include_unpublished: true,
            user: None,
            query: ListQuery::default(),
            issued_seq: 0,
            applied_seq: 0,
        }
    }
}

/// What the catalog page should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CatalogDisplay<'a> {
    Loading,
    Failed(&'a FetchFailure),
    Empty,
    Articles(&'a [Article]),
}

impl CatalogView {
    pub fn signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Loading wins, then the error, so stale articles never show under a failure.
    pub fn display(&self) -> CatalogDisplay<'_> {
        if self.loading {
            CatalogDisplay::Loading
        } else if let Some(failure) = &self.error {
            CatalogDisplay::Failed(failure)
        } else if self.articles.is_empty() {
            CatalogDisplay::Empty
        } else {
            CatalogDisplay::Articles(&self.articles)
        }
    }

    /// True once the fetch numbered `seq` (or a later one) has been applied.
    pub fn settled_at(&self, seq: u64) -> bool {
        !self.loading && self.applied_seq >= seq
    }
}
