use folio_model::ListQuery;
use std::time::Duration;
use tokio::time::Instant;

use super::debounce::DebouncedInput;

/// Compose the list query for the given filter values.
///
/// `show_unpublished` is only sent for a signed-in user who asked for it;
/// empty search and tag values are left out entirely.
pub fn compose_query(
    search: &str,
    tags: &str,
    include_unpublished: bool,
    signed_in: bool,
) -> ListQuery {
    ListQuery::new()
        .search(search)
        .tags(tags)
        .show_unpublished(include_unpublished && signed_in)
}

/// Catalog filter inputs.
#[derive(Debug, Clone)]
pub struct FilterState {
    pub search: DebouncedInput,
    pub tags: DebouncedInput,
    /// Display preference; only meaningful while signed in.
    pub include_unpublished: bool,
}

impl FilterState {
    pub fn new(quiet: Duration) -> Self {
        Self {
            search: DebouncedInput::new(quiet),
            tags: DebouncedInput::new(quiet),
            include_unpublished: true,
        }
    }

    /// Earliest pending debounce deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.search.deadline(), self.tags.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Settle both inputs; true when either settled value changed.
    pub fn settle(&mut self, now: Instant) -> bool {
        let search_changed = self.search.settle(now);
        let tags_changed = self.tags.settle(now);
        search_changed || tags_changed
    }

    pub fn cancel_timers(&mut self) {
        self.search.cancel();
        self.tags.cancel();
    }

    pub fn query(&self, signed_in: bool) -> ListQuery {
        compose_query(
            self.search.settled(),
            self.tags.settled(),
            self.include_unpublished,
            signed_in,
        )
    }
}
