/// Parameters for the article list endpoint.
///
/// Empty search/tag values are treated as absent, so a cleared input never
/// produces a `search=` parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub tags: Option<String>,
    pub show_unpublished: bool,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = non_empty(search.into());
        self
    }

    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = non_empty(tags.into());
        self
    }

    pub fn show_unpublished(mut self, show: bool) -> Self {
        self.show_unpublished = show;
        self
    }

    /// Query-string pairs in a stable order.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("search".to_string(), search.to_string()));
        }
        if let Some(tags) = self.tags.as_deref().filter(|s| !s.is_empty()) {
            params.push(("tags".to_string(), tags.to_string()));
        }
        if self.show_unpublished {
            params.push(("show_unpublished".into(), "true".into()));
        }
        params
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
