//! Plain-text rendering of catalog and article pages.

use chrono::{DateTime, Utc};
use console::style;
use folio_model::{Article, Tags};
use terminal_size::{Width, terminal_size};

use super::icons::{DRAFT, SEARCH, TAG, USER};
use crate::catalog::{CatalogDisplay, CatalogView};

const DEFAULT_WIDTH: usize = 80;

pub const EMPTY_CATALOG: &str = "No articles found.";
pub const LOADING_CATALOG: &str = "Loading articles...";

/// Usable text width, clamped to something readable.
pub fn terminal_width() -> usize {
    terminal_size()
        .map(|(Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_WIDTH)
        .clamp(40, 120)
}

/// `March 1, 2025`
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

pub fn render_tags(tags: &Tags) -> String {
    tags.iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Two-line summary used in the catalog list.
pub fn render_article_row(article: &Article) -> String {
    let mut title = format!(
        "{:>5}  {}",
        style(format!("#{}", article.id)).dim(),
        style(&article.title).bold()
    );
    if !article.is_published {
        title.push_str(&format!("  {}{}", DRAFT, style("Draft").yellow()));
    }

    let when = match article.published_at() {
        Some(at) => format_date(at),
        None => "Unpublished".to_string(),
    };
    let mut meta = format!("       By {} · {}", author(article), when);
    if !article.tags.is_empty() {
        meta.push_str(&format!("  {}", style(render_tags(&article.tags)).cyan()));
    }

    format!("{}\n{}", title, meta)
}

pub fn render_catalog(view: &CatalogView, width: usize) -> String {
    let mut out = Vec::new();
    out.push(style("Blog Articles").bold().underlined().to_string());
    if let Some(user) = &view.user {
        out.push(format!("{}Hello, {}!", USER, user));
    }

    let mut filters = Vec::new();
    if !view.search_input.is_empty() {
        filters.push(format!("{}{}", SEARCH, view.search_input));
    }
    if !view.tags_input.is_empty() {
        filters.push(format!("{}{}", TAG, view.tags_input));
    }
    if view.signed_in() {
        let drafts = if view.include_unpublished { "shown" } else { "hidden" };
        filters.push(format!("drafts {}", drafts));
    }
    if !filters.is_empty() {
        out.push(style(filters.join("  ")).dim().to_string());
    }
    out.push(style("─".repeat(width.min(60))).dim().to_string());

    match view.display() {
        CatalogDisplay::Loading => out.push(LOADING_CATALOG.to_string()),
        CatalogDisplay::Failed(failure) => {
            out.push(style(&failure.message).red().to_string());
        }
        CatalogDisplay::Empty => out.push(EMPTY_CATALOG.to_string()),
        CatalogDisplay::Articles(articles) => {
            for article in articles {
                out.push(render_article_row(article));
            }
        }
    }
    out.join("\n")
}

/// Full article page with content wrapped to `width`.
pub fn render_article(article: &Article, width: usize) -> String {
    let mut out = Vec::new();
    out.push(style(&article.title).bold().underlined().to_string());

    let mut meta = vec![format!("By {}", author(article))];
    match article.published_at() {
        Some(at) => meta.push(format!("Published on {}", format_date(at))),
        None => meta.push(style("Draft").yellow().to_string()),
    }
    if article.was_edited_after_publish()
        && let Some(updated) = article.updated_at
    {
        meta.push(format!("Updated on {}", format_date(updated)));
    }
    out.push(style(meta.join(" · ")).dim().to_string());
    if !article.tags.is_empty() {
        out.push(style(render_tags(&article.tags)).cyan().to_string());
    }
    out.push(String::new());

    for paragraph in article.paragraphs() {
        if paragraph.trim().is_empty() {
            out.push(String::new());
        } else {
            out.push(textwrap::fill(paragraph, width));
        }
    }
    out.join("\n")
}

fn author(article: &Article) -> &str {
    if article.author_name.is_empty() {
        "unknown"
    } else {
        &article.author_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FetchFailure;
    use crate::errors::ErrorKind;
    use chrono::TimeZone;
    use folio_model::ArticleId;
    use std::sync::Arc;

    fn plain(s: &str) -> String {
        console::strip_ansi_codes(s).to_string()
    }

    fn article(published: bool) -> Article {
        Article {
            id: ArticleId::from(7),
            title: "Ownership".into(),
            content: "First line.\n\nSecond line.".into(),
            tags: Tags::parse("rust, memory"),
            author_name: "ada".into(),
            is_published: published,
            publishing_date: Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()),
            updated_at: Some(Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_format_date() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(format_date(at), "March 1, 2025");
    }

    #[test]
    fn test_render_tags() {
        assert_eq!(render_tags(&Tags::parse("a, b")), "#a #b");
        assert_eq!(render_tags(&Tags::default()), "");
    }

    #[test]
    fn test_row_marks_drafts() {
        let row = plain(&render_article_row(&article(false)));
        assert!(row.contains("#7"));
        assert!(row.contains("Ownership"));
        assert!(row.contains("Draft"));
        assert!(row.contains("Unpublished"));

        let row = plain(&render_article_row(&article(true)));
        assert!(!row.contains("Draft"));
        assert!(row.contains("March 1, 2025"));
        assert!(row.contains("#rust #memory"));
    }

    #[test]
    fn test_article_page_shows_edit_date() {
        let page = plain(&render_article(&article(true), 80));
        assert!(page.contains("Published on March 1, 2025"));
        assert!(page.contains("Updated on March 4, 2025"));
        assert!(page.contains("First line.\n\nSecond line."));
    }

    #[test]
    fn test_catalog_states() {
        let mut view = CatalogView::default();
        assert!(plain(&render_catalog(&view, 80)).contains(LOADING_CATALOG));

        view.loading = false;
        assert!(plain(&render_catalog(&view, 80)).contains(EMPTY_CATALOG));

        view.articles = Arc::new(vec![article(true)]);
        view.error = Some(FetchFailure {
            message: "Failed to fetch articles".into(),
            status: None,
            kind: ErrorKind::Network,
        });
        let text = plain(&render_catalog(&view, 80));
        assert!(text.contains("Failed to fetch articles"));
        assert!(!text.contains("Ownership"));
    }

    #[test]
    fn test_catalog_greets_user_and_shows_toggle() {
        let view = CatalogView {
            loading: false,
            user: Some("ada".into()),
            include_unpublished: false,
            ..Default::default()
        };
        let text = plain(&render_catalog(&view, 80));
        assert!(text.contains("Hello, ada!"));
        assert!(text.contains("drafts hidden"));
    }
}
