//! Shared domain types for the folio blog client.
//!
//! These types describe what the blog API exchanges: articles, the editable
//! subset of their fields, tag lists and list-query parameters. They carry no
//! I/O and are shared by the client library and its tests.

pub mod article;
pub mod query;
pub mod tags;

pub use article::{Article, ArticleFields, ArticleId, MissingFields, ParseArticleIdError};
pub use query::ListQuery;
pub use tags::{TAG_SEPARATOR, Tags};
