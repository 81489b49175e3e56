//! Typed wrappers over the request pipeline.

pub mod articles;
pub mod auth;

pub use articles::{ARTICLES_PATH, ArticleApi, article_path, decode_article_list};
pub use auth::{AuthApi, Registration};
