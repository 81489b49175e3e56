use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use crate::tags::Tags;

/// Server-assigned article identifier.
///
/// The API hands out integers today, but the client never does arithmetic on
/// them; the id is kept as an opaque string and rendered into paths verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ArticleId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ArticleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::str::FromStr for ArticleId {
    type Err = ParseArticleIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.contains('/') {
            return Err(ParseArticleIdError(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Invalid article id '{0}'")]
pub struct ParseArticleIdError(String);

impl Serialize for ArticleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ArticleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self(n.to_string()),
            Raw::Str(s) => Self(s),
        })
    }
}

/// A blog article as returned by the API.
///
/// List responses omit `content`; it defaults to empty there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub publishing_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Publish timestamp, ignored while the article is a draft.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        if self.is_published {
            self.publishing_date
        } else {
            None
        }
    }

    /// Content split into paragraphs, one per line.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    /// True when a published article has been edited since it went live.
    pub fn was_edited_after_publish(&self) -> bool {
        match (self.published_at(), self.updated_at) {
            (Some(published), Some(updated)) => published != updated,
            _ => false,
        }
    }
}

/// Client-side validation failure for article fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Title and content are required")]
pub struct MissingFields;

/// Editable article fields sent on create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleFields {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Tags,
}

impl ArticleFields {
    pub fn new(title: impl Into<String>, content: impl Into<String>, tags: Tags) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags,
        }
    }

    /// Title and content must both carry non-whitespace text.
    pub fn validate(&self) -> Result<(), MissingFields> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            return Err(MissingFields);
        }
        Ok(())
    }
}

impl From<&Article> for ArticleFields {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            content: article.content.clone(),
            tags: article.tags.clone(),
        }
    }
}
