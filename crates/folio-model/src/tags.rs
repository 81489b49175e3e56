//! Article tags.
//!
//! The API transports tags as one comma-joined string (`"rust, async, web"`).
//! Inside the client they are an ordered list of trimmed, non-empty, unique
//! entries. [`Tags::parse`] and [`Tags::join`] are the only conversion points
//! between the two forms; the conversion drops empty and repeated entries.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Separator used when joining tags for transport.
pub const TAG_SEPARATOR: &str = ", ";

/// Ordered list of trimmed, non-empty, de-duplicated tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Split a comma-joined tag string.
    ///
    /// Entries are trimmed; empty entries and later duplicates are dropped.
    pub fn parse(raw: &str) -> Self {
        let mut tags: Vec<String> = Vec::new();
        for entry in raw.split(',') {
            let entry = entry.trim();
            if entry.is_empty() || tags.iter().any(|t| t == entry) {
                continue;
            }
            tags.push(entry.to_string());
        }
        Self(tags)
    }

    /// Join tags into the transport string.
    pub fn join(&self) -> String {
        self.0.join(TAG_SEPARATOR)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }
}

impl<S: AsRef<str>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let joined: Vec<String> = iter.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse(&joined.join(","))
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}

impl Serialize for Tags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.join())
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.map(|s| Tags::parse(&s)).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_entries() {
        let tags = Tags::parse(" rust ,async,  web ");
        assert_eq!(tags.as_slice(), ["rust", "async", "web"]);
    }

    #[test]
    fn test_parse_drops_empty_entries() {
        let tags = Tags::parse("rust,, ,web,");
        assert_eq!(tags.as_slice(), ["rust", "web"]);
    }

    #[test]
    fn test_parse_drops_later_duplicates_keeping_order() {
        let tags = Tags::parse("web, rust, web, async, rust");
        assert_eq!(tags.as_slice(), ["web", "rust", "async"]);
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(Tags::parse("").is_empty());
        assert!(Tags::parse(" , ,").is_empty());
    }

    #[test]
    fn test_join_uses_comma_space() {
        let tags = Tags::parse("python,django,react");
        assert_eq!(tags.join(), "python, django, react");
    }

    #[test]
    fn test_join_is_stable_under_reparse() {
        let tags = Tags::parse("a, b ,,c,a");
        assert_eq!(Tags::parse(&tags.join()), tags);
    }

    #[test]
    fn test_from_iterator_normalizes() {
        let tags: Tags = vec![" rust", "", "rust", "web "].into_iter().collect();
        assert_eq!(tags.as_slice(), ["rust", "web"]);
    }

    #[test]
    fn test_serde_uses_joined_string() {
        let tags = Tags::parse("rust,web");
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#""rust, web""#);

        let parsed: Tags = serde_json::from_str(r#""rust ,web,,""#).unwrap();
        assert_eq!(parsed.as_slice(), ["rust", "web"]);
    }

    #[test]
    fn test_deserialize_null_is_empty() {
        let parsed: Tags = serde_json::from_str("null").unwrap();
        assert!(parsed.is_empty());
    }
}
