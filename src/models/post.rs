use serde::{Deserialize, Serialize};

use super::category::Category;

pub const DEFAULT_READ_TIME: &str = "3 min read";

/// Marker value of `type` for entries that are static pages, not posts.
pub const PAGE_TYPE: &str = "page";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_file: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl Post {
    pub fn is_page(&self) -> bool {
        self.kind.as_deref() == Some(PAGE_TYPE)
    }

    pub fn has_content(&self) -> bool {
        self.content.as_deref().map(|c| !c.trim().is_empty()).unwrap_or(false)
    }

    /// Content is missing but can be fetched.
    pub fn needs_hydration(&self) -> bool {
        !self.has_content() && self.content_file.is_some()
    }

    pub fn author_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.author.as_deref() {
            Some(a) if !a.trim().is_empty() => a,
            _ => default,
        }
    }

    pub fn read_time(&self) -> &str {
        match self.read_time.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => DEFAULT_READ_TIME,
        }
    }

    /// Case-insensitive substring match over title, excerpt and content.
    /// `query_lower` must already be lowercased.
    pub fn matches_query(&self, query_lower: &str) -> bool {
        if query_lower.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(query_lower)
            || self.excerpt.to_lowercase().contains(query_lower)
            || self
                .content
                .as_deref()
                .map(|c| c.to_lowercase().contains(query_lower))
                .unwrap_or(false)
    }
}
