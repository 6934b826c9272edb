use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Post categories. Stored values use the blog's own labels; the English
/// slugs are accepted on input as well. Any other value is kept verbatim.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Essays,
    Engineering,
    Research,
    Life,
    Other(String),
}

const OTHER_LABEL: &str = "其他";

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Essays,
        Category::Engineering,
        Category::Research,
        Category::Life,
    ];

    /// Display label, identical to the stored value.
    pub fn label(&self) -> &str {
        match self {
            Category::Essays => "随笔",
            Category::Engineering => "工程",
            Category::Research => "科研",
            Category::Life => "生活",
            Category::Other(raw) if raw.trim().is_empty() => OTHER_LABEL,
            Category::Other(raw) => raw.as_str(),
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Category::Essays => "essays",
            Category::Engineering => "engineering",
            Category::Research => "research",
            Category::Life => "life",
            Category::Other(_) => "other",
        }
    }

    fn known(s: &str) -> Option<Category> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s || c.slug().eq_ignore_ascii_case(s))
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other(String::new())
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        Category::known(&raw).unwrap_or(Category::Other(raw))
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        match c {
            Category::Other(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Only the fixed categories parse; a filter naming anything else matches nothing.
impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::known(s).ok_or_else(|| format!("Unknown category: {}", s.trim()))
    }
}
