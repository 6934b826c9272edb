//! Hash-fragment routing.
//!
//! `#/` is home, `#/<page>` a top-level page and `#/blog/<id>` a post.

use std::fmt;

use serde::Serialize;

use crate::models::category::Category;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Home,
    About,
    Essays,
    Engineering,
    Research,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::About,
        Page::Essays,
        Page::Engineering,
        Page::Research,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::About => "about",
            Page::Essays => "essays",
            Page::Engineering => "engineering",
            Page::Research => "research",
        }
    }

    pub fn from_id(id: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|p| p.id() == id)
    }

    /// Category shown by a category page.
    pub fn category(&self) -> Option<Category> {
        match self {
            Page::Essays => Some(Category::Essays),
            Page::Engineering => Some(Category::Engineering),
            Page::Research => Some(Category::Research),
            Page::Home | Page::About => None,
        }
    }

    /// Container element of the page, e.g. `essays-page`.
    pub fn element_id(&self) -> String {
        format!("{}-page", self.id())
    }

    /// Container for the post cards listed on the page, if any.
    pub fn list_id(&self) -> Option<&'static str> {
        match self {
            Page::Home => Some("blogList"),
            Page::Essays => Some("essaysList"),
            Page::Engineering => Some("engineeringList"),
            Page::Research => Some("researchList"),
            Page::About => None,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Page(Page),
    Detail(i64),
    /// An identifier no page answers to. Nothing is shown for it.
    Unknown(String),
}

impl Route {
    pub fn home() -> Route {
        Route::Page(Page::Home)
    }
}

/// Fragment for a route, without the leading `#`.
pub fn encode(route: &Route) -> String {
    match route {
        Route::Page(Page::Home) => String::new(),
        Route::Page(page) => format!("/{}", page.id()),
        Route::Detail(id) => format!("/blog/{}", id),
        Route::Unknown(raw) => format!("/{}", raw),
    }
}

pub fn to_hash(route: &Route) -> String {
    format!("#{}", encode(route))
}

/// Resolve a location hash (`#/about`, `#/blog/3`, `#`, `""`) to a route.
pub fn decode(hash: &str) -> Route {
    // Fixed two-character prefix, "#/"
    let rest: String = hash.chars().skip(2).collect();

    if let Some(id) = rest.strip_prefix("blog/") {
        let id = id.split('/').next().unwrap_or("");
        return match id.parse::<i64>() {
            Ok(id) => Route::Detail(id),
            Err(_) => Route::Unknown(rest.clone()),
        };
    }

    if rest.is_empty() || rest == "/" {
        return Route::home();
    }

    match Page::from_id(&rest) {
        Some(page) => Route::Page(page),
        None => Route::Unknown(rest),
    }
}
