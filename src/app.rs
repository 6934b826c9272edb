//! Application controller.
//!
//! The UI binding owns an [`App`], turns DOM events into [`UiEvent`]s and
//! applies the [`ViewUpdate`] each dispatch returns. Nothing here touches the
//! DOM directly.

use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::content::{ContentStore, LoadOutcome};
use crate::models::category::Category;
use crate::models::comment::CommentForm;
use crate::models::contact::ContactForm;
use crate::models::post::Post;
use crate::render;
use crate::router::{self, Page, Route};
use crate::store::THEME_KEY;

pub const TOAST_DURATION_MS: u64 = 3000;

pub const DETAIL_PAGE_ID: &str = "detail-page";
pub const DETAIL_CONTAINER_ID: &str = "blogDetail";
pub const COMMENTS_CONTAINER_ID: &str = "commentsList";

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Page loaded with the given location hash.
    Start { hash: String },
    NavClicked(Page),
    /// The location hash changed (back/forward, typed URL, or our own update).
    HashChanged(String),
    PostClicked(i64),
    Back,
    SearchInput(String),
    CategoryChanged(String),
    SubmitComment {
        name: String,
        text: String,
    },
    SubmitContact {
        name: String,
        email: String,
        subject: String,
        message: String,
    },
    ToggleTheme,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// Transient notification, dismissed by the UI after `dismiss_after_ms`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub dismiss_after_ms: u64,
}

impl Toast {
    fn success(message: &str) -> Self {
        Toast {
            message: message.to_string(),
            kind: ToastKind::Success,
            dismiss_after_ms: TOAST_DURATION_MS,
        }
    }

    fn error(message: &str) -> Self {
        Toast {
            message: message.to_string(),
            kind: ToastKind::Error,
            dismiss_after_ms: TOAST_DURATION_MS,
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FormId {
    Comment,
    Contact,
}

/// Clear every active page/nav marker, then activate these.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PageChange {
    pub element: Option<String>,
    pub nav: Option<Page>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ContainerUpdate {
    pub target: String,
    pub html: String,
}

/// Everything the UI must change after one event.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct ViewUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageChange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<ContainerUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<usize>,
    /// New location hash; only set when it differs from the current one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_form: Option<FormId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl ViewUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ViewUpdate::default()
    }

    fn replace(&mut self, target: &str, html: String) {
        self.containers.push(ContainerUpdate {
            target: target.to_string(),
            html,
        });
    }

    /// Html written to `target` by this update, if any.
    pub fn container(&self, target: &str) -> Option<&str> {
        self.containers
            .iter()
            .rev()
            .find(|c| c.target == target)
            .map(|c| c.html.as_str())
    }
}

/// Search box and category select of the home list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub query: String,
    /// Raw select value; empty means "all categories".
    pub category: Option<String>,
}

impl Filter {
    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || self.category.is_some()
    }
}

pub struct App {
    content: ContentStore,
    route: Route,
    hash: String,
    filter: Filter,
    theme: Theme,
    load_error: Option<String>,
    started: bool,
}

impl App {
    pub fn new(content: ContentStore) -> Self {
        App {
            content,
            route: Route::home(),
            hash: String::new(),
            filter: Filter::default(),
            theme: Theme::Light,
            load_error: None,
            started: false,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn dispatch(&mut self, event: UiEvent) -> ViewUpdate {
        debug!("dispatch {:?}", event);
        let mut update = ViewUpdate::default();

        match event {
            UiEvent::Start { hash } => self.start(&hash, &mut update),
            UiEvent::NavClicked(page) => self.navigate(Route::Page(page), &mut update),
            UiEvent::HashChanged(hash) => {
                let route = router::decode(&hash);
                self.hash = hash;
                // Our own hash writes come back here; same route means nothing to do
                if self.started && route == self.route {
                    return update;
                }
                self.navigate(route, &mut update);
            }
            UiEvent::PostClicked(id) => self.navigate(Route::Detail(id), &mut update),
            UiEvent::Back => self.navigate(Route::home(), &mut update),
            UiEvent::SearchInput(query) => {
                self.filter.query = query;
                self.render_home_list(&mut update);
            }
            UiEvent::CategoryChanged(value) => {
                let value = value.trim();
                self.filter.category = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
                self.render_home_list(&mut update);
            }
            UiEvent::SubmitComment { name, text } => {
                self.submit_comment(CommentForm::new(&name, &text), &mut update)
            }
            UiEvent::SubmitContact {
                name,
                email,
                subject,
                message,
            } => self.submit_contact(
                ContactForm::new(&name, &email, &subject, &message),
                &mut update,
            ),
            UiEvent::ToggleTheme => self.toggle_theme(&mut update),
        }

        update
    }

    // ── Startup ─────────────────────────────────────────────────────

    fn start(&mut self, hash: &str, update: &mut ViewUpdate) {
        match self.content.load_initial_posts() {
            Ok(LoadOutcome::Loaded(n)) => {
                info!("Posts ready ({} loaded)", n);
                self.load_error = None;
            }
            Ok(LoadOutcome::AlreadyLoaded(n)) => {
                debug!("Posts ready ({} cached)", n);
                self.load_error = None;
            }
            Err(e) => {
                error!("Initial post load failed: {}", e);
                self.load_error = Some(e.0);
                update.toast = Some(Toast::error(render::LOAD_FAILED_MESSAGE));
            }
        }

        self.theme = if self.content.storage().get_bool(THEME_KEY) {
            Theme::Dark
        } else {
            Theme::Light
        };
        update.theme = Some(self.theme);

        self.hash = hash.to_string();
        self.started = true;
        self.navigate(router::decode(hash), update);
    }

    // ── Navigation ──────────────────────────────────────────────────

    fn navigate(&mut self, route: Route, update: &mut ViewUpdate) {
        match &route {
            Route::Page(page) => {
                update.page = Some(PageChange {
                    element: Some(page.element_id()),
                    nav: Some(*page),
                });
                self.load_page(*page, update);
            }
            Route::Detail(id) => {
                let post = match self.content.get_post(*id) {
                    Some(p) => p,
                    None => {
                        warn!("No post with id {}", id);
                        return;
                    }
                };
                update.page = Some(PageChange {
                    element: Some(DETAIL_PAGE_ID.to_string()),
                    nav: None,
                });
                self.render_detail(&post, update);
            }
            Route::Unknown(raw) => {
                debug!("Unknown page '{}'", raw);
                update.page = Some(PageChange {
                    element: None,
                    nav: None,
                });
            }
        }

        // "", "#" and "#/" all mean home, so compare routes rather than strings
        if router::decode(&self.hash) != route {
            let hash = router::to_hash(&route);
            update.hash = Some(hash.clone());
            self.hash = hash;
        }
        self.route = route;
    }

    fn load_page(&self, page: Page, update: &mut ViewUpdate) {
        match page {
            Page::Home => self.render_home_list(update),
            Page::About => {
                let post = self.content.page_post(page.id());
                update.replace(&page.element_id(), render::render_page(post.as_ref()));
            }
            Page::Essays | Page::Engineering | Page::Research => {
                let (category, list_id) = match (page.category(), page.list_id()) {
                    (Some(c), Some(l)) => (c, l),
                    _ => return,
                };
                let html = match &self.load_error {
                    Some(_) => render::render_post_list(&[], render::LOAD_FAILED_MESSAGE),
                    None => render::render_post_list(
                        &self.content.category_posts(category),
                        render::EMPTY_CATEGORY_MESSAGE,
                    ),
                };
                update.replace(list_id, html);
            }
        }
    }

    fn filtered_posts(&self) -> Vec<Post> {
        let category = match self.filter.category.as_deref() {
            None => None,
            Some(raw) => match raw.parse::<Category>() {
                Ok(c) => Some(c),
                // An unknown category matches nothing
                Err(_) => return Vec::new(),
            },
        };
        self.content.search(&self.filter.query, category)
    }

    fn render_home_list(&self, update: &mut ViewUpdate) {
        let list_id = Page::Home.list_id().unwrap_or("blogList");
        let html = if self.load_error.is_some() {
            render::render_post_list(&[], render::LOAD_FAILED_MESSAGE)
        } else {
            let empty = if self.filter.is_active() {
                render::NO_MATCHES_MESSAGE
            } else {
                render::EMPTY_CATEGORY_MESSAGE
            };
            render::render_post_list(&self.filtered_posts(), empty)
        };
        update.replace(list_id, html);
    }

    fn render_detail(&self, post: &Post, update: &mut ViewUpdate) {
        update.replace(
            DETAIL_CONTAINER_ID,
            render::render_detail(post, &self.content.display().default_author),
        );
        self.render_comments(post.id, update);
        update.reset_form = Some(FormId::Comment);
    }

    fn render_comments(&self, post_id: i64, update: &mut ViewUpdate) {
        let comments = self.content.list_comments(post_id);
        update.comment_count = Some(comments.len());
        update.replace(COMMENTS_CONTAINER_ID, render::render_comments(&comments));
    }

    // ── Forms ───────────────────────────────────────────────────────

    fn submit_comment(&self, form: CommentForm, update: &mut ViewUpdate) {
        if let Err(msg) = form.validate() {
            update.toast = Some(Toast::error(&msg));
            return;
        }

        let post_id = match self.route {
            Route::Detail(id) if self.content.get_post(id).is_some() => id,
            _ => {
                warn!("Comment submitted without an open post");
                update.toast = Some(Toast::error("Open a post before commenting"));
                return;
            }
        };

        match self.content.add_comment(post_id, &form) {
            Ok(_) => {
                update.reset_form = Some(FormId::Comment);
                self.render_comments(post_id, update);
                update.toast = Some(Toast::success("Comment posted!"));
            }
            Err(e) => {
                error!("Comment submission failed: {}", e);
                update.toast = Some(Toast::error("Comment could not be saved, please try again"));
            }
        }
    }

    fn submit_contact(&self, form: ContactForm, update: &mut ViewUpdate) {
        if let Err(msg) = form.validate() {
            update.toast = Some(Toast::error(&msg));
            return;
        }

        match self.content.add_contact(&form) {
            Ok(_) => {
                update.reset_form = Some(FormId::Contact);
                update.toast = Some(Toast::success("Message sent! Thanks for getting in touch."));
            }
            Err(e) => {
                error!("Contact submission failed: {}", e);
                update.toast = Some(Toast::error("Submission failed, please try again"));
            }
        }
    }

    // ── Theme ───────────────────────────────────────────────────────

    fn toggle_theme(&mut self, update: &mut ViewUpdate) {
        self.theme = self.theme.toggled();
        let dark = Value::Bool(self.theme == Theme::Dark);
        if let Err(e) = self.content.storage().set(THEME_KEY, &dark) {
            warn!("Could not persist theme preference: {}", e);
        }
        update.theme = Some(self.theme);
    }
}
