use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::config::{Config, DisplayConfig};
use crate::fetch::{self, FetchError, Fetcher};
use crate::models::category::Category;
use crate::models::comment::{Comment, CommentForm};
use crate::models::contact::{ContactForm, ContactSubmission};
use crate::models::post::Post;
use crate::render::format_timestamp;
use crate::store::{self, Storage, CONTACTS_KEY, POSTS_KEY};

/// Posts shipped with the binary, used when no metadata source is configured.
pub const DEFAULT_POSTS: &str = include_str!("../assets/default_posts.json");

/// Where the initial post collection comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PostSource {
    Embedded,
    Metadata {
        location: String,
        content_base: Option<String>,
    },
}

impl PostSource {
    pub fn from_config(config: &Config) -> PostSource {
        match config.content.metadata.as_deref() {
            Some(location) if !location.trim().is_empty() => PostSource::Metadata {
                location: location.to_string(),
                content_base: fetch::content_base(
                    Some(location),
                    config.content.content_base.as_deref(),
                ),
            },
            _ => PostSource::Embedded,
        }
    }

    fn content_base(&self) -> Option<&str> {
        match self {
            PostSource::Embedded => None,
            PostSource::Metadata { content_base, .. } => content_base.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Posts were written to storage by this call. Happens once per store.
    Loaded(usize),
    AlreadyLoaded(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadError(pub String);

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<FetchError> for LoadError {
    fn from(e: FetchError) -> Self {
        LoadError(e.0)
    }
}

/// Owner of posts, comments and contact submissions.
pub struct ContentStore {
    storage: Arc<dyn Storage>,
    fetcher: Arc<dyn Fetcher>,
    source: PostSource,
    display: DisplayConfig,
    clock: fn() -> DateTime<Utc>,
}

impl ContentStore {
    pub fn new(
        storage: Arc<dyn Storage>,
        fetcher: Arc<dyn Fetcher>,
        source: PostSource,
        display: DisplayConfig,
    ) -> Self {
        ContentStore {
            storage,
            fetcher,
            source,
            display,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    // ── Posts ───────────────────────────────────────────────────────

    /// Populate the post collection if it isn't stored yet.
    /// `Ok` is the "posts ready" signal; a failed fetch is an `Err`, never a wait.
    pub fn load_initial_posts(&self) -> Result<LoadOutcome, LoadError> {
        if let Some(posts) = store::load::<Vec<Post>>(self.storage(), POSTS_KEY) {
            debug!("Post collection already present ({} entries)", posts.len());
            return Ok(LoadOutcome::AlreadyLoaded(posts.len()));
        }

        let raw = match &self.source {
            PostSource::Embedded => DEFAULT_POSTS.to_string(),
            PostSource::Metadata { location, .. } => {
                info!("Fetching post metadata from {}", location);
                self.fetcher.fetch_text(location)?
            }
        };

        let parsed: Vec<Post> = serde_json::from_str(&raw)
            .map_err(|e| LoadError(format!("Post metadata is not valid: {}", e)))?;
        let posts = dedupe_ids(parsed);

        store::save(self.storage(), POSTS_KEY, &posts)
            .map_err(|e| LoadError(format!("Could not store posts: {}", e)))?;

        info!("Loaded {} posts", posts.len());
        Ok(LoadOutcome::Loaded(posts.len()))
    }

    /// Every stored entry, pages included, in source order.
    pub fn all_posts(&self) -> Vec<Post> {
        store::load(self.storage(), POSTS_KEY).unwrap_or_default()
    }

    /// Non-page posts in source order.
    pub fn list_posts(&self) -> Vec<Post> {
        self.all_posts().into_iter().filter(|p| !p.is_page()).collect()
    }

    pub fn category_posts(&self, category: Category) -> Vec<Post> {
        self.list_posts()
            .into_iter()
            .filter(|p| p.category == category)
            .collect()
    }

    /// Case-insensitive match of the untrimmed query on title/excerpt/content,
    /// AND an exact category.
    pub fn search(&self, query: &str, category: Option<Category>) -> Vec<Post> {
        let needle = query.to_lowercase();
        self.list_posts()
            .into_iter()
            .filter(|p| p.matches_query(&needle))
            .filter(|p| category.as_ref().map_or(true, |c| &p.category == c))
            .collect()
    }

    /// Look up a post, hydrating its content from `contentFile` if needed.
    /// Hydration failure returns the post with content unset.
    pub fn get_post(&self, id: i64) -> Option<Post> {
        let post = self.all_posts().into_iter().find(|p| p.id == id)?;
        Some(self.hydrate(post))
    }

    /// The page-flagged entry with the given slug (e.g. "about").
    pub fn page_post(&self, slug: &str) -> Option<Post> {
        let post = self
            .all_posts()
            .into_iter()
            .find(|p| p.is_page() && p.slug.as_deref() == Some(slug))?;
        Some(self.hydrate(post))
    }

    fn hydrate(&self, mut post: Post) -> Post {
        if !post.needs_hydration() {
            return post;
        }
        let reference = match post.content_file.as_deref() {
            Some(r) => r,
            None => return post,
        };

        let fetched = fetch::resolve_reference(self.source.content_base(), reference)
            .and_then(|location| self.fetcher.fetch_text(&location));

        match fetched {
            Ok(text) => {
                post.content = Some(text);
                self.persist_hydrated(&post);
            }
            Err(e) => warn!("Content for post {} unavailable: {}", post.id, e),
        }
        post
    }

    fn persist_hydrated(&self, post: &Post) {
        let mut posts = self.all_posts();
        if let Some(slot) = posts.iter_mut().find(|p| p.id == post.id) {
            slot.content = post.content.clone();
            if let Err(e) = store::save(self.storage(), POSTS_KEY, &posts) {
                warn!("Could not cache content for post {}: {}", post.id, e);
            }
        }
    }

    // ── Comments ────────────────────────────────────────────────────

    pub fn list_comments(&self, post_id: i64) -> Vec<Comment> {
        store::load(self.storage(), &store::comments_key(post_id)).unwrap_or_default()
    }

    pub fn add_comment(&self, post_id: i64, form: &CommentForm) -> Result<Comment, String> {
        form.validate()?;

        let key = store::comments_key(post_id);
        let mut comments = self.list_comments(post_id);
        let comment = Comment {
            id: self.storage.next_id(&key)?,
            post_id,
            name: form.name.trim().to_string(),
            text: form.text.trim().to_string(),
            date: self.stamp(&self.display.date_format),
        };
        comments.push(comment.clone());
        store::save(self.storage(), &key, &comments)?;

        debug!("Comment {} added to post {}", comment.id, post_id);
        Ok(comment)
    }

    // ── Contacts ────────────────────────────────────────────────────

    pub fn list_contacts(&self) -> Vec<ContactSubmission> {
        store::load(self.storage(), CONTACTS_KEY).unwrap_or_default()
    }

    pub fn add_contact(&self, form: &ContactForm) -> Result<ContactSubmission, String> {
        form.validate()?;

        let mut contacts = self.list_contacts();
        let submission = ContactSubmission {
            id: self.storage.next_id(CONTACTS_KEY)?,
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            subject: form.subject.trim().to_string(),
            message: form.message.trim().to_string(),
            date: self.stamp(&self.display.date_format),
            time: self.stamp(&self.display.time_format),
        };
        contacts.push(submission.clone());
        store::save(self.storage(), CONTACTS_KEY, &contacts)?;

        debug!("Contact submission {} saved", submission.id);
        Ok(submission)
    }

    fn stamp(&self, fmt: &str) -> String {
        format_timestamp((self.clock)(), fmt, &self.display.timezone)
    }
}

/// Keep the first entry for each id.
fn dedupe_ids(posts: Vec<Post>) -> Vec<Post> {
    let mut seen = HashSet::new();
    posts
        .into_iter()
        .filter(|p| {
            let fresh = seen.insert(p.id);
            if !fresh {
                warn!("Dropping duplicate post id {} ({})", p.id, p.title);
            }
            fresh
        })
        .collect()
}
