use std::fmt::Write;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::models::comment::Comment;
use crate::models::post::Post;

pub const LOADING_MESSAGE: &str = "Loading content...";
pub const EMPTY_CATEGORY_MESSAGE: &str = "Nothing here yet";
pub const NO_MATCHES_MESSAGE: &str = "No matching posts found";
pub const NO_COMMENTS_MESSAGE: &str = "No comments yet. Be the first to comment!";
pub const LOAD_FAILED_MESSAGE: &str = "Posts could not be loaded. Please try again later.";
pub const PAGE_UNAVAILABLE_MESSAGE: &str = "This page is not available.";

/// Escape the five HTML-significant characters.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

// ── Content ─────────────────────────────────────────────────────────

fn image_pattern() -> Option<&'static Regex> {
    static IMAGE_RE: OnceLock<Option<Regex>> = OnceLock::new();
    IMAGE_RE
        .get_or_init(|| Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)\)").ok())
        .as_ref()
}

/// Only http(s) and scheme-less (relative) sources become images.
fn is_allowed_src(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || !lower.contains(':')
}

/// Runs on already-escaped text, so the only `<` left afterwards are ours.
fn expand_images(escaped: &str) -> String {
    let re = match image_pattern() {
        Some(re) => re,
        None => return escaped.to_string(),
    };
    re.replace_all(escaped, |caps: &regex::Captures| {
        let alt = &caps[1];
        let src = &caps[2];
        if is_allowed_src(src) {
            format!("<img src=\"{}\" alt=\"{}\" loading=\"lazy\">", src, alt)
        } else {
            caps[0].to_string()
        }
    })
    .into_owned()
}

fn is_sole_image(line: &str) -> bool {
    line.starts_with("<img ") && line.find('>') == Some(line.len() - 1)
}

/// Markdown-lite: the body is escaped, `![alt](url)` becomes an image and
/// every remaining non-empty line becomes a paragraph. Nothing else is
/// interpreted.
pub fn render_content(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r,
        _ => return format!("<p class=\"content-loading\">{}</p>", LOADING_MESSAGE),
    };

    let expanded = expand_images(&html_escape(raw));
    let mut html = String::new();
    for line in expanded.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_sole_image(line) {
            html.push_str(&format!("<div class=\"content-image\">{}</div>\n", line));
        } else {
            html.push_str(&format!("<p>{}</p>\n", line));
        }
    }
    html
}

// ── Templates ───────────────────────────────────────────────────────

fn empty_state(message: &str) -> String {
    format!("<p class=\"empty-state\">{}</p>", html_escape(message))
}

pub fn render_card(post: &Post) -> String {
    format!(
        "<div class=\"blog-card\" data-id=\"{id}\">\
         <div class=\"blog-card-image\">📰</div>\
         <div class=\"blog-card-content\">\
         <h3 class=\"blog-card-title\">{title}</h3>\
         <span class=\"blog-card-category\">{category}</span>\
         <p class=\"blog-card-excerpt\">{excerpt}</p>\
         <div class=\"blog-card-meta\"><span>📅 {date}</span><span>⏱️ {read_time}</span></div>\
         </div>\
         </div>",
        id = post.id,
        title = html_escape(&post.title),
        category = html_escape(post.category.label()),
        excerpt = html_escape(&post.excerpt),
        date = html_escape(&post.date),
        read_time = html_escape(post.read_time()),
    )
}

/// Cards for `posts`, or `empty_message` when there are none.
pub fn render_post_list(posts: &[Post], empty_message: &str) -> String {
    if posts.is_empty() {
        return empty_state(empty_message);
    }
    posts.iter().map(render_card).collect::<Vec<_>>().join("\n")
}

pub fn render_detail(post: &Post, default_author: &str) -> String {
    let mut html = format!("<h1>{}</h1>", html_escape(&post.title));

    html.push_str(&format!(
        "<div class=\"blog-detail-meta\">\
         <span>✍️ Author: {}</span>\
         <span>📅 {}</span>\
         <span>⏱️ {}</span>\
         <span>🏷️ {}</span>\
         </div>",
        html_escape(post.author_or(default_author)),
        html_escape(&post.date),
        html_escape(post.read_time()),
        html_escape(post.category.label()),
    ));

    if !post.tags.is_empty() {
        let tags: Vec<String> = post
            .tags
            .iter()
            .map(|t| format!("<span class=\"tag\">{}</span>", html_escape(t)))
            .collect();
        html.push_str(&format!("<div class=\"blog-detail-tags\">{}</div>", tags.join(" ")));
    }

    html.push_str(&format!(
        "<div class=\"blog-detail-content\">{}</div>",
        render_content(post.content.as_deref())
    ));
    html
}

pub fn render_comments(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return empty_state(NO_COMMENTS_MESSAGE);
    }
    let mut html = String::new();
    for c in comments {
        html.push_str(&format!(
            "<div class=\"comment-item\" data-id=\"{}\">\
             <div class=\"comment-author\">{}</div>\
             <div class=\"comment-time\">{}</div>\
             <div class=\"comment-text\">{}</div>\
             </div>",
            c.id,
            html_escape(&c.name),
            html_escape(&c.date),
            html_escape(&c.text),
        ));
    }
    html
}

/// Static page (e.g. about) backed by a page-flagged post.
pub fn render_page(post: Option<&Post>) -> String {
    match post {
        Some(p) => format!(
            "<div class=\"page-content\"><h1>{}</h1>{}</div>",
            html_escape(&p.title),
            render_content(p.content.as_deref())
        ),
        None => empty_state(PAGE_UNAVAILABLE_MESSAGE),
    }
}

// ── Dates ───────────────────────────────────────────────────────────

/// Format `at` in the named timezone. Unknown zones fall back to UTC and an
/// invalid format string falls back to ISO date/time.
pub fn format_timestamp(at: DateTime<Utc>, fmt: &str, tz_name: &str) -> String {
    let mut out = String::new();
    let written = match tz_name.parse::<chrono_tz::Tz>() {
        Ok(tz) => write!(out, "{}", at.with_timezone(&tz).format(fmt)),
        Err(_) => write!(out, "{}", at.format(fmt)),
    };
    if written.is_err() {
        return at.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    out
}
