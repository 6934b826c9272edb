use std::path::Path;
use std::time::Duration;

use log::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchError(pub String);

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Retrieves external documents (post metadata, post content).
/// Every call completes with a result; there is no open-ended wait.
pub trait Fetcher: Send + Sync {
    fn fetch_text(&self, location: &str) -> Result<String, FetchError>;
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

// ── HTTP ────────────────────────────────────────────────────────────

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError(format!("HTTP client error: {}", e)))?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_text(&self, location: &str) -> Result<String, FetchError> {
        debug!("GET {}", location);
        let resp = self
            .client
            .get(location)
            .send()
            .map_err(|e| FetchError(format!("Request to {} failed: {}", location, e)))?;

        if !resp.status().is_success() {
            return Err(FetchError(format!("{} returned {}", location, resp.status())));
        }

        resp.text()
            .map_err(|e| FetchError(format!("Reading {} failed: {}", location, e)))
    }
}

// ── Filesystem ──────────────────────────────────────────────────────

pub struct FileFetcher;

impl Fetcher for FileFetcher {
    fn fetch_text(&self, location: &str) -> Result<String, FetchError> {
        debug!("read {}", location);
        std::fs::read_to_string(location)
            .map_err(|e| FetchError(format!("Reading {} failed: {}", location, e)))
    }
}

// ── Dispatch by location ────────────────────────────────────────────

/// Sends http(s) locations to the HTTP client and everything else to the
/// filesystem.
pub struct SourceFetcher {
    http: HttpFetcher,
    files: FileFetcher,
}

impl SourceFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(SourceFetcher {
            http: HttpFetcher::new(timeout)?,
            files: FileFetcher,
        })
    }
}

impl Fetcher for SourceFetcher {
    fn fetch_text(&self, location: &str) -> Result<String, FetchError> {
        if is_remote(location) {
            self.http.fetch_text(location)
        } else {
            self.files.fetch_text(location)
        }
    }
}

// ── Reference resolution ────────────────────────────────────────────

/// Where content references resolve from: an explicit base (URL or
/// directory), else the metadata document's own location.
pub fn content_base(metadata: Option<&str>, explicit: Option<&str>) -> Option<String> {
    if let Some(base) = explicit {
        if is_remote(base) && !base.ends_with('/') {
            return Some(format!("{}/", base));
        }
        return Some(base.to_string());
    }
    let metadata = metadata?;
    if is_remote(metadata) {
        return Some(metadata.to_string());
    }
    Path::new(metadata)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
}

/// Resolve a `contentFile` reference against a base. Absolute URLs pass through.
pub fn resolve_reference(base: Option<&str>, reference: &str) -> Result<String, FetchError> {
    if Url::parse(reference).is_ok() {
        return Ok(reference.to_string());
    }
    match base {
        Some(b) if is_remote(b) => {
            let base_url =
                Url::parse(b).map_err(|e| FetchError(format!("Bad content base {}: {}", b, e)))?;
            base_url
                .join(reference)
                .map(|u| u.to_string())
                .map_err(|e| FetchError(format!("Bad content reference {}: {}", reference, e)))
        }
        Some(b) => Ok(Path::new(b).join(reference).to_string_lossy().into_owned()),
        None => Ok(reference.to_string()),
    }
}
