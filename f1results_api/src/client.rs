//! HTTP client for the results archive pages.

use std::time::Duration;

use url::Url;

use crate::{user_agent::get_user_agent, Error};

/// HTTP client for the results archive.
///
/// Holds one pooled `reqwest::Client`, so a single instance can be shared
/// (behind an `Arc`) by every season task of a scrape run. Each call to
/// [`Client::fetch`] makes exactly one attempt.
pub struct Client {
    /// Archive root, e.g. `https://www.formula1.com/en/results.html`.
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.formula1.com/en/results.html";

    /// Creates a client for the production archive with the transport's
    /// default timeout behaviour.
    pub fn new() -> Result<Self, Error> {
        Self::with_options(Self::DEFAULT_BASE_URL, None)
    }

    /// Creates a client with a custom archive root. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::with_options(base_url, None)
    }

    /// Creates a client with a custom archive root and an optional request timeout.
    pub fn with_options(base_url: &str, timeout: Option<Duration>) -> Result<Self, Error> {
        Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let mut builder = reqwest::Client::builder().user_agent(get_user_agent());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            Error::RequestFailed {
                url: base_url.to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the page listing every race of `year`.
    pub fn season_index_url(&self, year: i32) -> String {
        format!("{}/{}/races.html", self.base_url, year)
    }

    /// Resolves a link found on an index page against the archive root.
    ///
    /// Site-relative links (`/en/results.html/...`) keep only the origin of
    /// the root; absolute links are returned unchanged.
    pub fn resolve(&self, href: &str) -> Result<String, Error> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        let url = base
            .join(href.trim())
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", href, e)))?;
        Ok(url.to_string())
    }

    /// Fetches the raw markup at `url`.
    pub async fn fetch(&self, url: &str) -> Result<String, Error> {
        let resp = self
            .http
            .get(url)
            .header("accept", "text/html,application/xhtml+xml")
            .header("accept-language", "en-US,en;q=0.9")
            .header("upgrade-insecure-requests", "1")
            .header("cache-control", "no-cache")
            .header("pragma", "no-cache")
            .send()
            .await
            .map_err(|e| Error::RequestFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::RequestFailed {
            url: url.to_string(),
            message: format!("failed to read body: {}", e),
        })?;

        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        tracing::debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
