//! Error types for the archive client.

/// Errors that can occur when fetching or extracting archive pages.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced a response (network error, TLS, timeout).
    #[error("request to {url} failed: {message}")]
    RequestFailed { url: String, message: String },
    /// The server answered with a non-success status. `body` is a snippet.
    #[error("request to {url} failed with status {status}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },
    /// A URL could not be built from the base URL and a discovered link.
    #[error("invalid url {0}")]
    InvalidUrl(String),
    /// A column layout references a selector that does not parse.
    #[error("invalid layout: {0}")]
    Layout(String),
}
