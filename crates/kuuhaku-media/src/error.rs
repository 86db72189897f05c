//! Media error types.

use thiserror::Error;

/// Errors from downloading or storing media.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The URL could not be parsed or is not http(s).
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The server answered with an error status.
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    /// The request timed out.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The connection failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Any other request failure.
    #[error("Request error: {0}")]
    Request(String),

    /// The body exceeded the size cap.
    #[error("Content too large: more than {0} bytes")]
    TooLarge(usize),

    /// The body was empty.
    #[error("Empty image")]
    Empty,

    /// Inline image content was not valid base64.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Writing to the media directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Whether a retry might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            MediaError::Timeout(_) | MediaError::Connection(_) => true,
            MediaError::Http { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for MediaError {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(|u| u.to_string()).unwrap_or_default();
        if e.is_timeout() {
            MediaError::Timeout(url)
        } else if e.is_connect() {
            MediaError::Connection(e.to_string())
        } else if let Some(status) = e.status() {
            MediaError::Http {
                status: status.as_u16(),
                url,
            }
        } else {
            MediaError::Request(e.to_string())
        }
    }
}
