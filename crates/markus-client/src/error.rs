//! The client error type.

use reqwest::{header::InvalidHeaderValue, Method};
use thiserror::Error;
use url::Url;

pub type MarkusClientResult<T> = Result<T, MarkusClientError>;

/// The main error type for markus-client.
///
/// Only local and transport failures are errors. A request that reaches the server
/// and fails with an HTTP error status is returned as an `ApiResponse` carrying the
/// server's JSON error body.
#[derive(Debug, Error)]
pub enum MarkusClientError {
    #[error("Failed to parse as URL: {0}")]
    UrlParse(String, #[source] url::ParseError),
    #[error("The API key contains characters that are not allowed in an HTTP header")]
    InvalidApiKey(#[source] InvalidHeaderValue),
    #[error("Failed to build HTTP client")]
    HttpClientBuilder(#[source] reqwest::Error),

    #[error("Connection error trying to {0} {1}")]
    ConnectionError(Method, Url, #[source] reqwest::Error),
    #[error("Failed to read response from {0}")]
    HttpReadResponse(Url, #[source] reqwest::Error),
    #[error("Failed to deserialize response from {0} as JSON")]
    HttpJsonResponse(Url, #[source] serde_json::Error),
    #[error("Failed to deserialize JSON response")]
    JsonDeserialize(#[source] serde_json::Error),
    #[error("Expected a {expected} response body, got {actual}")]
    UnexpectedBody {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Failed to serialize request parameters")]
    SerializeParams(#[source] serde_json::Error),
    #[error("Could not determine the MIME type of {0}, the type needs to be given explicitly")]
    UnknownMimeType(String),
}
