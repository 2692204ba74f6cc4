//! OVapi client error types.

/// Errors from the OVapi HTTP client.
///
/// All variants are non-fatal to callers: the transport layer converts them
/// to empty or last-known-good results at its boundary.
#[derive(Debug, thiserror::Error)]
pub enum OvApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message} (body: {body})")]
    Json {
        message: String,
        /// Leading snippet of the offending body, for diagnostics.
        body: String,
    },

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}
