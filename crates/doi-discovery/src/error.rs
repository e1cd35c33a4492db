//! Error types for the discovery query core.
//!
//! Uses `thiserror` for structured error handling with automatic `From`
//! implementations. Store/network failures are surfaced to the caller,
//! which owns retry and circuit-breaking policy.

/// Errors from the search-engine and event-store HTTP clients.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Invalid query document (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from the store
        message: String,
    },

    /// Index or endpoint not found (404 response)
    #[error("Not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Response body did not match the expected schema
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

/// Result alias for store client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors from the cursor connection layer.
///
/// Backward pagination is a deliberate scope restriction: silently
/// returning wrong pagination data would corrupt client-side
/// infinite-scroll state, so the unsupported direction fails loudly.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PaginationError {
    /// Backward pagination (`last`/`before`/`hasPreviousPage`) is not
    /// implemented; the connection is forward-only.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::bad_request("parsing_exception");
        assert_eq!(err.to_string(), "Bad request: parsing_exception");

        let err = ClientError::server(503, "unavailable");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_pagination_error_names_direction() {
        let err = PaginationError::NotImplemented("before");
        assert_eq!(err.to_string(), "before is not implemented");
    }
}
