//! Error types for artist and event search.

use thiserror::Error;

/// Errors that can occur during search operations.
///
/// Lookup misses are not errors: backends report them as `Ok(None)` or an
/// empty collection. Everything here is a failure the caller should surface.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network communication failed before a response arrived.
    #[error("Network error: {reason}")]
    Network {
        /// The reason for the network error
        reason: String,
    },

    /// The backend answered with a non-success status.
    #[error("Backend error ({status}): {reason}")]
    Backend {
        /// HTTP status code returned by the backend
        status: u16,
        /// Response body or status text
        reason: String,
    },

    /// The backend rejected the credentials for a user-scoped endpoint.
    #[error("Unauthorized: {reason}")]
    Unauthorized {
        /// The reason given by the backend
        reason: String,
    },

    /// A response body could not be decoded.
    #[error("Parse error: {reason}")]
    Parse {
        /// The reason for the parse error
        reason: String,
    },

    /// The backend could not be constructed from the given configuration.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What is wrong with the configuration
        reason: String,
    },
}

impl SearchError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SearchError::Network { .. } => true,
            SearchError::Backend { status, .. } => *status >= 500 || *status == 429,
            SearchError::Unauthorized { .. }
            | SearchError::Parse { .. }
            | SearchError::InvalidConfiguration { .. } => false,
        }
    }

    /// Returns a short message suitable for display next to a retry button.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Network { .. } => {
                "Could not reach the event server. Check your connection.".to_string()
            }
            SearchError::Backend { status, .. } if *status >= 500 => {
                "The event server is having trouble. Try again shortly.".to_string()
            }
            SearchError::Backend { .. } => "The search request was rejected.".to_string(),
            SearchError::Unauthorized { .. } => "Please sign in again.".to_string(),
            SearchError::Parse { .. } => "Received an unexpected response.".to_string(),
            SearchError::InvalidConfiguration { reason } => {
                format!("Search is misconfigured: {reason}")
            }
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            SearchError::Parse {
                reason: error.to_string(),
            }
        } else {
            SearchError::Network {
                reason: error.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let network = SearchError::Network {
            reason: "connection reset".to_string(),
        };
        let server = SearchError::Backend {
            status: 503,
            reason: "unavailable".to_string(),
        };
        let rejected = SearchError::Backend {
            status: 422,
            reason: "query too long".to_string(),
        };
        let auth = SearchError::Unauthorized {
            reason: "expired".to_string(),
        };

        assert!(network.is_retryable());
        assert!(server.is_retryable());
        assert!(!rejected.is_retryable());
        assert!(!auth.is_retryable());
    }

    #[test]
    fn test_display_includes_status() {
        let error = SearchError::Backend {
            status: 502,
            reason: "bad gateway".to_string(),
        };
        assert_eq!(error.to_string(), "Backend error (502): bad gateway");
    }
}
