//! Encore Core - Shared configuration and runtime plumbing
//!
//! Holds the pieces every Encore crate needs: grouped configuration with
//! environment overrides, the runtime mode that selects mock or real
//! backends, and tracing setup for binaries.

pub mod config;
pub mod mode;
pub mod tracing_setup;

pub use config::{ApiConfig, EncoreConfig, LatencyConfig, SearchConfig};
pub use mode::RuntimeMode;

/// Errors raised while preparing an Encore runtime.
#[derive(Debug, thiserror::Error)]
pub enum EncoreError {
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncoreError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            EncoreError::Configuration { reason } => format!("Invalid configuration: {reason}"),
            EncoreError::Io(_) => "File system error occurred".to_string(),
        }
    }
}

/// Convenience type alias for Results with EncoreError.
pub type Result<T> = std::result::Result<T, EncoreError>;
