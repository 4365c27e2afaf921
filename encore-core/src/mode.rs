//! Runtime mode configuration for Encore.

use serde::{Deserialize, Serialize};

/// Runtime mode for Encore services.
///
/// Controls whether searches run against the bundled fixture data or the
/// real HTTP API. Both sides expose the same backend trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuntimeMode {
    /// Production mode - talks to the real event API
    Production,
    /// Development mode - serves fixture data with simulated latency
    Development,
}

impl RuntimeMode {
    /// Check if running in development mode.
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if running in production mode.
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Maps the mobile client's mock-API flag onto a mode.
    ///
    /// Only the literal `"false"` disables the mock; anything else,
    /// including an unset flag, keeps development mode.
    pub fn from_mock_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(value) if value.trim().eq_ignore_ascii_case("false") => Self::Production,
            _ => Self::Development,
        }
    }
}

impl Default for RuntimeMode {
    fn default() -> Self {
        Self::Development
    }
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "PRODUCTION"),
            Self::Development => write!(f, "DEVELOPMENT"),
        }
    }
}

impl std::str::FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            _ => Err(format!(
                "Invalid runtime mode: '{s}'. Valid options are: production, development"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("prod".parse::<RuntimeMode>(), Ok(RuntimeMode::Production));
        assert_eq!(
            "Development".parse::<RuntimeMode>(),
            Ok(RuntimeMode::Development)
        );
        assert!("staging".parse::<RuntimeMode>().is_err());
    }

    #[test]
    fn test_mock_flag_only_false_disables_mock() {
        assert_eq!(RuntimeMode::from_mock_flag(None), RuntimeMode::Development);
        assert_eq!(
            RuntimeMode::from_mock_flag(Some("true")),
            RuntimeMode::Development
        );
        assert_eq!(
            RuntimeMode::from_mock_flag(Some("0")),
            RuntimeMode::Development
        );
        assert_eq!(
            RuntimeMode::from_mock_flag(Some("FALSE")),
            RuntimeMode::Production
        );
    }

    #[test]
    fn test_default_is_development() {
        assert!(RuntimeMode::default().is_development());
        assert!(!RuntimeMode::default().is_production());
    }
}
