//! Error types and handling for `EcoVoyage`

use thiserror::Error;

/// Main error type for the `EcoVoyage` library
#[derive(Error, Debug)]
pub enum EcoVoyageError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport or HTTP-status failures talking to the search service
    #[error("Search error: {message}")]
    Search { message: String },

    /// Search service answered with something we could not decode
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A search is already in flight for this conversation
    #[error("A search is already in progress")]
    Busy,

    /// Unknown conversation or resource
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl EcoVoyageError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new search transport error
    pub fn search<S: Into<String>>(message: S) -> Self {
        Self::Search {
            message: message.into(),
        }
    }

    /// Create a new response parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            EcoVoyageError::Config { .. } => {
                "Configuration error. Please check your config file and search credentials."
                    .to_string()
            }
            EcoVoyageError::Search { message } => {
                format!("Unable to reach the destination search service ({message})")
            }
            EcoVoyageError::Parse { .. } => {
                "The destination search service returned an unexpected response".to_string()
            }
            EcoVoyageError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            EcoVoyageError::Busy => {
                "Still searching, please wait for the current answer.".to_string()
            }
            EcoVoyageError::NotFound { message } => format!("Not found: {message}"),
            EcoVoyageError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            EcoVoyageError::General { message } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for EcoVoyageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EcoVoyageError::parse(err.to_string())
        } else {
            EcoVoyageError::search(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EcoVoyageError {
    fn from(err: serde_json::Error) -> Self {
        EcoVoyageError::parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = EcoVoyageError::config("missing app id");
        assert!(matches!(config_err, EcoVoyageError::Config { .. }));

        let search_err = EcoVoyageError::search("connection refused");
        assert!(matches!(search_err, EcoVoyageError::Search { .. }));

        let validation_err = EcoVoyageError::validation("empty query");
        assert!(matches!(validation_err, EcoVoyageError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = EcoVoyageError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let search_err = EcoVoyageError::search("connection refused");
        assert!(search_err.user_message().contains("connection refused"));

        let validation_err = EcoVoyageError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));

        assert!(EcoVoyageError::Busy.user_message().contains("Still searching"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EcoVoyageError = io_err.into();
        assert!(matches!(err, EcoVoyageError::Io { .. }));
    }

    #[test]
    fn test_json_error_is_parse_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: EcoVoyageError = json_err.into();
        assert!(matches!(err, EcoVoyageError::Parse { .. }));
    }
}
