//! Error types and handling for `CabFare`

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stable error codes, shared by the CLI and the HTTP API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    LocationNotFound,
    RouteUnavailable,
    ModelLoad,
    Prediction,
    NoRoute,
    Validation,
    Config,
    Io,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::LocationNotFound => "location_not_found",
            ErrorCode::RouteUnavailable => "route_unavailable",
            ErrorCode::ModelLoad => "model_load_error",
            ErrorCode::Prediction => "prediction_error",
            ErrorCode::NoRoute => "no_route",
            ErrorCode::Validation => "invalid_input",
            ErrorCode::Config => "config_error",
            ErrorCode::Io => "io_error",
        }
    }
}

/// Main error type for the `CabFare` application
#[derive(Error, Debug)]
pub enum FareError {
    /// The geocoder had no match for a place name, or could not be reached
    #[error("Location not found: {query}")]
    LocationNotFound { query: String },

    /// The routing service returned no usable route
    #[error("Route unavailable: {message}")]
    RouteUnavailable { message: String },

    /// The fare model artifact is missing or corrupt
    #[error("Failed to load model from {}: {message}", path.display())]
    ModelLoad { path: PathBuf, message: String },

    /// The model rejected the feature vector or failed to score it
    #[error("Prediction error: {message}")]
    Prediction { message: String },

    /// A fare was requested before any route was found in this session
    #[error("No route available in this session")]
    NoRoute,

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl FareError {
    pub fn location_not_found<S: Into<String>>(query: S) -> Self {
        Self::LocationNotFound {
            query: query.into(),
        }
    }

    pub fn route_unavailable<S: Into<String>>(message: S) -> Self {
        Self::RouteUnavailable {
            message: message.into(),
        }
    }

    pub fn model_load<S: Into<String>>(path: &Path, message: S) -> Self {
        Self::ModelLoad {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn prediction<S: Into<String>>(message: S) -> Self {
        Self::Prediction {
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            FareError::LocationNotFound { .. } => ErrorCode::LocationNotFound,
            FareError::RouteUnavailable { .. } => ErrorCode::RouteUnavailable,
            FareError::ModelLoad { .. } => ErrorCode::ModelLoad,
            FareError::Prediction { .. } => ErrorCode::Prediction,
            FareError::NoRoute => ErrorCode::NoRoute,
            FareError::Validation { .. } => ErrorCode::Validation,
            FareError::Config { .. } => ErrorCode::Config,
            FareError::Io { .. } => ErrorCode::Io,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            FareError::LocationNotFound { query } => {
                format!("Invalid location '{query}'. Please try again.")
            }
            FareError::RouteUnavailable { .. } => {
                "Could not retrieve route details. Try again later.".to_string()
            }
            FareError::ModelLoad { .. } => {
                "Fare prediction is unavailable because the model couldn't be loaded.".to_string()
            }
            FareError::Prediction { message } => format!("Prediction error: {message}"),
            FareError::NoRoute => "Find a route before predicting a fare.".to_string(),
            FareError::Validation { message } => format!("Invalid input: {message}"),
            FareError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            FareError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = FareError::location_not_found("Atlantis");
        assert!(matches!(err, FareError::LocationNotFound { .. }));
        assert_eq!(err.code(), ErrorCode::LocationNotFound);

        let err = FareError::route_unavailable("no routes");
        assert!(matches!(err, FareError::RouteUnavailable { .. }));

        let err = FareError::model_load(Path::new("saved_models/model.json"), "missing");
        assert!(err.to_string().contains("saved_models/model.json"));
    }

    #[test]
    fn test_user_messages() {
        let err = FareError::location_not_found("@@@");
        assert!(err.user_message().contains("@@@"));

        let err = FareError::route_unavailable("timeout");
        assert!(err.user_message().contains("Could not retrieve route"));

        let err = FareError::model_load(Path::new("m.json"), "corrupt");
        assert!(err.user_message().contains("couldn't be loaded"));

        assert!(FareError::NoRoute.user_message().contains("Find a route"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FareError = io_err.into();
        assert!(matches!(err, FareError::Io { .. }));
        assert_eq!(err.code().as_str(), "io_error");
    }
}
