// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for wmclient
//!
//! Every failure surfaced by the client maps onto one of the five kinds a
//! host application needs to tell apart: connection, protocol, validation,
//! server and not-found. Configuration and local IO errors only arise when
//! loading a [`crate::config::ClientConfig`].

use thiserror::Error;

/// Main error type for wmclient operations
#[derive(Error, Debug)]
pub enum WmError {
    /// Server unreachable, connection refused, DNS failure or timeout
    #[error("Connection error: {0}")]
    Connection(String),

    /// Malformed or incomplete server response
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The caller supplied an unusable request
    #[error("Validation error: {0}")]
    Validation(String),

    /// The server answered a well-formed request with an error
    #[error("Server error: {0}")]
    Server(String),

    /// The server answered with a non-success HTTP status
    #[error("Server error: HTTP {status} from {url}: {message}")]
    Http {
        status: u16,
        url: String,
        message: String,
    },

    /// A device identifier, make or OS is unknown to the server
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(String),
}

/// Coarse classification of a [`WmError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Protocol,
    Validation,
    Server,
    NotFound,
    Config,
}

impl WmError {
    /// Classify this error.
    ///
    /// Local IO and (de)serialization failures only occur while loading
    /// configuration, so they are reported as [`ErrorKind::Config`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            WmError::Connection(_) => ErrorKind::Connection,
            WmError::Protocol(_) => ErrorKind::Protocol,
            WmError::Validation(_) => ErrorKind::Validation,
            WmError::Server(_) | WmError::Http { .. } => ErrorKind::Server,
            WmError::NotFound(_) => ErrorKind::NotFound,
            WmError::Config(_) | WmError::Io(_) | WmError::Json(_) | WmError::Toml(_) => {
                ErrorKind::Config
            }
        }
    }
}

impl From<toml::de::Error> for WmError {
    fn from(err: toml::de::Error) -> Self {
        WmError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for WmError {
    fn from(err: toml::ser::Error) -> Self {
        WmError::Toml(err.to_string())
    }
}

/// Result type alias for wmclient operations
pub type Result<T> = std::result::Result<T, WmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err = WmError::Connection("connection refused".to_string());
        assert_eq!(err.to_string(), "Connection error: connection refused");
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn test_protocol_error_display() {
        let err = WmError::Protocol("missing wm_version".to_string());
        assert!(err.to_string().contains("Protocol error"));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn test_validation_error_display() {
        let err = WmError::Validation("No User-Agent header provided".to_string());
        assert!(err.to_string().contains("No User-Agent header provided"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_server_error_kind() {
        let err = WmError::Server("boom".to_string());
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[test]
    fn test_http_error_keeps_status() {
        let err = WmError::Http {
            status: 503,
            url: "http://localhost:8080/v2/getinfo/json".to_string(),
            message: "engine unavailable".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("engine unavailable"));
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[test]
    fn test_not_found_error_kind() {
        let err = WmError::NotFound("NotExists".to_string());
        assert!(err.to_string().starts_with("Not found"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_io_error_is_config_kind() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WmError = io_err.into();
        assert!(err.to_string().contains("IO error"));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_toml_error_conversion() {
        let parse_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: WmError = parse_err.into();
        assert!(matches!(err, WmError::Toml(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn test_fn() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(test_fn().unwrap(), 42);
    }
}
