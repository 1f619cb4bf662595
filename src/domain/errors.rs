//! Domain error types
//!
//! This module defines the error hierarchy for the uploader.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main uploader error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum UploaderError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Cliniko API and storage errors
    #[error("Cliniko error: {0}")]
    Cliniko(#[from] ClinikoError),

    /// Patient lookup store errors
    #[error("Patient store error: {0}")]
    PatientStore(String),

    /// Local invoice tree errors
    #[error("Invoice store error: {0}")]
    InvoiceStore(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Cliniko-specific errors
///
/// Errors that occur while talking to the Cliniko API or to the storage
/// endpoint a presigned target points at. These errors don't expose the HTTP
/// client's types.
#[derive(Debug, Error)]
pub enum ClinikoError {
    /// Request never produced a response
    #[error("Failed to reach {0}")]
    ConnectionFailed(String),

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Server error (5xx) or other unexpected status
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Storage accepted the upload but returned no object key
    #[error("Upload response has no PostResponse/Key: {0}")]
    MalformedUploadResponse(String),

    /// Attachment registration completed with a status other than 201
    #[error("Attachment registration rejected with status {status}: {body}")]
    RegistrationRejected { status: u16, body: String },
}

impl ClinikoError {
    /// Classifies a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if (400..500).contains(&status) {
            ClinikoError::ClientError { status, message }
        } else {
            ClinikoError::ServerError { status, message }
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for UploaderError {
    fn from(err: std::io::Error) -> Self {
        UploaderError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for UploaderError {
    fn from(err: serde_json::Error) -> Self {
        UploaderError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for UploaderError {
    fn from(err: toml::de::Error) -> Self {
        UploaderError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from SQLite errors
impl From<rusqlite::Error> for UploaderError {
    fn from(err: rusqlite::Error) -> Self {
        UploaderError::PatientStore(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uploader_error_display() {
        let err = UploaderError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_cliniko_error_conversion() {
        let cliniko_err = ClinikoError::ConnectionFailed("Network error".to_string());
        let err: UploaderError = cliniko_err.into();
        assert!(matches!(err, UploaderError::Cliniko(_)));
    }

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            ClinikoError::from_status(404, "missing"),
            ClinikoError::ClientError { status: 404, .. }
        ));
        assert!(matches!(
            ClinikoError::from_status(503, "down"),
            ClinikoError::ServerError { status: 503, .. }
        ));
        assert!(matches!(
            ClinikoError::from_status(302, "moved"),
            ClinikoError::ServerError { status: 302, .. }
        ));
    }

    #[test]
    fn test_registration_rejected_display_contains_body() {
        let err = ClinikoError::RegistrationRejected {
            status: 422,
            body: "{\"errors\":{\"upload_url\":[\"is invalid\"]}}".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("422"));
        assert!(text.contains("is invalid"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: UploaderError = io_err.into();
        assert!(matches!(err, UploaderError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: UploaderError = json_err.into();
        assert!(matches!(err, UploaderError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: UploaderError = toml_err.into();
        assert!(matches!(err, UploaderError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let err: UploaderError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, UploaderError::PatientStore(_)));
    }
}
