//! Error types for echodrill.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EchodrillError {
    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    // Input discovery errors
    #[error("No supported media file found in {dir}")]
    InputNotFound { dir: String },

    // Detector collaborator errors
    #[error("Segment detection failed: {message}")]
    Detection { message: String },

    // Media engine errors
    #[error("Media engine {operation} failed: {message}")]
    MediaEngine { operation: String, message: String },

    // Output versioning errors
    #[error("Output sequence exhausted for {date}: more than 9999 runs in one day")]
    SequenceExhausted { date: String },

    #[error("Run cancelled before {stage}")]
    Cancelled { stage: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, EchodrillError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_parse_display() {
        let error = EchodrillError::ConfigParse {
            message: "invalid JSON syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration: invalid JSON syntax"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = EchodrillError::ConfigInvalidValue {
            key: "repeat_count".to_string(),
            message: "must be at least 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for repeat_count: must be at least 1"
        );
    }

    #[test]
    fn test_input_not_found_display() {
        let error = EchodrillError::InputNotFound {
            dir: "input".to_string(),
        };
        assert_eq!(error.to_string(), "No supported media file found in input");
    }

    #[test]
    fn test_detection_display() {
        let error = EchodrillError::Detection {
            message: "model load failed".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Segment detection failed: model load failed"
        );
    }

    #[test]
    fn test_media_engine_display() {
        let error = EchodrillError::MediaEngine {
            operation: "concatenate".to_string(),
            message: "exit status 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Media engine concatenate failed: exit status 1"
        );
    }

    #[test]
    fn test_sequence_exhausted_display() {
        let error = EchodrillError::SequenceExhausted {
            date: "20260823".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Output sequence exhausted for 20260823: more than 9999 runs in one day"
        );
    }

    #[test]
    fn test_cancelled_display() {
        let error = EchodrillError::Cancelled {
            stage: "detect".to_string(),
        };
        assert_eq!(error.to_string(), "Run cancelled before detect");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: EchodrillError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<EchodrillError>();
        assert_sync::<EchodrillError>();
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
