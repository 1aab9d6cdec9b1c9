//! # Error Types
//!
//! Failures that can escape the core. Per-frame detection misses are not
//! errors: they surface as `None` from the estimator and are skipped.

use thiserror::Error;

/// Failure to open or run the microphone capture.
///
/// Every variant is recoverable: the session simply does not start and the
/// user may retry.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("microphone access was denied: {0}")]
    PermissionDenied(String),
    #[error("no usable audio input device: {0}")]
    DeviceUnavailable(String),
    #[error("unsupported input sample format `{0}`")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error("audio backend error: {0}")]
    Backend(String),
    #[error("capture worker failed: {0}")]
    Worker(#[from] std::io::Error),
}

impl CaptureError {
    /// Classifies a backend-specific message. Host APIs report a refused
    /// microphone permission only through their free-form description.
    pub(crate) fn from_backend(description: String) -> Self {
        let lower = description.to_lowercase();
        if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized") {
            CaptureError::PermissionDenied(description)
        } else {
            CaptureError::Backend(description)
        }
    }
}

impl From<cpal::DefaultStreamConfigError> for CaptureError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        let message = err.to_string();
        match err {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable(message)
            }
            cpal::DefaultStreamConfigError::BackendSpecific { err } => {
                CaptureError::from_backend(err.description)
            }
            _ => CaptureError::Backend(message),
        }
    }
}

impl From<cpal::SupportedStreamConfigsError> for CaptureError {
    fn from(err: cpal::SupportedStreamConfigsError) -> Self {
        let message = err.to_string();
        match err {
            cpal::SupportedStreamConfigsError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable(message)
            }
            cpal::SupportedStreamConfigsError::BackendSpecific { err } => {
                CaptureError::from_backend(err.description)
            }
            _ => CaptureError::Backend(message),
        }
    }
}

impl From<cpal::BuildStreamError> for CaptureError {
    fn from(err: cpal::BuildStreamError) -> Self {
        let message = err.to_string();
        match err {
            cpal::BuildStreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable(message)
            }
            cpal::BuildStreamError::BackendSpecific { err } => {
                CaptureError::from_backend(err.description)
            }
            _ => CaptureError::Backend(message),
        }
    }
}

impl From<cpal::PlayStreamError> for CaptureError {
    fn from(err: cpal::PlayStreamError) -> Self {
        let message = err.to_string();
        match err {
            cpal::PlayStreamError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable(message)
            }
            cpal::PlayStreamError::BackendSpecific { err } => {
                CaptureError::from_backend(err.description)
            }
            _ => CaptureError::Backend(message),
        }
    }
}

/// Failure to load, save or validate a [`crate::config::TrackerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {msg}")]
    Invalid { field: &'static str, msg: String },
}

/// A transposition outside the supported range.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransposeError {
    #[error("transpose of {0} semitones is outside [-12, 12]")]
    OutOfRange(i32),
}

/// An unknown pitch class name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown note name `{0}`")]
pub struct ParseNoteNameError(pub String);
