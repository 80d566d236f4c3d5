//! Error types for the client crate.

use std::path::PathBuf;

use cutout_core::ParameterError;
use thiserror::Error;

use crate::controller::RequestKind;

/// Errors from a single call to a remote service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A 2xx reply whose image field was missing or blank.
    #[error("Service returned an empty image")]
    EmptyImage,

    /// A non-empty reply that does not decode as an image.
    #[error("Service returned an undecodable image: {0}")]
    InvalidImage(String),
}

impl ServiceError {
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

/// Errors surfaced by the workflow controller.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Detect was requested with no file selected. Handled locally.
    #[error("Please select an image first")]
    NoFileSelected,

    /// Another request is still in flight; the new one was dropped.
    #[error("A {0} request is already in progress")]
    Busy(RequestKind),

    #[error("Object detection failed: {0}")]
    DetectionFailed(String),

    #[error("Object extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("No detected object at index {index} ({available} available)")]
    UnknownObject { index: usize, available: usize },

    #[error("Cannot {action} while {state}")]
    InvalidState { action: &'static str, state: String },

    #[error("No extracted object to edit")]
    NoSession,

    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

/// Errors writing an export to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
