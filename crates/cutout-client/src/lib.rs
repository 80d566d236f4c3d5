//! Cutout Client - service clients and the extraction workflow
//!
//! This crate connects the pure image pipeline in `cutout-core` to the
//! outside world: the remote detection and extraction services, the
//! workflow state machine that orders calls to them, and export to disk.
//!
//! # Module Structure
//!
//! - `config` - Service endpoints and output settings from the environment
//! - `model` - Detected objects, opaque geometry and the selected file
//! - `service` - Service traits plus the HTTP clients implementing them
//! - `controller` - Upload, detect, select, extract and edit state machine
//! - `export` - Writes exported PNGs under their canonical names
//! - `error` - Error types shared across the crate

pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod model;
pub mod service;

pub use config::ClientConfig;
pub use controller::{
    Completion, DetectRequest, ExtractRequest, RequestId, RequestKind, WorkflowController,
    WorkflowState,
};
pub use error::{ExportError, PipelineError, ServiceError};
pub use export::write_export;
pub use model::{DetectedObject, Geometry, SelectedFile};
pub use service::{
    DetectionService, ExtractionService, HttpDetectionClient, HttpExtractionClient, ServiceClient,
};
