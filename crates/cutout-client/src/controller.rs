//! The extraction workflow state machine.
//!
//! ```text
//! Idle -> Uploaded -> Detecting -> Detected -> Extracting -> Editing
//!                         |                        |
//!                         v                        v
//!                       Error                  Detected (previous session kept)
//! ```
//!
//! Each remote call is split into a `begin_*` step that validates the state
//! and hands out a ticket, and a `complete_*` step that applies the result.
//! Only one request may be in flight. Selecting a new file abandons the
//! in-flight request, and its completion is later reported as
//! [`Completion::Stale`] without touching any state.

use std::fmt;

use cutout_core::decode::decode_image;
use cutout_core::{
    ExportKind, ExportedImage, ExtractionSession, ImagePayload, ParameterUpdate, SessionId,
};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, ServiceError};
use crate::model::{DetectedObject, SelectedFile};
use crate::service::{DetectionService, ExtractionService};

/// Message shown after a failed detection.
pub const DETECTION_ERROR_MESSAGE: &str = "Error detecting objects";

/// Where the workflow currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Uploaded,
    Detecting,
    Detected,
    Extracting,
    Editing,
    /// Detection failed; the reason is kept for display.
    Error(String),
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Uploaded => "uploaded",
            WorkflowState::Detecting => "detecting",
            WorkflowState::Detected => "detected",
            WorkflowState::Extracting => "extracting",
            WorkflowState::Editing => "editing",
            WorkflowState::Error(_) => "error",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Error(reason) => write!(f, "error ({reason})"),
            other => f.write_str(other.name()),
        }
    }
}

/// The two kinds of remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Detect,
    Extract,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestKind::Detect => "detection",
            RequestKind::Extract => "extraction",
        })
    }
}

/// Sequence number of one remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request-{}", self.0)
    }
}

/// Everything needed to run a detection call.
#[derive(Debug, Clone)]
pub struct DetectRequest {
    pub id: RequestId,
    pub file: SelectedFile,
}

/// Everything needed to run an extraction call.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub id: RequestId,
    pub image: ImagePayload,
    pub object: DetectedObject,
}

/// Outcome of handing a service result back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result belonged to the pending request and was applied.
    Applied,
    /// The request had been superseded; the result was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct PendingRequest {
    id: RequestId,
    kind: RequestKind,
}

/// Orders upload, detection, selection, extraction and editing.
#[derive(Debug, Default)]
pub struct WorkflowController {
    state: WorkflowState,
    file: Option<SelectedFile>,
    detections: Vec<DetectedObject>,
    session: Option<ExtractionSession>,
    pending: Option<PendingRequest>,
    result_message: Option<String>,
    last_request: u64,
    last_session: u64,
}

impl WorkflowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// Detected objects in service order.
    pub fn detections(&self) -> &[DetectedObject] {
        &self.detections
    }

    pub fn session(&self) -> Option<&ExtractionSession> {
        self.session.as_ref()
    }

    /// User-facing message for the last failed detection.
    pub fn result_message(&self) -> Option<&str> {
        self.result_message.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// The request currently in flight, if any.
    pub fn pending_request(&self) -> Option<(RequestId, RequestKind)> {
        self.pending.map(|p| (p.id, p.kind))
    }

    /// Index of the first detection whose label matches, ignoring case.
    pub fn find_object(&self, label: &str) -> Option<usize> {
        self.detections
            .iter()
            .position(|o| o.label.eq_ignore_ascii_case(label))
    }

    /// Select a new image. Everything derived from the previous one is
    /// discarded and any in-flight request becomes stale.
    pub fn select_file(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let file = SelectedFile::new(name, bytes);
        info!(file = %file.name, bytes = file.payload.len(), "File selected");
        self.discard();
        self.file = Some(file);
        self.state = WorkflowState::Uploaded;
    }

    /// Drop the selected file and return to [`WorkflowState::Idle`].
    pub fn clear(&mut self) {
        self.discard();
        self.state = WorkflowState::Idle;
    }

    fn discard(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(request = %pending.id, kind = %pending.kind, "Abandoning in-flight request");
        }
        self.file = None;
        self.detections.clear();
        self.session = None;
        self.result_message = None;
    }

    fn next_request_id(&mut self) -> RequestId {
        self.last_request += 1;
        RequestId(self.last_request)
    }

    fn next_session_id(&mut self) -> SessionId {
        self.last_session += 1;
        SessionId::new(self.last_session)
    }

    fn is_pending(&self, id: RequestId) -> bool {
        self.pending.is_some_and(|p| p.id == id)
    }

    // ========================================================================
    // Detection
    // ========================================================================

    /// Validate and start a detection call.
    pub fn begin_detect(&mut self) -> Result<DetectRequest, PipelineError> {
        let Some(file) = self.file.clone() else {
            warn!("Detection requested without a selected file");
            return Err(PipelineError::NoFileSelected);
        };
        if let Some(pending) = self.pending {
            return Err(PipelineError::Busy(pending.kind));
        }

        let id = self.next_request_id();
        self.pending = Some(PendingRequest {
            id,
            kind: RequestKind::Detect,
        });
        self.state = WorkflowState::Detecting;
        debug!(request = %id, "Detection started");
        Ok(DetectRequest { id, file })
    }

    /// Apply the result of a detection call.
    ///
    /// A failure moves to [`WorkflowState::Error`], clears the detections and
    /// keeps the file so detection can be retried.
    pub fn complete_detect(
        &mut self,
        id: RequestId,
        result: Result<Vec<DetectedObject>, ServiceError>,
    ) -> Result<Completion, PipelineError> {
        if !self.is_pending(id) {
            debug!(request = %id, "Ignoring stale detection result");
            return Ok(Completion::Stale);
        }
        self.pending = None;

        match result {
            Ok(objects) => {
                info!(request = %id, count = objects.len(), "Objects detected");
                self.detections = objects;
                self.result_message = None;
                self.state = WorkflowState::Detected;
                Ok(Completion::Applied)
            }
            Err(err) => {
                let reason = err.to_string();
                warn!(request = %id, error = %reason, "Detection failed");
                self.detections.clear();
                self.result_message = Some(DETECTION_ERROR_MESSAGE.to_string());
                self.state = WorkflowState::Error(reason.clone());
                Err(PipelineError::DetectionFailed(reason))
            }
        }
    }

    /// Run a detection call to completion.
    pub async fn detect<S>(&mut self, service: &S) -> Result<&[DetectedObject], PipelineError>
    where
        S: DetectionService,
    {
        let request = self.begin_detect()?;
        let result = service.detect(&request.file).await;
        self.complete_detect(request.id, result)?;
        Ok(&self.detections)
    }

    // ========================================================================
    // Extraction
    // ========================================================================

    /// Validate and start extracting the detection at `index`.
    pub fn begin_extract(&mut self, index: usize) -> Result<ExtractRequest, PipelineError> {
        if let Some(pending) = self.pending {
            return Err(PipelineError::Busy(pending.kind));
        }
        if !matches!(
            self.state,
            WorkflowState::Detected | WorkflowState::Editing
        ) {
            return Err(PipelineError::InvalidState {
                action: "extract",
                state: self.state.to_string(),
            });
        }
        let Some(file) = &self.file else {
            return Err(PipelineError::NoFileSelected);
        };
        let Some(object) = self.detections.get(index).cloned() else {
            return Err(PipelineError::UnknownObject {
                index,
                available: self.detections.len(),
            });
        };
        let image = file.payload.clone();

        let id = self.next_request_id();
        self.pending = Some(PendingRequest {
            id,
            kind: RequestKind::Extract,
        });
        self.state = WorkflowState::Extracting;
        debug!(request = %id, label = %object.label, "Extraction started");
        Ok(ExtractRequest { id, image, object })
    }

    /// Apply the result of an extraction call.
    ///
    /// Success replaces the session with a fresh one at default parameters.
    /// Failure, including an empty or undecodable image, returns to
    /// [`WorkflowState::Detected`] and leaves any previous session alone.
    pub fn complete_extract(
        &mut self,
        id: RequestId,
        result: Result<ImagePayload, ServiceError>,
    ) -> Result<Completion, PipelineError> {
        if !self.is_pending(id) {
            debug!(request = %id, "Ignoring stale extraction result");
            return Ok(Completion::Stale);
        }
        self.pending = None;

        let result = result.and_then(|payload| {
            if payload.is_empty() {
                return Err(ServiceError::EmptyImage);
            }
            // A session must start from a decodable image, or every render fails
            decode_image(payload.as_bytes())
                .map_err(|e| ServiceError::InvalidImage(e.to_string()))?;
            Ok(payload)
        });

        match result {
            Ok(payload) => {
                let session_id = self.next_session_id();
                info!(
                    request = %id,
                    session = %session_id,
                    bytes = payload.len(),
                    "Extraction ready for editing"
                );
                self.session = Some(ExtractionSession::new(session_id, payload));
                self.state = WorkflowState::Editing;
                Ok(Completion::Applied)
            }
            Err(err) => {
                let reason = err.to_string();
                warn!(request = %id, error = %reason, "Extraction failed");
                self.state = WorkflowState::Detected;
                Err(PipelineError::ExtractionFailed(reason))
            }
        }
    }

    /// Run an extraction call to completion.
    pub async fn extract<S>(
        &mut self,
        index: usize,
        service: &S,
    ) -> Result<&ExtractionSession, PipelineError>
    where
        S: ExtractionService,
    {
        let request = self.begin_extract(index)?;
        let result = service.extract(&request.image, &request.object).await;
        self.complete_extract(request.id, result)?;
        self.session.as_ref().ok_or(PipelineError::NoSession)
    }

    // ========================================================================
    // Editing
    // ========================================================================

    fn session_mut(&mut self) -> Result<&mut ExtractionSession, PipelineError> {
        self.session.as_mut().ok_or(PipelineError::NoSession)
    }

    pub fn update_parameter(&mut self, update: ParameterUpdate) -> Result<(), PipelineError> {
        self.session_mut()?.update_parameter(update)?;
        Ok(())
    }

    /// Apply several updates with a single render.
    pub fn update_parameters<I>(&mut self, updates: I) -> Result<(), PipelineError>
    where
        I: IntoIterator<Item = ParameterUpdate>,
    {
        self.session_mut()?.update_parameters(updates)?;
        Ok(())
    }

    pub fn toggle_flip_horizontal(&mut self) -> Result<(), PipelineError> {
        let session = self.session_mut()?;
        let update = session.params().toggle_flip_horizontal();
        session.update_parameter(update)?;
        Ok(())
    }

    pub fn toggle_flip_vertical(&mut self) -> Result<(), PipelineError> {
        let session = self.session_mut()?;
        let update = session.params().toggle_flip_vertical();
        session.update_parameter(update)?;
        Ok(())
    }

    pub fn reset_parameters(&mut self) -> Result<(), PipelineError> {
        self.session_mut()?.reset_parameters();
        Ok(())
    }

    /// Package the current image for download. Does not change state.
    pub fn export(&self, kind: ExportKind) -> Result<ExportedImage, PipelineError> {
        let session = self.session.as_ref().ok_or(PipelineError::NoSession)?;
        session.export(kind).ok_or(PipelineError::NoSession)
    }
}
