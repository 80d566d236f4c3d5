//! Export naming for rendered and raw extractions.

use crate::payload::ImagePayload;

/// Which payload an export reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportKind {
    /// The current rendered image with all edits applied.
    #[default]
    Edited,
    /// The untouched extraction as returned by the service.
    RawExtraction,
}

impl ExportKind {
    /// Canonical download file name.
    pub fn file_name(self) -> &'static str {
        match self {
            ExportKind::Edited => "edited_image.png",
            ExportKind::RawExtraction => "extracted_object.png",
        }
    }
}

/// A PNG ready to be persisted by the surrounding environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub kind: ExportKind,
    pub payload: ImagePayload,
}

impl ExportedImage {
    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }
}
