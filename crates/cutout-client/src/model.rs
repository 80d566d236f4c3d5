//! Data exchanged with the detection and extraction services.

use cutout_core::ImagePayload;
use serde::{Deserialize, Serialize};

/// Opaque geometry from the detection service.
///
/// Boxes and masks are passed back to the extraction service verbatim, so
/// the JSON value is kept as-is rather than parsed into a fixed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Geometry(pub serde_json::Value);

impl Geometry {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Interpret the value as `[x1, y1, x2, y2]`, if it has that shape.
    pub fn as_box(&self) -> Option<[f64; 4]> {
        let values = self.0.as_array()?;
        if values.len() != 4 {
            return None;
        }
        let mut out = [0.0; 4];
        for (slot, value) in out.iter_mut().zip(values) {
            *slot = value.as_f64()?;
        }
        Some(out)
    }
}

impl From<serde_json::Value> for Geometry {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// One object proposed by the detection service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    /// Confidence in `[0, 1]`.
    pub score: f64,
    #[serde(rename = "box")]
    pub bbox: Geometry,
    pub mask: Geometry,
}

impl DetectedObject {
    /// Confidence as a percentage with one decimal, e.g. `"93.0%"`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.score * 100.0)
    }
}

/// The image the user picked, before any service has seen it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub payload: ImagePayload,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            payload: ImagePayload::new(bytes),
        }
    }
}
