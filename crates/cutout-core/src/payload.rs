//! Encoded image payloads and their base64 form.
//!
//! Payloads travel as base64 text (without a data-URI prefix) in service
//! requests and responses, and as raw encoded bytes everywhere else.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Errors that can occur when reading a base64 payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// The text was empty, whitespace only, or decoded to zero bytes.
    #[error("Image payload is empty")]
    Blank,

    /// The text is not valid standard base64.
    #[error("Invalid base64 image payload: {0}")]
    InvalidBase64(String),
}

/// Encoded raster bytes (PNG for everything the engine produces).
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Decode base64 text into a payload.
    ///
    /// A leading `data:<mime>;base64,` prefix is stripped. Blank input is
    /// rejected instead of producing an empty payload.
    pub fn from_base64(text: &str) -> Result<Self, PayloadError> {
        let text = text.trim();
        let text = match text.strip_prefix("data:") {
            Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(""),
            None => text,
        };
        if text.trim().is_empty() {
            return Err(PayloadError::Blank);
        }

        let bytes = STANDARD
            .decode(text.trim())
            .map_err(|e| PayloadError::InvalidBase64(e.to_string()))?;
        if bytes.is_empty() {
            return Err(PayloadError::Blank);
        }
        Ok(Self { bytes })
    }

    /// Standard base64 with padding, no data-URI prefix.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:image/png;base64,...` for display surfaces.
    pub fn to_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for ImagePayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

// Payloads can be megabytes; print the size, not the content.
impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("len", &self.bytes.len())
            .finish()
    }
}
