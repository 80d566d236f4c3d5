//! Cutout Core - Image processing library
//!
//! This crate provides the pure, synchronous half of Cutout: the base64 image
//! payload codec, PNG decoding and encoding, the transform engine that
//! re-renders an extracted object from its immutable original, and the
//! extraction session that owns the original and the current parameters.

pub mod decode;
pub mod encode;
pub mod export;
pub mod filter;
pub mod payload;
pub mod render;
pub mod session;
pub mod transform;

use std::fmt;

use thiserror::Error;

pub use export::{ExportKind, ExportedImage};
pub use payload::{ImagePayload, PayloadError};
pub use render::{render, render_decoded, RenderError};
pub use session::{ExtractionSession, SessionId};

/// Non-destructive edit parameters for an extracted object.
///
/// Every field is an absolute value, never a delta. Rendering always starts
/// from the untouched original with the full parameter set.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformParameters {
    /// Brightness multiplier (0.5 to 2.0)
    pub brightness: f32,
    /// Contrast multiplier around mid-gray (0.5 to 2.0)
    pub contrast: f32,
    /// Saturation multiplier (0.5 to 2.0)
    pub saturation: f32,
    /// Gaussian blur standard deviation in pixels (0 to 10)
    pub blur: f32,
    /// Rotation in degrees, positive = clockwise on screen (-180 to 180)
    pub rotation: f32,
    /// Mirror left-right
    pub flip_horizontal: bool,
    /// Mirror top-bottom
    pub flip_vertical: bool,
}

impl Default for TransformParameters {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            blur: 0.0,
            rotation: 0.0,
            flip_horizontal: false,
            flip_vertical: false,
        }
    }
}

impl TransformParameters {
    /// Create parameters with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// True when the geometric stage would be an exact copy.
    pub fn is_identity_geometry(&self) -> bool {
        self.rotation == 0.0 && !self.flip_horizontal && !self.flip_vertical
    }

    /// Overwrite one field after checking it against its range.
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn apply(&mut self, update: ParameterUpdate) -> Result<(), ParameterError> {
        update.validate()?;
        match update {
            ParameterUpdate::Brightness(v) => self.brightness = v,
            ParameterUpdate::Contrast(v) => self.contrast = v,
            ParameterUpdate::Saturation(v) => self.saturation = v,
            ParameterUpdate::Blur(v) => self.blur = v,
            ParameterUpdate::Rotation(v) => self.rotation = v,
            ParameterUpdate::FlipHorizontal(v) => self.flip_horizontal = v,
            ParameterUpdate::FlipVertical(v) => self.flip_vertical = v,
        }
        Ok(())
    }

    /// Check every numeric field, e.g. after loading parameters from JSON.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for update in self.as_updates() {
            update.validate()?;
        }
        Ok(())
    }

    /// Express this value as one update per field.
    pub fn as_updates(&self) -> [ParameterUpdate; 7] {
        [
            ParameterUpdate::Brightness(self.brightness),
            ParameterUpdate::Contrast(self.contrast),
            ParameterUpdate::Saturation(self.saturation),
            ParameterUpdate::Blur(self.blur),
            ParameterUpdate::Rotation(self.rotation),
            ParameterUpdate::FlipHorizontal(self.flip_horizontal),
            ParameterUpdate::FlipVertical(self.flip_vertical),
        ]
    }

    /// The update a "Flip H" button press produces.
    pub fn toggle_flip_horizontal(&self) -> ParameterUpdate {
        ParameterUpdate::FlipHorizontal(!self.flip_horizontal)
    }

    /// The update a "Flip V" button press produces.
    pub fn toggle_flip_vertical(&self) -> ParameterUpdate {
        ParameterUpdate::FlipVertical(!self.flip_vertical)
    }
}

/// Identifies one field of [`TransformParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterField {
    Brightness,
    Contrast,
    Saturation,
    Blur,
    Rotation,
    FlipHorizontal,
    FlipVertical,
}

impl ParameterField {
    /// Inclusive slider range for numeric fields, `None` for flips.
    pub fn range(self) -> Option<(f32, f32)> {
        match self {
            Self::Brightness | Self::Contrast | Self::Saturation => Some((0.5, 2.0)),
            Self::Blur => Some((0.0, 10.0)),
            Self::Rotation => Some((-180.0, 180.0)),
            Self::FlipHorizontal | Self::FlipVertical => None,
        }
    }

    /// Slider step for numeric fields.
    pub fn step(self) -> Option<f32> {
        match self {
            Self::Brightness | Self::Contrast | Self::Saturation => Some(0.1),
            Self::Blur => Some(0.5),
            Self::Rotation => Some(1.0),
            Self::FlipHorizontal | Self::FlipVertical => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Saturation => "saturation",
            Self::Blur => "blur",
            Self::Rotation => "rotation",
            Self::FlipHorizontal => "flipHorizontal",
            Self::FlipVertical => "flipVertical",
        }
    }
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A total overwrite of a single parameter field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterUpdate {
    Brightness(f32),
    Contrast(f32),
    Saturation(f32),
    Blur(f32),
    Rotation(f32),
    FlipHorizontal(bool),
    FlipVertical(bool),
}

impl ParameterUpdate {
    /// The field this update overwrites.
    pub fn field(&self) -> ParameterField {
        match self {
            Self::Brightness(_) => ParameterField::Brightness,
            Self::Contrast(_) => ParameterField::Contrast,
            Self::Saturation(_) => ParameterField::Saturation,
            Self::Blur(_) => ParameterField::Blur,
            Self::Rotation(_) => ParameterField::Rotation,
            Self::FlipHorizontal(_) => ParameterField::FlipHorizontal,
            Self::FlipVertical(_) => ParameterField::FlipVertical,
        }
    }

    fn numeric_value(&self) -> Option<f32> {
        match *self {
            Self::Brightness(v)
            | Self::Contrast(v)
            | Self::Saturation(v)
            | Self::Blur(v)
            | Self::Rotation(v) => Some(v),
            Self::FlipHorizontal(_) | Self::FlipVertical(_) => None,
        }
    }

    /// Reject non-finite and out-of-range values.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let field = self.field();
        match (self.numeric_value(), field.range()) {
            (Some(value), Some((min, max))) => {
                if value.is_finite() && value >= min && value <= max {
                    Ok(())
                } else {
                    Err(ParameterError::OutOfRange {
                        field,
                        value,
                        min,
                        max,
                    })
                }
            }
            _ => Ok(()),
        }
    }
}

/// Errors raised when a parameter value is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("{field} value {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: ParameterField,
        value: f32,
        min: f32,
        max: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_default() {
        let params = TransformParameters::new();
        assert!(params.is_default());
        assert!(params.is_identity_geometry());
        assert_eq!(params.brightness, 1.0);
        assert_eq!(params.blur, 0.0);
    }

    #[test]
    fn test_apply_overwrites_single_field() {
        let mut params = TransformParameters::new();
        params.apply(ParameterUpdate::Brightness(1.5)).unwrap();
        params.apply(ParameterUpdate::Brightness(0.7)).unwrap();
        assert_eq!(params.brightness, 0.7);
        assert_eq!(params.contrast, 1.0);
        assert!(!params.is_default());
    }

    #[test]
    fn test_apply_rejects_out_of_range() {
        let mut params = TransformParameters::new();
        let err = params.apply(ParameterUpdate::Rotation(270.0)).unwrap_err();
        assert_eq!(
            err,
            ParameterError::OutOfRange {
                field: ParameterField::Rotation,
                value: 270.0,
                min: -180.0,
                max: 180.0,
            }
        );
        // Rejected values leave the field untouched
        assert_eq!(params.rotation, 0.0);
    }

    #[test]
    fn test_apply_rejects_non_finite() {
        let mut params = TransformParameters::new();
        assert!(params.apply(ParameterUpdate::Blur(f32::NAN)).is_err());
        assert!(params
            .apply(ParameterUpdate::Saturation(f32::INFINITY))
            .is_err());
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let mut params = TransformParameters::new();
        params.apply(ParameterUpdate::Contrast(0.5)).unwrap();
        params.apply(ParameterUpdate::Contrast(2.0)).unwrap();
        params.apply(ParameterUpdate::Rotation(-180.0)).unwrap();
        params.apply(ParameterUpdate::Blur(10.0)).unwrap();
        assert!(params.apply(ParameterUpdate::Blur(10.5)).is_err());
        assert!(params.apply(ParameterUpdate::Brightness(0.4)).is_err());
    }

    #[test]
    fn test_toggle_flips() {
        let mut params = TransformParameters::new();
        params.apply(params.toggle_flip_horizontal()).unwrap();
        assert!(params.flip_horizontal);
        params.apply(params.toggle_flip_horizontal()).unwrap();
        assert!(!params.flip_horizontal);
        params.apply(params.toggle_flip_vertical()).unwrap();
        assert!(params.flip_vertical);
    }

    #[test]
    fn test_validate_whole_value() {
        let mut params = TransformParameters::new();
        assert!(params.validate().is_ok());
        params.saturation = 3.0;
        assert!(matches!(
            params.validate(),
            Err(ParameterError::OutOfRange {
                field: ParameterField::Saturation,
                ..
            })
        ));
    }

    #[test]
    fn test_serde_uses_camel_case_and_defaults() {
        let params: TransformParameters =
            serde_json::from_str(r#"{"brightness": 1.5, "flipHorizontal": true}"#).unwrap();
        assert_eq!(params.brightness, 1.5);
        assert!(params.flip_horizontal);
        assert_eq!(params.contrast, 1.0);

        let json = serde_json::to_string(&TransformParameters::default()).unwrap();
        assert!(json.contains("\"flipVertical\":false"));
    }

    #[test]
    fn test_field_metadata() {
        assert_eq!(ParameterField::Blur.step(), Some(0.5));
        assert_eq!(ParameterField::Rotation.range(), Some((-180.0, 180.0)));
        assert_eq!(ParameterField::FlipVertical.range(), None);
        assert_eq!(ParameterField::FlipHorizontal.to_string(), "flipHorizontal");
    }
}
