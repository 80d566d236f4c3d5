//! The transform engine.
//!
//! `render` is a pure function of the original payload and a full parameter
//! set. It never looks at a previous render, so the same inputs always give
//! byte-identical output.
//!
//! ## Pipeline
//! 1. Decode the original into an RGBA surface of the same size
//! 2. Draw it through the flip/rotation matrix
//! 3. Filter the drawn surface: brightness, contrast, saturation, blur
//! 4. Encode the surface as PNG
//!
//! Color filters are per-pixel, so drawing before filtering gives the same
//! colors as filtering first. Blur runs on the drawn surface, the way a
//! canvas applies its filter to whatever `drawImage` produced.

use thiserror::Error;

use crate::decode::{decode_image, DecodeError, DecodedImage};
use crate::encode::{encode_png, EncodeError};
use crate::filter::apply_filter_chain;
use crate::payload::ImagePayload;
use crate::transform::apply_geometry;
use crate::TransformParameters;

/// Errors raised by the transform engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Failed to decode original image: {0}")]
    Decode(#[from] DecodeError),

    #[error("Failed to encode rendered image: {0}")]
    Encode(#[from] EncodeError),

    /// The encoder produced no bytes.
    #[error("Rendered image is empty")]
    EmptyOutput,
}

/// Render `original` with `params` and return a new PNG payload.
///
/// Parameter ranges are not checked here; callers reject out-of-range
/// values before they reach the engine.
pub fn render(
    original: &ImagePayload,
    params: &TransformParameters,
) -> Result<ImagePayload, RenderError> {
    let decoded = decode_image(original.as_bytes())?;
    let rendered = render_decoded(&decoded, params);
    let bytes = encode_png(&rendered.pixels, rendered.width, rendered.height)?;

    if bytes.is_empty() {
        return Err(RenderError::EmptyOutput);
    }
    Ok(ImagePayload::new(bytes))
}

/// The pixel stage of [`render`]: geometry then filters.
pub fn render_decoded(image: &DecodedImage, params: &TransformParameters) -> DecodedImage {
    let mut surface = apply_geometry(image, params);
    apply_filter_chain(&mut surface, params);
    surface
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 6x4 opaque gradient with a transparent corner.
    fn sample_original() -> ImagePayload {
        let (w, h) = (6u32, 4u32);
        let mut pixels = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let alpha = if x == 0 && y == 0 { 0 } else { 255 };
                pixels.extend_from_slice(&[(x * 40) as u8, (y * 60) as u8, 90, alpha]);
            }
        }
        ImagePayload::new(encode_png(&pixels, w, h).unwrap())
    }

    fn decode(payload: &ImagePayload) -> DecodedImage {
        decode_image(payload.as_bytes()).unwrap()
    }

    #[test]
    fn test_default_render_reproduces_pixels() {
        let original = sample_original();
        let rendered = render(&original, &TransformParameters::default()).unwrap();
        assert_eq!(decode(&rendered), decode(&original));
    }

    #[test]
    fn test_render_is_idempotent() {
        let original = sample_original();
        let mut params = TransformParameters::default();
        params.brightness = 1.3;
        params.blur = 1.5;
        params.rotation = 17.0;
        params.flip_vertical = true;

        let first = render(&original, &params).unwrap();
        let second = render(&original, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_keeps_dimensions() {
        let original = sample_original();
        let mut params = TransformParameters::default();
        params.rotation = 45.0;
        let rendered = decode(&render(&original, &params).unwrap());
        assert_eq!((rendered.width, rendered.height), (6, 4));
    }

    #[test]
    fn test_brightness_only_changes_color() {
        let original = sample_original();
        let mut params = TransformParameters::default();
        params.brightness = 1.5;

        let before = decode(&original);
        let after = decode(&render(&original, &params).unwrap());
        assert_ne!(before, after);
        for (b, a) in before.pixels.chunks(4).zip(after.pixels.chunks(4)) {
            assert_eq!(b[3], a[3], "Alpha must not change");
            if b[3] > 0 {
                for c in 0..3 {
                    let expected = ((b[c] as f32 / 255.0 * 1.5).min(1.0) * 255.0).round() as u8;
                    assert_eq!(a[c], expected);
                }
            }
        }
    }

    #[test]
    fn test_render_does_not_chain_on_previous_output() {
        let original = sample_original();
        let mut params = TransformParameters::default();
        params.contrast = 1.8;

        let once = render(&original, &params).unwrap();
        let twice = render(&once, &params).unwrap();
        // Re-rendering a render compounds the effect; rendering from the
        // original does not.
        assert_ne!(once, twice);
        assert_eq!(once, render(&original, &params).unwrap());
    }

    #[test]
    fn test_render_rejects_undecodable_original() {
        let garbage = ImagePayload::new(b"not a png".to_vec());
        let result = render(&garbage, &TransformParameters::default());
        assert!(matches!(result, Err(RenderError::Decode(_))));
    }

    #[test]
    fn test_render_rejects_empty_original() {
        let empty = ImagePayload::new(Vec::new());
        let result = render(&empty, &TransformParameters::default());
        assert_eq!(result, Err(RenderError::Decode(DecodeError::Empty)));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating a small random RGBA image.
    fn image_strategy() -> impl Strategy<Value = DecodedImage> {
        (1u32..=12, 1u32..=12).prop_flat_map(|(w, h)| {
            let size = w as usize * h as usize * 4;
            prop::collection::vec(any::<u8>(), size..=size)
                .prop_map(move |pixels| DecodedImage::new(w, h, pixels))
        })
    }

    /// Strategy for generating in-range parameters.
    fn params_strategy() -> impl Strategy<Value = TransformParameters> {
        (
            0.5f32..=2.0,
            0.5f32..=2.0,
            0.5f32..=2.0,
            0.0f32..=10.0,
            -180.0f32..=180.0,
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(
                |(brightness, contrast, saturation, blur, rotation, fh, fv)| TransformParameters {
                    brightness,
                    contrast,
                    saturation,
                    blur,
                    rotation,
                    flip_horizontal: fh,
                    flip_vertical: fv,
                },
            )
    }

    proptest! {
        /// Property: Rendering twice with the same inputs gives identical bytes.
        #[test]
        fn prop_render_is_idempotent(image in image_strategy(), params in params_strategy()) {
            let original = ImagePayload::new(
                encode_png(&image.pixels, image.width, image.height).unwrap(),
            );
            let first = render(&original, &params).unwrap();
            let second = render(&original, &params).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Property: Default parameters reproduce the original pixels.
        #[test]
        fn prop_default_is_identity(image in image_strategy()) {
            let rendered = render_decoded(&image, &TransformParameters::default());
            prop_assert_eq!(rendered, image);
        }

        /// Property: The output surface always has the original's size.
        #[test]
        fn prop_dimensions_preserved(image in image_strategy(), params in params_strategy()) {
            let rendered = render_decoded(&image, &params);
            prop_assert_eq!(rendered.width, image.width);
            prop_assert_eq!(rendered.height, image.height);
            prop_assert_eq!(rendered.pixels.len(), image.pixels.len());
        }
    }
}
