//! Compositing filter chain.
//!
//! Mirrors the CSS Filter Effects functions a 2D canvas applies when its
//! `filter` property is `brightness(b) contrast(c) saturate(s) blur(r px)`.
//!
//! ## Filter Order
//! 1. Brightness
//! 2. Contrast
//! 3. Saturation
//! 4. Blur
//!
//! Color functions work on straight-alpha RGBA and leave alpha alone. Blur
//! works on premultiplied color so transparent pixels do not bleed black
//! into the object edges.

mod blur;
mod color;

pub use blur::{apply_gaussian_blur, gaussian_kernel};
pub use color::apply_color_filters;

use crate::decode::DecodedImage;
use crate::TransformParameters;

/// Apply the full filter chain to an image in place.
pub fn apply_filter_chain(image: &mut DecodedImage, params: &TransformParameters) {
    apply_color_filters(&mut image.pixels, params);
    apply_gaussian_blur(&mut image.pixels, image.width, image.height, params.blur);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chain_is_identity() {
        let mut image = DecodedImage::new(2, 1, vec![10, 200, 30, 255, 99, 1, 250, 128]);
        let original = image.clone();
        apply_filter_chain(&mut image, &TransformParameters::default());
        assert_eq!(image, original);
    }

    #[test]
    fn test_chain_runs_color_then_blur() {
        let mut image = DecodedImage::new(1, 1, vec![100, 100, 100, 255]);
        let mut params = TransformParameters::default();
        params.brightness = 1.5;
        params.blur = 2.0;
        apply_filter_chain(&mut image, &params);
        // A lone opaque pixel blurred into transparent surroundings keeps its
        // (brightened) color and loses most of its alpha.
        assert_eq!(&image.pixels[0..3], &[150, 150, 150]);
        assert!(image.pixels[3] < 255);
    }
}
