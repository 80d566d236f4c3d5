//! Per-pixel color filters: brightness, contrast and saturate.
//!
//! Formulas match the CSS `brightness()`, `contrast()` and `saturate()`
//! filter functions. Each function clamps its result to [0, 1] before the
//! next one runs.

use crate::decode::CHANNELS;
use crate::TransformParameters;

/// Apply brightness, contrast and saturation to RGBA pixel data in place.
///
/// # Arguments
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `params` - Only the color multipliers are read
pub fn apply_color_filters(pixels: &mut [u8], params: &TransformParameters) {
    let brightness = params.brightness;
    let contrast = params.contrast;
    let saturation = params.saturation;

    // Early exit if all functions are neutral
    if brightness == 1.0 && contrast == 1.0 && saturation == 1.0 {
        return;
    }

    for chunk in pixels.chunks_exact_mut(CHANNELS) {
        // Fully transparent pixels carry no visible color
        if chunk[3] == 0 {
            continue;
        }

        let mut r = chunk[0] as f32 / 255.0;
        let mut g = chunk[1] as f32 / 255.0;
        let mut b = chunk[2] as f32 / 255.0;

        (r, g, b) = apply_brightness(r, g, b, brightness);
        (r, g, b) = apply_contrast(r, g, b, contrast);
        (r, g, b) = apply_saturation(r, g, b, saturation);

        chunk[0] = to_byte(r);
        chunk[1] = to_byte(g);
        chunk[2] = to_byte(b);
    }
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn clamp3(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    (r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
}

/// brightness(b): linear multiplier.
///
/// Formula: `output = input * b`
#[inline]
fn apply_brightness(r: f32, g: f32, b: f32, amount: f32) -> (f32, f32, f32) {
    if amount == 1.0 {
        return (r, g, b);
    }
    clamp3(r * amount, g * amount, b * amount)
}

/// contrast(c): scale around mid-gray.
///
/// Formula: `output = (input - 0.5) * c + 0.5`
#[inline]
fn apply_contrast(r: f32, g: f32, b: f32, amount: f32) -> (f32, f32, f32) {
    if amount == 1.0 {
        return (r, g, b);
    }
    let intercept = 0.5 - 0.5 * amount;
    clamp3(
        r * amount + intercept,
        g * amount + intercept,
        b * amount + intercept,
    )
}

/// saturate(s): the Filter Effects color matrix.
///
/// ```text
/// | 0.213+0.787s  0.715-0.715s  0.072-0.072s |
/// | 0.213-0.213s  0.715+0.285s  0.072-0.072s |
/// | 0.213-0.213s  0.715-0.715s  0.072+0.928s |
/// ```
#[inline]
fn apply_saturation(r: f32, g: f32, b: f32, s: f32) -> (f32, f32, f32) {
    if s == 1.0 {
        return (r, g, b);
    }
    clamp3(
        (0.213 + 0.787 * s) * r + (0.715 - 0.715 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 + 0.285 * s) * g + (0.072 - 0.072 * s) * b,
        (0.213 - 0.213 * s) * r + (0.715 - 0.715 * s) * g + (0.072 + 0.928 * s) * b,
    )
}
