//! Separable Gaussian blur.
//!
//! The blur radius is the Gaussian standard deviation in pixels, matching
//! the CSS `blur()` function. The kernel extends to `ceil(3 * sigma)` on
//! each side. Samples beyond the surface count as transparent black, the
//! way a canvas treats the area outside the drawn image.

use crate::decode::CHANNELS;

/// Build a normalized 1D Gaussian kernel for the given standard deviation.
///
/// The returned kernel has odd length `2 * ceil(3 * sigma) + 1` and sums to 1.
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil().max(0.0) as usize;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-(x * x) / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Blur RGBA pixel data in place.
///
/// # Arguments
/// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `sigma` - Standard deviation in pixels; `<= 0` leaves the pixels alone
pub fn apply_gaussian_blur(pixels: &mut [u8], width: u32, height: u32, sigma: f32) {
    if sigma <= 0.0 || !sigma.is_finite() || width == 0 || height == 0 {
        return;
    }

    let (w, h) = (width as usize, height as usize);
    debug_assert_eq!(pixels.len(), w * h * CHANNELS);

    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;

    // Premultiply so transparent neighbours contribute no color
    let source: Vec<[f32; 4]> = pixels
        .chunks_exact(CHANNELS)
        .map(|p| {
            let a = p[3] as f32 / 255.0;
            [p[0] as f32 * a, p[1] as f32 * a, p[2] as f32 * a, p[3] as f32]
        })
        .collect();

    let mut horizontal = vec![[0.0f32; 4]; w * h];
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (k, weight) in kernel.iter().enumerate() {
                let sx = x as isize + k as isize - radius;
                if sx < 0 || sx >= w as isize {
                    continue;
                }
                let p = source[row + sx as usize];
                for c in 0..4 {
                    acc[c] += p[c] * weight;
                }
            }
            horizontal[row + x] = acc;
        }
    }

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (k, weight) in kernel.iter().enumerate() {
                let sy = y as isize + k as isize - radius;
                if sy < 0 || sy >= h as isize {
                    continue;
                }
                let p = horizontal[sy as usize * w + x];
                for c in 0..4 {
                    acc[c] += p[c] * weight;
                }
            }

            let idx = (y * w + x) * CHANNELS;
            let alpha = acc[3];
            if alpha <= 0.0 {
                pixels[idx..idx + CHANNELS].fill(0);
                continue;
            }
            let scale = 255.0 / alpha;
            for c in 0..3 {
                pixels[idx + c] = (acc[c] * scale).clamp(0.0, 255.0).round() as u8;
            }
            pixels[idx + 3] = alpha.clamp(0.0, 255.0).round() as u8;
        }
    }
}
