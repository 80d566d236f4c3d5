//! Flip and rotation with bilinear sampling on a fixed-size surface.
//!
//! # Algorithm
//!
//! The forward matrix `M` is built with the same right-multiplying calls a
//! canvas context uses. Rendering inverts it: for each destination pixel
//! center `p`, the source position is `M⁻¹ · p`, sampled bilinearly on
//! premultiplied color. Positions outside the source give transparent pixels.

use crate::decode::{DecodedImage, CHANNELS};
use crate::TransformParameters;

/// A 2D affine matrix in canvas layout.
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Post-multiply by a translation.
    pub fn translate(self, tx: f64, ty: f64) -> Self {
        Self {
            e: self.a * tx + self.c * ty + self.e,
            f: self.b * tx + self.d * ty + self.f,
            ..self
        }
    }

    /// Post-multiply by a scale.
    pub fn scale(self, sx: f64, sy: f64) -> Self {
        Self {
            a: self.a * sx,
            b: self.b * sx,
            c: self.c * sy,
            d: self.d * sy,
            ..self
        }
    }

    /// Post-multiply by a rotation (radians, clockwise on a y-down surface).
    pub fn rotate(self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: self.a * cos + self.c * sin,
            b: self.b * cos + self.d * sin,
            c: -self.a * sin + self.c * cos,
            d: -self.b * sin + self.d * cos,
            ..self
        }
    }

    /// Inverse matrix, `None` when singular.
    pub fn invert(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        Some(Self {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }

    /// Map a point through the matrix.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// The forward matrix for a parameter set on a `width` x `height` surface.
    pub fn for_parameters(params: &TransformParameters, width: u32, height: u32) -> Self {
        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0;

        let mut m = Self::IDENTITY.translate(cx, cy);
        if params.flip_horizontal {
            m = m.scale(-1.0, 1.0);
        }
        if params.flip_vertical {
            m = m.scale(1.0, -1.0);
        }
        m.rotate((params.rotation as f64).to_radians())
            .translate(-cx, -cy)
    }
}

/// Draw `image` through the flip/rotation parameters onto a same-size surface.
///
/// Brightness, contrast, saturation and blur are ignored here.
pub fn apply_geometry(image: &DecodedImage, params: &TransformParameters) -> DecodedImage {
    // Fast path: exact copy
    if params.is_identity_geometry() || image.is_empty() {
        return image.clone();
    }

    let forward = AffineTransform::for_parameters(params, image.width, image.height);
    let Some(inverse) = forward.invert() else {
        return DecodedImage::transparent(image.width, image.height);
    };

    let mut output = DecodedImage::transparent(image.width, image.height);
    for dst_y in 0..image.height {
        for dst_x in 0..image.width {
            // Map the destination pixel center back into the source, then
            // shift to index space where pixel centers sit on integers.
            let (sx, sy) = inverse.apply(dst_x as f64 + 0.5, dst_y as f64 + 0.5);
            let pixel = sample_bilinear(image, sx - 0.5, sy - 0.5);

            let idx = (dst_y as usize * image.width as usize + dst_x as usize) * CHANNELS;
            output.pixels[idx..idx + CHANNELS].copy_from_slice(&pixel);
        }
    }
    output
}

/// Sample a pixel using bilinear interpolation on premultiplied color.
///
/// `x`/`y` are in index space. Positions more than half a pixel outside the
/// image are transparent; within that margin the edge pixels are extended.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = (image.width as f64, image.height as f64);
    if x < -0.5 || y < -0.5 || x >= w - 0.5 || y >= h - 0.5 {
        return [0, 0, 0, 0];
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);
    let (max_x, max_y) = (image.width as i64 - 1, image.height as i64 - 1);

    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];

    let mut acc = [0.0f64; 4];
    for (px, py, weight) in taps {
        if weight == 0.0 {
            continue;
        }
        let p = image.pixel(px.clamp(0, max_x) as u32, py.clamp(0, max_y) as u32);
        let alpha = p[3] as f64 / 255.0;
        acc[0] += p[0] as f64 * alpha * weight;
        acc[1] += p[1] as f64 * alpha * weight;
        acc[2] += p[2] as f64 * alpha * weight;
        acc[3] += p[3] as f64 * weight;
    }

    let alpha = acc[3];
    if alpha <= 0.0 {
        return [0, 0, 0, 0];
    }
    let scale = 255.0 / alpha;
    [
        (acc[0] * scale).clamp(0.0, 255.0).round() as u8,
        (acc[1] * scale).clamp(0.0, 255.0).round() as u8,
        (acc[2] * scale).clamp(0.0, 255.0).round() as u8,
        alpha.clamp(0.0, 255.0).round() as u8,
    ]
}
