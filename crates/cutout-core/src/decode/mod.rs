//! Image decoding for Cutout.
//!
//! Payloads are decoded into straight-alpha RGBA pixels. Extracted objects
//! are transparent outside their mask, so the alpha channel is always kept.
//!
//! # Examples
//!
//! ```ignore
//! use cutout_core::decode::decode_image;
//!
//! let png_bytes = std::fs::read("object.png").unwrap();
//! let image = decode_image(&png_bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod raster;
mod types;

pub use raster::decode_image;
pub use types::{DecodeError, DecodedImage, CHANNELS};
