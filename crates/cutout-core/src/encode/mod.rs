//! Image encoding for Cutout.
//!
//! Every rendered payload is PNG: it is lossless, so re-rendering with
//! default parameters reproduces the original pixels, and it keeps the
//! transparency around extracted objects.

mod png;

pub use png::{encode_png, EncodeError};
