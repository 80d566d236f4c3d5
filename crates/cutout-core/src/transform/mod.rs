//! Geometric transform: flips and rotation about the image center.
//!
//! The output surface always keeps the source dimensions. Rotated corners
//! that leave the surface are clipped, and uncovered areas stay transparent,
//! exactly as drawing into a fixed-size canvas does.
//!
//! # Transform Order
//!
//! The forward matrix is composed the way canvas calls are issued:
//! 1. Translate to center
//! 2. Horizontal flip (scale x by -1)
//! 3. Vertical flip (scale y by -1)
//! 4. Rotate
//! 5. Translate back
//!
//! A source point is therefore rotated first and mirrored second. The order
//! is fixed and does not depend on the order the parameters were set in.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, y grows downward
//! - Rotation angles are in degrees, positive = clockwise on screen

mod geometry;

pub use geometry::{apply_geometry, AffineTransform};
