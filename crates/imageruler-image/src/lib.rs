#![deny(missing_docs)]
//! Binary design images for length-scale measurement.

/// binary image representation.
pub mod image;

/// Error types for the image module.
pub mod error;

/// pixelwise logical operations on binary images.
pub mod ops;

/// serde support for [`BinaryImage`], enabled with the `serde` feature.
#[cfg(feature = "serde")]
pub mod serde;

pub use crate::error::ImageError;
pub use crate::image::{BinaryImage, ImageSize};
