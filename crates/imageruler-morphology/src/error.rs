use imageruler_image::ImageError;

/// Errors related to morphological operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MorphologyError {
    /// Unknown shape tag or a diameter that is not a positive finite number.
    #[error("Invalid kernel shape parameter: {0}")]
    InvalidShapeParameter(String),

    /// Unknown padding tag.
    #[error("Invalid padding mode: {0}")]
    InvalidPaddingMode(String),

    /// The kernel footprint exceeds the image under a padding mode that forbids it.
    #[error("Kernel of size {kernel_size} does not fit in a {width}x{height} image")]
    DimensionMismatch {
        /// Pixel extent of the kernel.
        kernel_size: usize,
        /// Image width in pixels.
        width: usize,
        /// Image height in pixels.
        height: usize,
    },

    /// Error propagated from an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),
}
