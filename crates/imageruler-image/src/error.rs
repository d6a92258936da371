/// An error type for the image module.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    /// Error when the input is not a valid 2-D boolean grid.
    #[error("Invalid image type: {0}")]
    InvalidImageType(String),

    /// Error when two images that must match in size do not.
    #[error("Image size ({0}x{1}) does not match the expected size ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the pixel pitch is not a positive finite number.
    #[error("Pixel size must be positive and finite, got {0}")]
    InvalidPixelSize(f64),
}
