#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use imageruler_image as image;

#[doc(inline)]
pub use imageruler_morphology as morphology;

#[doc(inline)]
pub use imageruler_lengthscale as lengthscale;

pub use imageruler_image::{BinaryImage, ImageSize};
pub use imageruler_lengthscale::{
    length_violation, length_violation_solid, length_violation_void, minimum_length,
    minimum_length_solid, minimum_length_solid_void, minimum_length_void, ConstraintMode,
    LengthScaleResult, SearchParams,
};
pub use imageruler_morphology::{
    binary_close, binary_dilate, binary_erode, binary_open, get_kernel, KernelShape, PaddingMode,
};
