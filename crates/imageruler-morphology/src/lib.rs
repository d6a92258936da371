#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the morphology module.
pub mod error;

/// structuring element construction.
pub mod kernels;

/// memoized kernel construction.
pub mod cache;

/// boundary handling for windowed scans.
pub mod padding;

/// erosion, dilation, opening and closing.
pub mod ops;

pub use cache::KernelCache;
pub use error::MorphologyError;
pub use kernels::{get_kernel, Kernel, KernelShape};
pub use ops::{binary_close, binary_dilate, binary_erode, binary_open};
pub use padding::PaddingMode;
