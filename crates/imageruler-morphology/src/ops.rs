use imageruler_image::BinaryImage;
use rayon::prelude::*;

use crate::error::MorphologyError;
use crate::kernels::Kernel;
use crate::padding::PaddingMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Erode,
    Dilate,
}

fn check_kernel_fits(
    src: &BinaryImage,
    kernel: &Kernel,
    padding: PaddingMode,
) -> Result<(), MorphologyError> {
    if padding == PaddingMode::Ignore
        && (kernel.size() > src.width() || kernel.size() > src.height())
    {
        return Err(MorphologyError::DimensionMismatch {
            kernel_size: kernel.size(),
            width: src.width(),
            height: src.height(),
        });
    }
    Ok(())
}

// Windowed min (erode) or max (dilate) scan. Dilation probes the point-reflected
// footprint so that opening never adds and closing never removes pixels, also for
// even-sized kernels whose anchor is off the geometric center.
fn scan(
    src: &BinaryImage,
    kernel: &Kernel,
    padding: PaddingMode,
    op: Scan,
) -> Result<BinaryImage, MorphologyError> {
    check_kernel_fits(src, kernel, padding)?;

    log::trace!(
        "{op:?} {}x{} image with {} kernel of size {} ({padding} padding)",
        src.width(),
        src.height(),
        kernel.shape(),
        kernel.size()
    );

    let offsets: Vec<(isize, isize)> = match op {
        Scan::Erode => kernel.offsets(),
        Scan::Dilate => kernel
            .offsets()
            .into_iter()
            .map(|(dy, dx)| (-dy, -dx))
            .collect(),
    };

    let width = src.width();
    let mut dst = vec![false; width * src.height()];

    dst.par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, row_chunk)| {
            for (col, out) in row_chunk.iter_mut().enumerate() {
                let mut samples = offsets.iter().filter_map(|&(dy, dx)| {
                    padding.sample(src, row as isize + dy, col as isize + dx)
                });
                *out = match op {
                    Scan::Erode => samples.all(|v| v),
                    Scan::Dilate => samples.any(|v| v),
                };
            }
        });

    Ok(src.with_data(dst)?)
}

/// Erode a binary image using a [`Kernel`].
///
/// Erosion shrinks solid regions. An output pixel is solid iff every pixel of the
/// kernel footprint anchored on it is solid; off-grid pixels are resolved by
/// `padding`. Solid regions that cannot contain the kernel anywhere disappear.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `kernel` - The morphological structuring element ([`Kernel`]).
/// * `padding` - The border handling mode ([`PaddingMode`]).
///
/// # Returns
///
/// A new image with the size and pixel pitch of `src`.
///
/// # Errors
///
/// Returns [`MorphologyError::DimensionMismatch`] if the kernel does not fit in the
/// image under [`PaddingMode::Ignore`].
///
/// # Example
///
/// ```rust
/// use imageruler_image::BinaryImage;
/// use imageruler_morphology::{binary_erode, get_kernel, KernelShape, PaddingMode};
///
/// let image = BinaryImage::from_rows(&[
///     [false, true, true, true, false],
///     [false, true, true, true, false],
///     [false, true, true, true, false],
/// ]).unwrap();
///
/// let kernel = get_kernel(KernelShape::Square, 3.0).unwrap();
/// let eroded = binary_erode(&image, &kernel, PaddingMode::Edge).unwrap();
///
/// assert_eq!(eroded.count_solid(), 3);
/// assert_eq!(eroded.get(1, 2), Some(true));
/// ```
pub fn binary_erode(
    src: &BinaryImage,
    kernel: &Kernel,
    padding: PaddingMode,
) -> Result<BinaryImage, MorphologyError> {
    scan(src, kernel, padding, Scan::Erode)
}

/// Dilate a binary image using a [`Kernel`].
///
/// Dilation grows solid regions. An output pixel is solid iff the kernel footprint
/// anchored on it touches a solid pixel; off-grid pixels are resolved by `padding`.
/// Void regions that cannot contain the kernel anywhere are filled.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `kernel` - The morphological structuring element ([`Kernel`]).
/// * `padding` - The border handling mode ([`PaddingMode`]).
///
/// # Returns
///
/// A new image with the size and pixel pitch of `src`.
///
/// # Errors
///
/// Returns [`MorphologyError::DimensionMismatch`] if the kernel does not fit in the
/// image under [`PaddingMode::Ignore`].
pub fn binary_dilate(
    src: &BinaryImage,
    kernel: &Kernel,
    padding: PaddingMode,
) -> Result<BinaryImage, MorphologyError> {
    scan(src, kernel, padding, Scan::Dilate)
}

/// Opening: erosion followed by dilation.
///
/// Removes solid features narrower than the kernel and keeps the shape of wide
/// solid regions away from their thin parts.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `kernel` - The morphological structuring element ([`Kernel`]).
/// * `padding` - The border handling mode ([`PaddingMode`]), used by both steps.
pub fn binary_open(
    src: &BinaryImage,
    kernel: &Kernel,
    padding: PaddingMode,
) -> Result<BinaryImage, MorphologyError> {
    let eroded = binary_erode(src, kernel, padding)?;
    binary_dilate(&eroded, kernel, padding)
}

/// Closing: dilation followed by erosion.
///
/// Fills void gaps and indentations narrower than the kernel.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `kernel` - The morphological structuring element ([`Kernel`]).
/// * `padding` - The border handling mode ([`PaddingMode`]), used by both steps.
pub fn binary_close(
    src: &BinaryImage,
    kernel: &Kernel,
    padding: PaddingMode,
) -> Result<BinaryImage, MorphologyError> {
    let dilated = binary_dilate(src, kernel, padding)?;
    binary_erode(&dilated, kernel, padding)
}
