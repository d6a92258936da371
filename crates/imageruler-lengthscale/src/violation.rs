use std::str::FromStr;

use imageruler_image::BinaryImage;
use imageruler_morphology::{binary_close, binary_open, Kernel, MorphologyError, PaddingMode};

use crate::error::LengthScaleError;

/// Which features a length scale constraint applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConstraintMode {
    /// Only solid features are constrained.
    Solid,
    /// Only void features are constrained.
    Void,
    /// Both solid and void features are constrained.
    SolidVoid,
}

impl ConstraintMode {
    /// Default boundary convention for this constraint.
    ///
    /// Solid checks treat the outside as void and void checks treat it as solid, so
    /// a feature cut by the image edge is measured by the part inside the image.
    /// Combined checks replicate the edge pixels.
    pub fn default_padding(&self) -> PaddingMode {
        match self {
            ConstraintMode::Solid => PaddingMode::Void,
            ConstraintMode::Void => PaddingMode::Solid,
            ConstraintMode::SolidVoid => PaddingMode::Edge,
        }
    }
}

impl FromStr for ConstraintMode {
    type Err = LengthScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solid" => Ok(ConstraintMode::Solid),
            "void" => Ok(ConstraintMode::Void),
            "solid_void" | "solid-void" | "both" => Ok(ConstraintMode::SolidVoid),
            other => Err(LengthScaleError::InvalidConstraintMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for ConstraintMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConstraintMode::Solid => write!(f, "solid"),
            ConstraintMode::Void => write!(f, "void"),
            ConstraintMode::SolidVoid => write!(f, "solid_void"),
        }
    }
}

/// Solid pixels that belong to a feature too narrow to contain the kernel.
///
/// Computed as `image AND NOT open(image)`; the result is always a subset of `image`.
///
/// # Example
///
/// ```rust
/// use imageruler_image::BinaryImage;
/// use imageruler_lengthscale::length_violation_solid;
/// use imageruler_morphology::{get_kernel, KernelShape, PaddingMode};
///
/// // a one pixel wide solid line
/// let image = BinaryImage::from_rows(&[
///     [false, false, false, false],
///     [true, true, true, true],
///     [false, false, false, false],
/// ]).unwrap();
///
/// let kernel = get_kernel(KernelShape::Disk, 2.0).unwrap();
/// let violations = length_violation_solid(&image, &kernel, PaddingMode::Void).unwrap();
/// assert_eq!(violations, image);
/// ```
pub fn length_violation_solid(
    image: &BinaryImage,
    kernel: &Kernel,
    padding: PaddingMode,
) -> Result<BinaryImage, MorphologyError> {
    let opened = binary_open(image, kernel, padding)?;
    Ok(image.and_not(&opened)?)
}

/// Void pixels that belong to a gap too narrow to contain the kernel.
///
/// Computed as `NOT image AND close(image)`; the result is always a subset of
/// `NOT image`.
pub fn length_violation_void(
    image: &BinaryImage,
    kernel: &Kernel,
    padding: PaddingMode,
) -> Result<BinaryImage, MorphologyError> {
    let closed = binary_close(image, kernel, padding)?;
    Ok(closed.and_not(image)?)
}

/// Violation mask for the given constraint mode.
///
/// [`ConstraintMode::SolidVoid`] yields the pixelwise OR of the solid and void masks.
pub fn length_violation(
    image: &BinaryImage,
    kernel: &Kernel,
    padding: PaddingMode,
    mode: ConstraintMode,
) -> Result<BinaryImage, MorphologyError> {
    match mode {
        ConstraintMode::Solid => length_violation_solid(image, kernel, padding),
        ConstraintMode::Void => length_violation_void(image, kernel, padding),
        ConstraintMode::SolidVoid => {
            let solid = length_violation_solid(image, kernel, padding)?;
            let void = length_violation_void(image, kernel, padding)?;
            Ok(solid.or(&void)?)
        }
    }
}

/// Bands along the image border, in pixels, whose violations are disregarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margin {
    /// Rows disregarded at the top.
    pub top: usize,
    /// Rows disregarded at the bottom.
    pub bottom: usize,
    /// Columns disregarded on the left.
    pub left: usize,
    /// Columns disregarded on the right.
    pub right: usize,
}

impl Margin {
    /// The same margin on all four sides.
    pub fn uniform(size: usize) -> Self {
        Self {
            top: size,
            bottom: size,
            left: size,
            right: size,
        }
    }

    fn contains(&self, row: usize, col: usize, width: usize, height: usize) -> bool {
        row < self.top
            || col < self.left
            || row + self.bottom >= height
            || col + self.right >= width
    }
}

/// Which violating pixels are disregarded besides the margin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IgnoreScheme {
    /// Every violation counts.
    #[default]
    None,
    /// Violations on a solid/void interface are disregarded.
    ///
    /// An interface pixel has a 4-neighbour inside the image with the opposite state.
    /// Discretized curved boundaries produce such violations at every diameter.
    Edges,
}

/// Filter applied to a violation mask before deciding whether it is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViolationFilter {
    /// Border bands whose violations are disregarded.
    pub margin: Margin,
    /// Interface handling.
    pub ignore: IgnoreScheme,
}

impl ViolationFilter {
    /// Whether the filter keeps every violation.
    pub fn is_identity(&self) -> bool {
        self.margin == Margin::default() && self.ignore == IgnoreScheme::None
    }

    /// Clear the disregarded pixels of `mask`, computed for `image`.
    ///
    /// # Errors
    ///
    /// Returns [`imageruler_image::ImageError::InvalidImageSize`] if `mask` and
    /// `image` differ in size.
    pub fn apply(
        &self,
        mask: &BinaryImage,
        image: &BinaryImage,
    ) -> Result<BinaryImage, LengthScaleError> {
        if mask.size() != image.size() {
            return Err(imageruler_image::ImageError::InvalidImageSize(
                mask.width(),
                mask.height(),
                image.width(),
                image.height(),
            )
            .into());
        }

        if self.is_identity() {
            return Ok(mask.clone());
        }

        let (width, height) = (image.width(), image.height());
        Ok(mask.from_fn_like(|row, col| {
            mask.get_unchecked(row, col)
                && !self.margin.contains(row, col, width, height)
                && !(self.ignore == IgnoreScheme::Edges && is_interface(image, row, col))
        }))
    }
}

fn is_interface(image: &BinaryImage, row: usize, col: usize) -> bool {
    let v = image.get_unchecked(row, col);
    let neighbors = [
        row.checked_sub(1).map(|r| (r, col)),
        Some((row + 1, col)),
        col.checked_sub(1).map(|c| (row, c)),
        Some((row, col + 1)),
    ];
    neighbors
        .into_iter()
        .flatten()
        .filter_map(|(r, c)| image.get(r, c))
        .any(|n| n != v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageruler_image::ImageSize;
    use imageruler_morphology::{get_kernel, KernelShape};

    fn vertical_bar(width: usize, height: usize, cols: std::ops::Range<usize>) -> BinaryImage {
        BinaryImage::from_size_val(ImageSize { width, height }, false)
            .expect("valid size")
            .from_fn_like(|_, c| cols.contains(&c))
    }

    fn checkerboard(size: usize) -> BinaryImage {
        BinaryImage::from_size_val(ImageSize::from([size, size]), false)
            .expect("valid size")
            .from_fn_like(|r, c| (r + c) % 2 == 0)
    }

    #[test]
    fn solid_violation_bar() -> Result<(), LengthScaleError> {
        let image = vertical_bar(10, 10, 3..6);

        let kernel = get_kernel(KernelShape::Disk, 3.0)?;
        let mask = length_violation_solid(&image, &kernel, PaddingMode::Void)?;
        assert!(!mask.any());

        let kernel = get_kernel(KernelShape::Disk, 4.0)?;
        let mask = length_violation_solid(&image, &kernel, PaddingMode::Void)?;
        assert_eq!(mask, image);
        Ok(())
    }

    #[test]
    fn void_violation_gap() -> Result<(), LengthScaleError> {
        let image = vertical_bar(10, 10, 4..6).not();

        let kernel = get_kernel(KernelShape::Disk, 2.0)?;
        let mask = length_violation_void(&image, &kernel, PaddingMode::Solid)?;
        assert!(!mask.any());

        let kernel = get_kernel(KernelShape::Disk, 3.0)?;
        let mask = length_violation_void(&image, &kernel, PaddingMode::Solid)?;
        assert_eq!(mask, image.not());
        Ok(())
    }

    #[test]
    fn checkerboard_violates_everywhere() -> Result<(), LengthScaleError> {
        let image = checkerboard(8);
        for diameter in [2.0, 3.0, 4.0] {
            let kernel = get_kernel(KernelShape::Disk, diameter)?;
            let solid = length_violation_solid(&image, &kernel, PaddingMode::Void)?;
            let void = length_violation_void(&image, &kernel, PaddingMode::Solid)?;
            assert_eq!(solid, image);
            assert_eq!(void, image.not());
        }
        Ok(())
    }

    #[test]
    fn combined_is_union() -> Result<(), LengthScaleError> {
        let image = checkerboard(6);
        let kernel = get_kernel(KernelShape::Square, 2.0)?;
        for padding in [PaddingMode::Edge, PaddingMode::Periodic, PaddingMode::Void] {
            let solid = length_violation(&image, &kernel, padding, ConstraintMode::Solid)?;
            let void = length_violation(&image, &kernel, padding, ConstraintMode::Void)?;
            let both = length_violation(&image, &kernel, padding, ConstraintMode::SolidVoid)?;
            assert_eq!(both, solid.or(&void)?);
        }
        Ok(())
    }

    #[test]
    fn masks_are_contained() -> Result<(), LengthScaleError> {
        let image = BinaryImage::from_rows(&[
            [true, true, false, false, true, false],
            [true, false, false, true, true, false],
            [false, false, true, true, true, true],
            [true, true, true, false, false, true],
            [false, true, false, false, true, true],
        ])?;
        for diameter in [1.0, 2.0, 3.0, 4.0] {
            let kernel = get_kernel(KernelShape::Disk, diameter)?;
            for padding in [
                PaddingMode::Solid,
                PaddingMode::Void,
                PaddingMode::Edge,
                PaddingMode::Periodic,
            ] {
                let solid = length_violation_solid(&image, &kernel, padding)?;
                let void = length_violation_void(&image, &kernel, padding)?;
                assert!(solid.is_subset_of(&image)?);
                assert!(void.is_subset_of(&image.not())?);
            }
        }
        Ok(())
    }

    #[test]
    fn solid_violation_count_is_monotone() -> Result<(), LengthScaleError> {
        // bars of width 1..=6 separated by void gaps of width 3
        let mut cols = Vec::new();
        for width in 1..=6 {
            cols.extend(std::iter::repeat(true).take(width));
            cols.extend(std::iter::repeat(false).take(3));
        }
        let rows = vec![cols; 8];
        let image = BinaryImage::from_rows(&rows)?;

        let mut previous = 0;
        for n in 1..=8 {
            let kernel = get_kernel(KernelShape::Disk, n as f64)?;
            let mask = length_violation_solid(&image, &kernel, PaddingMode::Periodic)?;
            let count = mask.count_solid();
            assert!(count >= previous, "n={n}: {count} < {previous}");
            // bars narrower than the kernel are fully flagged, the rest are kept
            let expected: usize = (1..=6).filter(|&w| w < n).map(|w| w * 8).sum();
            assert_eq!(count, expected, "n={n}");
            previous = count;
        }
        Ok(())
    }

    #[test]
    fn filter_margin() -> Result<(), LengthScaleError> {
        let image = BinaryImage::from_size_val(ImageSize::from([5, 4]), true)?;
        let filter = ViolationFilter {
            margin: Margin::uniform(1),
            ignore: IgnoreScheme::None,
        };
        let filtered = filter.apply(&image, &image)?;
        assert_eq!(filtered.count_solid(), 3 * 2);
        assert_eq!(filtered.get(0, 0), Some(false));
        assert_eq!(filtered.get(1, 1), Some(true));
        assert_eq!(filtered.get(2, 3), Some(true));
        assert_eq!(filtered.get(3, 3), Some(false));
        Ok(())
    }

    #[test]
    fn filter_edges() -> Result<(), LengthScaleError> {
        let image = vertical_bar(7, 3, 2..5);
        let mask = image.clone();
        let filter = ViolationFilter {
            margin: Margin::default(),
            ignore: IgnoreScheme::Edges,
        };
        let filtered = filter.apply(&mask, &image)?;
        // only the bar's middle column is away from the interface
        assert_eq!(filtered, vertical_bar(7, 3, 3..4));
        assert!(ViolationFilter::default().is_identity());
        assert_eq!(ViolationFilter::default().apply(&mask, &image)?, mask);
        Ok(())
    }

    #[test]
    fn parse_constraint_mode() {
        assert_eq!("solid".parse::<ConstraintMode>(), Ok(ConstraintMode::Solid));
        assert_eq!("Void".parse::<ConstraintMode>(), Ok(ConstraintMode::Void));
        assert_eq!("both".parse::<ConstraintMode>(), Ok(ConstraintMode::SolidVoid));
        assert!(matches!(
            "edges".parse::<ConstraintMode>(),
            Err(LengthScaleError::InvalidConstraintMode(_))
        ));
        assert_eq!(ConstraintMode::SolidVoid.to_string(), "solid_void");
        assert_eq!(ConstraintMode::Solid.default_padding(), PaddingMode::Void);
        assert_eq!(ConstraintMode::Void.default_padding(), PaddingMode::Solid);
    }
}
