use std::str::FromStr;

use crate::error::MorphologyError;

/// Shapes of morphological [`Kernel`]s.
///
/// All kernels are centered at their geometric center: the middle pixel for odd
/// extents, the corner shared by the four middle pixels for even extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum KernelShape {
    /// A disk (circular) structuring element.
    ///
    /// Pixels whose center lies within the radius of the kernel center are included.
    Disk,

    /// A square box structuring element.
    ///
    /// All pixels within the box are included in the morphological operation.
    Square,
}

impl FromStr for KernelShape {
    type Err = MorphologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disk" | "circle" => Ok(KernelShape::Disk),
            "square" => Ok(KernelShape::Square),
            other => Err(MorphologyError::InvalidShapeParameter(format!(
                "unknown kernel shape '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for KernelShape {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            KernelShape::Disk => write!(f, "disk"),
            KernelShape::Square => write!(f, "square"),
        }
    }
}

/// A morphological structuring element.
///
/// The kernel stores a square binary mask of `size x size` pixels where `true`
/// marks the pixels included in the operation. During a scan the kernel pixel at
/// [`Kernel::anchor`] is aligned with the output pixel.
///
/// # Example
///
/// ```rust
/// use imageruler_morphology::{get_kernel, KernelShape};
///
/// let kernel = get_kernel(KernelShape::Square, 3.0).unwrap();
/// assert_eq!(kernel.size(), 3);
/// assert_eq!(kernel.anchor(), (1, 1));
/// assert_eq!(kernel.area(), 9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    shape: KernelShape,
    size: usize,
    data: Vec<bool>,
}

impl Kernel {
    /// Create a kernel of the given shape spanning `size x size` pixels.
    ///
    /// The rasterization radius is `size / 2`, measured from the geometric center.
    ///
    /// # Errors
    ///
    /// Returns [`MorphologyError::InvalidShapeParameter`] if `size` is zero or the
    /// `size x size` mask cannot be allocated.
    pub fn new(shape: KernelShape, size: usize) -> Result<Self, MorphologyError> {
        if size == 0 {
            return Err(MorphologyError::InvalidShapeParameter(
                "kernel size must be at least one pixel".to_string(),
            ));
        }

        let area = size
            .checked_mul(size)
            .filter(|&area| area <= isize::MAX as usize)
            .ok_or_else(|| {
                MorphologyError::InvalidShapeParameter(format!(
                    "kernel size {size} is too large"
                ))
            })?;

        let mut data = Vec::new();
        data.try_reserve_exact(area).map_err(|e| {
            MorphologyError::InvalidShapeParameter(format!(
                "cannot allocate a kernel of size {size}: {e}"
            ))
        })?;
        data.resize(area, false);

        let center = (size as f64 - 1.0) / 2.0;
        let radius = size as f64 / 2.0;

        for r in 0..size {
            for c in 0..size {
                let dy = r as f64 - center;
                let dx = c as f64 - center;
                data[r * size + c] = match shape {
                    KernelShape::Disk => dx * dx + dy * dy <= radius * radius,
                    KernelShape::Square => dx.abs() <= radius && dy.abs() <= radius,
                };
            }
        }

        Ok(Self { shape, size, data })
    }

    /// Get the shape of the kernel.
    pub fn shape(&self) -> KernelShape {
        self.shape
    }

    /// Get the side length of the kernel in pixels.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the kernel pixel at `(row, col)` is active.
    pub fn is_active(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.data[row * self.size + col]
    }

    /// Number of active pixels.
    pub fn area(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Get the rasterization radius in pixels.
    pub fn radius(&self) -> f64 {
        self.size as f64 / 2.0
    }

    /// Get the anchor pixel `(row, col)` aligned with the output pixel during a scan.
    ///
    /// For even sizes the anchor is the lower-right of the four middle pixels.
    pub fn anchor(&self) -> (usize, usize) {
        (self.size / 2, self.size / 2)
    }

    /// Offsets `(dy, dx)` of the active pixels relative to the anchor.
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let (ay, ax) = self.anchor();
        let mut offsets = Vec::with_capacity(self.area());
        for r in 0..self.size {
            for c in 0..self.size {
                if self.data[r * self.size + c] {
                    offsets.push((r as isize - ay as isize, c as isize - ax as isize));
                }
            }
        }
        offsets
    }
}

/// Pixel extent of a kernel with the given diameter.
///
/// # Errors
///
/// Returns [`MorphologyError::InvalidShapeParameter`] if `diameter` is not a
/// positive finite number, or if a `size x size` mask would not fit in memory.
pub fn kernel_size(diameter: f64) -> Result<usize, MorphologyError> {
    if !(diameter.is_finite() && diameter > 0.0) {
        return Err(MorphologyError::InvalidShapeParameter(format!(
            "diameter must be positive and finite, got {diameter}"
        )));
    }

    // usize::MAX as f64 rounds up, so this also rejects the saturating casts
    let extent = diameter.ceil();
    if extent >= usize::MAX as f64 {
        return Err(MorphologyError::InvalidShapeParameter(format!(
            "diameter {diameter} exceeds the addressable kernel size"
        )));
    }

    let size = extent as usize;
    match size.checked_mul(size) {
        Some(area) if area <= isize::MAX as usize => Ok(size),
        _ => Err(MorphologyError::InvalidShapeParameter(format!(
            "diameter {diameter} exceeds the addressable kernel size"
        ))),
    }
}

/// Build a kernel of the given shape and diameter.
///
/// The diameter is measured in pixels and rasterized on `n = ⌈diameter⌉` pixels per
/// side. A fractional diameter snaps to the pixel extent: the disk radius is `n / 2`,
/// not `diameter / 2`, so every diameter in `(n - 1, n]` yields the same kernel.
/// For example diameters 9.1 and 10.0 both give the 10 pixel disk.
///
/// # Arguments
///
/// * `shape` - The shape of the kernel.
/// * `diameter` - The kernel diameter in pixels.
///
/// # Errors
///
/// Returns [`MorphologyError::InvalidShapeParameter`] if `diameter` is not a
/// positive finite number.
///
/// # Example
///
/// ```rust
/// use imageruler_morphology::{get_kernel, KernelShape};
///
/// let kernel = get_kernel(KernelShape::Disk, 4.0).unwrap();
/// assert_eq!(kernel.size(), 4);
/// // corners fall outside the disk
/// assert!(!kernel.is_active(0, 0));
/// assert!(kernel.is_active(0, 1));
/// ```
pub fn get_kernel(shape: KernelShape, diameter: f64) -> Result<Kernel, MorphologyError> {
    Kernel::new(shape, kernel_size(diameter)?)
}
