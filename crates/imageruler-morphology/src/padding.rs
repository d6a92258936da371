use std::str::FromStr;

use imageruler_image::BinaryImage;

use crate::error::MorphologyError;

/// A border type for windowed scans: the value assumed for pixels outside the image.
///
/// The mode is fixed for a whole morphology call and applies to every out-of-bounds
/// sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PaddingMode {
    /// Everything outside the image is solid.
    ///
    /// Example: ...d c b a | 1 1 1 1...
    Solid,

    /// Everything outside the image is void.
    ///
    /// Example: ...d c b a | 0 0 0 0...
    Void,

    /// The outermost row or column of pixels is repeated into the padded region.
    ///
    /// Example: ...d c b a | a a a a...
    Edge,

    /// The image tiles the plane periodically.
    ///
    /// Example: ...d c b a | w x y z...
    Periodic,

    /// Samples outside the image are skipped.
    ///
    /// The kernel must fit inside the image in both directions.
    Ignore,
}

impl PaddingMode {
    #[inline]
    fn wrap(i: isize, len: usize) -> usize {
        i.rem_euclid(len as isize) as usize
    }

    /// Sample `image` at `(row, col)`, resolving off-grid positions by this mode.
    ///
    /// Returns `None` only for off-grid samples under [`PaddingMode::Ignore`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use imageruler_image::BinaryImage;
    /// use imageruler_morphology::PaddingMode;
    ///
    /// let image = BinaryImage::from_rows(&[[true, false, false]]).unwrap();
    /// assert_eq!(PaddingMode::Solid.sample(&image, 0, 3), Some(true));
    /// assert_eq!(PaddingMode::Edge.sample(&image, 0, -2), Some(true));
    /// assert_eq!(PaddingMode::Periodic.sample(&image, 0, 3), Some(true));
    /// assert_eq!(PaddingMode::Ignore.sample(&image, -1, 0), None);
    /// ```
    #[inline]
    pub fn sample(&self, image: &BinaryImage, row: isize, col: isize) -> Option<bool> {
        let height = image.height();
        let width = image.width();

        if row >= 0 && col >= 0 && (row as usize) < height && (col as usize) < width {
            return Some(image.get_unchecked(row as usize, col as usize));
        }

        match self {
            PaddingMode::Solid => Some(true),
            PaddingMode::Void => Some(false),
            PaddingMode::Edge => Some(image.get_unchecked(
                row.clamp(0, height as isize - 1) as usize,
                col.clamp(0, width as isize - 1) as usize,
            )),
            PaddingMode::Periodic => {
                Some(image.get_unchecked(Self::wrap(row, height), Self::wrap(col, width)))
            }
            PaddingMode::Ignore => None,
        }
    }

    /// The mode with solid and void exchanged.
    ///
    /// Complementing an image and swapping its padding describes the same extended
    /// pattern with the roles of solid and void reversed.
    pub fn swapped(&self) -> Self {
        match self {
            PaddingMode::Solid => PaddingMode::Void,
            PaddingMode::Void => PaddingMode::Solid,
            other => *other,
        }
    }
}

impl FromStr for PaddingMode {
    type Err = MorphologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solid" => Ok(PaddingMode::Solid),
            "void" => Ok(PaddingMode::Void),
            "edge" | "replicate" => Ok(PaddingMode::Edge),
            "periodic" | "wrap" => Ok(PaddingMode::Periodic),
            "ignore" | "none" => Ok(PaddingMode::Ignore),
            other => Err(MorphologyError::InvalidPaddingMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for PaddingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            PaddingMode::Solid => "solid",
            PaddingMode::Void => "void",
            PaddingMode::Edge => "edge",
            PaddingMode::Periodic => "periodic",
            PaddingMode::Ignore => "ignore",
        };
        write!(f, "{name}")
    }
}
