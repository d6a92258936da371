use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use imageruler_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// A binary design: a row-major grid of solid (`true`) and void (`false`) pixels.
///
/// The image also carries its pixel pitch, the physical length represented by one
/// pixel. The pitch never affects morphology; it is only used to convert length
/// scales measured in pixels into physical units.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryImage {
    size: ImageSize,
    data: Vec<bool>,
    pixel_size: f64,
}

impl BinaryImage {
    /// Create a new binary image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The row-major pixel data of the image.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidImageType`] if the image has a zero dimension or
    /// the length of the pixel data does not match the image size.
    ///
    /// # Examples
    ///
    /// ```
    /// use imageruler_image::{BinaryImage, ImageSize};
    ///
    /// let image = BinaryImage::new(
    ///     ImageSize { width: 3, height: 2 },
    ///     vec![true, false, true, false, true, false],
    /// ).unwrap();
    ///
    /// assert_eq!(image.width(), 3);
    /// assert_eq!(image.height(), 2);
    /// assert_eq!(image.get(1, 1), Some(true));
    /// ```
    pub fn new(size: ImageSize, data: Vec<bool>) -> Result<Self, ImageError> {
        if size.width == 0 || size.height == 0 {
            return Err(ImageError::InvalidImageType(format!(
                "expected a non-empty 2-D grid, got {}x{}",
                size.width, size.height
            )));
        }

        if data.len() != size.width * size.height {
            return Err(ImageError::InvalidImageType(format!(
                "data length ({}) does not match the image size ({})",
                data.len(),
                size.width * size.height
            )));
        }

        Ok(Self {
            size,
            data,
            pixel_size: 1.0,
        })
    }

    /// Create a new binary image with every pixel set to `val`.
    pub fn from_size_val(size: ImageSize, val: bool) -> Result<Self, ImageError> {
        Self::new(size, vec![val; size.width * size.height])
    }

    /// Create a binary image from a list of rows.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidImageType`] if there are no rows, the rows are
    /// empty or the rows have different lengths.
    ///
    /// # Examples
    ///
    /// ```
    /// use imageruler_image::BinaryImage;
    ///
    /// let image = BinaryImage::from_rows(&[
    ///     vec![false, true, false],
    ///     vec![false, true, false],
    /// ]).unwrap();
    ///
    /// assert_eq!(image.count_solid(), 2);
    /// ```
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self, ImageError> {
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);

        if let Some(row) = rows.iter().find(|r| r.as_ref().len() != width) {
            return Err(ImageError::InvalidImageType(format!(
                "ragged rows: expected length {}, found {}",
                width,
                row.as_ref().len()
            )));
        }

        let data = rows
            .iter()
            .flat_map(|r| r.as_ref().iter().copied())
            .collect();

        Self::new(
            ImageSize {
                width,
                height: rows.len(),
            },
            data,
        )
    }

    /// Return the image with its pixel pitch set to `pixel_size`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidPixelSize`] if `pixel_size` is not positive and finite.
    pub fn with_pixel_size(mut self, pixel_size: f64) -> Result<Self, ImageError> {
        if !(pixel_size.is_finite() && pixel_size > 0.0) {
            return Err(ImageError::InvalidPixelSize(pixel_size));
        }
        self.pixel_size = pixel_size;
        Ok(self)
    }

    /// Build an image of the same size and pitch from new pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidImageType`] if the data length does not match.
    pub fn with_data(&self, data: Vec<bool>) -> Result<Self, ImageError> {
        if data.len() != self.data.len() {
            return Err(ImageError::InvalidImageType(format!(
                "data length ({}) does not match the image size ({})",
                data.len(),
                self.data.len()
            )));
        }
        Ok(self.with_data_unchecked(data))
    }

    pub(crate) fn with_data_unchecked(&self, data: Vec<bool>) -> Self {
        debug_assert_eq!(data.len(), self.data.len());
        Self {
            size: self.size,
            data,
            pixel_size: self.pixel_size,
        }
    }

    /// Build an image of the same size and pitch by evaluating `f(row, col)` at every pixel.
    pub fn from_fn_like(&self, f: impl Fn(usize, usize) -> bool) -> Self {
        let width = self.width();
        let data = (0..self.data.len()).map(|i| f(i / width, i % width)).collect();
        self.with_data_unchecked(data)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the physical length represented by one pixel.
    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    /// Get the pixel at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        Some(self.data[row * self.width() + col])
    }

    /// Get the pixel at `(row, col)` without bounds checking against the row width.
    ///
    /// # Panics
    ///
    /// Panics if the flat index is out of bounds.
    #[inline]
    pub fn get_unchecked(&self, row: usize, col: usize) -> bool {
        self.data[row * self.size.width + col]
    }

    /// Get the row-major pixel data.
    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    /// Number of solid pixels.
    pub fn count_solid(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Number of void pixels.
    pub fn count_void(&self) -> usize {
        self.data.len() - self.count_solid()
    }

    /// Whether any pixel is solid.
    ///
    /// For a violation mask this answers "is there any violation".
    pub fn any(&self) -> bool {
        self.data.iter().any(|&v| v)
    }

    /// Whether the image is entirely solid or entirely void.
    pub fn is_uniform(&self) -> bool {
        let first = self.data[0];
        self.data.iter().all(|&v| v == first)
    }
}
