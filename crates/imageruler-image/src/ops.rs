use crate::{BinaryImage, ImageError};

fn check_same_size(a: &BinaryImage, b: &BinaryImage) -> Result<(), ImageError> {
    if a.size() != b.size() {
        return Err(ImageError::InvalidImageSize(
            a.width(),
            a.height(),
            b.width(),
            b.height(),
        ));
    }
    Ok(())
}

fn zip_with(
    a: &BinaryImage,
    b: &BinaryImage,
    f: impl Fn(bool, bool) -> bool,
) -> Result<BinaryImage, ImageError> {
    check_same_size(a, b)?;
    let data = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| f(x, y))
        .collect();
    Ok(a.with_data_unchecked(data))
}

impl BinaryImage {
    /// Pixelwise logical NOT: swaps solid and void.
    ///
    /// # Examples
    ///
    /// ```
    /// use imageruler_image::BinaryImage;
    ///
    /// let image = BinaryImage::from_rows(&[[true, false]]).unwrap();
    /// assert_eq!(image.not().as_slice(), &[false, true]);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> BinaryImage {
        self.with_data_unchecked(self.as_slice().iter().map(|&v| !v).collect())
    }

    /// Pixelwise logical AND.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidImageSize`] if the images differ in size.
    pub fn and(&self, other: &BinaryImage) -> Result<BinaryImage, ImageError> {
        zip_with(self, other, |x, y| x && y)
    }

    /// Pixelwise logical OR.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidImageSize`] if the images differ in size.
    pub fn or(&self, other: &BinaryImage) -> Result<BinaryImage, ImageError> {
        zip_with(self, other, |x, y| x || y)
    }

    /// Pixelwise `self AND NOT other`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidImageSize`] if the images differ in size.
    pub fn and_not(&self, other: &BinaryImage) -> Result<BinaryImage, ImageError> {
        zip_with(self, other, |x, y| x && !y)
    }

    /// Whether every solid pixel of `self` is also solid in `other`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidImageSize`] if the images differ in size.
    pub fn is_subset_of(&self, other: &BinaryImage) -> Result<bool, ImageError> {
        check_same_size(self, other)?;
        Ok(self
            .as_slice()
            .iter()
            .zip(other.as_slice())
            .all(|(&x, &y)| !x || y))
    }
}
