use crate::{BinaryImage, ImageSize};

use serde::ser::SerializeStruct;
use serde::Deserialize;

impl serde::Serialize for BinaryImage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("BinaryImage", 3)?;
        state.serialize_field("data", self.as_slice())?;
        state.serialize_field("size", &self.size())?;
        state.serialize_field("pixel_size", &self.pixel_size())?;
        state.end()
    }
}

impl<'de> serde::Deserialize<'de> for BinaryImage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct BinaryImageData {
            data: Vec<bool>,
            size: ImageSize,
            pixel_size: f64,
        }

        let BinaryImageData {
            data,
            size,
            pixel_size,
        } = BinaryImageData::deserialize(deserializer)?;

        BinaryImage::new(size, data)
            .and_then(|image| image.with_pixel_size(pixel_size))
            .map_err(serde::de::Error::custom)
    }
}
