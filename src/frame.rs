//! Cropped pixel buffers.

use image::{DynamicImage, ImageFormat, RgbaImage, imageops};

use crate::{error::HardsubError, region::Region};

/// RGBA pixels for one cropped region at one sample time.
///
/// A buffer is produced by the frame extractor, transformed by the
/// enhancer and consumed by the OCR adapter. Nothing keeps it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    image: RgbaImage,
}

impl FrameBuffer {
    /// Wrap an existing RGBA image.
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Build a buffer from tightly packed RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HardsubError::InvalidParameter`] if `data` does not hold
    /// exactly `width × height × 4` bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, HardsubError> {
        let length = data.len();
        RgbaImage::from_raw(width, height, data)
            .map(Self::new)
            .ok_or_else(|| {
                HardsubError::InvalidParameter(format!(
                    "{length} bytes do not form a {width}x{height} RGBA buffer"
                ))
            })
    }

    /// A buffer of the given size filled with one colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::new(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying image.
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Mutably borrow the underlying image.
    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    /// Unwrap into the underlying image.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Copy the pixels inside `region` into a new buffer.
    ///
    /// The region is clamped to the buffer first.
    ///
    /// # Errors
    ///
    /// Returns [`HardsubError::InvalidParameter`] if the region lies
    /// entirely outside the buffer.
    pub fn crop(&self, region: &Region) -> Result<Self, HardsubError> {
        let region = region.clamp_to(self.width(), self.height())?;
        let view = imageops::crop_imm(&self.image, region.x, region.y, region.width, region.height);
        Ok(Self::new(view.to_image()))
    }

    /// Encode the buffer as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>, HardsubError> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(self.image.clone())
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

impl From<RgbaImage> for FrameBuffer {
    fn from(image: RgbaImage) -> Self {
        Self::new(image)
    }
}
