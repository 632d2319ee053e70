//! Per-sample frame capture.
//!
//! The [`FrameExtractor`] turns a sample time into a cropped
//! [`FrameBuffer`]: it seeks the source, waits for the frame under a
//! timeout, and reads the text band of the configured region.

use std::time::Duration;

use crate::{error::HardsubError, frame::FrameBuffer, region::Region, video::VideoSource};

/// Default bound on how long a single seek may take.
pub const DEFAULT_SEEK_TIMEOUT: Duration = Duration::from_secs(10);

/// Captures the text band of one region at successive sample times.
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    region: Region,
    crop: Region,
    seek_timeout: Duration,
}

impl FrameExtractor {
    /// Build an extractor for `source`.
    ///
    /// `region` is clamped to the source's natural size; `None` selects the
    /// full frame.
    ///
    /// # Errors
    ///
    /// Returns [`HardsubError::InvalidParameter`] if the source reports a
    /// zero-sized frame, the region lies outside the frame, or the timeout is
    /// zero.
    pub fn for_source<S: VideoSource + ?Sized>(
        source: &S,
        region: Option<Region>,
        seek_timeout: Duration,
    ) -> Result<Self, HardsubError> {
        if seek_timeout.is_zero() {
            return Err(HardsubError::InvalidParameter(
                "seek timeout must be greater than zero".to_string(),
            ));
        }

        let (width, height) = source.natural_size();
        let frame = Region::full_frame(width, height)?;
        let region = match region {
            Some(region) => region.clamp_to(width, height)?,
            None => frame,
        };

        Ok(Self {
            region,
            crop: region.text_band(),
            seek_timeout,
        })
    }

    /// The region after clamping to the frame.
    pub fn region(&self) -> Region {
        self.region
    }

    /// The rectangle actually read from each frame.
    pub fn crop_region(&self) -> Region {
        self.crop
    }

    /// Seek `source` to `timestamp` and read the crop.
    ///
    /// # Errors
    ///
    /// - [`HardsubError::SeekTimeout`] if the source does not become ready
    ///   within the timeout.
    /// - Any error reported by the source's seek or pixel read.
    pub async fn extract<S: VideoSource + ?Sized>(
        &self,
        source: &mut S,
        timestamp: f64,
    ) -> Result<FrameBuffer, HardsubError> {
        match tokio::time::timeout(self.seek_timeout, source.seek(timestamp)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(HardsubError::SeekTimeout {
                    timestamp,
                    timeout: self.seek_timeout,
                });
            }
        }

        source.read_pixels(&self.crop)
    }
}
