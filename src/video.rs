//! The video decoder seam.
//!
//! [`VideoSource`] is everything the extraction loop needs from a decoder:
//! its duration and natural size, an asynchronous seek that resolves once
//! the frame at the requested time is ready, and a synchronous pixel read of
//! that frame. [`MediaFile`] implements it on top of FFmpeg; tests drive the
//! pipeline with scripted in-memory sources.
//!
//! A source has one decode position, so it is only ever used through
//! `&mut` by a single run loop.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{error::HardsubError, frame::FrameBuffer, media::MediaFile, region::Region};

/// A seekable video whose current frame can be read as pixels.
#[async_trait(?Send)]
pub trait VideoSource {
    /// Total length in seconds.
    fn duration(&self) -> f64;

    /// Natural frame size as `(width, height)` in pixels.
    fn natural_size(&self) -> (u32, u32);

    /// Move the decode position to `timestamp` seconds.
    ///
    /// Resolves once the current frame corresponds to `timestamp`. Callers
    /// bound the wait with a timeout.
    async fn seek(&mut self, timestamp: f64) -> Result<(), HardsubError>;

    /// Copy the pixels of the current frame inside `region`.
    fn read_pixels(&self, region: &Region) -> Result<FrameBuffer, HardsubError>;
}

#[async_trait(?Send)]
impl VideoSource for MediaFile {
    fn duration(&self) -> f64 {
        self.metadata.duration.as_secs_f64()
    }

    fn natural_size(&self) -> (u32, u32) {
        (self.metadata.video.width, self.metadata.video.height)
    }

    async fn seek(&mut self, timestamp: f64) -> Result<(), HardsubError> {
        self.current_frame = None;
        log::debug!("Seeking {} to {timestamp:.3}s", self.file_path.display());

        let decoder = Arc::clone(&self.decoder);
        let frame = tokio::task::spawn_blocking(move || {
            let mut state = decoder.lock().map_err(|_| {
                HardsubError::VideoDecodeError("decoder state poisoned by a panic".to_string())
            })?;
            state.decode_at(timestamp)
        })
        .await
        .map_err(|error| HardsubError::VideoDecodeError(format!("decode task failed: {error}")))??;

        self.current_frame = Some(frame);
        Ok(())
    }

    fn read_pixels(&self, region: &Region) -> Result<FrameBuffer, HardsubError> {
        let image = self.current_frame.as_ref().ok_or_else(|| {
            HardsubError::VideoDecodeError("no frame decoded; seek first".to_string())
        })?;
        let region = region.clamp_to(image.width(), image.height())?;
        let view = image::imageops::crop_imm(image, region.x, region.y, region.width, region.height);
        Ok(FrameBuffer::new(view.to_image()))
    }
}
