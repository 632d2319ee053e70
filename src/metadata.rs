//! Media metadata types.
//!
//! This module defines the metadata returned by
//! [`MediaFile::metadata`](crate::MediaFile::metadata). Metadata is read once
//! when the file is opened and cached for the lifetime of the handle.

use std::time::Duration;

/// Container-level metadata plus the selected video stream.
///
/// # Example
///
/// ```no_run
/// use hardsub::MediaFile;
///
/// let media = MediaFile::open("input.mp4")?;
/// let metadata = media.metadata();
/// println!("Duration: {:?}", metadata.duration);
/// println!("Size: {}x{}", metadata.video.width, metadata.video.height);
/// # Ok::<(), hardsub::HardsubError>(())
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct MediaMetadata {
    /// The video stream OCR runs against.
    pub video: VideoMetadata,
    /// Total duration of the media file.
    pub duration: Duration,
    /// Container format name (e.g. `"mp4"`, `"matroska"`).
    pub format: String,
}

/// Metadata for a video stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Natural frame width in pixels.
    pub width: u32,
    /// Natural frame height in pixels.
    pub height: u32,
    /// Frames per second (approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Estimated total number of frames, computed from duration and frame rate.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
    /// FFmpeg stream index.
    pub stream_index: usize,
}
