//! FFmpeg-backed media files.
//!
//! [`MediaFile`] opens a video with FFmpeg, caches its metadata, and serves
//! as the [`VideoSource`](crate::VideoSource) for extraction runs. Decoding
//! happens on Tokio's blocking pool so that a stalled seek can be abandoned
//! by the extractor's timeout; the demuxer lives behind a mutex that the
//! next seek waits on.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbaImage;

use crate::{
    conversion,
    error::HardsubError,
    metadata::{MediaMetadata, VideoMetadata},
};

/// An opened video file.
///
/// # Example
///
/// ```no_run
/// use hardsub::{HardsubError, MediaFile};
///
/// let media = MediaFile::open("input.mp4")?;
/// println!("{:.1}s", media.metadata().duration.as_secs_f64());
/// # Ok::<(), HardsubError>(())
/// ```
pub struct MediaFile {
    /// Demuxer state shared with the blocking decode task.
    pub(crate) decoder: Arc<Mutex<DecoderState>>,
    /// Cached metadata extracted at open time.
    pub(crate) metadata: MediaMetadata,
    /// The most recently decoded frame, in RGBA at natural size.
    pub(crate) current_frame: Option<RgbaImage>,
    /// Path to the opened media file (kept for error messages).
    pub(crate) file_path: PathBuf,
}

impl Debug for MediaFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaFile")
            .field("metadata", &self.metadata)
            .field("has_frame", &self.current_frame.is_some())
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl MediaFile {
    /// Open a video file.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, locates the best
    /// video stream, and caches its metadata.
    ///
    /// # Errors
    ///
    /// - [`HardsubError::FileOpen`] if the file cannot be opened or its video
    ///   stream cannot be decoded.
    /// - [`HardsubError::NoVideoStream`] if the file has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HardsubError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening media file: {}", file_path.display());

        ffmpeg_next::init().map_err(|error| HardsubError::FileOpen {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| HardsubError::FileOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };
        let format = input_context.format().name().to_string();

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(HardsubError::NoVideoStream)?;
        let stream_index = stream.index();
        let time_base = stream.time_base();

        let decoder_context =
            CodecContext::from_parameters(stream.parameters()).map_err(|error| {
                HardsubError::FileOpen {
                    path: file_path.clone(),
                    reason: format!(
                        "Failed to read video codec parameters for stream {stream_index}: {error}"
                    ),
                }
            })?;
        let video_decoder =
            decoder_context
                .decoder()
                .video()
                .map_err(|error| HardsubError::FileOpen {
                    path: file_path.clone(),
                    reason: format!(
                        "Failed to create video decoder for stream {stream_index}: {error}"
                    ),
                })?;

        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };
        let frame_count = if frames_per_second > 0.0 {
            (duration.as_secs_f64() * frames_per_second) as u64
        } else {
            0
        };
        let codec = video_decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let video = VideoMetadata {
            width: video_decoder.width(),
            height: video_decoder.height(),
            frames_per_second,
            frame_count,
            codec,
            stream_index,
        };

        log::info!(
            "Opened media file: {} (format={}, duration={:.2}s, {}x{} @ {:.2} fps, codec={})",
            file_path.display(),
            format,
            duration.as_secs_f64(),
            video.width,
            video.height,
            video.frames_per_second,
            video.codec,
        );

        let decoder = DecoderState {
            input_context,
            stream_index,
            time_base,
            width: video.width,
            height: video.height,
            frames_per_second,
        };

        Ok(Self {
            decoder: Arc::new(Mutex::new(decoder)),
            metadata: MediaMetadata {
                video,
                duration,
                format,
            },
            current_frame: None,
            file_path,
        })
    }

    /// Metadata cached at open time.
    pub fn metadata(&self) -> &MediaMetadata {
        &self.metadata
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// The demuxer plus everything needed to decode one frame of the selected
/// stream.
pub(crate) struct DecoderState {
    input_context: Input,
    stream_index: usize,
    time_base: ffmpeg_next::Rational,
    width: u32,
    height: u32,
    frames_per_second: f64,
}

impl DecoderState {
    /// Decode the first frame whose presentation time is at or after
    /// `timestamp` seconds, converted to RGBA.
    ///
    /// Seeks to the nearest keyframe before the target and decodes forward.
    /// A fresh decoder is built for every call, so no state leaks between
    /// seeks.
    pub(crate) fn decode_at(&mut self, timestamp: f64) -> Result<RgbaImage, HardsubError> {
        let stream = self
            .input_context
            .stream(self.stream_index)
            .ok_or(HardsubError::NoVideoStream)?;
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let mut decoder = decoder_context.decoder().video()?;

        let mut scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGBA,
            self.width,
            self.height,
            ScalingFlags::BILINEAR,
        )?;

        let seek_target = conversion::seconds_to_seek_timestamp(timestamp);
        self.input_context.seek(seek_target, ..seek_target)?;

        // Half a frame of slack so a frame stamped just before `timestamp`
        // by rounding still counts as the frame at `timestamp`.
        let tolerance = if self.frames_per_second > 0.0 {
            0.5 / self.frames_per_second
        } else {
            0.0
        };

        let (width, height) = (self.width, self.height);
        let mut decoded_frame = VideoFrame::empty();
        let mut rgba_frame = VideoFrame::empty();

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != self.stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                let pts = decoded_frame.timestamp().or(decoded_frame.pts()).unwrap_or(0);
                let seconds = conversion::pts_to_seconds(pts, self.time_base);
                if seconds + tolerance >= timestamp {
                    scaler.run(&decoded_frame, &mut rgba_frame)?;
                    return convert_frame(&rgba_frame, width, height);
                }
            }
        }

        decoder.send_eof()?;
        if decoder.receive_frame(&mut decoded_frame).is_ok() {
            scaler.run(&decoded_frame, &mut rgba_frame)?;
            return convert_frame(&rgba_frame, width, height);
        }

        Err(HardsubError::VideoDecodeError(format!(
            "Could not locate a frame at {timestamp:.3}s in the video stream"
        )))
    }
}

/// Convert a scaled RGBA video frame to an [`RgbaImage`].
fn convert_frame(
    rgba_frame: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<RgbaImage, HardsubError> {
    let buffer = conversion::frame_to_buffer(rgba_frame, width, height, 4);
    RgbaImage::from_raw(width, height, buffer).ok_or_else(|| {
        HardsubError::VideoDecodeError(
            "Failed to construct RGBA image from decoded frame data".to_string(),
        )
    })
}
