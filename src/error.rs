//! Error types for the `hardsub` crate.
//!
//! This module defines [`HardsubError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry enough context (paths,
//! timestamps, upstream messages) to be reported to a user as a single line.
//!
//! Not every variant is fatal. The extraction loop recovers from
//! [`HardsubError::SeekTimeout`] and [`HardsubError::VideoDecodeError`] by
//! skipping the affected sample, and the translation merge recovers from
//! [`HardsubError::TranslationRequestFailed`] by leaving that record
//! untranslated. Everything else ends the operation that raised it.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `hardsub` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HardsubError {
    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::MediaFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// A duration, frame step, region or timeout was out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The decoder did not report a ready frame within the seek timeout.
    #[error("Seek to {timestamp:.3}s timed out after {timeout:?}")]
    SeekTimeout {
        /// The sample time that was requested, in seconds.
        timestamp: f64,
        /// How long the extractor waited.
        timeout: Duration,
    },

    /// The OCR engine could not be configured or failed outright.
    #[error("OCR engine error: {0}")]
    OcrEngine(String),

    /// `recognize` was called on a session that is not ready.
    #[error("OCR session is not ready (state: {0})")]
    OcrUnavailable(String),

    /// A translation was requested without a configured credential.
    #[error("No translation API key configured")]
    MissingApiKey,

    /// A single translation request failed.
    #[error("Translation request failed: {0}")]
    TranslationRequestFailed(String),

    /// A language code is not in the supported table.
    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during frame conversion or encoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// A region file could not be parsed or written.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for HardsubError {
    fn from(error: FfmpegError) -> Self {
        HardsubError::FfmpegError(error.to_string())
    }
}

impl From<reqwest::Error> for HardsubError {
    fn from(error: reqwest::Error) -> Self {
        HardsubError::TranslationRequestFailed(error.to_string())
    }
}

impl HardsubError {
    /// Returns `true` for failures that only affect one sample of a run.
    ///
    /// The extraction loop logs these and moves on to the next sample.
    pub fn is_sample_local(&self) -> bool {
        matches!(
            self,
            HardsubError::SeekTimeout { .. }
                | HardsubError::VideoDecodeError(_)
                | HardsubError::FfmpegError(_)
                | HardsubError::ImageError(_)
        )
    }
}
