//! # hardsub
//!
//! Extract burned-in subtitles from video files.
//!
//! `hardsub` samples a video at a fixed interval, crops each sample to the
//! region where subtitles are drawn, enhances the crop for text recognition,
//! runs OCR on it, and assembles the results into a timestamped subtitle
//! track. Tracks can be translated with a chat-completions API and exported
//! as SubRip or plain text. Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate; recognition
//! runs the `tesseract` command-line program.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hardsub::{
//!     ExportFormat, ExtractOptions, HardsubError, MediaFile, OcrSession, Region,
//!     TesseractCommand, TrackView, export, extract_subtitles,
//! };
//!
//! # async fn run() -> Result<(), HardsubError> {
//! let mut media = MediaFile::open("input.mp4")?;
//! let mut session = OcrSession::new(TesseractCommand::from_env());
//! let options = ExtractOptions::new()
//!     .with_frame_step(0.5)
//!     .with_region(Region::new(0, 600, 1280, 120)?);
//!
//! let track = extract_subtitles(&mut media, &mut session, &options).await?;
//! println!("{}", export(&track, ExportFormat::Srt, TrackView::Original));
//! # Ok(())
//! # }
//! ```
//!
//! ## Translating a Track
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hardsub::{HardsubError, OpenAiTranslator, SubtitleTrack, TranslateLanguage, translate_track};
//!
//! # async fn run(track: SubtitleTrack) -> Result<(), HardsubError> {
//! let key = std::env::var("OPENAI_API_KEY").ok();
//! let translator = Arc::new(OpenAiTranslator::new()?);
//! let translated =
//!     translate_track(&track, TranslateLanguage::French, key.as_deref(), translator).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! - **Sampling**: `0, step, 2·step, …` below the whole-second duration
//! - **Extraction**: seek with a timeout, then read the region minus a 10%
//!   margin at the top and bottom
//! - **Enhancement**: blur, contrast, brightness, gamma-corrected grayscale
//! - **Recognition**: a long-lived [`OcrSession`] configured once per
//!   language
//! - **Assembly**: one record per non-empty recognition, 1-based indices
//! - **Translation**: concurrent per-record requests, failures left blank
//! - **Export**: SubRip or plain text, original or translated
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed to build, and `tesseract`
//! with the wanted language packs must be on `PATH` (or named by
//! `TESSERACT_CMD`) to recognize text.

pub mod configuration;
mod conversion;
pub mod enhance;
pub mod error;
pub mod export;
pub mod extractor;
pub mod ffmpeg;
pub mod frame;
pub mod media;
pub mod metadata;
pub mod ocr;
pub mod pipeline;
pub mod progress;
pub mod region;
pub mod sampler;
pub mod subtitle;
pub mod tesseract;
pub mod translate;
pub mod video;

pub use configuration::{DEFAULT_FRAME_STEP, ExtractOptions, MAX_FRAME_STEP, MIN_FRAME_STEP};
pub use enhance::{EnhanceOptions, enhance};
pub use error::HardsubError;
pub use export::{
    ExportFormat, TrackView, WrittenTracks, default_file_name, export, format_duration,
    format_time, write_export, write_tracks,
};
pub use extractor::{DEFAULT_SEEK_TIMEOUT, FrameExtractor};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use frame::FrameBuffer;
pub use media::MediaFile;
pub use metadata::{MediaMetadata, VideoMetadata};
pub use ocr::{
    OcrConfig, OcrEngine, OcrLanguage, OcrSession, PageSegMode, SessionState,
    WHITELIST_ALPHANUMERIC, cjk_whitelist,
};
pub use pipeline::extract_subtitles;
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use region::{Region, SELECTION_PADDING, TEXT_BAND_MARGIN};
pub use sampler::{SampleSchedule, SampleTimes};
pub use subtitle::{SubtitleAssembler, SubtitleRecord, SubtitleTrack};
pub use tesseract::{TESSERACT_ENV, TesseractCommand};
pub use translate::{
    OPENAI_BASE_URL, OPENAI_MODEL, OpenAiTranslator, TranslateLanguage, Translator,
    translate_track, translate_track_with_progress,
};
pub use video::VideoSource;
