//! The extraction run loop.
//!
//! [`extract_subtitles`] drives one run over a [`VideoSource`]:
//!
//! ```text
//! for t in schedule:
//!     seek(t) -> read text band -> enhance -> recognize -> assemble
//! ```
//!
//! Samples are processed strictly one after another, since the source has a
//! single decode position. A sample whose seek times out or whose frame
//! cannot be decoded is skipped; anything else ends the run.

use crate::{
    configuration::ExtractOptions,
    enhance::enhance,
    error::HardsubError,
    extractor::FrameExtractor,
    ocr::{OcrEngine, OcrSession},
    progress::{OperationType, ProgressTracker},
    sampler::SampleSchedule,
    subtitle::{SubtitleAssembler, SubtitleTrack},
    video::VideoSource,
};

/// Run OCR over `source` and assemble the recognized text into a track.
///
/// The session is configured for `options`' OCR settings before the first
/// sample and left configured afterwards, so it can be reused for another
/// run in the same language without reinitializing the engine.
///
/// # Errors
///
/// - [`HardsubError::InvalidParameter`] for an out-of-range frame step,
///   timeout, duration or region. No sample is taken.
/// - [`HardsubError::Cancelled`] if the token in `options` is cancelled;
///   the partial track is discarded.
/// - Any error from configuring the OCR session.
pub async fn extract_subtitles<S, E>(
    source: &mut S,
    session: &mut OcrSession<E>,
    options: &ExtractOptions,
) -> Result<SubtitleTrack, HardsubError>
where
    S: VideoSource + ?Sized,
    E: OcrEngine,
{
    options.validate()?;

    let schedule = SampleSchedule::new(source.duration(), options.frame_step)?;
    let extractor = FrameExtractor::for_source(&*source, options.region, options.seek_timeout)?;
    session.configure(&options.ocr).await?;

    log::debug!(
        "Sampling {} frames every {}s, region {} (text band {})",
        schedule.len(),
        schedule.step(),
        extractor.region(),
        extractor.crop_region(),
    );

    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::SubtitleExtraction,
        Some(schedule.len()),
        options.batch_size,
    );
    let mut assembler = SubtitleAssembler::new(schedule.step());
    let mut skipped = 0u64;

    for timestamp in &schedule {
        if options.is_cancelled() {
            return Err(HardsubError::Cancelled);
        }

        match extractor.extract(&mut *source, timestamp).await {
            Ok(crop) => {
                let enhanced = enhance(&crop, &options.enhance);
                let text = session.recognize(&enhanced).await?;
                if let Some(record) = assembler.push(timestamp, &text) {
                    log::debug!("Subtitle {} at {timestamp:.3}s: {}", record.index, record.text);
                }
            }
            Err(error) if error.is_sample_local() => {
                skipped += 1;
                log::warn!("Skipping sample at {timestamp:.3}s: {error}");
            }
            Err(error) => return Err(error),
        }

        tracker.advance(timestamp, assembler.len());
    }

    tracker.finish();
    let track = assembler.finish();

    log::info!(
        "Extracted {} subtitles from {} samples ({skipped} skipped)",
        track.len(),
        schedule.len(),
    );

    Ok(track)
}
