//! FFmpeg video source tests.
//!
//! Tests that decode require fixture files from
//! `tests/fixtures/generate_fixtures.sh` and return early without them.

use std::path::Path;

use hardsub::{
    ExtractOptions, FrameBuffer, FrameExtractor, HardsubError, MediaFile, OcrConfig, OcrEngine,
    OcrSession, Region, VideoSource, extract_subtitles,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

#[test]
fn open_nonexistent_file() {
    let result = MediaFile::open("this_file_does_not_exist.mp4");

    let error_message = result.expect_err("missing file must not open").to_string();
    assert!(
        error_message.contains("Failed to open media file"),
        "Error message should mention file open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = MediaFile::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
}

#[test]
fn metadata_matches_fixture() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let media = MediaFile::open(path).expect("Failed to open fixture");
    let metadata = media.metadata();
    assert_eq!((metadata.video.width, metadata.video.height), (320, 240));
    assert!((metadata.duration.as_secs_f64() - 5.0).abs() < 0.1);
    assert!((metadata.video.frames_per_second - 25.0).abs() < 0.01);
    assert_eq!(media.natural_size(), (320, 240));
}

#[test]
fn read_before_seek_fails() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let media = MediaFile::open(path).expect("Failed to open fixture");
    let region = Region::full_frame(320, 240).expect("valid region");
    assert!(matches!(
        media.read_pixels(&region),
        Err(HardsubError::VideoDecodeError(_))
    ));
}

#[tokio::test]
async fn seek_then_read_crop() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let extractor = FrameExtractor::for_source(
        &media,
        Some(Region::new(0, 180, 320, 60).expect("valid region")),
        hardsub::DEFAULT_SEEK_TIMEOUT,
    )
    .expect("extractor");

    for timestamp in [0.0, 2.5, 1.0, 4.0] {
        let crop = extractor
            .extract(&mut media, timestamp)
            .await
            .expect("seek should succeed");
        assert_eq!((crop.width(), crop.height()), (320, 48));
    }
}

/// Reports the mean brightness of each crop so decoding can be checked
/// without a real OCR engine.
struct BrightnessEngine;

#[async_trait::async_trait(?Send)]
impl OcrEngine for BrightnessEngine {
    async fn configure(&mut self, _config: &OcrConfig) -> Result<(), HardsubError> {
        Ok(())
    }

    async fn recognize(&mut self, frame: &FrameBuffer) -> Result<String, HardsubError> {
        let pixels = frame.as_image().pixels().count().max(1) as u64;
        let total: u64 = frame.as_image().pixels().map(|pixel| pixel.0[0] as u64).sum();
        Ok((total / pixels).to_string())
    }
}

#[tokio::test]
async fn extraction_over_fixture_samples_every_step() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut media = MediaFile::open(path).expect("Failed to open fixture");
    let mut session = OcrSession::new(BrightnessEngine);
    let options = ExtractOptions::new().with_frame_step(1.0);

    let track = extract_subtitles(&mut media, &mut session, &options)
        .await
        .expect("extraction should succeed");

    assert_eq!(track.len(), 5);
    let indices: Vec<usize> = track.iter().map(|record| record.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);
}
