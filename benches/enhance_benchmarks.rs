//! Benchmarks for the per-sample hot path and export.
//!
//! Run with: cargo bench
//!
//! The seek benchmark requires fixture files from
//! `tests/fixtures/generate_fixtures.sh`.

use std::{hint::black_box, path::Path};

use criterion::Criterion;
use hardsub::{
    DEFAULT_SEEK_TIMEOUT, EnhanceOptions, ExportFormat, FfmpegLogLevel, FrameBuffer,
    FrameExtractor, MediaFile, Region, SampleSchedule, SubtitleAssembler, TrackView, enhance,
    export,
};
use image::{Rgba, RgbaImage};
use tokio::runtime::Builder;

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

/// A 1280x96 band with light text-like strokes on a noisy background.
fn caption_band() -> FrameBuffer {
    FrameBuffer::new(RgbaImage::from_fn(1280, 96, |x, y| {
        if (30..66).contains(&y) && (x / 12) % 3 != 0 {
            Rgba([235, 235, 220, 255])
        } else {
            let noise = ((x * 31 + y * 17) % 64) as u8;
            Rgba([40 + noise, 45 + noise, 50 + noise, 255])
        }
    }))
}

fn benchmark_enhance(criterion: &mut Criterion) {
    let band = caption_band();
    let options = EnhanceOptions::default();

    criterion.bench_function("enhance 1280x96 caption band", |bencher| {
        bencher.iter(|| enhance(black_box(&band), black_box(&options)));
    });

    let unblurred = EnhanceOptions {
        blur_sigma: 0.0,
        ..EnhanceOptions::default()
    };
    criterion.bench_function("enhance 1280x96 caption band (no blur)", |bencher| {
        bencher.iter(|| enhance(black_box(&band), black_box(&unblurred)));
    });
}

fn benchmark_assemble_and_export(criterion: &mut Criterion) {
    let Ok(schedule) = SampleSchedule::new(2.0 * 3600.0, 0.5) else {
        return;
    };

    criterion.bench_function("assemble and export 2h at 0.5s", |bencher| {
        bencher.iter(|| {
            let mut assembler = SubtitleAssembler::new(schedule.step());
            for (position, timestamp) in schedule.iter().enumerate() {
                let text = if position % 4 == 0 { "" } else { "A line of dialogue" };
                assembler.push(timestamp, text);
            }
            let track = assembler.finish();
            export(black_box(&track), ExportFormat::Srt, TrackView::Original)
        });
    });
}

fn benchmark_seek_and_crop(criterion: &mut Criterion) {
    hardsub::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let runtime = Builder::new_current_thread().enable_all().build().unwrap();
    let mut media = MediaFile::open(SAMPLE_VIDEO).unwrap();
    let region = Region::new(0, 180, 320, 60).unwrap();
    let extractor = FrameExtractor::for_source(&media, Some(region), DEFAULT_SEEK_TIMEOUT).unwrap();

    criterion.bench_function("seek and crop (mid-video)", |bencher| {
        bencher.iter(|| {
            runtime
                .block_on(extractor.extract(&mut media, black_box(2.5)))
                .unwrap()
        });
    });
}

criterion::criterion_group!(
    benches,
    benchmark_enhance,
    benchmark_assemble_and_export,
    benchmark_seek_and_crop,
);

criterion::criterion_main!(benches);
