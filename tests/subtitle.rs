//! Subtitle assembly tests.

use std::time::Duration;

use hardsub::{SubtitleAssembler, SubtitleRecord, SubtitleTrack};

#[test]
fn indices_are_contiguous_from_one() {
    let mut assembler = SubtitleAssembler::new(0.5);
    let texts = ["A", "", "B", "  ", "C", "\n", "D"];
    for (position, text) in texts.iter().enumerate() {
        assembler.push(position as f64 * 0.5, text);
    }

    let track = assembler.finish();
    let indices: Vec<usize> = track.iter().map(|record| record.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
}

#[test]
fn record_spans_one_step() {
    let mut assembler = SubtitleAssembler::new(0.5);
    let record = assembler.push(2.5, "  line  ").cloned().expect("non-empty text");

    assert_eq!(
        record,
        SubtitleRecord {
            index: 1,
            start: Duration::from_millis(2500),
            end: Duration::from_secs(3),
            text: "line".to_string(),
            translated: None,
        }
    );
}

#[test]
fn blank_text_is_skipped() {
    let mut assembler = SubtitleAssembler::new(1.0);
    assert!(assembler.push(0.0, "").is_none());
    assert!(assembler.push(1.0, " \t ").is_none());
    assert!(assembler.is_empty());
    assert!(assembler.finish().is_empty());
}

#[test]
fn repeated_text_is_not_merged() {
    let mut assembler = SubtitleAssembler::new(1.0);
    assembler.push(0.0, "SAME");
    assembler.push(1.0, "SAME");
    assert_eq!(assembler.len(), 2);
}

#[test]
fn track_keeps_insertion_order() {
    let track = SubtitleTrack::from_records(vec![
        SubtitleRecord::new(1, 0.0, 1.0, "first"),
        SubtitleRecord::new(2, 1.0, 2.0, "second").with_translation("zweite"),
    ]);

    assert_eq!(track.len(), 2);
    assert!(track.has_translations());
    let texts: Vec<String> = track.into_iter().map(|record| record.text).collect();
    assert_eq!(texts, vec!["first", "second"]);
}
