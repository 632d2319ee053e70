//! Subtitle records and track assembly.
//!
//! The [`SubtitleAssembler`] consumes recognized text in sample order and
//! appends one [`SubtitleRecord`] per non-empty result. Records are never
//! merged, reordered, or removed; the finished [`SubtitleTrack`] is the
//! read-only input to translation and export.
//!
//! # Example
//!
//! ```
//! use hardsub::SubtitleAssembler;
//!
//! let mut assembler = SubtitleAssembler::new(1.0);
//! assembler.push(0.0, "HELLO");
//! assembler.push(1.0, "   ");
//! assembler.push(2.0, "WORLD");
//!
//! let track = assembler.finish();
//! let indices: Vec<usize> = track.iter().map(|record| record.index).collect();
//! assert_eq!(indices, vec![1, 2]);
//! ```

use std::time::Duration;

/// A single timed line of recognized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleRecord {
    /// One-based position in the track.
    pub index: usize,
    /// When the line appears.
    pub start: Duration,
    /// When the line disappears (`start` plus the sampling step).
    pub end: Duration,
    /// Recognized text, trimmed.
    pub text: String,
    /// Translation, filled in by [`translate_track`](crate::translate_track).
    pub translated: Option<String>,
}

impl SubtitleRecord {
    /// Create an untranslated record from second offsets.
    ///
    /// Negative or non-finite times collapse to zero.
    pub fn new(index: usize, start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            index,
            start: seconds(start),
            end: seconds(end),
            text: text.into(),
            translated: None,
        }
    }

    /// Attach a translation.
    #[must_use]
    pub fn with_translation(mut self, translated: impl Into<String>) -> Self {
        self.translated = Some(translated.into());
        self
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or_default()
}

/// An ordered list of [`SubtitleRecord`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleTrack {
    records: Vec<SubtitleRecord>,
}

impl SubtitleTrack {
    /// An empty track.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap records that are already in index order.
    pub fn from_records(records: Vec<SubtitleRecord>) -> Self {
        Self { records }
    }

    /// The records, in index order.
    pub fn records(&self) -> &[SubtitleRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` if the track has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the records in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, SubtitleRecord> {
        self.records.iter()
    }

    /// Unwrap into the underlying records.
    pub fn into_records(self) -> Vec<SubtitleRecord> {
        self.records
    }

    /// `true` if any record carries a translation.
    pub fn has_translations(&self) -> bool {
        self.records.iter().any(|record| record.translated.is_some())
    }
}

impl<'a> IntoIterator for &'a SubtitleTrack {
    type Item = &'a SubtitleRecord;
    type IntoIter = std::slice::Iter<'a, SubtitleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for SubtitleTrack {
    type Item = SubtitleRecord;
    type IntoIter = std::vec::IntoIter<SubtitleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Builds a [`SubtitleTrack`] from `(timestamp, text)` pairs arriving in
/// ascending time order.
#[derive(Debug, Clone)]
pub struct SubtitleAssembler {
    step: f64,
    records: Vec<SubtitleRecord>,
}

impl SubtitleAssembler {
    /// Start an empty track whose records last `step` seconds each.
    pub fn new(step: f64) -> Self {
        Self {
            step,
            records: Vec::new(),
        }
    }

    /// Append a record for `text` at `timestamp` unless it is blank.
    ///
    /// Returns the appended record.
    pub fn push(&mut self, timestamp: f64, text: &str) -> Option<&SubtitleRecord> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let index = self.records.len() + 1;
        self.records.push(SubtitleRecord::new(
            index,
            timestamp,
            timestamp + self.step,
            text,
        ));
        self.records.last()
    }

    /// Number of records accepted so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` if no record has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The finished track.
    pub fn finish(self) -> SubtitleTrack {
        SubtitleTrack::from_records(self.records)
    }
}
