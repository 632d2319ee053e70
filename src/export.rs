//! Rendering a track as SubRip or plain text.
//!
//! # Example
//!
//! ```
//! use hardsub::{ExportFormat, SubtitleRecord, SubtitleTrack, TrackView, export};
//!
//! let track = SubtitleTrack::from_records(vec![SubtitleRecord::new(1, 0.0, 0.5, "A")]);
//! assert_eq!(
//!     export(&track, ExportFormat::Srt, TrackView::Original),
//!     "1\n00:00:00,000 --> 00:00:00,500\nA",
//! );
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::File,
    future::Future,
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use crate::{
    error::HardsubError,
    subtitle::{SubtitleRecord, SubtitleTrack},
};

/// Output format for an exported track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// SubRip Text (.srt).
    #[default]
    Srt,
    /// One line of text per record (.txt).
    Txt,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Srt => "srt",
            ExportFormat::Txt => "txt",
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = HardsubError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "srt" => Ok(ExportFormat::Srt),
            "txt" => Ok(ExportFormat::Txt),
            other => Err(HardsubError::InvalidParameter(format!(
                "unknown export format '{other}' (expected srt or txt)"
            ))),
        }
    }
}

/// Which text of each record to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackView {
    /// The recognized text.
    #[default]
    Original,
    /// The translation; records without one render as empty text.
    Translated,
}

impl TrackView {
    fn text(self, record: &SubtitleRecord) -> &str {
        match self {
            TrackView::Original => &record.text,
            TrackView::Translated => record.translated.as_deref().unwrap_or(""),
        }
    }
}

/// Render `track` as a single string.
///
/// SubRip blocks are separated by a blank line and plain-text lines by a
/// newline; there is no trailing separator. An empty track renders as an
/// empty string.
pub fn export(track: &SubtitleTrack, format: ExportFormat, view: TrackView) -> String {
    match format {
        ExportFormat::Srt => track
            .iter()
            .map(|record| {
                format!(
                    "{}\n{} --> {}\n{}",
                    record.index,
                    format_duration(record.start),
                    format_duration(record.end),
                    view.text(record),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        ExportFormat::Txt => track
            .iter()
            .map(|record| view.text(record))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Render `track` and write it to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`HardsubError::IoError`] if the file cannot be written.
pub fn write_export<P: AsRef<Path>>(
    track: &SubtitleTrack,
    format: ExportFormat,
    view: TrackView,
    path: P,
) -> Result<(), HardsubError> {
    let content = export(track, format, view);
    let mut file = File::create(path.as_ref())?;
    file.write_all(content.as_bytes())?;
    log::debug!(
        "Wrote {} records as {format} to {}",
        track.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Files written by [`write_tracks`].
#[derive(Debug)]
pub struct WrittenTracks {
    /// Where the original track was written.
    pub original: PathBuf,
    /// Where the translated track was written, or why the translation
    /// failed. `None` when no translation was requested.
    pub translated: Option<Result<PathBuf, HardsubError>>,
}

/// Write `track` into `dir` under its [`default_file_name`], then await
/// `translation` and write its result next to it.
///
/// The original file is on disk before `translation` is first polled, so a
/// failed merge (for example [`HardsubError::MissingApiKey`]) still leaves
/// it in place; the merge error is returned in
/// [`WrittenTracks::translated`].
///
/// # Errors
///
/// Returns [`HardsubError::IoError`] if `dir` cannot be created or the
/// original file cannot be written.
pub async fn write_tracks<F>(
    track: &SubtitleTrack,
    format: ExportFormat,
    dir: &Path,
    translation: Option<F>,
) -> Result<WrittenTracks, HardsubError>
where
    F: Future<Output = Result<SubtitleTrack, HardsubError>>,
{
    std::fs::create_dir_all(dir)?;

    let original = dir.join(default_file_name(format, TrackView::Original));
    write_export(track, format, TrackView::Original, &original)?;

    let translated = match translation {
        Some(translation) => Some(match translation.await {
            Ok(translated_track) => {
                let path = dir.join(default_file_name(format, TrackView::Translated));
                write_export(&translated_track, format, TrackView::Translated, &path)
                    .map(|()| path)
            }
            Err(error) => {
                log::warn!("Translation failed, keeping the original track only: {error}");
                Err(error)
            }
        }),
        None => None,
    };

    Ok(WrittenTracks {
        original,
        translated,
    })
}

/// `subtitles.<ext>`, or `subtitles_translated.<ext>` for the translated
/// view.
pub fn default_file_name(format: ExportFormat, view: TrackView) -> String {
    let suffix = match view {
        TrackView::Original => "",
        TrackView::Translated => "_translated",
    };
    format!("subtitles{suffix}.{}", format.extension())
}

/// Format seconds as `HH:MM:SS,mmm`, truncating to the millisecond.
///
/// Negative or non-finite input formats as zero.
///
/// ```
/// assert_eq!(hardsub::format_time(65.4321), "00:01:05,432");
/// ```
pub fn format_time(seconds: f64) -> String {
    format_duration(Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or_default())
}

/// Format a duration as `HH:MM:SS,mmm`, truncating to the millisecond.
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = duration.subsec_millis();
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}
