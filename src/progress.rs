//! Progress reporting and cancellation support.
//!
//! This module provides [`ProgressCallback`] for monitoring an extraction
//! run, [`CancellationToken`] for stopping one between samples, and
//! [`ProgressInfo`] for the snapshots delivered to callbacks.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hardsub::{
//!     ExtractOptions, HardsubError, MediaFile, OcrSession, ProgressCallback, ProgressInfo,
//!     TesseractCommand, extract_subtitles,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.operation);
//!         }
//!     }
//! }
//!
//! # async fn run() -> Result<(), HardsubError> {
//! let mut media = MediaFile::open("input.mp4")?;
//! let mut session = OcrSession::new(TesseractCommand::from_env());
//! let options = ExtractOptions::new().with_progress(Arc::new(PrintProgress));
//!
//! let track = extract_subtitles(&mut media, &mut session, &options).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Sampling, recognizing and assembling subtitles.
    SubtitleExtraction,
    /// Translating an assembled track.
    Translation,
}

/// A snapshot of run progress.
///
/// Delivered to [`ProgressCallback::on_progress`] at a cadence controlled
/// by [`ExtractOptions::with_batch_size`](crate::ExtractOptions::with_batch_size).
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many samples (or translation requests) have been processed so
    /// far, including skipped or failed ones.
    pub current: u64,
    /// Total items expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 to 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Number of subtitle records produced (or translated) so far.
    pub records: usize,
    /// The sample time most recently processed, or the start of the record
    /// most recently translated.
    pub current_timestamp: Option<Duration>,
}

/// Trait for receiving progress updates during a run.
///
/// Implementations must be [`Send`] and [`Sync`] so the same callback can
/// be shared with whatever thread renders it.
///
/// Progress callbacks are **infallible**: they observe but cannot halt
/// the operation. Use [`CancellationToken`] for cooperative cancellation.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals during a run.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from anywhere to stop the
/// associated run. The extraction loop checks
/// [`is_cancelled`](CancellationToken::is_cancelled) before each sample.
///
/// # Example
///
/// ```
/// use hardsub::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// // From another thread (or a signal handler, etc.):
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    ///
    /// All clones of this token will observe the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks progress timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
    records: usize,
    last_timestamp: Option<Duration>,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
            records: 0,
            last_timestamp: None,
        }
    }

    /// Record one processed sample and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self, timestamp: f64, records: usize) {
        self.current += 1;
        self.items_since_last_report += 1;
        self.records = records;
        self.last_timestamp = Duration::try_from_secs_f64(timestamp.max(0.0)).ok();

        if self.items_since_last_report >= self.batch_size {
            self.report();
            self.items_since_last_report = 0;
        }
    }

    /// Emit a final report if the last batch was not already reported.
    pub(crate) fn finish(&mut self) {
        if self.items_since_last_report > 0 || self.current == 0 {
            self.report();
            self.items_since_last_report = 0;
        }
    }

    fn report(&self) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| (self.current as f32 / t as f32) * 100.0);

        let estimated_remaining = if self.current > 0 {
            self.total.map(|t| {
                let remaining = t.saturating_sub(self.current);
                elapsed.mul_f64(remaining as f64 / self.current as f64)
            })
        } else {
            None
        };

        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            records: self.records,
            current_timestamp: self.last_timestamp,
        };

        self.callback.on_progress(&info);
    }
}
