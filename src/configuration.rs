//! Extraction run configuration.
//!
//! [`ExtractOptions`] is a builder that carries everything fixed for the
//! duration of one run: the sampling step, the region, OCR and enhancement
//! settings, the seek timeout, and the progress and cancellation hooks.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use hardsub::{CancellationToken, ExtractOptions, OcrLanguage, Region};
//!
//! let token = CancellationToken::new();
//! let options = ExtractOptions::new()
//!     .with_frame_step(1.0)
//!     .with_region(Region::new(0, 600, 1280, 120)?)
//!     .with_language(OcrLanguage::Japanese)
//!     .with_seek_timeout(Duration::from_secs(5))
//!     .with_cancellation(token.clone());
//!
//! options.validate()?;
//! # Ok::<(), hardsub::HardsubError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    enhance::EnhanceOptions,
    error::HardsubError,
    extractor::DEFAULT_SEEK_TIMEOUT,
    ocr::{OcrConfig, OcrLanguage},
    progress::{CancellationToken, NoOpProgress, ProgressCallback},
    region::Region,
};

/// Smallest accepted sampling step, in seconds.
pub const MIN_FRAME_STEP: f64 = 0.1;

/// Largest accepted sampling step, in seconds.
pub const MAX_FRAME_STEP: f64 = 2.0;

/// Default sampling step, in seconds.
pub const DEFAULT_FRAME_STEP: f64 = 0.5;

/// Configuration for one extraction run.
///
/// A default-constructed value samples every half second over the full
/// frame, recognizes English with the alphanumeric whitelist, and reports
/// no progress.
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) frame_step: f64,
    pub(crate) region: Option<Region>,
    pub(crate) ocr: OcrConfig,
    pub(crate) seek_timeout: Duration,
    pub(crate) enhance: EnhanceOptions,
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Cancellation token. `None` means never cancelled.
    pub(crate) cancellation: Option<CancellationToken>,
    /// How often to fire the progress callback (every N samples).
    pub(crate) batch_size: u64,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("frame_step", &self.frame_step)
            .field("region", &self.region)
            .field("ocr", &self.ocr)
            .field("seek_timeout", &self.seek_timeout)
            .field("enhance", &self.enhance)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self {
            frame_step: DEFAULT_FRAME_STEP,
            region: None,
            ocr: OcrConfig::default(),
            seek_timeout: DEFAULT_SEEK_TIMEOUT,
            enhance: EnhanceOptions::default(),
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Seconds between samples. Checked by [`validate`](Self::validate).
    #[must_use]
    pub fn with_frame_step(mut self, step: f64) -> Self {
        self.frame_step = step;
        self
    }

    /// Restrict recognition to `region`. The default is the full frame.
    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Change the OCR language, keeping the whitelist and segmentation mode.
    #[must_use]
    pub fn with_language(mut self, language: OcrLanguage) -> Self {
        self.ocr.language = language;
        self
    }

    /// Replace the OCR character whitelist. `None` disables it.
    #[must_use]
    pub fn with_whitelist(mut self, whitelist: Option<String>) -> Self {
        self.ocr.whitelist = whitelist;
        self
    }

    /// Replace the complete OCR configuration.
    #[must_use]
    pub fn with_ocr_config(mut self, config: OcrConfig) -> Self {
        self.ocr = config;
        self
    }

    /// Bound on how long each seek may take before the sample is skipped.
    #[must_use]
    pub fn with_seek_timeout(mut self, timeout: Duration) -> Self {
        self.seek_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_enhance_options(mut self, options: EnhanceOptions) -> Self {
        self.enhance = options;
        self
    }

    /// Attach a progress callback.
    ///
    /// The callback is invoked every [`batch_size`](ExtractOptions::with_batch_size)
    /// samples during extraction.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled, the run stops before its next sample
    /// and returns [`HardsubError::Cancelled`].
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires.
    ///
    /// A value of 1 means every sample; 10 means every 10th sample.
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn frame_step(&self) -> f64 {
        self.frame_step
    }

    pub fn region(&self) -> Option<Region> {
        self.region
    }

    pub fn ocr_config(&self) -> &OcrConfig {
        &self.ocr
    }

    pub fn seek_timeout(&self) -> Duration {
        self.seek_timeout
    }

    pub fn enhance_options(&self) -> &EnhanceOptions {
        &self.enhance
    }

    /// Check the options before a run starts.
    ///
    /// # Errors
    ///
    /// Returns [`HardsubError::InvalidParameter`] if the frame step is
    /// outside `[0.1, 2.0]` seconds or the seek timeout is zero.
    pub fn validate(&self) -> Result<(), HardsubError> {
        if !(MIN_FRAME_STEP..=MAX_FRAME_STEP).contains(&self.frame_step) {
            return Err(HardsubError::InvalidParameter(format!(
                "frame step must be between {MIN_FRAME_STEP} and {MAX_FRAME_STEP} seconds (got {})",
                self.frame_step
            )));
        }
        if self.seek_timeout.is_zero() {
            return Err(HardsubError::InvalidParameter(
                "seek timeout must be greater than zero".to_string(),
            ));
        }
        if self.seek_timeout < Duration::from_secs(5) {
            log::warn!(
                "Seek timeout of {:?} is short; slow seeks will be skipped",
                self.seek_timeout
            );
        }
        Ok(())
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
