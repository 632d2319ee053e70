//! The OCR adapter.
//!
//! Recognition itself is delegated to an [`OcrEngine`]. The pipeline never
//! talks to an engine directly; it goes through an [`OcrSession`], which
//! owns the engine for the lifetime of a run and tracks its state:
//!
//! ```text
//! Uninitialized --configure(lang)--> Ready(lang) --shutdown()--> Terminated
//!                                     |      ^
//!                                     +------+ configure(other lang)
//! ```
//!
//! Configuring the language the session is already set up for is a no-op,
//! so an engine is initialized once per language, not once per frame.
//! Recognition failures are reported as empty text, which the assembler
//! skips like any other empty result.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use async_trait::async_trait;

use crate::{error::HardsubError, frame::FrameBuffer};

/// Uppercase and lowercase ASCII letters, digits, and `:.,`.
pub const WHITELIST_ALPHANUMERIC: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789:.,";

/// Hiragana, katakana, common CJK ideographs, ASCII alphanumerics and
/// Japanese punctuation, spelled out character by character since the
/// engine's whitelist has no range syntax.
pub fn cjk_whitelist() -> String {
    ('\u{3041}'..='\u{3093}')
        .chain('\u{30A1}'..='\u{30F3}')
        .chain('\u{4E00}'..='\u{9FA5}')
        .chain('A'..='Z')
        .chain('a'..='z')
        .chain('0'..='9')
        .chain("。、！？ー".chars())
        .collect()
}

/// Languages the OCR engine can be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OcrLanguage {
    /// `eng`.
    #[default]
    English,
    /// `jpn`.
    Japanese,
    /// `spa`.
    Spanish,
    /// `fra`.
    French,
    /// `chi_sim`.
    ChineseSimplified,
}

impl OcrLanguage {
    /// Every supported language, in display order.
    pub const ALL: [OcrLanguage; 5] = [
        OcrLanguage::English,
        OcrLanguage::Japanese,
        OcrLanguage::Spanish,
        OcrLanguage::French,
        OcrLanguage::ChineseSimplified,
    ];

    /// The traineddata code passed to the engine.
    pub fn code(self) -> &'static str {
        match self {
            OcrLanguage::English => "eng",
            OcrLanguage::Japanese => "jpn",
            OcrLanguage::Spanish => "spa",
            OcrLanguage::French => "fra",
            OcrLanguage::ChineseSimplified => "chi_sim",
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            OcrLanguage::English => "English",
            OcrLanguage::Japanese => "Japanese",
            OcrLanguage::Spanish => "Spanish",
            OcrLanguage::French => "French",
            OcrLanguage::ChineseSimplified => "Chinese (Simplified)",
        }
    }
}

impl Display for OcrLanguage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OcrLanguage {
    type Err = HardsubError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        OcrLanguage::ALL
            .into_iter()
            .find(|language| language.code().eq_ignore_ascii_case(value))
            .ok_or_else(|| HardsubError::UnsupportedLanguage(value.to_string()))
    }
}

/// Tesseract-style page segmentation modes.
///
/// Caption bands are always read as one uniform block of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum PageSegMode {
    /// Treat the image as a single uniform block of text (`6`).
    #[default]
    SingleBlock,
}

impl PageSegMode {
    /// Numeric mode as understood by Tesseract.
    pub fn as_tesseract_value(self) -> u8 {
        match self {
            PageSegMode::SingleBlock => 6,
        }
    }
}

/// Everything an engine is configured with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    /// Recognition language.
    pub language: OcrLanguage,
    /// Characters the engine may emit. `None` lets it emit anything.
    pub whitelist: Option<String>,
    /// Page layout assumption.
    pub page_seg_mode: PageSegMode,
}

impl OcrConfig {
    /// Configuration for `language` with the alphanumeric whitelist and
    /// single-block segmentation.
    pub fn new(language: OcrLanguage) -> Self {
        Self {
            language,
            whitelist: Some(WHITELIST_ALPHANUMERIC.to_string()),
            page_seg_mode: PageSegMode::SingleBlock,
        }
    }

    /// Replace the whitelist.
    #[must_use]
    pub fn with_whitelist(mut self, whitelist: Option<String>) -> Self {
        self.whitelist = whitelist;
        self
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::new(OcrLanguage::default())
    }
}

/// An optical character recognition engine.
///
/// Engines are driven from the single-threaded extraction loop and need not
/// be `Send`.
#[async_trait(?Send)]
pub trait OcrEngine {
    /// Load (or reload) the engine for `config`.
    ///
    /// Called once before the first recognition and again whenever the
    /// configuration changes.
    async fn configure(&mut self, config: &OcrConfig) -> Result<(), HardsubError>;

    /// Recognize the text in `frame`.
    ///
    /// Returns an empty string when nothing is recognized with confidence.
    async fn recognize(&mut self, frame: &FrameBuffer) -> Result<String, HardsubError>;

    /// Release engine resources. The default does nothing.
    async fn terminate(&mut self) {}
}

/// Lifecycle state of an [`OcrSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No configuration has been applied yet.
    Uninitialized,
    /// Configured and ready for the given language.
    Ready(OcrLanguage),
    /// Shut down; the session cannot be used again.
    Terminated,
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => f.write_str("uninitialized"),
            SessionState::Ready(language) => write!(f, "ready({language})"),
            SessionState::Terminated => f.write_str("terminated"),
        }
    }
}

/// Owns an [`OcrEngine`] and its configuration for the duration of a run.
#[derive(Debug)]
pub struct OcrSession<E> {
    engine: E,
    state: SessionState,
    config: Option<OcrConfig>,
}

impl<E: OcrEngine> OcrSession<E> {
    /// Wrap an unconfigured engine.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: SessionState::Uninitialized,
            config: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Borrow the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Bring the session to `Ready(config.language)`.
    ///
    /// The engine is only reconfigured when the configuration differs from
    /// the one currently applied.
    ///
    /// # Errors
    ///
    /// - [`HardsubError::OcrUnavailable`] if the session was shut down.
    /// - [`HardsubError::OcrEngine`] if the engine rejects the configuration;
    ///   the session is then back in `Uninitialized`.
    pub async fn configure(&mut self, config: &OcrConfig) -> Result<(), HardsubError> {
        if self.state == SessionState::Terminated {
            return Err(HardsubError::OcrUnavailable(self.state.to_string()));
        }
        if self.config.as_ref() == Some(config) {
            return Ok(());
        }

        log::debug!("Configuring OCR engine for {}", config.language);
        if let Err(error) = self.engine.configure(config).await {
            self.state = SessionState::Uninitialized;
            self.config = None;
            return Err(error);
        }

        self.state = SessionState::Ready(config.language);
        self.config = Some(config.clone());
        Ok(())
    }

    /// Recognize `frame`, returning trimmed text.
    ///
    /// Engine failures are logged and reported as an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`HardsubError::OcrUnavailable`] unless the session is ready.
    pub async fn recognize(&mut self, frame: &FrameBuffer) -> Result<String, HardsubError> {
        if !matches!(self.state, SessionState::Ready(_)) {
            return Err(HardsubError::OcrUnavailable(self.state.to_string()));
        }

        match self.engine.recognize(frame).await {
            Ok(text) => Ok(text.trim().to_string()),
            Err(error) => {
                log::warn!("OCR recognition failed, treating as empty: {error}");
                Ok(String::new())
            }
        }
    }

    /// Terminate the engine. Further calls are rejected.
    pub async fn shutdown(&mut self) {
        if self.state == SessionState::Terminated {
            return;
        }
        self.engine.terminate().await;
        self.state = SessionState::Terminated;
        self.config = None;
    }
}
