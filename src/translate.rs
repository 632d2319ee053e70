//! Machine translation of a finished track.
//!
//! [`translate_track`] sends every record to a [`Translator`] at once and
//! waits for all of them. A record whose request fails keeps
//! `translated == None`; the rest of the track is unaffected. Timing, text
//! and ordering are always preserved.
//!
//! [`OpenAiTranslator`] is the bundled HTTP backend, talking to an
//! OpenAI-compatible chat completions endpoint.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::{
    error::HardsubError,
    progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker},
    subtitle::{SubtitleRecord, SubtitleTrack},
};

/// Default API root for [`OpenAiTranslator`].
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Default chat model for [`OpenAiTranslator`].
pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Target languages offered for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TranslateLanguage {
    #[default]
    English,
    Japanese,
    Spanish,
    French,
    German,
    Chinese,
    Korean,
    Italian,
    Portuguese,
    Russian,
}

impl TranslateLanguage {
    /// Every supported target, in display order.
    pub const ALL: [TranslateLanguage; 10] = [
        TranslateLanguage::English,
        TranslateLanguage::Japanese,
        TranslateLanguage::Spanish,
        TranslateLanguage::French,
        TranslateLanguage::German,
        TranslateLanguage::Chinese,
        TranslateLanguage::Korean,
        TranslateLanguage::Italian,
        TranslateLanguage::Portuguese,
        TranslateLanguage::Russian,
    ];

    /// Two-letter language code.
    pub fn code(self) -> &'static str {
        match self {
            TranslateLanguage::English => "en",
            TranslateLanguage::Japanese => "ja",
            TranslateLanguage::Spanish => "es",
            TranslateLanguage::French => "fr",
            TranslateLanguage::German => "de",
            TranslateLanguage::Chinese => "zh",
            TranslateLanguage::Korean => "ko",
            TranslateLanguage::Italian => "it",
            TranslateLanguage::Portuguese => "pt",
            TranslateLanguage::Russian => "ru",
        }
    }

    /// The language's own name for itself. This is what the translation
    /// backend is asked to translate into.
    pub fn name(self) -> &'static str {
        match self {
            TranslateLanguage::English => "English",
            TranslateLanguage::Japanese => "日本語",
            TranslateLanguage::Spanish => "Español",
            TranslateLanguage::French => "Français",
            TranslateLanguage::German => "Deutsch",
            TranslateLanguage::Chinese => "中文",
            TranslateLanguage::Korean => "한국어",
            TranslateLanguage::Italian => "Italiano",
            TranslateLanguage::Portuguese => "Português",
            TranslateLanguage::Russian => "Русский",
        }
    }
}

impl Display for TranslateLanguage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TranslateLanguage {
    type Err = HardsubError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        TranslateLanguage::ALL
            .into_iter()
            .find(|language| language.code().eq_ignore_ascii_case(value))
            .ok_or_else(|| HardsubError::UnsupportedLanguage(value.to_string()))
    }
}

/// A machine-translation backend.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into the language called `target_language_name`.
    ///
    /// # Errors
    ///
    /// Any failure is reported as
    /// [`HardsubError::TranslationRequestFailed`] and only affects the record
    /// being translated.
    async fn translate(
        &self,
        text: &str,
        target_language_name: &str,
        credential: &str,
    ) -> Result<String, HardsubError>;
}

/// Translate every record of `track` into `target`.
///
/// Requests run concurrently; the returned track has the same records in
/// the same order, with `translated` set for each request that succeeded.
///
/// # Errors
///
/// Returns [`HardsubError::MissingApiKey`] before issuing any request if
/// `credential` is absent or blank.
pub async fn translate_track<T>(
    track: &SubtitleTrack,
    target: TranslateLanguage,
    credential: Option<&str>,
    translator: Arc<T>,
) -> Result<SubtitleTrack, HardsubError>
where
    T: Translator + ?Sized + 'static,
{
    translate_track_with_progress(track, target, credential, translator, Arc::new(NoOpProgress))
        .await
}

/// Like [`translate_track`], reporting to `progress` as each request
/// settles.
///
/// Reports carry [`OperationType::Translation`]; `current` counts settled
/// requests and `records` counts successful translations.
///
/// # Errors
///
/// See [`translate_track`].
pub async fn translate_track_with_progress<T>(
    track: &SubtitleTrack,
    target: TranslateLanguage,
    credential: Option<&str>,
    translator: Arc<T>,
    progress: Arc<dyn ProgressCallback>,
) -> Result<SubtitleTrack, HardsubError>
where
    T: Translator + ?Sized + 'static,
{
    let credential = credential
        .map(str::trim)
        .filter(|credential| !credential.is_empty())
        .ok_or(HardsubError::MissingApiKey)?;
    let credential: Arc<str> = Arc::from(credential);

    let mut records: Vec<SubtitleRecord> = track
        .iter()
        .cloned()
        .map(|mut record| {
            record.translated = None;
            record
        })
        .collect();

    log::debug!(
        "Translating {} subtitle records into {}",
        records.len(),
        target.name()
    );

    let mut tasks = JoinSet::new();
    for (position, record) in records.iter().enumerate() {
        let translator = Arc::clone(&translator);
        let credential = Arc::clone(&credential);
        let text = record.text.clone();
        let index = record.index;
        tasks.spawn(async move {
            let result = translator
                .translate(&text, target.name(), &credential)
                .await;
            (position, index, result)
        });
    }

    let mut tracker = ProgressTracker::new(
        progress,
        OperationType::Translation,
        Some(records.len() as u64),
        1,
    );
    let mut translated_count = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let settled_at = match joined {
            Ok((position, _, Ok(translated))) => {
                translated_count += 1;
                records[position].translated = Some(translated);
                records[position].start.as_secs_f64()
            }
            Ok((position, index, Err(error))) => {
                log::warn!("Translation of subtitle {index} failed: {error}");
                records[position].start.as_secs_f64()
            }
            Err(error) => {
                log::warn!("Translation task did not complete: {error}");
                0.0
            }
        };
        tracker.advance(settled_at, translated_count);
    }
    tracker.finish();

    log::info!(
        "Translated {} of {} subtitle records into {}",
        translated_count,
        records.len(),
        target.name()
    );

    Ok(SubtitleTrack::from_records(records))
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Translator backed by an OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiTranslator {
    client: Client,
    base_url: String,
    model: String,
}

impl OpenAiTranslator {
    /// A translator for the public OpenAI API using [`OPENAI_MODEL`].
    ///
    /// # Errors
    ///
    /// Returns [`HardsubError::TranslationRequestFailed`] if the HTTP client
    /// cannot be built.
    pub fn new() -> Result<Self, HardsubError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: OPENAI_BASE_URL.to_string(),
            model: OPENAI_MODEL.to_string(),
        })
    }

    /// Send requests to a different API root, e.g. a proxy or a local
    /// compatible server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language_name: &str,
        credential: &str,
    ) -> Result<String, HardsubError> {
        let instruction = format!("Translate the following into {target_language_name}.");
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &instruction,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
        };

        log::trace!("Chat completion request: {request:?}");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(credential)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HardsubError::TranslationRequestFailed(format!(
                "HTTP {status}: {}",
                body.trim()
            )));
        }

        let reply: ChatResponse = response.json().await?;
        log::trace!("Chat completion response: {reply:?}");
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| {
                HardsubError::TranslationRequestFailed(
                    "response contained no message content".to_string(),
                )
            })
    }
}
