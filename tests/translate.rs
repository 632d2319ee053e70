//! Translation merge and OpenAI backend tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hardsub::{
    HardsubError, OpenAiTranslator, OperationType, ProgressCallback, ProgressInfo,
    SubtitleRecord, SubtitleTrack, TranslateLanguage, Translator, translate_track,
    translate_track_with_progress,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn three_records() -> SubtitleTrack {
    SubtitleTrack::from_records(vec![
        SubtitleRecord::new(1, 0.0, 0.5, "one"),
        SubtitleRecord::new(2, 0.5, 1.0, "two"),
        SubtitleRecord::new(3, 1.0, 1.5, "three"),
    ])
}

/// Upper-cases text, failing for one chosen input.
#[derive(Default)]
struct ShoutingTranslator {
    fail_on: Option<&'static str>,
    calls: AtomicUsize,
}

#[async_trait]
impl Translator for ShoutingTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language_name: &str,
        credential: &str,
    ) -> Result<String, HardsubError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(credential, "secret");
        if self.fail_on == Some(text) {
            return Err(HardsubError::TranslationRequestFailed("HTTP 500".to_string()));
        }
        Ok(format!("{}:{}", target_language_name, text.to_uppercase()))
    }
}

#[tokio::test]
async fn failed_record_stays_untranslated() {
    let translator = Arc::new(ShoutingTranslator {
        fail_on: Some("two"),
        ..ShoutingTranslator::default()
    });
    let track = three_records();

    let translated = translate_track(
        &track,
        TranslateLanguage::French,
        Some("secret"),
        translator.clone(),
    )
    .await
    .expect("per-record failures must not fail the merge");

    assert_eq!(translator.calls.load(Ordering::SeqCst), 3);
    let records = translated.records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].translated.as_deref(), Some("Français:ONE"));
    assert_eq!(records[1].translated, None);
    assert_eq!(records[2].translated.as_deref(), Some("Français:THREE"));

    for (original, merged) in track.iter().zip(records) {
        assert_eq!(original.index, merged.index);
        assert_eq!(original.start, merged.start);
        assert_eq!(original.end, merged.end);
        assert_eq!(original.text, merged.text);
    }
}

#[derive(Default)]
struct RecordingProgress {
    infos: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Ok(mut infos) = self.infos.lock() {
            infos.push(info.clone());
        }
    }
}

#[tokio::test]
async fn translation_reports_each_settled_request() {
    let translator = Arc::new(ShoutingTranslator {
        fail_on: Some("two"),
        ..ShoutingTranslator::default()
    });
    let progress = Arc::new(RecordingProgress::default());

    translate_track_with_progress(
        &three_records(),
        TranslateLanguage::Spanish,
        Some("secret"),
        translator,
        progress.clone(),
    )
    .await
    .expect("merge should succeed");

    let infos = progress.infos.lock().expect("progress lock").clone();
    let counts: Vec<u64> = infos.iter().map(|info| info.current).collect();
    assert_eq!(counts, vec![1, 2, 3]);
    assert!(infos.iter().all(|info| info.operation == OperationType::Translation));
    assert!(infos.iter().all(|info| info.total == Some(3)));

    let last = infos.last().expect("final report");
    assert_eq!(last.records, 2);
    assert_eq!(last.percentage, Some(100.0));
}

#[tokio::test]
async fn empty_track_translation_reports_once() {
    let progress = Arc::new(RecordingProgress::default());

    let translated = translate_track_with_progress(
        &SubtitleTrack::new(),
        TranslateLanguage::Korean,
        Some("secret"),
        Arc::new(ShoutingTranslator::default()),
        progress.clone(),
    )
    .await
    .expect("empty merge should succeed");

    assert!(translated.is_empty());
    let infos = progress.infos.lock().expect("progress lock").clone();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].current, 0);
    assert_eq!(infos[0].total, Some(0));
}

#[tokio::test]
async fn missing_key_fails_before_any_request() {
    let translator = Arc::new(ShoutingTranslator::default());

    for credential in [None, Some(""), Some("   ")] {
        let result = translate_track(
            &three_records(),
            TranslateLanguage::German,
            credential,
            translator.clone(),
        )
        .await;
        assert!(matches!(result, Err(HardsubError::MissingApiKey)));
    }

    assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_track_translates_to_empty_track() {
    let translator = Arc::new(ShoutingTranslator::default());
    let translated = translate_track(
        &SubtitleTrack::new(),
        TranslateLanguage::Japanese,
        Some("secret"),
        translator,
    )
    .await
    .expect("empty merge should succeed");

    assert!(translated.is_empty());
}

#[test]
fn language_table_is_stable() {
    let table: Vec<(&str, &str)> = TranslateLanguage::ALL
        .iter()
        .map(|language| (language.code(), language.name()))
        .collect();
    assert_eq!(
        table,
        vec![
            ("en", "English"),
            ("ja", "日本語"),
            ("es", "Español"),
            ("fr", "Français"),
            ("de", "Deutsch"),
            ("zh", "中文"),
            ("ko", "한국어"),
            ("it", "Italiano"),
            ("pt", "Português"),
            ("ru", "Русский"),
        ]
    );
}

#[test]
fn language_codes_parse() {
    assert_eq!("JA".parse::<TranslateLanguage>().ok(), Some(TranslateLanguage::Japanese));
    assert!(matches!(
        "xx".parse::<TranslateLanguage>(),
        Err(HardsubError::UnsupportedLanguage(_))
    ));
}

// ── OpenAiTranslator ───────────────────────────────────────────────

fn translator_for(server: &MockServer) -> OpenAiTranslator {
    OpenAiTranslator::new()
        .expect("client should build")
        .with_base_url(server.uri())
}

#[tokio::test]
async fn openai_translator_sends_chat_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                { "role": "system", "content": "Translate the following into Español." },
                { "role": "user", "content": "Good morning" },
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "  Buenos días\n" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let translated = translator_for(&server)
        .translate("Good morning", "Español", "sk-test")
        .await
        .expect("translation should succeed");

    assert_eq!(translated, "Buenos días");
}

#[tokio::test]
async fn openai_translator_reports_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let result = translator_for(&server)
        .translate("Hello", "Deutsch", "sk-bad")
        .await;

    match result {
        Err(HardsubError::TranslationRequestFailed(message)) => {
            assert!(message.contains("401"), "unexpected message: {message}");
        }
        other => panic!("Expected TranslationRequestFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn openai_translator_rejects_empty_choices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let result = translator_for(&server)
        .translate("Hello", "Deutsch", "sk-test")
        .await;

    assert!(matches!(result, Err(HardsubError::TranslationRequestFailed(_))));
}

#[tokio::test]
async fn merge_over_http_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [ { "message": { "content": "traduit" } } ]
        })))
        .expect(3)
        .mount(&server)
        .await;

    let translated = translate_track(
        &three_records(),
        TranslateLanguage::French,
        Some("sk-test"),
        Arc::new(translator_for(&server)),
    )
    .await
    .expect("merge should succeed");

    assert!(
        translated
            .iter()
            .all(|record| record.translated.as_deref() == Some("traduit"))
    );
}
