//! OCR session lifecycle tests.

use async_trait::async_trait;
use hardsub::{
    FrameBuffer, HardsubError, OcrConfig, OcrEngine, OcrLanguage, OcrSession, PageSegMode,
    SessionState, WHITELIST_ALPHANUMERIC, cjk_whitelist,
};

/// Counts lifecycle calls and answers with a fixed result.
#[derive(Default)]
struct CountingEngine {
    configures: usize,
    terminates: usize,
    reject_language: Option<OcrLanguage>,
    answer: Option<String>,
}

#[async_trait(?Send)]
impl OcrEngine for CountingEngine {
    async fn configure(&mut self, config: &OcrConfig) -> Result<(), HardsubError> {
        self.configures += 1;
        if self.reject_language == Some(config.language) {
            return Err(HardsubError::OcrEngine(format!(
                "no traineddata for {}",
                config.language
            )));
        }
        Ok(())
    }

    async fn recognize(&mut self, _frame: &FrameBuffer) -> Result<String, HardsubError> {
        self.answer
            .clone()
            .ok_or_else(|| HardsubError::OcrEngine("engine crashed".to_string()))
    }

    async fn terminate(&mut self) {
        self.terminates += 1;
    }
}

fn frame() -> FrameBuffer {
    FrameBuffer::filled(4, 4, [0, 0, 0, 255])
}

#[tokio::test]
async fn starts_uninitialized_and_rejects_recognition() {
    let mut session = OcrSession::new(CountingEngine::default());
    assert_eq!(session.state(), &SessionState::Uninitialized);

    let result = session.recognize(&frame()).await;
    assert!(matches!(result, Err(HardsubError::OcrUnavailable(_))));
}

#[tokio::test]
async fn identical_configuration_is_applied_once() {
    let mut session = OcrSession::new(CountingEngine::default());
    let config = OcrConfig::new(OcrLanguage::Japanese);

    session.configure(&config).await.expect("configure");
    session.configure(&config).await.expect("configure again");

    assert_eq!(session.state(), &SessionState::Ready(OcrLanguage::Japanese));
    assert_eq!(session.engine().configures, 1);
}

#[tokio::test]
async fn language_change_reconfigures() {
    let mut session = OcrSession::new(CountingEngine::default());

    session
        .configure(&OcrConfig::new(OcrLanguage::English))
        .await
        .expect("configure");
    session
        .configure(&OcrConfig::new(OcrLanguage::French))
        .await
        .expect("reconfigure");

    assert_eq!(session.state(), &SessionState::Ready(OcrLanguage::French));
    assert_eq!(session.engine().configures, 2);
}

#[tokio::test]
async fn rejected_configuration_returns_to_uninitialized() {
    let mut session = OcrSession::new(CountingEngine {
        reject_language: Some(OcrLanguage::ChineseSimplified),
        ..CountingEngine::default()
    });

    session
        .configure(&OcrConfig::new(OcrLanguage::English))
        .await
        .expect("configure");
    let result = session
        .configure(&OcrConfig::new(OcrLanguage::ChineseSimplified))
        .await;

    assert!(matches!(result, Err(HardsubError::OcrEngine(_))));
    assert_eq!(session.state(), &SessionState::Uninitialized);
}

#[tokio::test]
async fn recognition_is_trimmed() {
    let mut session = OcrSession::new(CountingEngine {
        answer: Some("\n  HELLO WORLD \n".to_string()),
        ..CountingEngine::default()
    });
    session.configure(&OcrConfig::default()).await.expect("configure");

    let text = session.recognize(&frame()).await.expect("recognize");
    assert_eq!(text, "HELLO WORLD");
}

#[tokio::test]
async fn engine_failure_reads_as_empty_text() {
    let mut session = OcrSession::new(CountingEngine::default());
    session.configure(&OcrConfig::default()).await.expect("configure");

    let text = session.recognize(&frame()).await.expect("failures are not errors");
    assert_eq!(text, "");
}

#[tokio::test]
async fn shutdown_is_final_and_idempotent() {
    let mut session = OcrSession::new(CountingEngine::default());
    session.configure(&OcrConfig::default()).await.expect("configure");

    session.shutdown().await;
    session.shutdown().await;

    assert_eq!(session.state(), &SessionState::Terminated);
    assert_eq!(session.engine().terminates, 1);
    assert!(matches!(
        session.configure(&OcrConfig::default()).await,
        Err(HardsubError::OcrUnavailable(_))
    ));
    assert!(matches!(
        session.recognize(&frame()).await,
        Err(HardsubError::OcrUnavailable(_))
    ));
}

#[test]
fn default_config_uses_alphanumeric_whitelist() {
    let config = OcrConfig::default();
    assert_eq!(config.language, OcrLanguage::English);
    assert_eq!(config.whitelist.as_deref(), Some(WHITELIST_ALPHANUMERIC));
    assert_eq!(config.page_seg_mode, PageSegMode::SingleBlock);
    assert_eq!(config.page_seg_mode.as_tesseract_value(), 6);

    let cjk = OcrConfig::new(OcrLanguage::Japanese).with_whitelist(Some(cjk_whitelist()));
    assert!(cjk.whitelist.as_deref().is_some_and(|set| set.contains('。')));
}

#[test]
fn cjk_whitelist_lists_every_character() {
    let whitelist = cjk_whitelist();

    for expected in ['ぁ', 'か', 'ん', 'ァ', 'カ', 'ン', '一', '語', '龥', 'A', 'z', '7', '。', 'ー'] {
        assert!(whitelist.contains(expected), "missing {expected}");
    }
    assert!(!whitelist.contains('-'));
    assert!(!whitelist.contains('ゔ'));
    assert_eq!(whitelist.chars().count(), 83 + 83 + 20902 + 26 + 26 + 10 + 5);
}

#[test]
fn language_codes_round_trip_through_display() {
    for language in OcrLanguage::ALL {
        assert_eq!(language.to_string().parse::<OcrLanguage>().ok(), Some(language));
    }
    assert_eq!(
        "CHI_SIM".parse::<OcrLanguage>().ok(),
        Some(OcrLanguage::ChineseSimplified)
    );
    assert!(matches!(
        "deu".parse::<OcrLanguage>(),
        Err(HardsubError::UnsupportedLanguage(_))
    ));
}
