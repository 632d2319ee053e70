//! Tesseract command-line engine.
//!
//! [`TesseractCommand`] implements [`OcrEngine`] by running the `tesseract`
//! program once per frame, with the crop piped in as PNG on stdin and the
//! text read back from stdout. The executable is taken from the
//! `TESSERACT_CMD` environment variable, falling back to `tesseract` on
//! `PATH`.

use std::{ffi::OsString, process::Stdio};

use async_trait::async_trait;
use tokio::{io::AsyncWriteExt, process::Command};

use crate::{
    error::HardsubError,
    frame::FrameBuffer,
    ocr::{OcrConfig, OcrEngine},
};

/// Environment variable overriding the Tesseract executable.
pub const TESSERACT_ENV: &str = "TESSERACT_CMD";

/// Runs the `tesseract` executable for each recognition.
#[derive(Debug, Clone)]
pub struct TesseractCommand {
    program: OsString,
    tessdata_dir: Option<OsString>,
    config: Option<OcrConfig>,
}

impl TesseractCommand {
    /// Use the executable named by `TESSERACT_CMD`, or `tesseract`.
    pub fn from_env() -> Self {
        let program = std::env::var_os(TESSERACT_ENV).unwrap_or_else(|| OsString::from("tesseract"));
        Self::new(program)
    }

    /// Use a specific executable.
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        Self {
            program: program.into(),
            tessdata_dir: None,
            config: None,
        }
    }

    /// Load traineddata files from `directory` instead of the default
    /// location.
    #[must_use]
    pub fn with_tessdata_dir<S: Into<OsString>>(mut self, directory: S) -> Self {
        self.tessdata_dir = Some(directory.into());
        self
    }

    /// Command-line arguments for one recognition under `config`, after
    /// the program name.
    pub fn arguments(&self, config: &OcrConfig) -> Vec<OsString> {
        let mut arguments: Vec<OsString> = vec!["stdin".into(), "stdout".into()];
        if let Some(directory) = &self.tessdata_dir {
            arguments.push("--tessdata-dir".into());
            arguments.push(directory.clone());
        }
        arguments.push("-l".into());
        arguments.push(config.language.code().into());
        arguments.push("--psm".into());
        arguments.push(config.page_seg_mode.as_tesseract_value().to_string().into());
        if let Some(whitelist) = &config.whitelist {
            arguments.push("-c".into());
            arguments.push(format!("tessedit_char_whitelist={whitelist}").into());
        }
        arguments
    }
}

impl Default for TesseractCommand {
    fn default() -> Self {
        Self::from_env()
    }
}

#[async_trait(?Send)]
impl OcrEngine for TesseractCommand {
    async fn configure(&mut self, config: &OcrConfig) -> Result<(), HardsubError> {
        let output = Command::new(&self.program)
            .arg("--list-langs")
            .args(
                self.tessdata_dir
                    .iter()
                    .flat_map(|directory| [OsString::from("--tessdata-dir"), directory.clone()]),
            )
            .output()
            .await
            .map_err(|error| {
                HardsubError::OcrEngine(format!(
                    "failed to run {}: {error}",
                    self.program.to_string_lossy()
                ))
            })?;

        // Older releases print the listing on stderr.
        let listing = [&output.stdout, &output.stderr]
            .map(|stream| String::from_utf8_lossy(stream).into_owned())
            .join("\n");
        let code = config.language.code();
        if !listing.lines().any(|line| line.trim() == code) {
            return Err(HardsubError::OcrEngine(format!(
                "tesseract has no traineddata for {code}"
            )));
        }

        self.config = Some(config.clone());
        Ok(())
    }

    async fn recognize(&mut self, frame: &FrameBuffer) -> Result<String, HardsubError> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| HardsubError::OcrEngine("engine used before configure".to_string()))?;
        let png = frame.to_png()?;

        let mut child = Command::new(&self.program)
            .args(self.arguments(config))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| HardsubError::OcrEngine(format!("failed to start tesseract: {error}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&png).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(HardsubError::OcrEngine(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
