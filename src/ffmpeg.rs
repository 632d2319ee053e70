//! FFmpeg log level configuration.
//!
//! FFmpeg prints its own warnings to stderr, independently of the `log`
//! crate. Decoding many seek targets in a damaged file can produce a lot of
//! this output, so the CLI lowers it to `Error` unless asked otherwise.
//!
//! ```no_run
//! use hardsub::FfmpegLogLevel;
//!
//! hardsub::set_ffmpeg_log_level(FfmpegLogLevel::Quiet);
//! ```

use std::str::FromStr;

use ffmpeg_next::util::log::Level;

use crate::error::HardsubError;

/// FFmpeg internal log verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FfmpegLogLevel {
    Quiet,
    Panic,
    Fatal,
    Error,
    /// FFmpeg's own default.
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }

    /// The level matching a Rust-side `log` filter, so `--verbose` raises
    /// both together.
    pub fn for_log_filter(filter: log::LevelFilter) -> Self {
        match filter {
            log::LevelFilter::Off => FfmpegLogLevel::Quiet,
            log::LevelFilter::Error | log::LevelFilter::Warn => FfmpegLogLevel::Error,
            log::LevelFilter::Info => FfmpegLogLevel::Warning,
            log::LevelFilter::Debug => FfmpegLogLevel::Verbose,
            log::LevelFilter::Trace => FfmpegLogLevel::Debug,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = HardsubError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quiet" => Ok(FfmpegLogLevel::Quiet),
            "panic" => Ok(FfmpegLogLevel::Panic),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "verbose" => Ok(FfmpegLogLevel::Verbose),
            "debug" => Ok(FfmpegLogLevel::Debug),
            "trace" => Ok(FfmpegLogLevel::Trace),
            other => Err(HardsubError::InvalidParameter(format!(
                "unknown FFmpeg log level '{other}'"
            ))),
        }
    }
}

/// Set FFmpeg's own log verbosity. Does not affect the `log` crate.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}
