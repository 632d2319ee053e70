use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use hardsub::{
    CancellationToken, ExportFormat, ExtractOptions, FfmpegLogLevel, MediaFile, OcrLanguage,
    OcrSession, OpenAiTranslator, OperationType, ProgressCallback, ProgressInfo, Region,
    TesseractCommand, TrackView, TranslateLanguage, WHITELIST_ALPHANUMERIC, cjk_whitelist,
    default_file_name, extract_subtitles, translate_track_with_progress, write_tracks,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  hardsub probe input.mp4 --json\n  hardsub extract input.mp4 --region 0,600,1280,120 --step 0.5 --progress\n  hardsub extract input.mp4 --ocr-lang jpn --cjk --translate-to en --format txt\n  hardsub languages\n  hardsub completions zsh > _hardsub";

#[derive(Debug, Parser)]
#[command(
    name = "hardsub",
    version,
    about = "Extract burned-in subtitles from video files",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print video metadata.
    #[command(
        about = "Print video metadata",
        after_help = "Examples:\n  hardsub probe input.mp4\n  hardsub probe input.mp4 --json"
    )]
    Probe {
        /// Input video path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Extract burned-in subtitles with OCR.
    #[command(
        about = "Extract burned-in subtitles",
        after_help = "Examples:\n  hardsub extract input.mp4 --region 0,600,1280,120\n  hardsub extract input.mp4 --selection 40,590,1240,700 --save-region regions.json\n  hardsub extract input.mp4 --region-file regions.json --translate-to fr"
    )]
    Extract {
        /// Input video path.
        input: PathBuf,

        /// Region to read, as x,y,width,height in video pixels.
        #[arg(long, conflicts_with_all = ["region_file", "selection"])]
        region: Option<String>,

        /// Region drawn as two corners x1,y1,x2,y2; padded by 5 px.
        #[arg(long, conflicts_with = "region_file")]
        selection: Option<String>,

        /// Read the region from a JSON file.
        #[arg(long)]
        region_file: Option<PathBuf>,

        /// Write the region used for this run to a JSON file.
        #[arg(long)]
        save_region: Option<PathBuf>,

        /// Seconds between samples (0.1 to 2.0).
        #[arg(long, default_value_t = 0.5)]
        step: f64,

        /// OCR language (eng, jpn, spa, fra, chi_sim).
        #[arg(long, default_value = "eng")]
        ocr_lang: String,

        /// Characters the OCR engine may emit.
        #[arg(long, conflicts_with_all = ["cjk", "no_whitelist"])]
        whitelist: Option<String>,

        /// Use the CJK-inclusive whitelist.
        #[arg(long)]
        cjk: bool,

        /// Let the OCR engine emit any character.
        #[arg(long, conflicts_with = "cjk")]
        no_whitelist: bool,

        /// Seconds to wait for each seek before skipping the sample.
        #[arg(long, default_value_t = 10.0)]
        seek_timeout: f64,

        /// Output format: srt | txt.
        #[arg(long, default_value = "srt")]
        format: String,

        /// Directory the subtitle files are written to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Print the tracks to stdout instead of writing files.
        #[arg(long)]
        print: bool,

        /// Also produce a track translated into this language (en, ja, es, fr, de, zh, ko, it, pt, ru).
        #[arg(long)]
        translate_to: Option<String>,

        /// Translation API key.
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Translation API root.
        #[arg(long)]
        api_base: Option<String>,

        /// Translation model.
        #[arg(long)]
        model: Option<String>,

        /// Show a progress bar.
        #[arg(long)]
        progress: bool,

        /// Allow overwriting existing output files.
        #[arg(long)]
        overwrite: bool,
    },

    /// List supported OCR and translation languages.
    #[command(about = "List supported languages")]
    Languages,

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_corners(value: &str) -> Result<((f64, f64), (f64, f64)), Box<dyn std::error::Error>> {
    let numbers = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()?;
    match numbers.as_slice() {
        [x1, y1, x2, y2] => Ok(((*x1, *y1), (*x2, *y2))),
        _ => Err(format!("expected --selection as x1,y1,x2,y2 (got {value})").into()),
    }
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let filter = if global.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .init();

    let ffmpeg_level = match &global.log_level {
        Some(level) => level
            .parse::<FfmpegLogLevel>()
            .map_err(|_| format!("unsupported --log-level: {level}"))?,
        None => FfmpegLogLevel::for_log_filter(filter),
    };
    hardsub::set_ffmpeg_log_level(ffmpeg_level);
    Ok(())
}

/// Drives an indicatif bar from run progress.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg} [{eta}]",
        )?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        let message = if info.operation == OperationType::Translation {
            format!("requests, {} translated", info.records)
        } else {
            format!("samples, {} subtitles", info.records)
        };
        self.bar.set_message(message);
    }
}

/// Used when no progress bar was requested.
struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Probe { input, json } => {
            let media = MediaFile::open(&input)?;
            let metadata = media.metadata();
            let video = &metadata.video;
            if json {
                let payload = json!({
                    "format": metadata.format,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                    "video": {
                        "width": video.width,
                        "height": video.height,
                        "fps": video.frames_per_second,
                        "frame_count": video.frame_count,
                        "codec": video.codec,
                    },
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", metadata.format);
                println!("Duration: {:.3}s", metadata.duration.as_secs_f64());
                println!(
                    "Video: {}x{} @ {:.2} fps [{}]",
                    video.width, video.height, video.frames_per_second, video.codec,
                );
            }
        }
        Commands::Extract {
            input,
            region,
            selection,
            region_file,
            save_region,
            step,
            ocr_lang,
            whitelist,
            cjk,
            no_whitelist,
            seek_timeout,
            format,
            out_dir,
            print,
            translate_to,
            api_key,
            api_base,
            model,
            progress,
            overwrite,
        } => {
            let format: ExportFormat = format.parse()?;
            let language: OcrLanguage = ocr_lang.parse()?;
            let target = translate_to
                .as_deref()
                .map(str::parse::<TranslateLanguage>)
                .transpose()?;
            if target.is_some() && api_key.as_deref().is_none_or(|key| key.trim().is_empty()) {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    "no OPENAI_API_KEY or --api-key; only the original track will be produced"
                        .yellow()
                );
            }

            let mut media = MediaFile::open(&input)?;
            let (frame_width, frame_height) = {
                let video = &media.metadata().video;
                (video.width, video.height)
            };

            let region = match (region, selection, region_file) {
                (Some(region), _, _) => Some(region.parse::<Region>()?),
                (None, Some(selection), _) => {
                    let (start, end) = parse_corners(&selection)?;
                    Some(Region::from_selection(start, end, frame_width, frame_height)?)
                }
                (None, None, Some(path)) => Some(Region::load_json(path)?),
                (None, None, None) => None,
            };
            if let (Some(path), Some(region)) = (&save_region, &region) {
                ensure_writable_path(path, overwrite)?;
                region.save_json(path)?;
            }

            let whitelist = if no_whitelist {
                None
            } else if cjk {
                Some(cjk_whitelist())
            } else {
                Some(whitelist.unwrap_or_else(|| WHITELIST_ALPHANUMERIC.to_string()))
            };

            let token = CancellationToken::new();
            let mut options = ExtractOptions::new()
                .with_frame_step(step)
                .with_language(language)
                .with_whitelist(whitelist)
                .with_seek_timeout(Duration::try_from_secs_f64(seek_timeout)?)
                .with_cancellation(token.clone());
            if let Some(region) = region {
                options = options.with_region(region);
            }

            let bar = if progress {
                let terminal = Arc::new(TerminalProgress::new()?);
                options = options.with_progress(terminal.clone());
                Some(terminal)
            } else {
                None
            };

            let interrupt = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            });

            let mut session = OcrSession::new(TesseractCommand::from_env());
            let result = extract_subtitles(&mut media, &mut session, &options).await;
            session.shutdown().await;
            interrupt.abort();
            if let Some(terminal) = &bar {
                terminal.bar.finish_and_clear();
            }
            let track = result?;

            eprintln!(
                "{} {} subtitles from {}",
                "extracted".green().bold(),
                track.len(),
                input.display()
            );

            let translator = match target {
                Some(_) => {
                    let mut translator = OpenAiTranslator::new()?;
                    if let Some(base) = api_base {
                        translator = translator.with_base_url(base);
                    }
                    if let Some(model) = model {
                        translator = translator.with_model(model);
                    }
                    Some(Arc::new(translator))
                }
                None => None,
            };
            let translation_bar = if progress && translator.is_some() {
                Some(Arc::new(TerminalProgress::new()?))
            } else {
                None
            };
            let translation_progress: Arc<dyn ProgressCallback> = match &translation_bar {
                Some(terminal) => terminal.clone(),
                None => Arc::new(SilentProgress),
            };
            let translation = target.zip(translator).map(|(target, translator)| {
                translate_track_with_progress(
                    &track,
                    target,
                    api_key.as_deref(),
                    translator,
                    translation_progress,
                )
            });

            if print {
                println!("{}", hardsub::export(&track, format, TrackView::Original));
                if let Some(translation) = translation {
                    let translated = translation.await;
                    if let Some(terminal) = &translation_bar {
                        terminal.bar.finish_and_clear();
                    }
                    println!();
                    println!("{}", hardsub::export(&translated?, format, TrackView::Translated));
                }
                return Ok(());
            }

            ensure_writable_path(
                &out_dir.join(default_file_name(format, TrackView::Original)),
                overwrite,
            )?;
            if translation.is_some() {
                ensure_writable_path(
                    &out_dir.join(default_file_name(format, TrackView::Translated)),
                    overwrite,
                )?;
            }

            let written = write_tracks(&track, format, &out_dir, translation).await?;
            if let Some(terminal) = &translation_bar {
                terminal.bar.finish_and_clear();
            }
            eprintln!("{} {}", "wrote".green().bold(), written.original.display());
            match written.translated {
                Some(Ok(path)) => eprintln!("{} {}", "wrote".green().bold(), path.display()),
                Some(Err(error)) => return Err(error.into()),
                None => {}
            }
        }
        Commands::Languages => {
            println!("{}", "OCR languages:".bold());
            for language in OcrLanguage::ALL {
                println!("  {:<8} {}", language.code(), language.name());
            }
            println!("{}", "Translation targets:".bold());
            for language in TranslateLanguage::ALL {
                println!("  {:<8} {}", language.code(), language.name());
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "hardsub", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
