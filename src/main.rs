use anyhow::Context as _;
use clap::Parser;
use dotenvy::dotenv;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use phrasecap::captions::{CaptionConfig, Preset, build_captions};
use phrasecap::subtitle;
use phrasecap::transcribe::{
    JsonWordSource, LanguageConfig, MIN_SILENCE_DURATION_SECS, WhisperModel, WhisperWordSource,
    WordDump, WordSource,
};

/// Karaoke-style phrase captions: the whole phrase stays on screen while the
/// spoken word is highlighted.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// WAV audio to transcribe, or a JSON word list
    input: PathBuf,

    /// Output ASS subtitle file
    #[arg(short, long, default_value = "captions_phrase.ass")]
    output: PathBuf,

    /// Canvas preset: landscape (1920x1080) or portrait (1080x1920)
    #[arg(short, long, default_value = "landscape")]
    preset: Preset,

    /// Whisper model size: tiny, base, small, medium, large
    #[arg(short, long, default_value = "small")]
    model: WhisperModel,

    /// Spoken language code, or "auto" to detect
    #[arg(short, long, default_value = "auto")]
    language: String,

    /// Translate speech to English
    #[arg(long)]
    translate: bool,

    /// Minimum silence (seconds) used to cut audio into speech chunks
    #[arg(long, default_value_t = MIN_SILENCE_DURATION_SECS)]
    min_silence: f32,

    /// Also write the recognized words as JSON
    #[arg(long)]
    dump_words: Option<PathBuf>,

    /// Keep every phrase on a single line
    #[arg(long)]
    no_wrap: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn is_word_list(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn word_source(cli: &Cli) -> Box<dyn WordSource + Send> {
    if is_word_list(&cli.input) {
        Box::new(JsonWordSource::new(&cli.input))
    } else {
        Box::new(
            WhisperWordSource::new(&cli.input, cli.model)
                .with_language(LanguageConfig::from_arg(&cli.language, cli.translate))
                .with_min_silence(cli.min_silence),
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = CaptionConfig::from_env(cli.preset).context("Invalid caption configuration")?;
    if cli.no_wrap {
        config = config.with_wrap(false);
    }
    info!(
        "Preset {}: {}x{}, anchor ({}, {})",
        cli.preset, config.canvas_width, config.canvas_height, config.pos_x, config.pos_y
    );

    let source = word_source(&cli);
    let description = source.describe();
    info!("Reading words from {}", description);

    // Recognition is slow and blocking, keep it off the async workers
    let words = tokio::task::spawn_blocking(move || source.words())
        .await
        .context("Word source task panicked")?
        .with_context(|| format!("Failed to read words from {}", description))?;
    info!("Got {} words", words.len());

    if let Some(dump_path) = &cli.dump_words {
        WordDump::new(description.clone(), words.clone())
            .save_to_file(dump_path)
            .with_context(|| format!("Failed to write word list to {:?}", dump_path))?;
    }

    let track = build_captions(words, &config);

    subtitle::save_to_file(&cli.output, &config, &track.cues)
        .with_context(|| format!("Failed to write subtitles to {:?}", cli.output))?;

    info!(
        "Wrote {}: {} phrases, {} highlight events, {} words",
        cli.output.display(),
        track.groups.len(),
        track.cues.len(),
        track.word_count()
    );

    Ok(())
}
