use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::audio::AudioChunk;
use crate::captions::Word;

/// Available Whisper model sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhisperModel {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl WhisperModel {
    /// Get the Hugging Face URL for this model
    pub fn hf_url(&self) -> String {
        format!(
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/{}",
            self.filename()
        )
    }

    /// Get the filename for this model
    pub fn filename(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "ggml-tiny.bin",
            WhisperModel::Base => "ggml-base.bin",
            WhisperModel::Small => "ggml-small.bin",
            WhisperModel::Medium => "ggml-medium.bin",
            WhisperModel::Large => "ggml-large-v3.bin",
        }
    }

    /// Get approximate model size in MB
    pub fn size_mb(&self) -> u64 {
        match self {
            WhisperModel::Tiny => 75,
            WhisperModel::Base => 142,
            WhisperModel::Small => 466,
            WhisperModel::Medium => 1500,
            WhisperModel::Large => 3100,
        }
    }
}

impl std::fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WhisperModel::Tiny => write!(f, "tiny"),
            WhisperModel::Base => write!(f, "base"),
            WhisperModel::Small => write!(f, "small"),
            WhisperModel::Medium => write!(f, "medium"),
            WhisperModel::Large => write!(f, "large"),
        }
    }
}

impl std::str::FromStr for WhisperModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(WhisperModel::Tiny),
            "base" => Ok(WhisperModel::Base),
            "small" => Ok(WhisperModel::Small),
            "medium" => Ok(WhisperModel::Medium),
            "large" => Ok(WhisperModel::Large),
            _ => Err(format!("Unknown model: {}. Use tiny, base, small, medium, or large", s)),
        }
    }
}

#[derive(Error, Debug)]
pub enum WhisperError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to download model: {0}")]
    Download(String),
    #[error("Failed to initialize Whisper: {0}")]
    Init(String),
    #[error("Transcription failed: {0}")]
    Transcription(String),
}

/// Get the models directory path
pub fn models_dir() -> PathBuf {
    PathBuf::from("models").join("whisper")
}

/// Get the path to a specific model file
pub fn model_path(model: WhisperModel) -> PathBuf {
    models_dir().join(model.filename())
}

/// Check if a model is already downloaded
pub fn is_model_downloaded(model: WhisperModel) -> bool {
    // At least half the expected size, anything smaller is a broken download
    fs::metadata(model_path(model))
        .map(|m| m.len() >= model.size_mb() * 1024 * 1024 / 2)
        .unwrap_or(false)
}

/// Download a Whisper model from Hugging Face
pub fn download_model(model: WhisperModel) -> Result<PathBuf, WhisperError> {
    let path = model_path(model);

    if is_model_downloaded(model) {
        info!("Model {} already downloaded at {:?}", model, path);
        return Ok(path);
    }

    fs::create_dir_all(models_dir())?;

    info!("Downloading Whisper {} model (~{}MB)...", model, model.size_mb());

    let url = model.hf_url();
    let response = reqwest::blocking::Client::new()
        .get(&url)
        .send()
        .map_err(|e| WhisperError::Download(format!("HTTP request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(WhisperError::Download(format!(
            "HTTP {} from {}",
            response.status(),
            url
        )));
    }

    let total_size = response.content_length().unwrap_or(0);

    let pb = indicatif::ProgressBar::new(total_size);
    pb.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .map_err(|e| WhisperError::Download(format!("Invalid progress template: {}", e)))?
            .progress_chars("#>-"),
    );

    // Stream into a temp file so an interrupted download never looks complete
    let temp_path = path.with_extension("bin.tmp");
    let mut file = BufWriter::new(File::create(&temp_path)?);
    let mut reader = pb.wrap_read(response);
    io::copy(&mut reader, &mut file)?;
    file.flush()?;
    drop(file);

    pb.finish_with_message("Download complete");

    fs::rename(&temp_path, &path)?;
    info!("Model downloaded to {:?}", path);

    Ok(path)
}

/// Language configuration for transcription
#[derive(Debug, Clone, Default)]
pub struct LanguageConfig {
    /// Language hint (None = auto-detect)
    pub language: Option<String>,
    /// Whether to translate to English
    pub translate: bool,
}

impl LanguageConfig {
    /// Parse a CLI language argument ("auto" or a language code)
    pub fn from_arg(arg: &str, translate: bool) -> Self {
        let language = match arg.trim().to_lowercase().as_str() {
            "" | "auto" => None,
            code => Some(code.to_string()),
        };
        Self { language, translate }
    }
}

/// Whisper transcriber producing word-level timestamps
pub struct Transcriber {
    ctx: WhisperContext,
    model: WhisperModel,
    language_config: LanguageConfig,
    n_threads: i32,
}

impl Transcriber {
    /// Load a model (downloading it on first use)
    pub fn with_language(model: WhisperModel, language_config: LanguageConfig) -> Result<Self, WhisperError> {
        let path = download_model(model)?;
        let path_str = path
            .to_str()
            .ok_or_else(|| WhisperError::Init(format!("Model path is not valid UTF-8: {:?}", path)))?;

        info!("Loading Whisper {} model...", model);

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| WhisperError::Init(format!("Failed to load model: {}", e)))?;

        let n_threads = std::thread::available_parallelism()
            .map(|p| (p.get() as i32).max(1))
            .unwrap_or(4);

        info!("Whisper model loaded (using {} threads, language: {:?})", n_threads, language_config);

        Ok(Self {
            ctx,
            model,
            language_config,
            n_threads,
        })
    }

    /// Transcribe one chunk into words with chunk-relative times
    pub fn transcribe_chunk(&self, chunk: &AudioChunk) -> Result<Vec<Word>, WhisperError> {
        let start_time = std::time::Instant::now();

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.n_threads);

        // One word per segment: token timestamps, split on word boundaries,
        // and a maximum segment length of one token
        params.set_token_timestamps(true);
        params.set_split_on_word(true);
        params.set_max_len(1);

        params.set_no_speech_thold(0.6);
        params.set_entropy_thold(2.4);
        params.set_logprob_thold(-1.0);
        params.set_temperature(0.0);
        params.set_temperature_inc(0.2);
        params.set_no_context(true);
        params.set_suppress_non_speech_tokens(true);

        match &self.language_config.language {
            Some(lang) => params.set_language(Some(lang.as_str())),
            None => params.set_language(Some("auto")),
        }
        params.set_translate(self.language_config.translate);

        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_print_special(false);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| WhisperError::Transcription(format!("Failed to create state: {}", e)))?;

        state
            .full(params, &chunk.samples)
            .map_err(|e| WhisperError::Transcription(format!("Inference failed: {}", e)))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| WhisperError::Transcription(format!("Failed to get segments: {}", e)))?;

        let mut words = Vec::new();
        for i in 0..num_segments {
            let t0 = state
                .full_get_segment_t0(i)
                .map_err(|e| WhisperError::Transcription(format!("Failed to get start time: {}", e)))?;
            let t1 = state
                .full_get_segment_t1(i)
                .map_err(|e| WhisperError::Transcription(format!("Failed to get end time: {}", e)))?;
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| WhisperError::Transcription(format!("Failed to get text: {}", e)))?;

            // Timestamps are in centiseconds
            if let Some(word) = Word::from_raw(&text, t0 as f64 / 100.0, t1 as f64 / 100.0) {
                words.push(word);
            }
        }

        let elapsed = start_time.elapsed();
        info!(
            "Transcribed chunk {} ({:.2}s audio) in {:.1}s: {} words",
            chunk.index,
            chunk.duration_secs(),
            elapsed.as_secs_f32(),
            words.len()
        );

        Ok(words)
    }

    /// Transcribe all chunks, returning words with absolute timestamps.
    ///
    /// A failing chunk is logged and skipped; the caller decides whether an
    /// empty result is fatal.
    pub fn transcribe_chunks(&self, chunks: &[AudioChunk]) -> Vec<Word> {
        let total_audio_secs: f32 = chunks.iter().map(AudioChunk::duration_secs).sum();
        info!("Transcribing {} chunks ({:.1}s total audio)...", chunks.len(), total_audio_secs);

        let start_time = std::time::Instant::now();
        let mut words = Vec::new();

        for (i, chunk) in chunks.iter().enumerate() {
            match self.transcribe_chunk(chunk) {
                Ok(chunk_words) => {
                    let offset = chunk.start_time_secs as f64;
                    words.extend(
                        chunk_words
                            .into_iter()
                            .map(|w| Word::new(w.text, w.start + offset, w.end + offset)),
                    );
                    info!(
                        "Progress: {:.0}% ({}/{})",
                        (i + 1) as f32 / chunks.len() as f32 * 100.0,
                        i + 1,
                        chunks.len()
                    );
                }
                Err(e) => {
                    warn!("Failed to transcribe chunk {}: {}", chunk.index, e);
                }
            }
        }

        let elapsed = start_time.elapsed().as_secs_f32();
        info!(
            "Completed {} chunks in {:.1}s ({:.1}x realtime), {} words",
            chunks.len(),
            elapsed,
            total_audio_secs / elapsed.max(f32::EPSILON),
            words.len()
        );

        words
    }

    pub fn model(&self) -> WhisperModel {
        self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_parsing() {
        assert_eq!("tiny".parse::<WhisperModel>().unwrap(), WhisperModel::Tiny);
        assert_eq!("SMALL".parse::<WhisperModel>().unwrap(), WhisperModel::Small);
        assert!("invalid".parse::<WhisperModel>().is_err());
    }

    #[test]
    fn test_model_paths() {
        assert!(model_path(WhisperModel::Tiny).to_str().unwrap().contains("ggml-tiny.bin"));
        assert!(WhisperModel::Large.hf_url().ends_with("/ggml-large-v3.bin"));
    }

    #[test]
    fn test_language_from_arg() {
        assert_eq!(LanguageConfig::from_arg("auto", false).language, None);
        assert_eq!(LanguageConfig::from_arg("EN", false).language, Some("en".to_string()));
        assert!(LanguageConfig::from_arg("de", true).translate);
    }
}
