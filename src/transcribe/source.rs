//! Word stream sources.
//!
//! A source produces the flat, ordered list of timed words the caption
//! pipeline consumes. Recognition is a single blocking call with no timeout;
//! callers that need cancellation wrap it themselves.

use super::audio::{self, AudioError};
use super::whisper::{LanguageConfig, Transcriber, WhisperError, WhisperModel};
use crate::captions::{Word, sanitize_words};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid word list: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error(transparent)]
    Whisper(#[from] WhisperError),
    #[error("No usable words in {0}")]
    NoWords(String),
}

/// Anything that can produce timed words
pub trait WordSource {
    /// Short description used in logs and word dumps
    fn describe(&self) -> String;

    /// Produce the cleaned word stream, or fail if nothing usable comes back
    fn words(&self) -> Result<Vec<Word>, SourceError>;
}

fn require_words(words: Vec<Word>, source: &dyn WordSource) -> Result<Vec<Word>, SourceError> {
    let words = sanitize_words(words);
    if words.is_empty() {
        return Err(SourceError::NoWords(source.describe()));
    }
    Ok(words)
}

/// Transcribes a WAV file with a local Whisper model
#[derive(Debug, Clone)]
pub struct WhisperWordSource {
    pub audio_path: PathBuf,
    pub model: WhisperModel,
    pub language: LanguageConfig,
    pub min_silence_secs: f32,
}

impl WhisperWordSource {
    pub fn new(audio_path: impl Into<PathBuf>, model: WhisperModel) -> Self {
        Self {
            audio_path: audio_path.into(),
            model,
            language: LanguageConfig::default(),
            min_silence_secs: audio::MIN_SILENCE_DURATION_SECS,
        }
    }

    pub fn with_language(mut self, language: LanguageConfig) -> Self {
        self.language = language;
        self
    }

    pub fn with_min_silence(mut self, secs: f32) -> Self {
        self.min_silence_secs = secs;
        self
    }
}

impl WordSource for WhisperWordSource {
    fn describe(&self) -> String {
        format!("whisper-{}:{}", self.model, self.audio_path.display())
    }

    fn words(&self) -> Result<Vec<Word>, SourceError> {
        let samples = audio::load_wav(&self.audio_path)?;
        let chunks = audio::split_on_silence(&samples, self.min_silence_secs);
        if chunks.is_empty() {
            return Err(SourceError::NoWords(self.describe()));
        }

        let transcriber = Transcriber::with_language(self.model, self.language.clone())?;
        let words = transcriber.transcribe_chunks(&chunks);

        require_words(words, self)
    }
}

/// Metadata stored alongside a dumped word list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordDumpMetadata {
    /// Where the words came from
    pub source: String,
    /// When the dump was written (RFC 3339)
    pub generated_at: String,
    pub word_count: usize,
}

/// A word list as written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordDump {
    pub metadata: WordDumpMetadata,
    pub words: Vec<Word>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WordFile {
    Dump(WordDump),
    Bare(Vec<Word>),
}

impl WordDump {
    pub fn new(source: impl Into<String>, words: Vec<Word>) -> Self {
        Self {
            metadata: WordDumpMetadata {
                source: source.into(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                word_count: words.len(),
            },
            words,
        }
    }

    /// Save as pretty-printed JSON
    pub fn save_to_file(&self, path: &Path) -> Result<(), SourceError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Saved {} words to {:?}", self.words.len(), path);
        Ok(())
    }
}

/// Reads words from a JSON file (a word dump or a bare array of words)
#[derive(Debug, Clone)]
pub struct JsonWordSource {
    pub path: PathBuf,
}

impl JsonWordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WordSource for JsonWordSource {
    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }

    fn words(&self) -> Result<Vec<Word>, SourceError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let words = match serde_json::from_reader(reader)? {
            WordFile::Dump(dump) => {
                info!(
                    "Loaded word dump from {} ({})",
                    dump.metadata.source, dump.metadata.generated_at
                );
                dump.words
            }
            WordFile::Bare(words) => words,
        };

        require_words(words, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_round_trip_through_json_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        let words = vec![Word::new("hello", 0.0, 0.4), Word::new("world", 0.5, 0.9)];

        WordDump::new("test", words.clone()).save_to_file(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"word_count\": 2"));
        assert!(raw.contains("\"generated_at\""));

        let loaded = JsonWordSource::new(&path).words().unwrap();
        assert_eq!(loaded, words);
    }

    #[test]
    fn test_bare_array_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.json");
        std::fs::write(
            &path,
            r#"[{"text": " hi ", "start": 0.0, "end": 0.3},
                {"text": "  ", "start": 0.3, "end": 0.4},
                {"text": "oops", "start": 1.0, "end": 0.8}]"#,
        )
        .unwrap();

        let words = JsonWordSource::new(&path).words().unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "hi");
        assert_eq!(words[1].end, 1.0);
    }

    #[test]
    fn test_empty_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "[]").unwrap();

        let err = JsonWordSource::new(&path).words().unwrap_err();
        assert!(matches!(err, SourceError::NoWords(_)));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            JsonWordSource::new(&path).words(),
            Err(SourceError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let source = JsonWordSource::new("does/not/exist.json");
        assert!(matches!(source.words(), Err(SourceError::Io(_))));
    }
}
