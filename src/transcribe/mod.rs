pub mod audio;
mod source;
mod whisper;

pub use audio::{AudioChunk, AudioError, MIN_SILENCE_DURATION_SECS, WHISPER_SAMPLE_RATE};

pub use source::{
    JsonWordSource, SourceError, WhisperWordSource, WordDump, WordDumpMetadata, WordSource,
};

pub use whisper::{
    LanguageConfig, Transcriber, WhisperError, WhisperModel, download_model, is_model_downloaded,
    model_path,
};
