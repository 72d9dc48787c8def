use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A recognized word with timing information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// The word text (trimmed, never empty)
    pub text: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Build a word from an untrusted record.
    ///
    /// Blank text is dropped, non-finite times are dropped, a negative start
    /// is clamped to zero and an end before the start is clamped to the start.
    pub fn from_raw(text: &str, start: f64, end: f64) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Dropping blank word at {:.2}s", start);
            return None;
        }

        if !start.is_finite() || !end.is_finite() {
            warn!("Dropping word '{}' with non-finite timing ({}, {})", text, start, end);
            return None;
        }

        let start = start.max(0.0);
        let end = if end < start {
            warn!(
                "Word '{}' ends before it starts ({:.3}s < {:.3}s), clamping",
                text, end, start
            );
            start
        } else {
            end
        };

        Some(Self::new(text, start, end))
    }

    /// Duration of the word in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Rendered length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Clean a raw word stream, applying the [`Word::from_raw`] policy to every record
pub fn sanitize_words(raw: Vec<Word>) -> Vec<Word> {
    let total = raw.len();
    let words: Vec<Word> = raw
        .into_iter()
        .filter_map(|w| Word::from_raw(&w.text, w.start, w.end))
        .collect();

    if words.len() < total {
        debug!("Dropped {} malformed words out of {}", total - words.len(), total);
    }

    words
}
