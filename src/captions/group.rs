use super::word::Word;
use tracing::debug;

/// Thresholds that close a phrase group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupingLimits {
    /// Maximum number of words in one group
    pub max_words: usize,
    /// Maximum rendered length (words joined by single spaces)
    pub max_chars: usize,
    /// A pause longer than this starts a new group
    pub max_gap_secs: f64,
}

impl Default for GroupingLimits {
    fn default() -> Self {
        Self {
            max_words: 7,
            max_chars: 28,
            max_gap_secs: 0.65,
        }
    }
}

/// A contiguous run of words displayed together as one caption
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseGroup {
    words: Vec<Word>,
}

impl PhraseGroup {
    fn new(words: Vec<Word>) -> Self {
        debug_assert!(!words.is_empty());
        Self { words }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.words.iter().map(|w| w.text.as_str()).collect()
    }

    /// Words joined by single spaces
    pub fn text(&self) -> String {
        self.texts().join(" ")
    }

    pub fn char_len(&self) -> usize {
        joined_len(&self.words)
    }

    pub fn start(&self) -> f64 {
        self.words[0].start
    }

    pub fn end(&self) -> f64 {
        self.words[self.words.len() - 1].end
    }

    pub fn into_words(self) -> Vec<Word> {
        self.words
    }
}

fn joined_len(words: &[Word]) -> usize {
    let chars: usize = words.iter().map(Word::char_len).sum();
    chars + words.len().saturating_sub(1)
}

/// Partition a word sequence into display phrases.
///
/// A group is closed before a word when the pause since the previous word
/// exceeds `max_gap_secs`, or when appending it would exceed the word or
/// character cap. A single word longer than `max_chars` still forms its own
/// group.
pub fn group_words(words: Vec<Word>, limits: &GroupingLimits) -> Vec<PhraseGroup> {
    let mut groups = Vec::new();
    let mut current: Vec<Word> = Vec::new();
    let mut current_len = 0usize;
    let mut last_end: Option<f64> = None;

    for word in words {
        let gap = last_end.map(|end| word.start - end).unwrap_or(0.0);
        let separator = usize::from(!current.is_empty());
        let would_len = current_len + separator + word.char_len();

        let pause_break = gap > limits.max_gap_secs;
        let count_break = current.len() >= limits.max_words;
        let length_break = would_len > limits.max_chars;

        if !current.is_empty() && (pause_break || count_break || length_break) {
            debug!(
                "Closing group of {} words ({} chars) at {:.2}s: pause={} count={} length={}",
                current.len(),
                current_len,
                word.start,
                pause_break,
                count_break,
                length_break
            );
            groups.push(PhraseGroup::new(std::mem::take(&mut current)));
            current_len = 0;
        }

        current_len += usize::from(!current.is_empty()) + word.char_len();
        last_end = Some(word.end);
        current.push(word);
    }

    if !current.is_empty() {
        groups.push(PhraseGroup::new(current));
    }

    groups
}
