//! Merges multi-token brand phrases into single words.
//!
//! Speech recognition tends to split product names into ordinary tokens
//! ("a cap cut"). A small ordered table of rules collapses them back into one
//! canonical word that spans the timing of every token it replaced.

use super::config::ConfigError;
use super::word::Word;
use tracing::debug;

/// A multi-token pattern and its canonical single-token replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRule {
    /// Lowercased tokens to match in sequence
    pattern: Vec<String>,
    /// Canonical text of the merged word
    replacement: String,
}

impl MergeRule {
    pub fn new(pattern: &[&str], replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.iter().map(|t| t.to_lowercase()).collect(),
            replacement: replacement.into(),
        }
    }

    /// Parse a rule of the form `tokens separated by spaces=Replacement`
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let (pattern, replacement) = s
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidRule(s.to_string()))?;

        let tokens: Vec<&str> = pattern.split_whitespace().collect();
        let replacement = replacement.trim();

        if tokens.is_empty() || replacement.is_empty() {
            return Err(ConfigError::InvalidRule(s.to_string()));
        }

        Ok(Self::new(&tokens, replacement))
    }

    pub fn pattern_len(&self) -> usize {
        self.pattern.len()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    fn matches_at(&self, words: &[Word], pos: usize) -> bool {
        let Some(window) = words.get(pos..pos + self.pattern.len()) else {
            return false;
        };

        window
            .iter()
            .zip(&self.pattern)
            .all(|(word, token)| word.text.to_lowercase() == *token)
    }
}

/// The built-in rule table, in precedence order
pub fn default_rules() -> Vec<MergeRule> {
    vec![
        MergeRule::new(&["a", "cap", "cut"], "CapCut"),
        MergeRule::new(&["cap", "cut"], "CapCut"),
    ]
}

/// Applies merge rules left to right over a word sequence
#[derive(Debug, Clone)]
pub struct PhraseNormalizer {
    rules: Vec<MergeRule>,
}

impl PhraseNormalizer {
    /// Rules are tried longest pattern first; equal lengths keep table order.
    pub fn new(mut rules: Vec<MergeRule>) -> Self {
        rules.sort_by(|a, b| b.pattern_len().cmp(&a.pattern_len()));
        Self { rules }
    }

    pub fn rules(&self) -> &[MergeRule] {
        &self.rules
    }

    pub fn normalize(&self, words: Vec<Word>) -> Vec<Word> {
        let mut out = Vec::with_capacity(words.len());
        let mut i = 0;

        while i < words.len() {
            let matched = self.rules.iter().find(|rule| rule.matches_at(&words, i));

            match matched {
                Some(rule) => {
                    let last = i + rule.pattern_len() - 1;
                    debug!(
                        "Merged {} tokens at {:.2}s into '{}'",
                        rule.pattern_len(),
                        words[i].start,
                        rule.replacement
                    );
                    out.push(Word::new(
                        rule.replacement.clone(),
                        words[i].start,
                        words[last].end,
                    ));
                    i = last + 1;
                }
                None => {
                    out.push(words[i].clone());
                    i += 1;
                }
            }
        }

        out
    }
}

impl Default for PhraseNormalizer {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(texts: &[&str]) -> Vec<Word> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Word::new(*t, i as f64 * 0.5, i as f64 * 0.5 + 0.4))
            .collect()
    }

    fn texts(words: &[Word]) -> Vec<&str> {
        words.iter().map(|w| w.text.as_str()).collect()
    }

    #[test]
    fn test_three_token_brand_merge() {
        let input = words(&["a", "cap", "cut", "is", "great"]);
        let out = PhraseNormalizer::default().normalize(input.clone());

        assert_eq!(texts(&out), vec!["CapCut", "is", "great"]);
        assert_eq!(out[0].start, input[0].start);
        assert_eq!(out[0].end, input[2].end);
    }

    #[test]
    fn test_two_token_fallback() {
        let input = words(&["love", "Cap", "CUT"]);
        let out = PhraseNormalizer::default().normalize(input.clone());

        assert_eq!(texts(&out), vec!["love", "CapCut"]);
        assert_eq!(out[1].start, input[1].start);
        assert_eq!(out[1].end, input[2].end);
    }

    #[test]
    fn test_partial_match_at_end_passes_through() {
        let input = words(&["try", "a", "cap"]);
        let out = PhraseNormalizer::default().normalize(input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn test_idempotent_without_matches() {
        let input = words(&["CapCut", "is", "great"]);
        let normalizer = PhraseNormalizer::default();
        let once = normalizer.normalize(input.clone());
        let twice = normalizer.normalize(once.clone());

        assert_eq!(once, input);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_empty_input() {
        assert!(PhraseNormalizer::default().normalize(Vec::new()).is_empty());
    }

    #[test]
    fn test_longer_rule_wins_regardless_of_table_order() {
        let normalizer = PhraseNormalizer::new(vec![
            MergeRule::new(&["open", "ai"], "OpenAI"),
            MergeRule::new(&["the", "open", "ai"], "The OpenAI"),
        ]);
        let out = normalizer.normalize(words(&["the", "open", "ai", "team"]));
        assert_eq!(texts(&out), vec!["The OpenAI", "team"]);
    }

    #[test]
    fn test_parse_rule() {
        let rule = MergeRule::parse("chat g p t=ChatGPT").unwrap();
        assert_eq!(rule.pattern_len(), 4);
        assert_eq!(rule.replacement(), "ChatGPT");

        assert!(MergeRule::parse("no separator").is_err());
        assert!(MergeRule::parse("=Empty").is_err());
        assert!(MergeRule::parse("tokens= ").is_err());
    }
}
