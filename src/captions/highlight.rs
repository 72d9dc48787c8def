//! Per-word highlight windows and phrase rendering.
//!
//! Every word of a phrase group gets its own event: the whole phrase is
//! shown, with only the active word switched to the highlight color. The
//! emphasis never touches vertical scale or font size, so the rendered box
//! keeps the same height from one event to the next.

use super::group::PhraseGroup;
use super::word::Word;
use std::fmt::Write as FmtWrite;

/// Timing adjustments applied to every highlight window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingRules {
    /// Minimum time a word stays highlighted
    pub min_word_secs: f64,
    /// Padding appended to every window after the minimum is applied
    pub tail_secs: f64,
}

impl Default for TimingRules {
    fn default() -> Self {
        Self {
            min_word_secs: 0.10,
            tail_secs: 0.06,
        }
    }
}

/// Color tokens and horizontal scale for the active word
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightStyle {
    pub highlight_color: String,
    pub base_color: String,
    /// Horizontal scale of the active word in percent (100 = unscaled)
    pub scale_x: u32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            highlight_color: "&H00FFFF00&".to_string(),
            base_color: "&H00FFFFFF&".to_string(),
            scale_x: 100,
        }
    }
}

/// One piece of a rendered phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Plain(&'a str),
    Emphasis(&'a str),
    Space,
    LineBreak,
}

/// Split a phrase into tokens with `active` emphasized and a line break
/// before word `split` when given
pub fn tokenize<'a>(words: &[&'a str], active: usize, split: Option<usize>) -> Vec<Token<'a>> {
    let mut tokens = Vec::with_capacity(words.len() * 2);

    for (i, &word) in words.iter().enumerate() {
        if i > 0 {
            if split == Some(i) {
                tokens.push(Token::LineBreak);
            } else {
                tokens.push(Token::Space);
            }
        }

        if i == active {
            tokens.push(Token::Emphasis(word));
        } else {
            tokens.push(Token::Plain(word));
        }
    }

    tokens
}

/// Map tokens to ASS override sequences
pub fn render_tokens(tokens: &[Token<'_>], style: &HighlightStyle) -> String {
    let mut out = String::new();

    for token in tokens {
        match token {
            Token::Plain(text) => out.push_str(text),
            Token::Space => out.push(' '),
            Token::LineBreak => out.push_str("\\N"),
            Token::Emphasis(text) => {
                if style.scale_x == 100 {
                    let _ = write!(
                        out,
                        "{{\\c{}}}{}{{\\c{}}}",
                        style.highlight_color, text, style.base_color
                    );
                } else {
                    let _ = write!(
                        out,
                        "{{\\c{}\\fscx{}}}{}{{\\c{}\\fscx100}}",
                        style.highlight_color, style.scale_x, text, style.base_color
                    );
                }
            }
        }
    }

    out
}

/// Render a phrase group with word `active` highlighted
pub fn render_phrase(
    group: &PhraseGroup,
    active: usize,
    split: Option<usize>,
    style: &HighlightStyle,
) -> String {
    let texts = group.texts();
    render_tokens(&tokenize(&texts, active, split), style)
}

/// Compute the display window for word `index` of a group.
///
/// The window runs from the word's start to the next word's start, or to the
/// word's own end for the last word. It is then stretched to the minimum
/// duration if needed, and the tail is always added on top.
pub fn display_window(group: &PhraseGroup, index: usize, timing: &TimingRules) -> (f64, f64) {
    let words = group.words();
    let start = words[index].start;

    let mut end = match words.get(index + 1) {
        Some(next) => next.start,
        None => words[index].end,
    };

    if end - start < timing.min_word_secs {
        end = start + timing.min_word_secs;
    }
    end += timing.tail_secs;

    (start, end)
}

/// One word's active window within its phrase group
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightEvent<'g> {
    pub group: &'g PhraseGroup,
    pub active_index: usize,
    pub display_start: f64,
    pub display_end: f64,
}

impl<'g> HighlightEvent<'g> {
    pub fn active_word(&self) -> &'g Word {
        &self.group.words()[self.active_index]
    }

    pub fn duration(&self) -> f64 {
        self.display_end - self.display_start
    }

    pub fn render(&self, split: Option<usize>, style: &HighlightStyle) -> String {
        render_phrase(self.group, self.active_index, split, style)
    }
}

/// Build one highlight event per word of the group
pub fn highlight_events<'g>(group: &'g PhraseGroup, timing: &TimingRules) -> Vec<HighlightEvent<'g>> {
    (0..group.len())
        .map(|i| {
            let (display_start, display_end) = display_window(group, i, timing);
            HighlightEvent {
                group,
                active_index: i,
                display_start,
                display_end,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::group::{GroupingLimits, group_words};

    const EPS: f64 = 1e-9;

    fn single_group(words: Vec<Word>) -> PhraseGroup {
        let limits = GroupingLimits {
            max_words: 100,
            max_chars: 1000,
            max_gap_secs: 100.0,
        };
        let mut groups = group_words(words, &limits);
        assert_eq!(groups.len(), 1);
        groups.remove(0)
    }

    #[test]
    fn test_window_continuity() {
        let group = single_group(vec![
            Word::new("one", 0.0, 0.4),
            Word::new("two", 0.5, 0.9),
            Word::new("three", 1.2, 1.6),
        ]);
        let timing = TimingRules::default();
        let events = highlight_events(&group, &timing);

        assert_eq!(events.len(), 3);
        assert!((events[0].display_start - 0.0).abs() < EPS);
        assert!((events[0].display_end - (0.5 + timing.tail_secs)).abs() < EPS);
        assert!((events[1].display_start - 0.5).abs() < EPS);
        assert!((events[1].display_end - (1.2 + timing.tail_secs)).abs() < EPS);
        assert!((events[2].display_start - 1.2).abs() < EPS);
        assert!((events[2].display_end - (1.6 + timing.tail_secs)).abs() < EPS);
    }

    #[test]
    fn test_minimum_duration_clamp_then_tail() {
        let group = single_group(vec![Word::new("quick", 0.0, 0.04), Word::new("fire", 0.05, 0.5)]);
        let timing = TimingRules {
            min_word_secs: 0.10,
            tail_secs: 0.06,
        };
        let (start, end) = display_window(&group, 0, &timing);

        assert_eq!(start, 0.0);
        assert!(end - start >= timing.min_word_secs);
        assert!((end - 0.16).abs() < EPS);
    }

    #[test]
    fn test_single_word_group() {
        let group = single_group(vec![Word::new("solo", 3.0, 3.5)]);
        let timing = TimingRules::default();
        let events = highlight_events(&group, &timing);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].active_index, 0);
        assert_eq!(events[0].active_word().text, "solo");
        assert!((events[0].display_end - (3.5 + timing.tail_secs)).abs() < EPS);
    }

    #[test]
    fn test_render_marks_only_active_word() {
        let group = single_group(vec![
            Word::new("hello", 0.0, 0.3),
            Word::new("big", 0.3, 0.6),
            Word::new("world", 0.6, 0.9),
        ]);
        let style = HighlightStyle::default();
        let text = render_phrase(&group, 1, None, &style);

        assert_eq!(text, "hello {\\c&H00FFFF00&}big{\\c&H00FFFFFF&} world");
        assert!(!text.contains("fscy"));
        assert!(!text.contains("\\fs"));
    }

    #[test]
    fn test_render_line_break_has_no_trailing_space() {
        let group = single_group(vec![
            Word::new("the", 0.0, 0.1),
            Word::new("quick", 0.1, 0.2),
            Word::new("brown", 0.2, 0.3),
            Word::new("fox", 0.3, 0.4),
        ]);
        let style = HighlightStyle::default();

        let text = render_phrase(&group, 3, Some(2), &style);
        assert_eq!(text, "the quick\\Nbrown {\\c&H00FFFF00&}fox{\\c&H00FFFFFF&}");

        let text = render_phrase(&group, 1, Some(2), &style);
        assert_eq!(text, "the {\\c&H00FFFF00&}quick{\\c&H00FFFFFF&}\\Nbrown fox");
        assert!(!text.contains(" \\N"));
        assert!(!text.contains("\\N "));
    }

    #[test]
    fn test_horizontal_scale_only() {
        let style = HighlightStyle {
            scale_x: 125,
            ..HighlightStyle::default()
        };
        let tokens = tokenize(&["pop", "this"], 0, None);
        let text = render_tokens(&tokens, &style);

        assert_eq!(
            text,
            "{\\c&H00FFFF00&\\fscx125}pop{\\c&H00FFFFFF&\\fscx100} this"
        );
        assert!(!text.contains("fscy"));
    }

    #[test]
    fn test_tokenize_layout() {
        let tokens = tokenize(&["a", "b", "c"], 2, Some(1));
        assert_eq!(
            tokens,
            vec![
                Token::Plain("a"),
                Token::LineBreak,
                Token::Plain("b"),
                Token::Space,
                Token::Emphasis("c"),
            ]
        );
    }
}
