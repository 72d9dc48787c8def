use super::config::CaptionConfig;
use super::group::{PhraseGroup, group_words};
use super::highlight::highlight_events;
use super::normalize::PhraseNormalizer;
use super::word::Word;
use super::wrap::choose_split;
use tracing::debug;

/// A timed, styled block of subtitle text ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Style identifier
    pub style: String,
    /// Text with embedded override sequences
    pub text: String,
}

/// Result of running the caption pipeline
#[derive(Debug, Clone)]
pub struct CaptionTrack {
    pub groups: Vec<PhraseGroup>,
    pub cues: Vec<Cue>,
}

impl CaptionTrack {
    pub fn word_count(&self) -> usize {
        self.groups.iter().map(PhraseGroup::len).sum()
    }
}

/// Fixed position and fade prefix shared by every cue
pub fn placement_prefix(config: &CaptionConfig) -> String {
    format!(
        "{{\\an2\\pos({},{})\\fad({},{})}}",
        config.pos_x, config.pos_y, config.fade_in_ms, config.fade_out_ms
    )
}

/// Emit one cue per word of a phrase group
pub fn group_cues(group: &PhraseGroup, config: &CaptionConfig) -> Vec<Cue> {
    let split = if config.wrap_lines {
        choose_split(&group.texts(), config.min_wrap_chars)
    } else {
        None
    };
    let prefix = placement_prefix(config);

    highlight_events(group, &config.timing)
        .into_iter()
        .map(|event| Cue {
            start: event.display_start,
            end: event.display_end,
            style: config.style_name.clone(),
            text: format!("{}{}", prefix, event.render(split, &config.highlight)),
        })
        .collect()
}

/// Normalize, group, wrap and highlight a word stream
pub fn build_captions(words: Vec<Word>, config: &CaptionConfig) -> CaptionTrack {
    let input_len = words.len();
    let normalizer = PhraseNormalizer::new(config.merge_rules.clone());
    let words = normalizer.normalize(words);
    debug!("Normalized {} words into {}", input_len, words.len());

    let groups = group_words(words, &config.grouping);
    debug!("Grouped into {} phrases", groups.len());

    let cues: Vec<Cue> = groups
        .iter()
        .flat_map(|group| group_cues(group, config))
        .collect();

    CaptionTrack { groups, cues }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(texts: &[&str]) -> Vec<Word> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Word::new(*t, i as f64 * 0.4, i as f64 * 0.4 + 0.3))
            .collect()
    }

    #[test]
    fn test_one_cue_per_word() {
        let config = CaptionConfig::default();
        let track = build_captions(timed(&["a", "cap", "cut", "makes", "editing", "easy"]), &config);

        assert_eq!(track.word_count(), 4);
        assert_eq!(track.cues.len(), 4);
        assert_eq!(track.groups[0].texts()[0], "CapCut");
    }

    #[test]
    fn test_cue_carries_placement_and_single_highlight() {
        let config = CaptionConfig::default();
        let track = build_captions(timed(&["hello", "there"]), &config);

        for cue in &track.cues {
            assert!(cue.text.starts_with("{\\an2\\pos(960,830)\\fad(30,60)}"));
            assert_eq!(cue.text.matches(&config.highlight.highlight_color).count(), 1);
            assert_eq!(cue.style, "Phrase");
            assert!(cue.end > cue.start);
        }
        assert!(track.cues[0].text.ends_with("{\\c&H00FFFF00&}hello{\\c&H00FFFFFF&} there"));
    }

    #[test]
    fn test_long_phrase_wraps_and_no_wrap_flag() {
        let words = timed(&["the", "quick", "brown", "fox", "jumps", "today"]);
        let mut config = CaptionConfig::default();
        config.grouping.max_chars = 40;

        let track = build_captions(words.clone(), &config);
        assert_eq!(track.groups.len(), 1);
        assert!(track.cues.iter().all(|c| c.text.matches("\\N").count() == 1));
        assert!(track.cues[5].text.ends_with("the quick brown\\Nfox jumps {\\c&H00FFFF00&}today{\\c&H00FFFFFF&}"));

        let track = build_captions(words, &config.with_wrap(false));
        assert!(track.cues.iter().all(|c| !c.text.contains("\\N")));
    }

    #[test]
    fn test_empty_stream() {
        let track = build_captions(Vec::new(), &CaptionConfig::default());
        assert!(track.groups.is_empty());
        assert!(track.cues.is_empty());
    }
}
