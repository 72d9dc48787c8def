//! Caption segmentation and highlight timing.
//!
//! Turns a flat stream of timestamped words into phrase groups and per-word
//! highlight cues that keep the whole phrase pinned in place.

pub mod config;
pub mod group;
pub mod highlight;
pub mod normalize;
pub mod pipeline;
pub mod word;
pub mod wrap;

pub use config::{CaptionConfig, ConfigError, Preset};
pub use group::{GroupingLimits, PhraseGroup, group_words};
pub use highlight::{HighlightEvent, HighlightStyle, TimingRules, highlight_events, render_phrase};
pub use normalize::{MergeRule, PhraseNormalizer};
pub use pipeline::{CaptionTrack, Cue, build_captions};
pub use word::{Word, sanitize_words};
pub use wrap::choose_split;
