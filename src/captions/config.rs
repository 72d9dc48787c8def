use super::group::GroupingLimits;
use super::highlight::{HighlightStyle, TimingRules};
use super::normalize::{MergeRule, default_rules};
use super::wrap::MIN_WRAP_CHARS;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Invalid merge rule {0:?} (expected `tokens=Replacement`)")]
    InvalidRule(String),
}

/// Canvas layouts with tuned defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 1920x1080 landscape video
    Landscape,
    /// 1080x1920 portrait video (Shorts, Reels, TikTok)
    Portrait,
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preset::Landscape => write!(f, "landscape"),
            Preset::Portrait => write!(f, "portrait"),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "landscape" | "wide" | "16:9" => Ok(Preset::Landscape),
            "portrait" | "shorts" | "vertical" | "9:16" => Ok(Preset::Portrait),
            _ => Err(format!("Unknown preset: {}. Use landscape or portrait", s)),
        }
    }
}

/// Immutable settings for the whole caption pipeline
#[derive(Debug, Clone)]
pub struct CaptionConfig {
    /// Script resolution (PlayResX / PlayResY)
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub font_family: String,
    pub font_size: u32,
    /// Name of the single style every cue uses
    pub style_name: String,
    /// Left/right margins of the style line (fallback only, cues are positioned)
    pub margin_h: u32,
    pub highlight: HighlightStyle,
    pub grouping: GroupingLimits,
    pub timing: TimingRules,
    pub fade_in_ms: u32,
    pub fade_out_ms: u32,
    /// Bottom-center anchor point of every phrase
    pub pos_x: i32,
    pub pos_y: i32,
    /// Break long phrases into two balanced lines
    pub wrap_lines: bool,
    pub min_wrap_chars: usize,
    pub merge_rules: Vec<MergeRule>,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self::landscape()
    }
}

impl CaptionConfig {
    pub fn landscape() -> Self {
        Self {
            canvas_width: 1920,
            canvas_height: 1080,
            font_family: "Arial Black".to_string(),
            font_size: 84,
            style_name: "Phrase".to_string(),
            margin_h: 80,
            highlight: HighlightStyle::default(),
            grouping: GroupingLimits::default(),
            timing: TimingRules::default(),
            fade_in_ms: 30,
            fade_out_ms: 60,
            pos_x: 960,
            pos_y: 830,
            wrap_lines: true,
            min_wrap_chars: MIN_WRAP_CHARS,
            merge_rules: default_rules(),
        }
    }

    pub fn portrait() -> Self {
        Self {
            canvas_width: 1080,
            canvas_height: 1920,
            margin_h: 60,
            pos_x: 540,
            pos_y: 1450,
            ..Self::landscape()
        }
    }

    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Landscape => Self::landscape(),
            Preset::Portrait => Self::portrait(),
        }
    }

    pub fn with_wrap(mut self, wrap_lines: bool) -> Self {
        self.wrap_lines = wrap_lines;
        self
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.pos_x = x;
        self.pos_y = y;
        self
    }

    /// Load a preset and apply `CAPTION_*` environment overrides
    pub fn from_env(preset: Preset) -> Result<Self, ConfigError> {
        Self::from_lookup(preset, |key| std::env::var(key).ok())
    }

    /// Apply overrides from any key/value lookup on top of a preset
    pub fn from_lookup<F>(preset: Preset, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::preset(preset);
        let vars = EnvOverrides { lookup: &lookup };

        if let Some(v) = vars.parse("CAPTION_CANVAS_WIDTH")? {
            config.canvas_width = v;
        }
        if let Some(v) = vars.parse("CAPTION_CANVAS_HEIGHT")? {
            config.canvas_height = v;
        }
        if let Some(v) = vars.string("CAPTION_FONT") {
            config.font_family = v;
        }
        if let Some(v) = vars.parse("CAPTION_FONT_SIZE")? {
            config.font_size = v;
        }
        if let Some(v) = vars.string("CAPTION_BASE_COLOR") {
            config.highlight.base_color = v;
        }
        if let Some(v) = vars.string("CAPTION_HIGHLIGHT_COLOR") {
            config.highlight.highlight_color = v;
        }
        if let Some(v) = vars.parse("CAPTION_SCALE_X")? {
            config.highlight.scale_x = v;
        }
        if let Some(v) = vars.parse("CAPTION_MAX_WORDS")? {
            config.grouping.max_words = v;
        }
        if let Some(v) = vars.parse("CAPTION_MAX_CHARS")? {
            config.grouping.max_chars = v;
        }
        if let Some(v) = vars.parse("CAPTION_MAX_GAP")? {
            config.grouping.max_gap_secs = v;
        }
        if let Some(v) = vars.parse("CAPTION_MIN_WORD_DURATION")? {
            config.timing.min_word_secs = v;
        }
        if let Some(v) = vars.parse("CAPTION_TAIL")? {
            config.timing.tail_secs = v;
        }
        if let Some(v) = vars.parse("CAPTION_FADE_IN_MS")? {
            config.fade_in_ms = v;
        }
        if let Some(v) = vars.parse("CAPTION_FADE_OUT_MS")? {
            config.fade_out_ms = v;
        }
        if let Some(v) = vars.parse("CAPTION_POS_X")? {
            config.pos_x = v;
        }
        if let Some(v) = vars.parse("CAPTION_POS_Y")? {
            config.pos_y = v;
        }
        if let Some(v) = vars.parse("CAPTION_WRAP")? {
            config.wrap_lines = v;
        }
        if let Some(v) = vars.parse("CAPTION_MIN_WRAP_CHARS")? {
            config.min_wrap_chars = v;
        }
        if let Some(rules) = vars.string("CAPTION_MERGE_RULES") {
            for rule in rules.split(';').filter(|r| !r.trim().is_empty()) {
                config.merge_rules.push(MergeRule::parse(rule)?);
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::Invalid("canvas dimensions must be non-zero".into()));
        }
        if self.font_family.trim().is_empty() || self.font_size == 0 {
            return Err(ConfigError::Invalid("font family and size are required".into()));
        }
        if self.grouping.max_words == 0 {
            return Err(ConfigError::Invalid("max words per group must be at least 1".into()));
        }
        if self.grouping.max_chars == 0 {
            return Err(ConfigError::Invalid("max chars per group must be at least 1".into()));
        }

        let durations = [
            ("max gap", self.grouping.max_gap_secs),
            ("min word duration", self.timing.min_word_secs),
            ("tail", self.timing.tail_secs),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number of seconds, got {}",
                    name, value
                )));
            }
        }

        if self.highlight.scale_x == 0 {
            return Err(ConfigError::Invalid("horizontal scale must be positive".into()));
        }
        if self.highlight.base_color.trim().is_empty()
            || self.highlight.highlight_color.trim().is_empty()
        {
            return Err(ConfigError::Invalid("colors must not be blank".into()));
        }

        Ok(())
    }
}

struct EnvOverrides<'a, F> {
    lookup: &'a F,
}

impl<F> EnvOverrides<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.string(key) {
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value,
                }),
            None => Ok(None),
        }
    }
}
