//! Advanced SubStation Alpha (ASS) output.
//!
//! Writes a single-style script whose events are the per-word cues produced
//! by the caption pipeline.

use crate::captions::{CaptionConfig, Cue};
use std::fmt::Write as FmtWrite;
use std::io;
use std::path::Path;
use tracing::info;

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Format seconds as an ASS timestamp (H:MM:SS.CC)
pub fn format_ass_time(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;
    let cs = total_cs % 100;
    let total_secs = total_cs / 100;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!("{}:{:02}:{:02}.{:02}", hours, mins, secs, cs)
}

/// Turn an override-style color (`&H00FFFFFF&`) into a style-line color (`&H00FFFFFF`)
fn style_color(color: &str) -> &str {
    color.strip_suffix('&').unwrap_or(color)
}

/// Render the `[Script Info]`, `[V4+ Styles]` and `[Events]` headers
pub fn ass_header(config: &CaptionConfig) -> String {
    let mut out = String::new();
    let base = style_color(&config.highlight.base_color);

    let _ = writeln!(out, "[Script Info]");
    let _ = writeln!(out, "ScriptType: v4.00+");
    let _ = writeln!(out, "PlayResX: {}", config.canvas_width);
    let _ = writeln!(out, "PlayResY: {}", config.canvas_height);
    let _ = writeln!(out, "WrapStyle: 2");
    let _ = writeln!(out, "ScaledBorderAndShadow: yes");
    let _ = writeln!(out);
    let _ = writeln!(out, "[V4+ Styles]");
    let _ = writeln!(out, "{}", STYLE_FORMAT);
    let _ = writeln!(
        out,
        "Style: {},{},{},{},{},&H00000000,&H00000000,-1,0,0,0,100,100,2,0,1,6,2,2,{},{},120,1",
        config.style_name,
        config.font_family,
        config.font_size,
        base,
        base,
        config.margin_h,
        config.margin_h
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "[Events]");
    let _ = writeln!(out, "{}", EVENT_FORMAT);

    out
}

/// A single `Dialogue:` line
pub fn dialogue_line(cue: &Cue) -> String {
    format!(
        "Dialogue: 0,{},{},{},,0,0,0,,{}",
        format_ass_time(cue.start),
        format_ass_time(cue.end),
        cue.style,
        cue.text
    )
}

/// Full ASS script for a set of cues
pub fn render_document(config: &CaptionConfig, cues: &[Cue]) -> String {
    let mut output = ass_header(config);

    for cue in cues {
        let _ = writeln!(output, "{}", dialogue_line(cue));
    }

    output
}

/// Write the script to `path`, creating parent directories as needed
pub fn save_to_file(path: &Path, config: &CaptionConfig, cues: &[Cue]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, render_document(config, cues))?;
    info!("Wrote {} dialogue events to {:?}", cues.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(start: f64, end: f64, text: &str) -> Cue {
        Cue {
            start,
            end,
            style: "Phrase".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_ass_time_format() {
        assert_eq!(format_ass_time(0.0), "0:00:00.00");
        assert_eq!(format_ass_time(1.5), "0:00:01.50");
        assert_eq!(format_ass_time(65.123), "0:01:05.12");
        assert_eq!(format_ass_time(3661.5), "1:01:01.50");
        assert_eq!(format_ass_time(0.556), "0:00:00.56");
        assert_eq!(format_ass_time(59.999), "0:01:00.00");
        assert_eq!(format_ass_time(-0.3), "0:00:00.00");
    }

    #[test]
    fn test_header_uses_config() {
        let config = CaptionConfig::portrait();
        let header = ass_header(&config);

        assert!(header.starts_with("[Script Info]\nScriptType: v4.00+\n"));
        assert!(header.contains("PlayResX: 1080\nPlayResY: 1920\n"));
        assert!(header.contains(
            "Style: Phrase,Arial Black,84,&H00FFFFFF,&H00FFFFFF,&H00000000,&H00000000,-1,0,0,0,100,100,2,0,1,6,2,2,60,60,120,1\n"
        ));
        assert!(header.ends_with(&format!("[Events]\n{}\n", EVENT_FORMAT)));
    }

    #[test]
    fn test_dialogue_line() {
        let line = dialogue_line(&cue(0.5, 1.26, "{\\an2\\pos(960,830)}hi"));
        assert_eq!(line, "Dialogue: 0,0:00:00.50,0:00:01.26,Phrase,,0,0,0,,{\\an2\\pos(960,830)}hi");
    }

    #[test]
    fn test_empty_document_is_header_only() {
        let config = CaptionConfig::default();
        assert_eq!(render_document(&config, &[]), ass_header(&config));
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("captions.ass");
        let config = CaptionConfig::default();
        let cues = vec![cue(0.0, 0.5, "one"), cue(0.5, 1.0, "two")];

        save_to_file(&path, &config, &cues).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().filter(|l| l.starts_with("Dialogue:")).count(), 2);
        assert!(written.ends_with("Dialogue: 0,0:00:00.50,0:00:01.00,Phrase,,0,0,0,,two\n"));
    }
}
