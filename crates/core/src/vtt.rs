//! WebVTT caption parsing.
//!
//! Auto-generated tracks interleave real cues with zero-length "settings-only"
//! cues whose time range is followed by a blank line. The parser drops those and
//! keeps everything else in source order.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::types::Cue;

pub const TIME_RANGE_SEPARATOR: &str = "-->";

const HEADER_PREFIXES: [&str; 3] = ["WEBVTT", "Kind:", "Language:"];

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^}]+\}").unwrap());

/// Remove inline `<...>` tags and `{...}` style directives, then trim.
pub fn strip_markup(line: &str) -> String {
    let without_tags = TAG_RE.replace_all(line, "");
    STYLE_RE.replace_all(&without_tags, "").trim().to_string()
}

pub fn is_header_line(line: &str) -> bool {
    HEADER_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

pub fn is_time_range(line: &str) -> bool {
    line.contains(TIME_RANGE_SEPARATOR)
}

/// Split `00:00:01.000 --> 00:00:03.000 align:start` into range and settings.
fn split_time_range(line: &str) -> (String, Option<String>) {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(start), Some(TIME_RANGE_SEPARATOR), Some(end)) => {
            let settings = tokens.collect::<Vec<_>>().join(" ");
            let settings = (!settings.is_empty()).then_some(settings);
            (format!("{start} {TIME_RANGE_SEPARATOR} {end}"), settings)
        }
        _ => (line.to_string(), None),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserState {
    /// Outside any cue.
    Awaiting,
    /// Saw a time range; the next line decides whether it carries text.
    Pending {
        time_range: String,
        settings: Option<String>,
    },
    InCue(Cue),
}

/// Line-driven cue parser. Feed lines with [`CueParser::push_line`] and collect
/// the result with [`CueParser::finish`].
#[derive(Debug)]
pub struct CueParser {
    state: ParserState,
    cues: Vec<Cue>,
}

impl Default for CueParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CueParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Awaiting,
            cues: Vec::new(),
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn push_line(&mut self, raw: &str) {
        let line = raw.trim();
        if is_header_line(line) {
            return;
        }

        let state = std::mem::replace(&mut self.state, ParserState::Awaiting);
        self.state = match state {
            ParserState::Awaiting => {
                if is_time_range(line) {
                    pending(line)
                } else {
                    ParserState::Awaiting
                }
            }
            ParserState::Pending {
                time_range,
                settings,
            } => {
                if line.is_empty() {
                    debug!("Dropping settings-only cue {}", time_range);
                    ParserState::Awaiting
                } else if is_time_range(line) {
                    debug!("Dropping settings-only cue {}", time_range);
                    pending(line)
                } else {
                    let mut cue = Cue {
                        time_range,
                        settings,
                        lines: Vec::new(),
                    };
                    append_text(&mut cue, line);
                    ParserState::InCue(cue)
                }
            }
            ParserState::InCue(mut cue) => {
                if line.is_empty() {
                    self.cues.push(cue);
                    ParserState::Awaiting
                } else if is_time_range(line) {
                    self.cues.push(cue);
                    pending(line)
                } else {
                    append_text(&mut cue, line);
                    ParserState::InCue(cue)
                }
            }
        };
    }

    pub fn finish(mut self) -> Vec<Cue> {
        if let ParserState::InCue(cue) = std::mem::replace(&mut self.state, ParserState::Awaiting)
        {
            self.cues.push(cue);
        }
        self.cues
    }
}

fn pending(line: &str) -> ParserState {
    let (time_range, settings) = split_time_range(line);
    ParserState::Pending {
        time_range,
        settings,
    }
}

fn append_text(cue: &mut Cue, line: &str) {
    let cleaned = strip_markup(line);
    if !cleaned.is_empty() {
        cue.lines.push(cleaned);
    }
}

/// Parse a complete WebVTT document into cues, in source order.
pub fn parse_cues(markup: &str) -> Vec<Cue> {
    let mut parser = CueParser::new();
    for line in markup.lines() {
        parser.push_line(line);
    }
    let cues = parser.finish();
    debug!("Parsed {} cues", cues.len());
    cues
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: &str = "00:00:01.000 --> 00:00:03.000";

    #[test]
    fn strip_removes_tags_and_styles() {
        assert_eq!(strip_markup("<c>Hello</c> world"), "Hello world");
        assert_eq!(
            strip_markup("we<00:00:00.480><c> are</c><00:00:00.640><c> here</c>"),
            "we are here"
        );
        assert_eq!(strip_markup("{\\an8}Top line"), "Top line");
        assert_eq!(strip_markup("<c.colorE5E5E5></c>"), "");
    }

    #[test]
    fn strip_is_idempotent() {
        for line in ["<i>so</i> {\\b1}anyway", "plain text", "a < b and c > d", ""] {
            let once = strip_markup(line);
            assert_eq!(strip_markup(&once), once);
        }
    }

    #[test]
    fn time_range_settings_are_split_off() {
        let (range, settings) = split_time_range("00:00:00.160 --> 00:00:02.470 align:start position:0%");
        assert_eq!(range, "00:00:00.160 --> 00:00:02.470");
        assert_eq!(settings.as_deref(), Some("align:start position:0%"));

        let (range, settings) = split_time_range(RANGE);
        assert_eq!(range, RANGE);
        assert_eq!(settings, None);

        let (range, _) = split_time_range("00:01.000-->00:02.000");
        assert_eq!(range, "00:01.000-->00:02.000");
    }

    #[test]
    fn header_lines_are_ignored() {
        let mut parser = CueParser::new();
        parser.push_line("WEBVTT");
        parser.push_line("Kind: captions");
        parser.push_line("Language: en");
        assert_eq!(parser.state(), &ParserState::Awaiting);
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn time_range_enters_pending() {
        let mut parser = CueParser::new();
        parser.push_line(RANGE);
        assert_eq!(
            parser.state(),
            &ParserState::Pending {
                time_range: RANGE.to_string(),
                settings: None,
            }
        );
    }

    #[test]
    fn pending_then_blank_drops_cue() {
        let mut parser = CueParser::new();
        parser.push_line(RANGE);
        parser.push_line("   ");
        assert_eq!(parser.state(), &ParserState::Awaiting);
        parser.push_line("text after a settings-only cue");
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn pending_then_time_range_replaces_pending() {
        let mut parser = CueParser::new();
        parser.push_line(RANGE);
        parser.push_line("00:00:03.000 --> 00:00:05.000");
        parser.push_line("second");
        let cues = parser.finish();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].time_range, "00:00:03.000 --> 00:00:05.000");
        assert_eq!(cues[0].lines, vec!["second"]);
    }

    #[test]
    fn in_cue_accumulates_until_blank() {
        let mut parser = CueParser::new();
        parser.push_line(RANGE);
        parser.push_line("<c>first</c> line");
        parser.push_line("second line");
        assert!(matches!(parser.state(), ParserState::InCue(_)));
        parser.push_line("");
        assert_eq!(parser.state(), &ParserState::Awaiting);
        assert_eq!(parser.cues()[0].lines, vec!["first line", "second line"]);
    }

    #[test]
    fn in_cue_ends_on_next_time_range() {
        let markup = format!("{RANGE}\none\n00:00:03.000 --> 00:00:04.000\ntwo");
        let cues = parse_cues(&markup);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text(), "one");
        assert_eq!(cues[1].text(), "two");
    }

    #[test]
    fn styling_only_cue_keeps_empty_text() {
        let markup = format!("WEBVTT\n\n{RANGE}\n<c></c>\n\n");
        let cues = parse_cues(&markup);
        assert_eq!(cues.len(), 1);
        assert!(cues[0].is_empty());
    }

    #[test]
    fn youtube_auto_caption_layout() {
        let markup = "WEBVTT\nKind: captions\nLanguage: en\n\n\
            00:00:00.160 --> 00:00:02.470 align:start position:0%\n \n\
            hello<00:00:00.480><c> everyone</c>\n\n\
            00:00:02.470 --> 00:00:02.480 align:start position:0%\n\
            hello everyone\n \n\n\
            00:00:02.480 --> 00:00:05.000 align:start position:0%\n\
            hello everyone\n\
            welcome<00:00:03.000><c> back</c>\n";
        let cues = parse_cues(markup);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].time_range, "00:00:02.470 --> 00:00:02.480");
        assert_eq!(cues[0].lines, vec!["hello everyone"]);
        assert_eq!(cues[1].lines, vec!["hello everyone", "welcome back"]);
    }

    #[test]
    fn cue_identifiers_are_not_text() {
        let markup = format!("WEBVTT\n\n1\n{RANGE}\nfirst\n\n2\n00:00:03.000 --> 00:00:04.000\nsecond\n");
        let texts: Vec<_> = parse_cues(&markup).iter().map(|c| c.text()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }
}
