use crate::types::Cue;

/// Format cues as `[time range]` markers followed by their text, one block per cue.
///
/// Cue settings, when present, are kept inside the marker after the range.
/// Cues without text produce no marker.
pub fn format_transcript_with_timestamps(cues: &[Cue]) -> String {
    let mut output = String::new();

    for cue in cues.iter().filter(|cue| !cue.is_empty()) {
        match &cue.settings {
            Some(settings) => output.push_str(&format!("[{} {}]\n", cue.time_range, settings)),
            None => output.push_str(&format!("[{}]\n", cue.time_range)),
        }
        for line in &cue.lines {
            output.push_str(line);
            output.push('\n');
        }
        output.push('\n');
    }

    output.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vtt::parse_cues;

    #[test]
    fn renders_marker_and_stripped_text() {
        let markup = "WEBVTT\n\n00:00:01.000 --> 00:00:03.000\n<c>Hello</c> world\n\n";
        let rendered = format_transcript_with_timestamps(&parse_cues(markup));
        assert_eq!(rendered, "[00:00:01.000 --> 00:00:03.000]\nHello world");
    }

    #[test]
    fn no_bare_marker_for_settings_only_cue() {
        let markup = "00:00:01.000 --> 00:00:01.010\n00:00:01.010 --> 00:00:03.000\nreal text\n";
        let rendered = format_transcript_with_timestamps(&parse_cues(markup));
        assert_eq!(rendered, "[00:00:01.010 --> 00:00:03.000]\nreal text");
        assert!(!rendered.contains("00:00:01.000 -->"));
    }

    #[test]
    fn empty_cues_are_omitted() {
        let markup = "00:00:01.000 --> 00:00:02.000\n<c></c>\n\n\
            00:00:02.000 --> 00:00:03.000\nkept\n";
        let rendered = format_transcript_with_timestamps(&parse_cues(markup));
        assert_eq!(rendered, "[00:00:02.000 --> 00:00:03.000]\nkept");
    }

    #[test]
    fn multi_line_cues_and_block_separation() {
        let markup = "00:00:01.000 --> 00:00:02.000\none\ntwo\n\n\
            00:00:02.000 --> 00:00:03.000\nthree\n";
        let rendered = format_transcript_with_timestamps(&parse_cues(markup));
        assert_eq!(
            rendered,
            "[00:00:01.000 --> 00:00:02.000]\none\ntwo\n\n[00:00:02.000 --> 00:00:03.000]\nthree"
        );
    }

    #[test]
    fn cue_settings_stay_in_the_marker() {
        let markup = "00:00:00.160 --> 00:00:02.470 align:start position:0%\nhello\n";
        let rendered = format_transcript_with_timestamps(&parse_cues(markup));
        assert_eq!(
            rendered,
            "[00:00:00.160 --> 00:00:02.470 align:start position:0%]\nhello"
        );
    }

    #[test]
    fn nothing_to_render() {
        assert_eq!(format_transcript_with_timestamps(&[]), "");
    }
}
