use std::time::Duration;

use captext_core::{
    Fetched, Transcript, TranscriptError, TranscriptFiles, TranscriptResult, WordCount,
};
use console::style;
use serde::Serialize;

const BAR_WIDTH: usize = 30;

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let whole = d.as_secs();
        format!("{}m {}s", whole / 60, whole % 60)
    }
}

#[derive(Serialize)]
struct SavedFiles<'a> {
    timestamps: &'a std::path::Path,
    formatted: &'a std::path::Path,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    url: &'a str,
    cached: bool,
    #[serde(flatten)]
    result: TranscriptResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    words: Option<&'a [WordCount]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<SavedFiles<'a>>,
}

pub fn print_json(
    url: &str,
    fetched: &Fetched,
    words: Option<&[WordCount]>,
    files: Option<&TranscriptFiles>,
) -> anyhow::Result<()> {
    let report = JsonReport {
        url,
        cached: fetched.cached,
        result: fetched.report(),
        words,
        files: files.map(|f| SavedFiles {
            timestamps: &f.timestamps,
            formatted: &f.formatted,
        }),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn print_error(err: &TranscriptError) {
    eprintln!("{} {}", style("Error:").red().bold(), err);
}

pub fn print_transcript(transcript: &Transcript, files: Option<&TranscriptFiles>) {
    if let Some(files) = files {
        println!(
            "\n{} {}",
            style("Saved:").dim(),
            style(files.timestamps.display()).cyan()
        );
        println!(
            "{} {}\n",
            style("Saved:").dim(),
            style(files.formatted.display()).cyan()
        );
    }

    println!("{}", style("─".repeat(60)).dim());
    println!("{}\n", style("Transcript with Timestamps").bold());
    println!("{}\n", transcript.timestamped);

    println!("{}", style("─".repeat(60)).dim());
    println!("{}\n", style("Formatted Transcript").bold());
    println!("{}\n", transcript.paragraph);
}

pub fn print_words(words: Option<&[WordCount]>) {
    println!("{}", style("─".repeat(60)).dim());
    println!("{}\n", style("Most Frequent Words").bold());

    let Some(words) = words else {
        println!(
            "{}",
            style("Word frequencies could not be computed (perhaps only common words were found).")
                .yellow()
        );
        return;
    };

    let max = words.first().map(|w| w.count).unwrap_or(1).max(1);
    let label_width = words.iter().map(|w| w.word.chars().count()).max().unwrap_or(0);
    for w in words {
        let bar = "█".repeat((w.count * BAR_WIDTH).div_ceil(max));
        println!(
            "{:<width$}  {} {}",
            w.word,
            style(bar).cyan(),
            style(w.count).dim(),
            width = label_width
        );
    }
    println!();
}
