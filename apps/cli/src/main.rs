use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::Result;
use captext_core::{
    Config, Session, SetupOutcome, Stopwords, TranscriptPipeline, YtDlpSource, save_transcript,
    setup_tokenizer, word_frequencies,
};
use clap::{ArgAction, Parser};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::report::{format_duration, print_error, print_json, print_transcript, print_words};

mod report;

#[derive(Parser)]
#[command(name = "captext")]
#[command(
    about = "Fetch YouTube auto-captions and turn them into timestamped and paragraph transcripts"
)]
struct Cli {
    /// Video URLs. When omitted, URLs are read from stdin, one per line.
    urls: Vec<String>,

    /// Caption language (e.g., "en", "de"). Defaults to the configured language.
    #[arg(short, long)]
    lang: Option<String>,

    /// Directory for the transcript text files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fetch again even if this URL was just processed
    #[arg(short, long)]
    force: bool,

    /// Show the most frequent words of the transcript
    #[arg(short, long)]
    words: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Do not write transcript files
    #[arg(long)]
    no_save: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

struct RunContext<'a> {
    cli: &'a Cli,
    language: &'a str,
    output_dir: &'a Path,
    stopwords: &'a Stopwords,
    max_words: usize,
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "captext=info,captext_core=info",
        _ => "captext=debug,captext_core=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn report_tokenizer_setup(outcome: &SetupOutcome, quiet: bool) {
    match outcome {
        SetupOutcome::Ready(_) => {}
        SetupOutcome::Installed { path, .. } => {
            if !quiet {
                println!(
                    "{} Installed sentence tokenizer data {}",
                    style("✓").green().bold(),
                    style(path.display()).dim()
                );
            }
        }
        SetupOutcome::Missing { language, reason } | SetupOutcome::Failed { language, reason } => {
            eprintln!(
                "{} Sentence tokenizer unavailable for '{}': {}",
                style("Warning:").yellow().bold(),
                language,
                reason
            );
        }
    }
}

/// Process one URL. Returns whether it produced a transcript.
async fn process_url(session: &mut Session, url: &str, ctx: &RunContext<'_>) -> Result<bool> {
    let step_start = Instant::now();
    let spinner = (!ctx.cli.json)
        .then(|| create_spinner(&format!("Downloading subtitles ({})...", ctx.language)));

    info!("Requesting transcript for {}", url);
    let fetched = session.fetch(url, ctx.language, ctx.cli.force).await;

    let transcript = match &fetched.result {
        Ok(transcript) => transcript,
        Err(err) => {
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }
            if ctx.cli.json {
                print_json(url, &fetched, None, None)?;
            } else {
                print_error(err);
            }
            return Ok(false);
        }
    };

    if let Some(spinner) = spinner {
        let timing = if fetched.cached {
            "(cached)".to_string()
        } else {
            format!("[{}]", format_duration(step_start.elapsed()))
        };
        spinner.finish_with_message(format!(
            "{} Transcript: {} {}",
            style("✓").green().bold(),
            style(&transcript.video_id).yellow(),
            style(timing).dim()
        ));
    }

    let files = if ctx.cli.no_save {
        None
    } else {
        Some(save_transcript(transcript, ctx.output_dir).await?)
    };

    let words = ctx
        .cli
        .words
        .then(|| word_frequencies(&transcript.paragraph, ctx.stopwords, ctx.max_words))
        .flatten();

    if ctx.cli.json {
        print_json(url, &fetched, words.as_deref(), files.as_ref())?;
    } else {
        print_transcript(transcript, files.as_ref());
        if ctx.cli.words {
            print_words(words.as_deref());
        }
    }

    Ok(true)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load_or_default(cli.config.as_deref())?;
    let language = cli.lang.clone().unwrap_or_else(|| config.language.clone());
    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());
    debug!(?config, "Loaded configuration");

    if !cli.json {
        println!(
            "\n{}  {}\n",
            style("captext").cyan().bold(),
            style("Transcript Viewer & Formatter").dim()
        );
    }

    // One-time tokenizer setup; failures surface per URL as tokenizer errors
    let outcome = setup_tokenizer(&config.tokenizer.resource_dir(), &language);
    report_tokenizer_setup(&outcome, cli.json);

    let pipeline = TranscriptPipeline::new(
        Box::new(YtDlpSource::new(&config.retrieval)),
        outcome.into_tokenizer(),
        config.paragraphs.clone(),
    );
    let mut session = Session::new(pipeline);
    let stopwords = Stopwords::english().with_extra(&config.words.extra_stopwords);

    let ctx = RunContext {
        cli: &cli,
        language: &language,
        output_dir: &output_dir,
        stopwords: &stopwords,
        max_words: config.words.max_words,
    };

    let mut failures = 0usize;
    if cli.urls.is_empty() {
        if !cli.json {
            println!("{}", style("Enter YouTube URLs, one per line (Ctrl-D to quit).").dim());
        }
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let url = line.trim();
            if url.is_empty() {
                continue;
            }
            if !process_url(&mut session, url, &ctx).await? {
                failures += 1;
            }
        }
    } else {
        for url in &cli.urls {
            if !process_url(&mut session, url, &ctx).await? {
                failures += 1;
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }

    Ok(())
}
