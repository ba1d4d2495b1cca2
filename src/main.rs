use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use meet_insights::{
    AnthropicClient, AnthropicConfig, DedupConfig, InsightsReport, MarkdownReport, MergeConfig,
    PipelineConfig, RollupConfig, SegmenterConfig, Speaker, TextTranscriptOptions, build_rollup,
    extract_collection, load_collection, load_transcript_file,
};

#[derive(Parser)]
#[command(name = "meet-insights")]
#[command(author, version, about = "Sales call transcript insight extraction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract categorized insights from one or more transcripts
    Process {
        /// Input transcript files (.txt, .md or .json)
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output file for the machine-readable report (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for the human-readable report (markdown)
        #[arg(long)]
        markdown: Option<PathBuf>,

        /// Sales rep name (inferred from the transcript when omitted)
        #[arg(long)]
        rep_name: Option<String>,

        /// Prospect company name (overrides the transcript header)
        #[arg(long)]
        company_name: Option<String>,

        /// Call type, e.g. discovery or demo
        #[arg(long)]
        call_type: Option<String>,

        /// Keep near-duplicate insights
        #[arg(long)]
        no_dedupe: bool,

        /// Similarity at or above which two insights are duplicates (0-1)
        #[arg(long, default_value = "0.75")]
        dedup_threshold: f64,

        /// Also merge similar insights within each category
        #[arg(long)]
        merge: bool,

        /// Similarity to a group's first insight needed to merge (0-1)
        #[arg(long, default_value = "0.6")]
        merge_threshold: f64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Segment a transcript and show what was found, without extraction
    Analyze {
        /// Input transcript file (.txt, .md or .json)
        #[arg(short, long)]
        input: PathBuf,

        /// Sales rep name (inferred from the transcript when omitted)
        #[arg(long)]
        rep_name: Option<String>,

        /// Prospect company name (overrides the transcript header)
        #[arg(long)]
        company_name: Option<String>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            output,
            markdown,
            rep_name,
            company_name,
            call_type,
            no_dedupe,
            dedup_threshold,
            merge,
            merge_threshold,
            verbose,
        } => {
            setup_logging(verbose);
            let options = TextTranscriptOptions {
                rep_name,
                company_name,
                call_type,
                ..Default::default()
            };
            let config = PipelineConfig {
                dedup: DedupConfig {
                    threshold: dedup_threshold,
                    ..Default::default()
                },
                deduplicate: !no_dedupe,
                merge: merge.then_some(MergeConfig {
                    threshold: merge_threshold,
                }),
                ..Default::default()
            };
            process_transcripts(input, output, markdown, options, config).await
        }
        Commands::Analyze {
            input,
            rep_name,
            company_name,
            verbose,
        } => {
            setup_logging(verbose);
            let options = TextTranscriptOptions {
                rep_name,
                company_name,
                ..Default::default()
            };
            analyze_transcript(input, options)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn process_transcripts(
    input: Vec<PathBuf>,
    output: PathBuf,
    markdown: Option<PathBuf>,
    options: TextTranscriptOptions,
    config: PipelineConfig,
) -> Result<()> {
    info!("Loading {} transcript file(s)", input.len());
    let collection = load_collection(&input, &options, &SegmenterConfig::default());
    if collection.transcripts.is_empty() {
        bail!("No transcripts could be loaded");
    }

    let api_config = AnthropicConfig::from_env().context("Failed to configure extractor")?;
    let client = AnthropicClient::new(api_config);

    info!("Extracting insights from {} calls...", collection.total_calls());
    let result = extract_collection(&client, &collection, &config).await;

    if result.succeeded() == 0 {
        bail!("Extraction failed for every transcript");
    }

    let now = Local::now().naive_local();
    let rollup = (collection.total_calls() > 1).then(|| {
        build_rollup(
            &result.insights,
            collection.date_range_start.unwrap_or(now),
            collection.date_range_end.unwrap_or(now),
            &RollupConfig::default(),
        )
    });

    InsightsReport::new(&result.insights, rollup.as_ref(), now).write_json(&output)?;
    info!("Report written to {:?}", output);

    if let Some(path) = markdown {
        let mut report = MarkdownReport::new(&result.insights, now);
        if let Some(rollup) = &rollup {
            report = report.with_rollup(rollup);
        }
        report.write_file(&path)?;
        info!("Markdown report written to {:?}", path);
    }

    println!("Insight Summary");
    println!("===============");
    println!(
        "Calls processed: {} ({} failed)",
        result.succeeded(),
        result.failures.len()
    );
    for (category, count) in result.insights.category_counts() {
        println!("{}: {}", category.title(), count);
    }
    println!("Total insights: {}", result.insights.total_insights());
    if let Some(rollup) = &rollup {
        println!("Recurring themes: {}", rollup.top_themes.len());
    }
    println!(
        "Processing time: {:.1}s",
        result.processing_time.as_secs_f64()
    );

    for failure in &result.failures {
        println!("Failed: {} - {}", failure.call_id, failure.error);
    }

    Ok(())
}

fn analyze_transcript(input: PathBuf, options: TextTranscriptOptions) -> Result<()> {
    info!("Analyzing transcript from {:?}", input);
    let transcript = load_transcript_file(&input, options, &SegmenterConfig::default())
        .context("Failed to load input transcript")?;
    let metadata = &transcript.metadata;

    println!("Transcript Analysis");
    println!("==================");
    println!("Call ID: {}", metadata.call_id);
    println!("Call date: {}", metadata.call_date_formatted());
    println!("Rep: {}", metadata.rep_name);
    println!(
        "Company: {}",
        metadata.company_name.as_deref().unwrap_or("(unknown)")
    );
    if let Some(duration) = metadata.duration_formatted() {
        println!("Duration: {}", duration);
    }
    println!("Segments: {}", transcript.segments.len());
    println!("Words: {}", transcript.word_count());
    println!();

    if transcript.segments.is_empty() {
        println!("No speaker segments found; the full text will be used as-is.");
        return Ok(());
    }

    println!("Speakers");
    println!("--------");
    let mut speakers: Vec<(String, Speaker, usize)> = Vec::new();
    for segment in &transcript.segments {
        let label = segment.speaker_label().to_string();
        match speakers.iter_mut().find(|(name, _, _)| *name == label) {
            Some(entry) => entry.2 += 1,
            None => speakers.push((label, segment.speaker, 1)),
        }
    }
    for (name, speaker, count) in &speakers {
        println!("{} [{}]: {} segments", name, speaker.label(), count);
    }
    println!();

    println!("First segments");
    println!("--------------");
    for segment in transcript.segments.iter().take(5) {
        let timestamp = segment
            .timestamp_display()
            .map(|ts| format!("[{}] ", ts))
            .unwrap_or_default();
        println!("{}{}: {}", timestamp, segment.speaker_label(), segment.text);
    }

    Ok(())
}
