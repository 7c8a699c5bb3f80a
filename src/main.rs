use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use chapterize::{
    AnthropicClient, AnthropicConfig, ChapterConfig, ChapterFile, GenerationConfig, HumanChapters,
    MergeConfig, RetryConfig, WindowConfig, build_windows, generate_chapters, load_segment_store,
    parse_segments_file,
};

#[derive(Parser)]
#[command(name = "chapterize")]
#[command(author, version, about = "Generate chapters from a timestamped transcript", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate chapters for a transcript
    Generate {
        /// Input transcript segments (JSON array of {id, start, end, text})
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for chapters (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for a human-readable chapter list (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Segments per window
        #[arg(long, default_value = "15")]
        window_size: usize,

        /// Segments shared between consecutive windows
        #[arg(long, default_value = "5")]
        overlap: usize,

        /// Candidates starting within this many seconds are merged
        #[arg(long, default_value = "10.0")]
        merge_threshold: f64,

        /// Advisory maximum number of chapters
        #[arg(long, default_value = "12")]
        max_chapters: usize,

        /// Windows sent to the model concurrently
        #[arg(long, default_value = "4")]
        max_concurrency: usize,

        /// Retries per window on transient errors
        #[arg(long, default_value = "2")]
        max_retries: usize,

        /// Timeout per model request in seconds
        #[arg(long, default_value = "60")]
        timeout_secs: u64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show how a transcript would be windowed without calling the model
    Windows {
        /// Input transcript segments (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Segments per window
        #[arg(long, default_value = "15")]
        window_size: usize,

        /// Segments shared between consecutive windows
        #[arg(long, default_value = "5")]
        overlap: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            human_readable,
            window_size,
            overlap,
            merge_threshold,
            max_chapters,
            max_concurrency,
            max_retries,
            timeout_secs,
            verbose,
        } => {
            setup_logging(verbose);
            let config = ChapterConfig {
                window: WindowConfig {
                    window_size,
                    overlap,
                },
                merge: MergeConfig {
                    merge_threshold_seconds: merge_threshold,
                },
                generation: GenerationConfig {
                    max_chapters,
                    max_concurrency,
                    retry: RetryConfig {
                        num_retries: max_retries,
                        request_timeout_secs: timeout_secs,
                        ..Default::default()
                    },
                },
            };
            generate(input, output, human_readable, config).await
        }
        Commands::Windows {
            input,
            window_size,
            overlap,
            verbose,
        } => {
            setup_logging(verbose);
            show_windows(
                input,
                WindowConfig {
                    window_size,
                    overlap,
                },
            )
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn generate(
    input: PathBuf,
    output: PathBuf,
    human_readable: Option<PathBuf>,
    config: ChapterConfig,
) -> Result<()> {
    info!("Loading transcript segments from {:?}", input);
    let segments = parse_segments_file(&input).context("Failed to parse input transcript")?;
    info!("Loaded {} segments", segments.len());

    let api_config = AnthropicConfig::from_env()?;
    let client = AnthropicClient::new(api_config);

    let outcome = generate_chapters(&client, segments, &config)
        .await
        .context("Chapter generation failed")?;

    let file = ChapterFile::new(outcome.chapters);
    file.write_json(&output)
        .context("Failed to write chapters")?;
    info!("Chapters written to {:?}", output);

    if let Some(path) = human_readable {
        HumanChapters::new(&file.chapters)
            .write_file(&path)
            .context("Failed to write human-readable chapters")?;
        info!("Human-readable chapters written to {:?}", path);
    }

    let report = &outcome.report;
    info!(
        "Complete: {} chapters from {} windows ({} failed, {} empty), {} candidates ({} discarded, {} merged)",
        file.chapters.len(),
        report.windows_total,
        report.windows_failed,
        report.windows_empty,
        report.candidates_received,
        report.candidates_discarded,
        report.candidates_merged
    );
    print!("{}", HumanChapters::new(&file.chapters).format());

    Ok(())
}

fn show_windows(input: PathBuf, config: WindowConfig) -> Result<()> {
    info!("Analyzing transcript from {:?}", input);
    let store = load_segment_store(&input).context("Failed to load transcript")?;
    let windows = build_windows(&store, &config)?;

    println!("Transcript");
    println!("==========");
    println!("Segments: {}", store.len());
    println!(
        "Span: {:.2}s - {:.2}s ({:.1}s)",
        store.start_time(),
        store.end_time(),
        store.duration()
    );
    let average = store.segments().iter().map(|s| s.duration()).sum::<f64>() / store.len() as f64;
    println!("Average segment: {:.2}s", average);
    println!();

    println!("Windows");
    println!("-------");
    println!(
        "Window size {} segments, overlap {}, stride {}",
        config.window_size,
        config.overlap,
        config.stride()
    );
    for window in windows.iter() {
        println!(
            "{}: segments [{}, {}) {:.2}s - {:.2}s ({:.1}s)",
            window.window_id,
            window.start_idx,
            window.end_idx,
            window.start_time,
            window.end_time,
            window.duration()
        );
    }
    println!(
        "Total windows: {} covering {} of {} segments",
        windows.total_windows(),
        windows.covered_segment_count(),
        store.len()
    );

    Ok(())
}
