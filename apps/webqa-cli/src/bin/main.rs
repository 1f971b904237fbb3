//! `webqa`: ask questions about a single web page or text file.
//!
//! ```bash
//! webqa ask "What is task decomposition?"
//! webqa ask "What is CoT?" --source notes.txt -k 2 --show-context
//! webqa chunks --source https://example.com/post
//! webqa search "memory stream" -k 3
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use webqa_core::config::{Config, Settings};
use webqa_core::{build_chunker, Chunk, ChunkerKind, Loader};
use webqa_embed::build_embedder;
use webqa_pipeline::Pipeline;
use webqa_web::{ChatGenerator, SourceLoader};

#[derive(Parser)]
#[command(name = "webqa")]
#[command(about = "Question answering over one web page")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    chunking: ChunkingArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ChunkingArgs {
    /// Chunk size in characters (overrides config)
    #[arg(long, global = true)]
    chunk_size: Option<usize>,

    /// Overlap between chunks in characters (overrides config)
    #[arg(long, global = true)]
    overlap: Option<usize>,

    /// Chunking strategy: "fixed" or "recursive" (overrides config)
    #[arg(long, global = true)]
    strategy: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the source and answer a question about it
    Ask {
        question: String,

        /// URL or file path; defaults to source.url from config
        #[arg(long)]
        source: Option<String>,

        /// Number of chunks handed to the model
        #[arg(short)]
        k: Option<usize>,

        /// Print the retrieved chunks before the answer
        #[arg(long)]
        show_context: bool,
    },

    /// Print how the source is split into chunks
    Chunks {
        #[arg(long)]
        source: Option<String>,
    },

    /// Show scored nearest chunks without generating an answer
    Search {
        query: String,

        #[arg(long)]
        source: Option<String>,

        #[arg(short)]
        k: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Config::load().context("loading configuration")?.settings()?;
    apply_overrides(&mut settings, &cli.chunking)?;

    match cli.command {
        Commands::Ask { question, source, k, show_context } => {
            if let Some(k) = k {
                settings.retrieval.k = k;
            }
            let source = source.unwrap_or_else(|| settings.source.url.clone());
            let mut pipeline = build_pipeline(&settings)?;
            ingest(&mut pipeline, &source)?;

            let turn = pipeline.answer(&question, None).with_context(|| format!("answering {question:?}"))?;
            if show_context {
                for (rank, chunk) in turn.context.iter().enumerate() {
                    println!("--- #{} (offset {}) ---", rank + 1, chunk.start_offset);
                    println!("{}\n", preview(chunk, 300));
                }
            }
            println!("{}", turn.answer);
        }

        Commands::Chunks { source } => {
            let source = source.unwrap_or_else(|| settings.source.url.clone());
            let document = SourceLoader::from_config(&settings.source)?.load(&source)?;
            let chunker = build_chunker(&settings.chunking)?;
            let chunks = chunker.split(&document);

            println!("Split '{}' into {} chunks ({} strategy):\n", source, chunks.len(), chunker.name());
            for (i, chunk) in chunks.iter().enumerate() {
                println!("--- Chunk {} (offset {}, {} chars) ---", i + 1, chunk.start_offset, chunk.char_len());
                println!("{}\n", preview(chunk, 120));
            }
        }

        Commands::Search { query, source, k } => {
            let source = source.unwrap_or_else(|| settings.source.url.clone());
            let mut pipeline = build_pipeline(&settings)?;
            ingest(&mut pipeline, &source)?;

            let k = k.unwrap_or(pipeline.top_k());
            let hits = pipeline.retriever().retrieve_scored(&query, k)?;
            println!("Top {} chunks for {:?}:\n", hits.len(), query);
            for hit in hits {
                println!("[{:.4}] id {} offset {}", hit.score, hit.id, hit.payload.start_offset);
                println!("{}\n", preview(&hit.payload, 200));
            }
        }
    }
    Ok(())
}

fn apply_overrides(settings: &mut Settings, args: &ChunkingArgs) -> Result<()> {
    if let Some(size) = args.chunk_size {
        settings.chunking.chunk_size = size;
    }
    if let Some(overlap) = args.overlap {
        settings.chunking.overlap = overlap;
    }
    if let Some(strategy) = &args.strategy {
        settings.chunking.strategy = match strategy.as_str() {
            "fixed" => ChunkerKind::Fixed,
            "recursive" => ChunkerKind::Recursive,
            other => anyhow::bail!("unknown chunking strategy {other:?}; use \"fixed\" or \"recursive\""),
        };
    }
    settings.validate()?;
    Ok(())
}

fn build_pipeline(settings: &Settings) -> Result<Pipeline> {
    let loader = SourceLoader::from_config(&settings.source)?;
    let embedder = build_embedder(&settings.embedding)?;
    let generator = ChatGenerator::new(&settings.generation)?;
    Ok(Pipeline::from_settings(settings, Box::new(loader), embedder, Box::new(generator))?)
}

fn ingest(pipeline: &mut Pipeline, source: &str) -> Result<()> {
    let document = pipeline.load(source).with_context(|| format!("loading {source}"))?;
    let chunker = build_chunker(pipeline.chunking())?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)")?
            .progress_chars("#>-"),
    );
    let indexed = pipeline.build_with_progress(&document, chunker.as_ref(), |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    });
    match indexed {
        Ok(count) => {
            pb.finish_and_clear();
            tracing::info!(chunks = count, source, "index ready");
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            Err(e).with_context(|| format!("indexing {source}"))
        }
    }
}

fn preview(chunk: &Chunk, max_chars: usize) -> String {
    let mut text: String = chunk.text.chars().take(max_chars).collect();
    if chunk.char_len() > max_chars {
        text.push_str("...");
    }
    text
}
