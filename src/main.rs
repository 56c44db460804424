//! # kb-engine CLI (`kb`)
//!
//! The `kb` binary drives the retrieval engine: store initialization,
//! offline batch ingestion, one-shot hybrid queries, and store statistics.
//!
//! ```bash
//! kb --config ./config/kb.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `kb init` | Create the SQLite-backed vector store |
//! | `kb ingest` | Load PDFs/sitemap/manual entries, chunk, embed, store |
//! | `kb query "<question>"` | Run hybrid retrieval and print ranked hits |
//! | `kb stats` | Show chunk counts and embedding coverage |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use kb_engine::config;
use kb_engine::ingest::{self, IngestSources};
use kb_engine::lexical::LexicalIndex;
use kb_engine::logging;
use kb_engine::models::Turn;
use kb_engine::retrieve::Retriever;
use kb_engine::stats;
use kb_engine::store::VectorStore;

/// kb-engine — grounded knowledge-base retrieval for a support chatbot.
#[derive(Parser)]
#[command(
    name = "kb",
    about = "kb-engine — ingest a knowledge base and answer questions with hybrid retrieval",
    version,
    long_about = "kb-engine ingests PDFs, a sitemap-style text file, and built-in manual \
    entries into a persistent vector store, builds an in-memory keyword index at startup, \
    and serves hybrid (semantic + lexical) retrieval with grounded prompt assembly."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/kb.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the vector store schema. Idempotent.
    Init,

    /// Run the offline ingestion batch.
    ///
    /// Loads every configured source, chunks it, embeds the chunks in
    /// batches, and writes them to the store. Re-running without --clear
    /// overwrites existing entries instead of duplicating them.
    Ingest {
        /// Directory of PDF files (overrides config).
        #[arg(long)]
        pdf_dir: Option<PathBuf>,

        /// Sitemap-style text file (overrides config).
        #[arg(long)]
        sitemap: Option<PathBuf>,

        /// Drop all existing entries before ingesting.
        #[arg(long)]
        clear: bool,

        /// Skip the built-in manual knowledge entries.
        #[arg(long)]
        no_manual: bool,

        /// Show document and chunk counts without writing.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of documents to ingest.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run one hybrid retrieval query and print the ranked hits.
    Query {
        /// The question to retrieve context for.
        question: String,

        /// Final number of merged results (overrides config).
        #[arg(long)]
        k: Option<usize>,

        /// Print the assembled grounded prompt instead of the hit table.
        #[arg(long)]
        show_prompt: bool,
    },

    /// Show store statistics: chunks, embedding coverage, sources.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let store = VectorStore::open(&cfg).await?;
            store.close().await;
            println!("Store initialized at {}", cfg.store_path().display());
        }
        Commands::Ingest {
            pdf_dir,
            sitemap,
            clear,
            no_manual,
            dry_run,
            limit,
        } => {
            let mut sources = IngestSources::from_config(&cfg, clear);
            if pdf_dir.is_some() {
                sources.pdf_dir = pdf_dir;
            }
            if sitemap.is_some() {
                sources.sitemap = sitemap;
            }
            if no_manual {
                sources.manual = false;
            }
            ingest::run_ingest(&cfg, &sources, dry_run, limit).await?;
        }
        Commands::Query {
            question,
            k,
            show_prompt,
        } => {
            let mut retrieval = cfg.retrieval.clone();
            if let Some(k) = k {
                retrieval.final_limit = k;
            }

            let store = VectorStore::open(&cfg).await?;
            let lexical = LexicalIndex::build(store.all_chunks().await?);
            let retriever = Retriever::new(store, lexical, retrieval);

            // CLI queries carry no prior conversation.
            let history: Vec<Turn> = Vec::new();

            if show_prompt {
                let grounded = retriever.retrieve_grounded(&question, &history).await?;
                println!("{}", grounded.prompt);
                if !grounded.citations.is_empty() {
                    println!();
                    println!("Citations:");
                    for c in &grounded.citations {
                        println!("  {} — {}", c.title, c.url);
                    }
                }
            } else {
                let hits = retriever.retrieve(&question).await?;
                if hits.is_empty() {
                    println!("No results.");
                } else {
                    for (i, hit) in hits.iter().enumerate() {
                        println!("{}. [{:.2}] {}", i + 1, hit.score, hit.source_name);
                        if let Some(ref url) = hit.source_url {
                            println!("    url: {}", url);
                        }
                        let excerpt: String = hit.text.chars().take(160).collect();
                        println!("    excerpt: \"{}\"", excerpt.replace('\n', " "));
                        println!();
                    }
                }
            }
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
