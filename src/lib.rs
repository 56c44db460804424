//! # kb-engine
//!
//! A grounded knowledge-base retrieval engine for a support chatbot.
//!
//! kb-engine turns heterogeneous documents (PDF files, a sitemap-style text
//! file, built-in manual entries) into searchable chunks, indexes them both
//! semantically (embedding vectors in SQLite) and lexically (in-memory BM25),
//! and answers queries with an ensemble of the two, merged by weighted
//! voting. The merged hits are assembled into a grounded prompt with
//! citation links; the LLM call and the HTTP layer belong to the caller.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────────┐
//! │   Loaders    │──▶│   Chunker    │──▶│  VectorStore  │
//! │ PDF/Sitemap/ │   │ 1500c / 200c │   │ SQLite + vecs │
//! │    Manual    │   │   overlap    │   └───────┬───────┘
//! └──────────────┘   └──────────────┘           │ chunks
//!                                       ┌───────▼───────┐
//!                                       │ LexicalIndex  │
//!                                       │ in-memory BM25│
//!                                       └───────┬───────┘
//!                         query                 │
//!                           └────▶ Retriever ◀──┘
//!                                (0.6 sem + 0.4 lex)
//!                                      │
//!                                      ▼
//!                              GroundedPrompt
//!                            (prompt + citations)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! kb init                                  # create the store
//! kb ingest --pdf-dir ./documents --clear  # offline batch ingestion
//! kb query "What is static masking?"       # hybrid retrieval
//! kb stats                                 # what's indexed
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`source_pdf`] | PDF directory loader |
//! | [`source_sitemap`] | Sitemap-style text loader |
//! | [`source_manual`] | Built-in manual entries |
//! | [`chunk`] | Overlapping boundary-preferring chunker |
//! | [`embedding`] | Embedding provider abstraction + retry policy |
//! | [`store`] | Persistent vector index |
//! | [`lexical`] | In-memory BM25 index |
//! | [`retrieve`] | Ensemble retriever and weighted merge |
//! | [`prompt`] | Grounded prompt assembly + citations |
//! | [`ingest`] | Ingestion batch orchestration |

pub mod chunk;
pub mod config;
pub mod db;
pub mod embedding;
pub mod ingest;
pub mod lexical;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod prompt;
pub mod retrieve;
pub mod source_manual;
pub mod source_pdf;
pub mod source_sitemap;
pub mod stats;
pub mod store;
