//! Core data models used throughout the retrieval engine.
//!
//! These types represent the documents, chunks, and hits that flow through
//! the ingestion and retrieval pipeline.

use serde::Serialize;

/// Origin of an ingested document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Pdf,
    Sitemap,
    Manual,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Pdf => "pdf",
            SourceType::Sitemap => "sitemap",
            SourceType::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pdf" => Some(SourceType::Pdf),
            "sitemap" => Some(SourceType::Sitemap),
            "manual" => Some(SourceType::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw unit of ingestion produced by a loader. Not persisted; consumed by
/// the chunker.
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub source_type: SourceType,
    /// Human-readable label used for `[Source: ...]` attribution.
    pub source_name: String,
    /// Optional link carried through to citations.
    pub source_url: Option<String>,
}

/// The unit of indexing and retrieval.
///
/// The id is derived deterministically from `(source_name, seq_index)` so
/// re-ingesting the same corpus yields the same id set.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub source_type: SourceType,
    pub source_name: String,
    pub source_url: Option<String>,
    /// Position within the parent document.
    pub seq_index: i64,
}

/// Which retriever produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieverOrigin {
    Semantic,
    Lexical,
}

/// Ephemeral result of one retrieval query. Scores are in [0, 1].
#[derive(Debug, Clone)]
pub struct RetrievalHit {
    pub chunk_id: String,
    pub text: String,
    pub source_name: String,
    pub source_url: Option<String>,
    pub score: f64,
    pub origin: RetrieverOrigin,
}

/// A citation link attached to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
}

/// One turn of prior conversation, oldest-first.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// Counters returned by an ingestion run.
#[derive(Debug, Default, Clone)]
pub struct IngestStats {
    pub documents_loaded: usize,
    /// Sources that could not be read (corrupt PDFs etc.). Never aborts the batch.
    pub documents_skipped: usize,
    pub chunks_written: u64,
    pub chunks_embedded: u64,
    /// Chunks stored without a vector (embedding unavailable or disabled).
    pub chunks_pending: u64,
}
