//! In-memory keyword-ranking index.
//!
//! Built once per process lifetime from the full chunk corpus (the same
//! chunk texts the vector store holds) and read-only afterwards, so it is
//! safe for unlimited concurrent readers. Scoring is BM25 with the standard
//! k1 = 1.2, b = 0.75 parameters; per-query scores are scaled by the top
//! score so they land in [0, 1] alongside semantic similarities.
//!
//! There are no online updates: when the corpus changes, rebuild wholesale.
//! That is cheap at this corpus size and only happens at ingestion/restart.

use std::collections::HashMap;

use crate::models::{Chunk, RetrievalHit, RetrieverOrigin};

const BM25_K1: f64 = 1.2;
const BM25_B: f64 = 0.75;

struct IndexedChunk {
    chunk: Chunk,
    term_freq: HashMap<String, usize>,
    token_count: usize,
}

pub struct LexicalIndex {
    docs: Vec<IndexedChunk>,
    doc_freq: HashMap<String, usize>,
    avg_len: f64,
}

impl LexicalIndex {
    /// Build the index from chunks in original ingestion order; that order
    /// is the deterministic tie-break at query time.
    pub fn build(chunks: Vec<Chunk>) -> Self {
        let mut docs = Vec::with_capacity(chunks.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut total_tokens = 0usize;

        for chunk in chunks {
            let tokens = tokenize(&chunk.text);
            let mut term_freq: HashMap<String, usize> = HashMap::new();
            for token in &tokens {
                *term_freq.entry(token.clone()).or_insert(0) += 1;
            }
            for term in term_freq.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            total_tokens += tokens.len();
            docs.push(IndexedChunk {
                chunk,
                term_freq,
                token_count: tokens.len(),
            });
        }

        let avg_len = if docs.is_empty() {
            0.0
        } else {
            total_tokens as f64 / docs.len() as f64
        };

        Self {
            docs,
            doc_freq,
            avg_len,
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Top-k chunks by BM25 score, descending, zero-score chunks omitted.
    /// Scores are scaled by the query's best score into [0, 1].
    pub fn query(&self, text: &str, k: usize) -> Vec<RetrievalHit> {
        let query_terms = tokenize(text);
        if query_terms.is_empty() || self.docs.is_empty() {
            return Vec::new();
        }

        let n = self.docs.len() as f64;

        let mut hits: Vec<RetrievalHit> = self
            .docs
            .iter()
            .filter_map(|doc| {
                let mut score = 0.0f64;
                for term in &query_terms {
                    let tf = *doc.term_freq.get(term).unwrap_or(&0) as f64;
                    if tf == 0.0 {
                        continue;
                    }
                    let df = *self.doc_freq.get(term).unwrap_or(&0) as f64;
                    let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
                    let denom = tf
                        + BM25_K1 * (1.0 - BM25_B + BM25_B * doc.token_count as f64 / self.avg_len);
                    score += idf * tf * (BM25_K1 + 1.0) / denom;
                }
                if score > 0.0 {
                    Some(RetrievalHit {
                        chunk_id: doc.chunk.id.clone(),
                        text: doc.chunk.text.clone(),
                        source_name: doc.chunk.source_name.clone(),
                        source_url: doc.chunk.source_url.clone(),
                        score,
                        origin: RetrieverOrigin::Lexical,
                    })
                } else {
                    None
                }
            })
            .collect();

        // Stable sort keeps ingestion order on ties.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);

        if let Some(max) = hits.first().map(|h| h.score) {
            if max > 0.0 {
                for h in &mut hits {
                    h.score /= max;
                }
            }
        }

        hits
    }
}

/// Lowercased alphanumeric terms; everything else is a separator.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceType;

    fn chunk(id: &str, name: &str, text: &str) -> Chunk {
        Chunk {
            id: id.to_string(),
            text: text.to_string(),
            source_type: SourceType::Manual,
            source_name: name.to_string(),
            source_url: None,
            seq_index: 0,
        }
    }

    fn corpus() -> Vec<Chunk> {
        vec![
            chunk(
                "c1",
                "Static Data Masking",
                "Static Data Masking permanently replaces sensitive data with realistic masked values.",
            ),
            chunk(
                "c2",
                "Dynamic Data Masking",
                "Dynamic masking applies policies at query time without changing stored data.",
            ),
            chunk(
                "c3",
                "Deployment Options",
                "Deploy on premises or in the cloud with auto-scaling support.",
            ),
        ]
    }

    #[test]
    fn tokenizer_lowercases_and_splits() {
        assert_eq!(
            tokenize("What is Static-Masking?"),
            vec!["what", "is", "static", "masking"]
        );
    }

    #[test]
    fn query_ranks_matching_chunk_first() {
        let index = LexicalIndex::build(corpus());
        let hits = index.query("What is static masking?", 5);
        assert!(!hits.is_empty());
        assert_eq!(hits[0].source_name, "Static Data Masking");
        assert!((hits[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scores_are_unit_range_and_descending() {
        let index = LexicalIndex::build(corpus());
        let hits = index.query("data masking", 5);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(hits.iter().all(|h| (0.0..=1.0).contains(&h.score)));
    }

    #[test]
    fn no_match_returns_nothing() {
        let index = LexicalIndex::build(corpus());
        assert!(index.query("zebra xylophone", 5).is_empty());
    }

    #[test]
    fn empty_corpus_returns_nothing() {
        let index = LexicalIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.query("anything", 5).is_empty());
    }

    #[test]
    fn ties_keep_ingestion_order() {
        let index = LexicalIndex::build(vec![
            chunk("first", "A", "identical text here"),
            chunk("second", "B", "identical text here"),
        ]);
        let hits = index.query("identical text", 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_id, "first");
        assert_eq!(hits[1].chunk_id, "second");
    }

    #[test]
    fn truncates_to_k() {
        let index = LexicalIndex::build(corpus());
        let hits = index.query("data", 1);
        assert_eq!(hits.len(), 1);
    }
}
