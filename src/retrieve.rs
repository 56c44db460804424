//! Ensemble retriever: weighted voting over the semantic and lexical indexes.
//!
//! The two index queries have no data dependency and run concurrently; the
//! merge itself is a pure function over the two scored lists. A chunk found
//! by both sides sums both weighted contributions, rewarding agreement. When
//! one side fails or finds nothing, the combined score is renormalized by
//! the weight mass of the sides that did answer, so a degraded query still
//! ranks correctly instead of failing.

use anyhow::Result;
use std::collections::HashMap;

use crate::config::RetrievalConfig;
use crate::lexical::LexicalIndex;
use crate::models::{RetrievalHit, Turn};
use crate::prompt::{self, GroundedPrompt};
use crate::store::VectorStore;

pub struct Retriever {
    store: VectorStore,
    lexical: LexicalIndex,
    config: RetrievalConfig,
}

impl Retriever {
    /// Assemble the serve-time retriever. The lexical index is built by the
    /// caller from the store's chunk corpus (see [`LexicalIndex::build`]).
    pub fn new(store: VectorStore, lexical: LexicalIndex, config: RetrievalConfig) -> Self {
        Self {
            store,
            lexical,
            config,
        }
    }

    /// Query both indexes and return the merged, deduplicated top results.
    ///
    /// An empty store yields an empty hit list, not an error.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievalHit>> {
        let k = self.config.candidate_k;

        let (semantic, lexical) = tokio::join!(self.store.query(query, k), async {
            self.lexical.query(query, k)
        });

        // Store-level failures degrade rather than abort the request.
        let semantic = match semantic {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, "semantic retrieval failed; using lexical only");
                Vec::new()
            }
        };

        Ok(merge_hits(
            semantic,
            lexical,
            self.config.semantic_weight,
            self.config.lexical_weight,
            self.config.final_limit,
        ))
    }

    /// Full serve-time entry point: retrieve, then assemble the grounded
    /// prompt and citation links for the caller's LLM call.
    pub async fn retrieve_grounded(
        &self,
        question: &str,
        history: &[Turn],
    ) -> Result<GroundedPrompt> {
        let hits = self.retrieve(question).await?;
        Ok(prompt::assemble(question, &hits, history))
    }
}

/// Merge two scored hit lists by weighted voting.
///
/// Each hit contributes `weight * score`; a chunk id present in both lists
/// sums both contributions. The result is renormalized by the total weight
/// of the non-empty sides, sorted by combined score descending (stable by
/// semantic-then-lexical discovery order on exact ties) and truncated.
pub fn merge_hits(
    semantic: Vec<RetrievalHit>,
    lexical: Vec<RetrievalHit>,
    semantic_weight: f64,
    lexical_weight: f64,
    limit: usize,
) -> Vec<RetrievalHit> {
    let divisor = match (semantic.is_empty(), lexical.is_empty()) {
        (true, true) => return Vec::new(),
        (false, false) => semantic_weight + lexical_weight,
        (false, true) => semantic_weight,
        (true, false) => lexical_weight,
    };
    if divisor <= 0.0 {
        return Vec::new();
    }

    let mut merged: Vec<RetrievalHit> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for (hits, weight) in [(semantic, semantic_weight), (lexical, lexical_weight)] {
        for hit in hits {
            let contribution = weight * hit.score;
            match by_id.get(&hit.chunk_id) {
                Some(&i) => merged[i].score += contribution,
                None => {
                    by_id.insert(hit.chunk_id.clone(), merged.len());
                    merged.push(RetrievalHit {
                        score: contribution,
                        ..hit
                    });
                }
            }
        }
    }

    for hit in &mut merged {
        hit.score /= divisor;
    }

    merged.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged.truncate(limit);
    merged
}
