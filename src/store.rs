//! Persistent vector index over SQLite.
//!
//! Owns the durable artifact of the engine: chunk rows plus their embedding
//! vectors, keyed by deterministic chunk id so re-ingestion overwrites
//! instead of duplicating. Reads only at serve time; writes happen in the
//! offline ingestion batch.
//!
//! Query-time embedding failure is non-fatal: the semantic side degrades to
//! zero hits and the lexical index still answers.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::config::{Config, EmbeddingConfig};
use crate::db;
use crate::embedding::{self, RetryPolicy};
use crate::migrate;
use crate::models::{Chunk, RetrievalHit, RetrieverOrigin, SourceType};

pub struct VectorStore {
    pool: SqlitePool,
    embedding: EmbeddingConfig,
}

impl VectorStore {
    /// Open the store for the configured collection, creating the schema if
    /// it does not exist yet.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(&config.store_path()).await?;
        migrate::ensure_schema(&pool).await?;
        Ok(Self {
            pool,
            embedding: config.embedding.clone(),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Drop all entries; used for a from-scratch rebuild.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM chunk_vectors")
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM chunks").execute(&self.pool).await?;
        Ok(())
    }

    /// Upsert chunk rows. Conflicting ids are overwritten in place, which
    /// preserves the original insertion order used for tie-breaking.
    pub async fn insert_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for chunk in chunks {
            sqlx::query(
                r#"
                INSERT INTO chunks (id, seq_index, text, source_type, source_name, source_url, ingested_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    seq_index = excluded.seq_index,
                    text = excluded.text,
                    source_type = excluded.source_type,
                    source_name = excluded.source_name,
                    source_url = excluded.source_url,
                    ingested_at = excluded.ingested_at
                "#,
            )
            .bind(&chunk.id)
            .bind(chunk.seq_index)
            .bind(&chunk.text)
            .bind(chunk.source_type.as_str())
            .bind(&chunk.source_name)
            .bind(&chunk.source_url)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Embed one batch of chunks and store the vectors. The batch is written
    /// in a single transaction, so a retried batch is safe to re-submit in
    /// full and earlier batches are never lost to a later failure.
    pub async fn embed_batch(&self, chunks: &[Chunk], policy: &RetryPolicy) -> Result<u64> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let provider = embedding::create_provider(&self.embedding)?;
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embedding::embed_texts(&self.embedding, policy, &texts).await?;

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for (chunk, vec) in chunks.iter().zip(vectors.iter()) {
            let blob = embedding::vec_to_blob(vec);
            sqlx::query(
                r#"
                INSERT INTO chunk_vectors (chunk_id, model, dims, embedding, created_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(chunk_id) DO UPDATE SET
                    model = excluded.model,
                    dims = excluded.dims,
                    embedding = excluded.embedding,
                    created_at = excluded.created_at
                "#,
            )
            .bind(&chunk.id)
            .bind(provider.model_name())
            .bind(provider.dims() as i64)
            .bind(&blob)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(chunks.len() as u64)
    }

    /// Nearest-neighbor query by cosine similarity, scores mapped to [0, 1].
    ///
    /// Embedding unavailability degrades to zero hits rather than an error;
    /// the lexical path can still answer.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievalHit>> {
        if !self.embedding.is_enabled() {
            tracing::debug!("embedding disabled; semantic search returns no hits");
            return Ok(Vec::new());
        }

        let query_vec = match embedding::embed_query(&self.embedding, &RetryPolicy::serve(), text)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "query embedding failed; degrading to lexical-only");
                return Ok(Vec::new());
            }
        };

        // Corpus is small: scan every stored vector and rank in process.
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.seq_index, c.text, c.source_type, c.source_name, c.source_url, cv.embedding
            FROM chunk_vectors cv
            JOIN chunks c ON c.id = cv.chunk_id
            ORDER BY c.rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut candidates: Vec<(Chunk, Vec<f32>)> = Vec::with_capacity(rows.len());
        for row in &rows {
            let blob: Vec<u8> = row.try_get("embedding")?;
            candidates.push((chunk_from_row(row)?, embedding::blob_to_vec(&blob)));
        }

        Ok(rank_by_similarity(&query_vec, candidates, k))
    }

    /// All chunk rows in original ingestion order; used to build the lexical
    /// index at startup.
    pub async fn all_chunks(&self) -> Result<Vec<Chunk>> {
        let rows = sqlx::query(
            "SELECT id, seq_index, text, source_type, source_name, source_url FROM chunks ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(chunk_from_row).collect()
    }

    pub async fn chunk_count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn vector_count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM chunk_vectors")
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn chunk_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Chunk> {
    let source_type: String = row.try_get("source_type")?;
    let source_type = SourceType::parse(&source_type)
        .ok_or_else(|| anyhow::anyhow!("unknown source_type in store: {}", source_type))?;
    Ok(Chunk {
        id: row.try_get("id")?,
        seq_index: row.try_get("seq_index")?,
        text: row.try_get("text")?,
        source_type,
        source_name: row.try_get("source_name")?,
        source_url: row.try_get("source_url")?,
    })
}

/// Rank candidates against a query vector. Stable on ties, so equal scores
/// keep ingestion order.
pub fn rank_by_similarity(
    query_vec: &[f32],
    candidates: Vec<(Chunk, Vec<f32>)>,
    k: usize,
) -> Vec<RetrievalHit> {
    let mut hits: Vec<RetrievalHit> = candidates
        .into_iter()
        .map(|(chunk, vec)| {
            let score = embedding::similarity_to_unit(embedding::cosine_similarity(query_vec, &vec));
            RetrievalHit {
                chunk_id: chunk.id,
                text: chunk.text,
                source_name: chunk.source_name,
                source_url: chunk.source_url,
                score,
                origin: RetrieverOrigin::Semantic,
            }
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(k);
    hits
}
