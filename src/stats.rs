//! Store statistics overview.
//!
//! A quick summary of what's indexed: chunk counts, embedding coverage, and
//! a per-source breakdown. Used by `kb stats` to confirm ingestion worked.

use anyhow::Result;
use sqlx::Row;

use crate::config::Config;
use crate::store::VectorStore;

pub async fn run_stats(config: &Config) -> Result<()> {
    let store = VectorStore::open(config).await?;

    let total_chunks = store.chunk_count().await?;
    let total_embedded = store.vector_count().await?;

    let rows = sqlx::query(
        r#"
        SELECT source_type, COUNT(*) AS chunk_count, COUNT(DISTINCT source_name) AS source_count
        FROM chunks
        GROUP BY source_type
        ORDER BY source_type
        "#,
    )
    .fetch_all(store.pool())
    .await?;

    let db_size = std::fs::metadata(config.store_path())
        .map(|m| m.len())
        .unwrap_or(0);

    println!("kb-engine — Store Stats");
    println!("=======================");
    println!();
    println!("  Store:     {}", config.store_path().display());
    println!("  Size:      {}", format_bytes(db_size));
    println!();
    println!("  Chunks:    {}", total_chunks);
    println!(
        "  Embedded:  {} / {} ({}%)",
        total_embedded,
        total_chunks,
        if total_chunks > 0 {
            (total_embedded * 100) / total_chunks
        } else {
            0
        }
    );
    println!();

    if !rows.is_empty() {
        println!("  {:<12} {:>8} {:>8}", "SOURCE", "DOCS", "CHUNKS");
        for row in &rows {
            let source_type: String = row.get("source_type");
            let chunk_count: i64 = row.get("chunk_count");
            let source_count: i64 = row.get("source_count");
            println!("  {:<12} {:>8} {:>8}", source_type, source_count, chunk_count);
        }
    }

    store.close().await;
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
