//! PDF directory loader.
//!
//! Produces one [`Document`] per readable PDF file. Corrupt, scanned, or
//! otherwise unreadable files are logged and skipped; a bad file never
//! aborts the batch. Title and product URL are derived from the filename.

use anyhow::Result;
use globset::GlobBuilder;
use std::path::Path;
use walkdir::WalkDir;

use crate::models::{Document, SourceType};

/// Scan a directory for PDFs. Returns the loaded documents and the count of
/// files that could not be read. A missing directory loads nothing.
pub fn load_pdfs(dir: &Path) -> Result<(Vec<Document>, usize)> {
    if !dir.is_dir() {
        tracing::info!(dir = %dir.display(), "PDF directory not found; skipping");
        return Ok((Vec::new(), 0));
    }

    let matcher = GlobBuilder::new("**/*.pdf")
        .case_insensitive(true)
        .build()?
        .compile_matcher();

    let mut paths: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.strip_prefix(dir)
                .map(|rel| matcher.is_match(rel))
                .unwrap_or(false)
        })
        .collect();

    // Deterministic ingestion order.
    paths.sort();

    let mut docs = Vec::new();
    let mut skipped = 0usize;

    for path in paths {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let text = match std::fs::read(&path)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| {
                pdf_extract::extract_text_from_mem(&bytes).map_err(anyhow::Error::from)
            }) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "failed to extract PDF; skipping");
                skipped += 1;
                continue;
            }
        };

        if text.trim().is_empty() {
            tracing::warn!(file = %path.display(), "PDF yielded no text (scanned?); skipping");
            skipped += 1;
            continue;
        }

        docs.push(Document {
            text,
            source_type: SourceType::Pdf,
            source_name: title_from_filename(&filename),
            source_url: Some(url_from_filename(&filename)),
        });
    }

    tracing::info!(loaded = docs.len(), skipped, "PDF directory scanned");
    Ok((docs, skipped))
}

/// `static_data-masking.pdf` -> `Static Data Masking`.
fn title_from_filename(filename: &str) -> String {
    let stem = strip_pdf_ext(filename).replace(['-', '_'], " ");
    stem.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `Static Data_Masking.pdf` -> `/products/static-data-masking.html`.
fn url_from_filename(filename: &str) -> String {
    let slug = strip_pdf_ext(filename)
        .to_lowercase()
        .replace([' ', '_'], "-");
    format!("/products/{}.html", slug)
}

fn strip_pdf_ext(filename: &str) -> &str {
    if filename.len() >= 4 && filename[filename.len() - 4..].eq_ignore_ascii_case(".pdf") {
        &filename[..filename.len() - 4]
    } else {
        filename
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_derivation() {
        assert_eq!(title_from_filename("static_data-masking.pdf"), "Static Data Masking");
        assert_eq!(title_from_filename("Database Security.PDF"), "Database Security");
    }

    #[test]
    fn url_derivation() {
        assert_eq!(
            url_from_filename("Static Data_Masking.pdf"),
            "/products/static-data-masking.html"
        );
    }

    #[test]
    fn missing_directory_loads_nothing() {
        let (docs, skipped) = load_pdfs(Path::new("/nonexistent/pdfs")).unwrap();
        assert!(docs.is_empty());
        assert_eq!(skipped, 0);
    }

    #[test]
    fn unreadable_pdf_is_skipped_not_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("broken.pdf"), b"not a pdf at all").unwrap();
        let (docs, skipped) = load_pdfs(tmp.path()).unwrap();
        assert!(docs.is_empty());
        assert_eq!(skipped, 1);
    }
}
