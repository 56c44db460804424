//! Sitemap-style text loader (`llms.txt`).
//!
//! The file is a sequence of sections delimited by level-2/level-3 markdown
//! headings or horizontal rules. Each section becomes one [`Document`]: the
//! heading text is the source name, and an embedded link (a `URL:` line or
//! a bare `/path` line near the top) becomes the source url. Sections too
//! short to carry useful content are dropped.

use anyhow::Result;
use std::path::Path;

use crate::models::{Document, SourceType};

/// Sections shorter than this carry no useful content.
const MIN_SECTION_LEN: usize = 50;

/// How many lines from the top of a section to scan for a url.
const URL_SCAN_LINES: usize = 10;

/// Load a sitemap file. A missing file loads nothing (the source is
/// optional); an unreadable existing file is an error.
pub fn load_sitemap(path: &Path) -> Result<Vec<Document>> {
    if !path.is_file() {
        tracing::info!(path = %path.display(), "sitemap file not found; skipping");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)?;
    let docs = parse_sections(&content);
    tracing::info!(sections = docs.len(), "sitemap parsed");
    Ok(docs)
}

/// Split content into heading-delimited sections.
pub fn parse_sections(content: &str) -> Vec<Document> {
    let mut sections: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        if is_section_start(line) && !current.is_empty() {
            sections.push(std::mem::take(&mut current));
        }
        if is_rule(line) {
            // Rules delimit but never belong to a section.
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        sections.push(current);
    }

    sections
        .into_iter()
        .filter_map(|lines| section_to_document(&lines))
        .collect()
}

fn is_section_start(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("## ") || t.starts_with("### ") || is_rule(line)
}

fn is_rule(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 3 && t.chars().all(|c| c == '-')
}

fn section_to_document(lines: &[&str]) -> Option<Document> {
    let text = lines.join("\n").trim().to_string();
    if text.len() < MIN_SECTION_LEN {
        return None;
    }

    let title = lines
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .map(|l| l.trim_start_matches('#').trim().to_string())
        .filter(|t| !t.is_empty())?;

    let url = lines
        .iter()
        .take(URL_SCAN_LINES)
        .map(|l| l.trim())
        .find_map(|l| {
            if let Some(rest) = l.strip_prefix("URL:").or_else(|| l.strip_prefix("url:")) {
                return Some(rest.trim().to_string());
            }
            let mut chars = l.chars();
            if chars.next() == Some('/') && chars.next().is_some_and(|c| c.is_ascii_lowercase()) {
                return Some(l.to_string());
            }
            None
        });

    Some(Document {
        text,
        source_type: SourceType::Sitemap,
        source_name: title,
        source_url: url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Mage Data Site Map

## Static Data Masking
/products/static-data-masking.html
Static Data Masking permanently replaces sensitive data with realistic but
fictional values, protecting non-production environments.

## Dynamic Data Masking
URL: /products/dynamic-data-masking.html
Dynamic Data Masking applies masking policies at query time so that stored
data never changes while unauthorized users see only masked values.

### Database Activity Monitoring
Continuous monitoring of database access patterns with alerting for
suspicious activity across all supported platforms.

---

## Tiny
/x
";

    #[test]
    fn splits_on_h2_and_h3_headings() {
        let docs = parse_sections(SAMPLE);
        let names: Vec<&str> = docs.iter().map(|d| d.source_name.as_str()).collect();
        assert!(names.contains(&"Static Data Masking"));
        assert!(names.contains(&"Dynamic Data Masking"));
        assert!(names.contains(&"Database Activity Monitoring"));
    }

    #[test]
    fn extracts_bare_path_and_url_prefix_links() {
        let docs = parse_sections(SAMPLE);
        let sdm = docs.iter().find(|d| d.source_name == "Static Data Masking").unwrap();
        assert_eq!(
            sdm.source_url.as_deref(),
            Some("/products/static-data-masking.html")
        );
        let ddm = docs.iter().find(|d| d.source_name == "Dynamic Data Masking").unwrap();
        assert_eq!(
            ddm.source_url.as_deref(),
            Some("/products/dynamic-data-masking.html")
        );
    }

    #[test]
    fn short_sections_are_dropped() {
        let docs = parse_sections(SAMPLE);
        assert!(!docs.iter().any(|d| d.source_name == "Tiny"));
    }

    #[test]
    fn section_without_url_has_none() {
        let docs = parse_sections(SAMPLE);
        let dam = docs
            .iter()
            .find(|d| d.source_name == "Database Activity Monitoring")
            .unwrap();
        assert!(dam.source_url.is_none());
    }

    #[test]
    fn heading_text_is_stripped_of_markers() {
        let docs = parse_sections(SAMPLE);
        assert!(docs.iter().all(|d| !d.source_name.starts_with('#')));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let docs = load_sitemap(Path::new("/nonexistent/llms.txt")).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn all_docs_are_sitemap_type() {
        let docs = parse_sections(SAMPLE);
        assert!(docs.iter().all(|d| d.source_type == SourceType::Sitemap));
    }
}
