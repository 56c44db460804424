//! Grounded prompt assembly.
//!
//! Formats retrieved chunks with source labels and recent conversation
//! turns into a single prompt under a fixed system policy, and collects
//! the deduplicated citation links for the caller to attach to the answer.
//! The LLM call itself belongs to the caller.

use std::collections::HashSet;

use crate::models::{Citation, RetrievalHit, Turn};

/// Conversation turns included in the prompt (3 user/assistant pairs).
pub const HISTORY_WINDOW: usize = 6;

/// Maximum citation links attached to one answer.
pub const MAX_CITATIONS: usize = 5;

/// Fixed answering policy for the assistant.
pub const SYSTEM_POLICY: &str = "\
You are Mage Data's virtual assistant on magedata.ai. RULES:

1. ONLY answer from the provided context. Never invent features or pricing.
2. For pricing: \"Contact us for custom enterprise pricing\" and link to /contact.html.
3. Keep answers concise (2-3 paragraphs max). Link to relevant product pages.
4. Be professional, friendly, and helpful. Use the brand name \"Mage Data\" (not \"we\").

HANDLING OFF-TOPIC QUESTIONS:
- If the user asks anything NOT related to data security, data masking, data privacy, \
cybersecurity, compliance, or Mage Data's products and services, do NOT answer the \
question. Politely redirect them back to Mage Data's data security solutions.
- NEVER answer off-topic questions, even partially.

HANDLING IN-SCOPE BUT UNDOCUMENTED QUESTIONS:
- If the question is about data security or Mage Data's domain but the answer is NOT \
in the provided context, say so and refer the user to info@magedata.ai or the \
[Contact page](/contact.html). Do not guess.

If the user greets you or makes small talk, respond warmly and briefly, then guide \
them to ask about Mage Data's products and capabilities.";

/// The assembled prompt plus the citation links extracted from its context.
#[derive(Debug, Clone)]
pub struct GroundedPrompt {
    pub prompt: String,
    pub citations: Vec<Citation>,
}

/// Build the grounded prompt from the merged hit list and the most recent
/// conversation turns (oldest-first). Chunk text is included verbatim; no
/// further truncation happens at this stage.
pub fn assemble(question: &str, hits: &[RetrievalHit], history: &[Turn]) -> GroundedPrompt {
    let mut prompt = String::with_capacity(4096);
    prompt.push_str(SYSTEM_POLICY);
    prompt.push_str("\n\nContext from the Mage Data knowledge base:\n---\n");

    if hits.is_empty() {
        prompt.push_str("(no knowledge base passages matched this question)\n");
    } else {
        for (i, hit) in hits.iter().enumerate() {
            if i > 0 {
                prompt.push('\n');
            }
            prompt.push_str(&format!("[Source: {}]\n{}\n", hit.source_name, hit.text));
        }
    }
    prompt.push_str("---\n");

    let recent = if history.len() > HISTORY_WINDOW {
        &history[history.len() - HISTORY_WINDOW..]
    } else {
        history
    };
    if !recent.is_empty() {
        prompt.push_str("\nConversation so far:\n");
        for turn in recent {
            prompt.push_str(&format!("{}: {}\n", turn.role.as_str(), turn.text));
        }
    }

    prompt.push_str(&format!("\nUser question: {}", question));

    GroundedPrompt {
        prompt,
        citations: extract_citations(hits),
    }
}

/// Deduplicated `{title, url}` pairs from the included chunks, in hit order.
/// The url is the dedup key; chunks without one fall back to the title.
fn extract_citations(hits: &[RetrievalHit]) -> Vec<Citation> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut citations = Vec::new();

    for hit in hits {
        let url = hit.source_url.clone().unwrap_or_default();
        let key = if url.is_empty() {
            hit.source_name.clone()
        } else {
            url.clone()
        };
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        citations.push(Citation {
            title: if hit.source_name.is_empty() {
                "Related Page".to_string()
            } else {
                hit.source_name.clone()
            },
            url: if url.is_empty() { "#".to_string() } else { url },
        });
        if citations.len() == MAX_CITATIONS {
            break;
        }
    }

    citations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, RetrieverOrigin};

    fn hit(name: &str, url: Option<&str>) -> RetrievalHit {
        RetrievalHit {
            chunk_id: format!("id-{}", name),
            text: format!("Text about {}.", name),
            source_name: name.to_string(),
            source_url: url.map(|u| u.to_string()),
            score: 0.9,
            origin: RetrieverOrigin::Semantic,
        }
    }

    #[test]
    fn prompt_contains_policy_sources_and_question() {
        let hits = vec![hit("Static Data Masking", Some("/products/sdm.html"))];
        let out = assemble("What is static masking?", &hits, &[]);
        assert!(out.prompt.starts_with(SYSTEM_POLICY));
        assert!(out.prompt.contains("[Source: Static Data Masking]"));
        assert!(out.prompt.contains("Text about Static Data Masking."));
        assert!(out.prompt.ends_with("User question: What is static masking?"));
    }

    #[test]
    fn history_is_capped_to_window_oldest_dropped() {
        let history: Vec<Turn> = (0..8)
            .map(|i| Turn {
                role: if i % 2 == 0 { Role::User } else { Role::Assistant },
                text: format!("turn {}", i),
            })
            .collect();
        let out = assemble("q", &[hit("A", None)], &history);
        assert!(!out.prompt.contains("turn 0"));
        assert!(!out.prompt.contains("turn 1"));
        assert!(out.prompt.contains("User: turn 2"));
        assert!(out.prompt.contains("Assistant: turn 7"));
    }

    #[test]
    fn citations_dedup_by_url() {
        let hits = vec![
            hit("Static Data Masking", Some("/products/sdm.html")),
            hit("Static Data Masking p2", Some("/products/sdm.html")),
            hit("Compliance", Some("/solutions/compliance.html")),
        ];
        let out = assemble("q", &hits, &[]);
        assert_eq!(out.citations.len(), 2);
        assert_eq!(out.citations[0].url, "/products/sdm.html");
        assert_eq!(out.citations[0].title, "Static Data Masking");
        assert_eq!(out.citations[1].url, "/solutions/compliance.html");
    }

    #[test]
    fn citations_capped_at_five() {
        let hits: Vec<RetrievalHit> = (0..8)
            .map(|i| hit(&format!("S{}", i), Some(&format!("/p/{}.html", i))))
            .collect();
        let out = assemble("q", &hits, &[]);
        assert_eq!(out.citations.len(), MAX_CITATIONS);
    }

    #[test]
    fn missing_url_falls_back_to_placeholder() {
        let out = assemble("q", &[hit("Orphan Source", None)], &[]);
        assert_eq!(out.citations.len(), 1);
        assert_eq!(out.citations[0].url, "#");
        assert_eq!(out.citations[0].title, "Orphan Source");
    }

    #[test]
    fn empty_hits_still_produce_a_grounded_prompt() {
        let out = assemble("anything indexed?", &[], &[]);
        assert!(out.prompt.contains("no knowledge base passages matched"));
        assert!(out.citations.is_empty());
    }
}
