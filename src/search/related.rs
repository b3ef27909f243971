use std::collections::HashSet;

use futures::future::try_join_all;
use tracing::debug;

use crate::embedding::{Embedder, EmbeddingError, ensure_count, similarities};
use crate::search::Lang;
use crate::wiki::{KnowledgeLookup, WikiError, WikiPage};

/// A candidate related term with its similarity to the base query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTerm {
    pub term: String,
    pub score: f32,
}

/// Gathers candidate related terms from knowledge-base pages.
///
/// The base query is looked up first; only when it does not resolve are the
/// keywords looked up, each as its own title. Returns links of every resolved
/// page followed by the words of their related-items sections, de-duplicated
/// with the first occurrence kept. No resolved page yields an empty list.
pub async fn discover_related(
    wiki: &impl KnowledgeLookup,
    query: &str,
    keywords: &[String],
    lang: Lang,
) -> Result<Vec<String>, WikiError> {
    let pages = resolve_pages(wiki, query, keywords, lang).await?;
    if pages.is_empty() {
        debug!(query, "no knowledge-base page resolved");
        return Ok(Vec::new());
    }

    let candidates = merge_candidates(&pages, lang.related_section_label());
    debug!(
        pages = pages.len(),
        candidates = candidates.len(),
        "related terms discovered"
    );
    Ok(candidates)
}

async fn resolve_pages(
    wiki: &impl KnowledgeLookup,
    query: &str,
    keywords: &[String],
    lang: Lang,
) -> Result<Vec<WikiPage>, WikiError> {
    let page = wiki.lookup(query, lang).await?;
    if page.exists {
        return Ok(vec![page]);
    }

    // try_join_all keeps keyword order.
    let lookups = keywords.iter().map(|k| wiki.lookup(k, lang));
    let pages = try_join_all(lookups).await?;
    Ok(pages.into_iter().filter(|p| p.exists).collect())
}

fn merge_candidates(pages: &[WikiPage], label: &str) -> Vec<String> {
    let links = pages.iter().flat_map(|p| p.links.iter().map(String::as_str));
    let section_words = pages
        .iter()
        .filter_map(|p| p.section_text(label))
        .flat_map(str::split_whitespace);

    let mut seen = HashSet::new();
    links
        .chain(section_words)
        .filter(|term| seen.insert(*term))
        .map(str::to_string)
        .collect()
}

/// Re-orders `candidates` by descending similarity to `query` and keeps the top `k`.
///
/// Ties keep candidate order. Empty candidates make no embedding calls.
pub async fn rank_related(
    embedder: &impl Embedder,
    query: &str,
    candidates: &[String],
    k: usize,
) -> Result<Vec<ScoredTerm>, EmbeddingError> {
    if candidates.is_empty() || k == 0 {
        return Ok(Vec::new());
    }

    let query_vec = embedder.encode(query).await?;
    let candidate_vecs = embedder.encode_batch(candidates).await?;
    ensure_count(&candidate_vecs, candidates.len())?;
    let scores = similarities(&query_vec, &candidate_vecs);

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    Ok(order
        .into_iter()
        .take(k)
        .map(|i| ScoredTerm {
            term: candidates[i].clone(),
            score: scores[i],
        })
        .collect())
}
