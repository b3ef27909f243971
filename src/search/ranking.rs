use std::cmp::Ordering;

use clap::ValueEnum;
use tracing::debug;

use crate::embedding::{Embedder, EmbeddingError, ensure_count, similarities};
use crate::search::document::{Document, ScoredDocument};

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Similarity to the expanded query.
    #[default]
    Score,
    /// Publication date.
    Published,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    fn compare(self, a: &ScoredDocument, b: &ScoredDocument) -> Ordering {
        let natural = match self.key {
            SortKey::Score => a.score.total_cmp(&b.score),
            SortKey::Published => a.document.published.cmp(&b.document.published),
        };
        match self.direction {
            SortDirection::Asc => natural,
            SortDirection::Desc => natural.reverse(),
        }
    }
}

/// Documents scored against a query, filtered and ordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedDocuments {
    documents: Vec<ScoredDocument>,
}

/// One window of a `RankedDocuments` list.
#[derive(Debug, PartialEq)]
pub struct Page<'a> {
    /// 1-indexed page number, 0 when there are no pages.
    pub number: usize,
    pub total_pages: usize,
    pub total_count: usize,
    /// 1-indexed rank of the first item.
    pub first_rank: usize,
    pub items: &'a [ScoredDocument],
}

impl RankedDocuments {
    #[cfg(test)]
    pub(crate) fn from_scored(documents: Vec<ScoredDocument>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[ScoredDocument] {
        &self.documents
    }

    pub fn total_pages(&self) -> usize {
        self.documents.len().div_ceil(PAGE_SIZE)
    }

    /// The requested page, clamped to the valid range.
    pub fn page(&self, number: usize) -> Page<'_> {
        let total_pages = self.total_pages();
        let total_count = self.documents.len();
        if total_pages == 0 {
            return Page {
                number: 0,
                total_pages,
                total_count,
                first_rank: 0,
                items: &[],
            };
        }

        let number = number.clamp(1, total_pages);
        let start = (number - 1) * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(total_count);
        Page {
            number,
            total_pages,
            total_count,
            first_rank: start + 1,
            items: &self.documents[start..end],
        }
    }
}

/// Scores `documents` against `query`, drops those below `threshold`, and sorts by `sort`.
///
/// Each document is embedded as `"{title}. {summary}"`. The sort is stable.
/// An empty input makes no embedding calls.
pub async fn rank_documents(
    embedder: &impl Embedder,
    query: &str,
    documents: Vec<Document>,
    sort: SortSpec,
    threshold: Option<f32>,
) -> Result<RankedDocuments, EmbeddingError> {
    if documents.is_empty() {
        return Ok(RankedDocuments::default());
    }

    let query_vec = embedder.encode(query).await?;
    let texts: Vec<String> = documents.iter().map(Document::embedding_text).collect();
    let doc_vecs = embedder.encode_batch(&texts).await?;
    ensure_count(&doc_vecs, texts.len())?;
    let scores = similarities(&query_vec, &doc_vecs);

    let total = documents.len();
    let mut scored: Vec<ScoredDocument> = documents
        .into_iter()
        .zip(scores)
        .map(|(document, score)| ScoredDocument { document, score })
        .filter(|d| threshold.is_none_or(|min| d.score >= min))
        .collect();
    scored.sort_by(|a, b| sort.compare(a, b));

    debug!(
        scored = total,
        kept = scored.len(),
        key = ?sort.key,
        direction = ?sort.direction,
        "documents ranked"
    );
    Ok(RankedDocuments { documents: scored })
}
