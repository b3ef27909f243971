use std::collections::HashSet;

use tracing::{info, warn};

use crate::arxiv::{DateRange, DocumentFeed, FeedError};
use crate::config::PipelineConfig;
use crate::embedding::{Embedder, EmbeddingError};
use crate::morph::MorphAnalyzer;
use crate::search::document::{collect_authors, filter_by_authors};
use crate::search::expand::expand_query;
use crate::search::keywords::extract_keywords;
use crate::search::ranking::{RankedDocuments, rank_documents};
use crate::search::related::{ScoredTerm, discover_related, rank_related};
use crate::search::Lang;
use crate::wiki::{KnowledgeLookup, WikiError};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("{0}")]
    Wiki(#[from] WikiError),

    #[error("{0}")]
    Embedding(#[from] EmbeddingError),

    #[error("{0}")]
    Feed(#[from] FeedError),
}

/// What the front end supplies for one search.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// English arXiv topic keyword.
    pub topic: String,
    /// Natural-language query, typically Japanese.
    pub query: String,
    pub range: DateRange,
    /// Split the query into keywords with the morphological analyzer.
    pub use_morph: bool,
    pub lang: Lang,
    /// Related terms the user checked, in selection order.
    pub selected_terms: Vec<String>,
    /// Keep only documents by at least one of these authors.
    pub authors: Vec<String>,
    /// 1-indexed result page.
    pub page: usize,
}

/// Keywords and ranked related-term candidates for a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelatedTerms {
    pub keywords: Vec<String>,
    pub candidates: Vec<ScoredTerm>,
}

#[derive(Debug)]
pub struct SearchReport {
    /// Keyword list as shown to the user: extracted keywords then the query.
    pub display_keywords: Vec<String>,
    pub related: Vec<ScoredTerm>,
    pub expanded_query: String,
    /// Documents returned by the feed inside the date range.
    pub fetched: usize,
    /// Every author among the fetched documents, for filtering.
    pub authors: Vec<String>,
    pub results: RankedDocuments,
    pub page: usize,
}

/// The query-expansion and ranking pipeline over injected service handles.
pub struct Pipeline<M, E, K, F> {
    morph: M,
    embedder: E,
    wiki: K,
    feed: F,
    config: PipelineConfig,
}

impl<M, E, K, F> Pipeline<M, E, K, F>
where
    M: MorphAnalyzer,
    E: Embedder,
    K: KnowledgeLookup,
    F: DocumentFeed,
{
    pub fn new(morph: M, embedder: E, wiki: K, feed: F, config: PipelineConfig) -> Self {
        Self {
            morph,
            embedder,
            wiki,
            feed,
            config,
        }
    }

    /// Keywords of `query`; a tokenizer failure degrades to no keywords.
    pub async fn keywords(&self, query: &str) -> Vec<String> {
        match self.morph.tokenize(query).await {
            Ok(tokens) => extract_keywords(&tokens, query),
            Err(e) => {
                warn!(error = %e, "tokenizer unavailable, using the raw query only");
                Vec::new()
            }
        }
    }

    /// Keyword extraction, related-term discovery and ranking. `None` for an empty query.
    pub async fn related(
        &self,
        query: &str,
        use_morph: bool,
        lang: Lang,
    ) -> Result<Option<RelatedTerms>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            info!("empty query, nothing to do");
            return Ok(None);
        }

        let keywords = if use_morph {
            self.keywords(query).await
        } else {
            Vec::new()
        };
        info!(keywords = keywords.len(), "keywords extracted");

        let candidates = discover_related(&self.wiki, query, &keywords, lang).await?;
        let candidates = rank_related(
            &self.embedder,
            query,
            &candidates,
            self.config.related_term_cutoff,
        )
        .await?;
        info!(candidates = candidates.len(), "related terms ranked");

        Ok(Some(RelatedTerms {
            keywords,
            candidates,
        }))
    }

    /// Runs the full pipeline. `None` when the topic or query is empty.
    pub async fn search(&self, request: &SearchRequest) -> Result<Option<SearchReport>, SearchError> {
        let topic = request.topic.trim();
        let query = request.query.trim();
        if topic.is_empty() || query.is_empty() {
            info!("empty topic or query, nothing to do");
            return Ok(None);
        }

        let Some(RelatedTerms {
            keywords,
            candidates,
        }) = self.related(query, request.use_morph, request.lang).await?
        else {
            return Ok(None);
        };

        let selected = offered_selection(&request.selected_terms, &candidates);
        let expanded_query = expand_query(&keywords, query, &selected);
        info!(expanded = %expanded_query, "query expanded");

        let documents = self
            .feed
            .fetch(topic, request.range, self.config.max_results)
            .await?;
        let fetched = documents.len();
        if documents.is_empty() {
            info!(topic, "no documents in the requested range");
        }

        let authors = collect_authors(&documents);
        let documents = filter_by_authors(documents, &request.authors);
        let results = rank_documents(
            &self.embedder,
            &expanded_query,
            documents,
            self.config.sort,
            self.config.similarity_threshold,
        )
        .await?;
        info!(fetched, ranked = results.len(), "search complete");

        let mut display_keywords = keywords;
        display_keywords.push(query.to_string());

        Ok(Some(SearchReport {
            display_keywords,
            related: candidates,
            expanded_query,
            fetched,
            authors,
            results,
            page: request.page,
        }))
    }
}

/// Selected terms that were actually offered, in selection order, each once.
fn offered_selection(selected: &[String], offered: &[ScoredTerm]) -> Vec<String> {
    let mut seen = HashSet::new();
    selected
        .iter()
        .filter(|term| seen.insert(term.as_str()))
        .filter(|term| {
            let known = offered.iter().any(|c| &c.term == *term);
            if !known {
                warn!(term = %term, "ignoring selected term that was not offered");
            }
            known
        })
        .cloned()
        .collect()
}
