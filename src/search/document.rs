use std::collections::BTreeSet;

use chrono::NaiveDate;

/// A paper returned by the document feed. `link` identifies it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    pub link: String,
    pub published: NaiveDate,
}

impl Document {
    /// Text embedded for relevance scoring.
    pub fn embedding_text(&self) -> String {
        format!("{}. {}", self.title, self.summary)
    }
}

/// A document annotated with its similarity to the expanded query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// Sorted, de-duplicated author names across `documents`.
pub fn collect_authors(documents: &[Document]) -> Vec<String> {
    documents
        .iter()
        .flat_map(|d| d.authors.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Keeps documents with at least one of `authors`; an empty selection keeps everything.
pub fn filter_by_authors(documents: Vec<Document>, authors: &[String]) -> Vec<Document> {
    if authors.is_empty() {
        return documents;
    }
    documents
        .into_iter()
        .filter(|d| d.authors.iter().any(|a| authors.contains(a)))
        .collect()
}

#[cfg(test)]
pub(crate) fn sample(title: &str, authors: &[&str], published: &str) -> Document {
    Document {
        title: title.to_string(),
        summary: format!("About {title}."),
        authors: authors.iter().map(|a| a.to_string()).collect(),
        link: format!("http://arxiv.org/abs/{}", title.to_lowercase().replace(' ', "-")),
        published: NaiveDate::parse_from_str(published, "%Y-%m-%d").unwrap(),
    }
}
