//! Document feed backed by the arXiv Atom API.

mod types;

use std::env;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use tracing::{debug, warn};

use crate::search::Document;
use types::{AtomEntry, AtomFeed};

const DEFAULT_API_BASE: &str = "https://export.arxiv.org/api/query";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("arXiv API error: status {0}")]
    Status(u16),

    #[error("arXiv API rejected the query: {0}")]
    Remote(String),

    #[error("malformed arXiv feed: {0}")]
    Malformed(#[from] quick_xml::de::DeError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Inclusive publication-date window; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Source of candidate documents for a topic.
/// Implemented by `ArxivClient` for production; mock implementations used in tests.
pub trait DocumentFeed {
    async fn fetch(
        &self,
        topic: &str,
        range: DateRange,
        max_results: usize,
    ) -> Result<Vec<Document>, FeedError>;
}

/// Client for `export.arxiv.org/api/query`, newest submissions first.
///
/// `ARXIV_API_BASE` overrides the endpoint.
#[derive(Clone, Debug)]
pub struct ArxivClient {
    http: Client,
    endpoint: String,
}

impl ArxivClient {
    pub fn from_env(http: Client) -> Self {
        let endpoint = env::var("ARXIV_API_BASE")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self { http, endpoint }
    }

    #[cfg(test)]
    fn with_endpoint(http: Client, endpoint: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
        }
    }
}

impl DocumentFeed for ArxivClient {
    async fn fetch(
        &self,
        topic: &str,
        range: DateRange,
        max_results: usize,
    ) -> Result<Vec<Document>, FeedError> {
        let search_query = format!("all:{}", topic.trim());
        let max_results = max_results.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .header("User-Agent", crate::USER_AGENT)
            .query(&[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        let xml = response.text().await?;
        let parsed = quick_xml::de::from_str::<AtomFeed>(&xml);

        if let Ok(feed) = &parsed
            && let Some(message) = feed.error_message()
        {
            warn!(status = %status, message, "arXiv API reported an error");
            return Err(FeedError::Remote(message.to_string()));
        }
        if !status.is_success() {
            warn!(status = %status, "arXiv API error");
            return Err(FeedError::Status(status.as_u16()));
        }
        let feed = parsed?;
        let total = feed.entries.len();
        let documents: Vec<Document> = feed
            .entries
            .into_iter()
            .filter_map(into_document)
            .filter(|d| range.contains(d.published))
            .collect();

        debug!(topic, entries = total, kept = documents.len(), "arXiv feed parsed");
        Ok(documents)
    }
}

/// Entries whose published timestamp does not parse are dropped.
fn into_document(entry: AtomEntry) -> Option<Document> {
    let published = match parse_published(&entry.published) {
        Some(date) => date,
        None => {
            warn!(id = %entry.id, published = %entry.published, "dropping entry with unparseable date");
            return None;
        }
    };
    Some(Document {
        link: entry.alternate_link().to_string(),
        title: collapse_whitespace(&entry.title),
        summary: collapse_whitespace(&entry.summary),
        authors: entry
            .authors
            .into_iter()
            .map(|a| a.name.trim().to_string())
            .collect(),
        published,
    })
}

fn parse_published(raw: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(raw.trim(), PUBLISHED_FORMAT)
        .ok()
        .map(|dt| dt.date())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
