use serde::Deserialize;

/// Subset of the arXiv Atom feed this crate reads. Unknown elements are ignored.
#[derive(Debug, Deserialize)]
pub struct AtomFeed {
    #[serde(rename = "entry", default)]
    pub entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AtomEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    /// Absent on error entries.
    #[serde(default)]
    pub published: String,
    #[serde(rename = "author", default)]
    pub authors: Vec<AtomAuthor>,
    #[serde(rename = "link", default)]
    pub links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
pub struct AtomAuthor {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AtomLink {
    #[serde(rename = "@href")]
    pub href: String,
    #[serde(rename = "@rel")]
    pub rel: Option<String>,
}

/// Id prefix of the entry the API returns in place of results on a bad request.
const ERROR_ID_PREFIX: &str = "http://arxiv.org/api/errors";

impl AtomFeed {
    /// Message of the API's error entry, if the feed is an error report.
    pub fn error_message(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id.trim().starts_with(ERROR_ID_PREFIX))
            .map(|e| e.summary.trim())
    }
}

impl AtomEntry {
    /// The `rel="alternate"` link, falling back to the entry id.
    pub fn alternate_link(&self) -> &str {
        self.links
            .iter()
            .find(|l| l.rel.as_deref() == Some("alternate"))
            .map(|l| l.href.as_str())
            .unwrap_or(&self.id)
    }
}
