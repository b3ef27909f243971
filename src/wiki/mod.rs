//! Knowledge lookup against Wikipedia: page existence, outbound links, and a section tree.

mod sections;
mod types;

pub use sections::{Section, find_section, parse_sections};

use std::env;

use reqwest::Client;
use tracing::{debug, warn};

use crate::search::Lang;
use types::{PageEntry, QueryResponse};

const DEFAULT_API_BASE: &str = "https://{lang}.wikipedia.org/w/api.php";
/// Upper bound on `plcontinue` round trips per page.
const MAX_LINK_BATCHES: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    #[error("Wikipedia API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("Wikipedia API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Wikipedia API rejected the request ({code}): {info}")]
    Remote { code: String, info: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// A resolved (or missing) knowledge-base page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WikiPage {
    pub title: String,
    pub exists: bool,
    /// Outbound article links in the order the API returns them.
    pub links: Vec<String>,
    pub sections: Vec<Section>,
}

impl WikiPage {
    pub fn missing(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Text of the first section titled `label`, at any depth.
    pub fn section_text(&self, label: &str) -> Option<&str> {
        find_section(&self.sections, label).map(|s| s.text.as_str())
    }
}

/// Page lookup by title in a given language edition.
/// Implemented by `WikipediaClient` for production; mock implementations used in tests.
pub trait KnowledgeLookup {
    async fn lookup(&self, title: &str, lang: Lang) -> Result<WikiPage, WikiError>;
}

/// MediaWiki Action API client.
///
/// `WIKIPEDIA_API_BASE` overrides the endpoint; a `{lang}` placeholder is
/// replaced with the edition code.
#[derive(Clone, Debug)]
pub struct WikipediaClient {
    http: Client,
    endpoint: String,
}

impl WikipediaClient {
    pub fn from_env(http: Client) -> Self {
        let endpoint = env::var("WIKIPEDIA_API_BASE")
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

    fn api_url(&self, lang: Lang) -> String {
        self.endpoint.replace("{lang}", lang.code())
    }

    async fn query(&self, lang: Lang, params: &[(&str, &str)]) -> Result<QueryResponse, WikiError> {
        let response = self
            .http
            .get(self.api_url(lang))
            .header("User-Agent", crate::USER_AGENT)
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => {}
            429 => {
                warn!("Wikipedia API rate limited");
                return Err(WikiError::RateLimited);
            }
            code => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, "Wikipedia API error");
                return Err(WikiError::Api {
                    code,
                    message: body.chars().take(200).collect(),
                });
            }
        }

        let body: QueryResponse = response.json().await?;
        if let Some(err) = body.error {
            warn!(code = %err.code, "Wikipedia API error in 200 response");
            return Err(WikiError::Remote {
                code: err.code,
                info: err.info,
            });
        }
        Ok(body)
    }

    async fn fetch_extract(&self, title: &str, lang: Lang) -> Result<Option<PageEntry>, WikiError> {
        let body = self
            .query(
                lang,
                &[
                    ("prop", "extracts"),
                    ("explaintext", "1"),
                    ("exsectionformat", "wiki"),
                    ("redirects", "1"),
                    ("titles", title),
                ],
            )
            .await?;
        Ok(body
            .query
            .and_then(|q| q.pages.into_iter().next())
            .filter(PageEntry::exists))
    }

    async fn fetch_links(&self, title: &str, lang: Lang) -> Result<Vec<String>, WikiError> {
        let mut links = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_LINK_BATCHES {
            let mut params = vec![
                ("prop", "links"),
                ("plnamespace", "0"),
                ("pllimit", "max"),
                ("titles", title),
            ];
            if let Some(c) = cursor.as_deref() {
                params.push(("plcontinue", c));
            }
            let body = self.query(lang, &params).await?;

            let pages = body.query.map(|q| q.pages).unwrap_or_default();
            links.extend(
                pages
                    .into_iter()
                    .flat_map(|p| p.links)
                    .map(|l| l.title),
            );

            cursor = body.continuation.and_then(|c| c.plcontinue);
            if cursor.is_none() {
                return Ok(links);
            }
        }

        warn!(title, batches = MAX_LINK_BATCHES, "link listing truncated");
        Ok(links)
    }
}

impl KnowledgeLookup for WikipediaClient {
    async fn lookup(&self, title: &str, lang: Lang) -> Result<WikiPage, WikiError> {
        let Some(entry) = self.fetch_extract(title, lang).await? else {
            debug!(title, lang = lang.code(), "page not found");
            return Ok(WikiPage::missing(title));
        };

        // Links are listed for the resolved title so redirects are followed.
        let links = self.fetch_links(&entry.title, lang).await?;
        let sections = parse_sections(entry.extract.as_deref().unwrap_or_default());
        debug!(
            title = %entry.title,
            links = links.len(),
            sections = sections.len(),
            "page resolved"
        );

        Ok(WikiPage {
            title: entry.title,
            exists: true,
            links,
            sections,
        })
    }
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> WikipediaClient {
        WikipediaClient::with_endpoint(Client::new(), &format!("{}/w/api.php", server.uri()))
    }

    #[tokio::test]
    async fn lookup_collects_links_across_continuations() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "extracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {"pages": [{
                    "pageid": 1,
                    "title": "機械学習",
                    "extract": "概要。\n\n== 関連項目 ==\n深層学習\nデータマイニング"
                }]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "links"))
            .and(query_param_is_missing("plcontinue"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "continue": {"plcontinue": "1|0|統計学", "continue": "||"},
                "query": {"pages": [{
                    "title": "機械学習",
                    "links": [{"ns": 0, "title": "人工知能"}, {"ns": 0, "title": "パターン認識"}]
                }]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("plcontinue", "1|0|統計学"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {"pages": [{
                    "title": "機械学習",
                    "links": [{"ns": 0, "title": "統計学"}]
                }]}
            })))
            .mount(&server)
            .await;

        let page = client(&server).lookup("機械学習", Lang::Ja).await.unwrap();

        assert!(page.exists);
        assert_eq!(page.links, ["人工知能", "パターン認識", "統計学"]);
        assert_eq!(page.section_text("関連項目"), Some("深層学習\nデータマイニング"));
    }

    #[tokio::test]
    async fn lookup_missing_page_skips_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "extracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {"pages": [{"ns": 0, "title": "存在しない", "missing": true}]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("prop", "links"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let page = client(&server).lookup("存在しない", Lang::Ja).await.unwrap();
        assert!(!page.exists);
        assert!(page.links.is_empty());
    }

    #[tokio::test]
    async fn invalid_title_is_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {"pages": [{"title": "[", "invalid": true}]}
            })))
            .mount(&server)
            .await;

        let page = client(&server).lookup("[", Lang::En).await.unwrap();
        assert!(!page.exists);
    }

    #[tokio::test]
    async fn error_object_in_200_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {"code": "badvalue", "info": "Unrecognized value"}
            })))
            .mount(&server)
            .await;

        let err = client(&server).lookup("x", Lang::En).await.unwrap_err();
        assert!(matches!(err, WikiError::Remote { ref code, .. } if code == "badvalue"));
    }

    #[tokio::test]
    async fn http_429_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client(&server).lookup("x", Lang::En).await.unwrap_err();
        assert!(matches!(err, WikiError::RateLimited));
    }

    #[tokio::test]
    async fn http_500_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client(&server).lookup("x", Lang::En).await.unwrap_err();
        assert!(matches!(err, WikiError::Api { code: 502, .. }));
    }
}
