use serde::Deserialize;

/// `action=query` response in `formatversion=2`.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub query: Option<QueryBody>,
    #[serde(rename = "continue")]
    pub continuation: Option<Continuation>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    #[serde(default)]
    pub pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PageEntry {
    pub title: String,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    pub extract: Option<String>,
    #[serde(default)]
    pub links: Vec<LinkEntry>,
}

impl PageEntry {
    pub fn exists(&self) -> bool {
        !self.missing && !self.invalid
    }
}

#[derive(Debug, Deserialize)]
pub struct LinkEntry {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct Continuation {
    pub plcontinue: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: String,
    #[serde(default)]
    pub info: String,
}
