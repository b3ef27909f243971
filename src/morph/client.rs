use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{MorphAnalyzer, PosCategory, Token};

const DEFAULT_API_BASE: &str = "http://localhost:8081";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum MorphError {
    #[error("tokenizer error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct TokenizeRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenizeResponse {
    #[serde(default)]
    tokens: Vec<RawToken>,
}

#[derive(Debug, Deserialize)]
struct RawToken {
    surface: String,
    base_form: String,
    part_of_speech: String,
}

impl From<RawToken> for Token {
    fn from(raw: RawToken) -> Self {
        Token {
            pos: PosCategory::from_tag(&raw.part_of_speech),
            surface: raw.surface,
            base_form: raw.base_form,
        }
    }
}

/// Client for a morphological analysis sidecar exposing `POST /tokenize`.
///
/// Base URL comes from `MORPH_API_BASE` (default `http://localhost:8081`).
#[derive(Clone, Debug)]
pub struct HttpMorphAnalyzer {
    http: Client,
    base_url: String,
}

impl HttpMorphAnalyzer {
    pub fn from_env(http: Client) -> Self {
        let base_url = env::var("MORPH_API_BASE")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self { http, base_url }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
        }
    }
}

impl MorphAnalyzer for HttpMorphAnalyzer {
    async fn tokenize(&self, text: &str) -> Result<Vec<Token>, MorphError> {
        let url = format!("{}/tokenize", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("User-Agent", crate::USER_AGENT)
            .json(&TokenizeRequest { text })
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "tokenizer error");
            return Err(MorphError::Api {
                code: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body: TokenizeResponse = response.json().await?;
        debug!(tokens = body.tokens.len(), "tokenized");
        Ok(body.tokens.into_iter().map(Token::from).collect())
    }
}
