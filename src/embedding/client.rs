use std::env;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ApiErrorBody, EmbeddingRequest, EmbeddingResponse};
use super::{Embedder, Embedding};

const DEFAULT_API_BASE: &str = "http://localhost:8080/v1";
const DEFAULT_MODEL: &str = "paraphrase-multilingual-MiniLM-L12-v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Inputs per request; larger batches are split.
const MAX_BATCH: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding service rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("embedding API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("malformed embedding response: {0}")]
    Malformed(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Client for an OpenAI-compatible `/embeddings` endpoint.
///
/// Configuration via environment variables:
/// - `EMBEDDING_API_BASE` (default `http://localhost:8080/v1`)
/// - `EMBEDDING_MODEL` (default `paraphrase-multilingual-MiniLM-L12-v2`)
/// - `EMBEDDING_API_KEY` (optional bearer token)
#[derive(Clone, Debug)]
pub struct HttpEmbedder {
    http: Client,
    api_key: Option<ApiKey>,
    model: String,
    base_url: String,
}

impl HttpEmbedder {
    pub fn from_env(http: Client) -> Self {
        let base_url = non_empty_var("EMBEDDING_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let model = non_empty_var("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_key = non_empty_var("EMBEDDING_API_KEY").map(ApiKey);
        debug!(base = %base_url, model = %model, "embedding client configured");
        Self {
            http,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let mut builder = self
            .http
            .post(&url)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(REQUEST_TIMEOUT);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(&key.0);
        }
        let response = builder.send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("embedding service rate limited");
            return Err(EmbeddingError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| text.chars().take(200).collect());
            warn!(status = %status, "embedding API error");
            return Err(EmbeddingError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: EmbeddingResponse = response.json().await?;
        into_ordered_vectors(body, texts.len())
    }

    async fn embed_chunk_with_retry(
        &self,
        texts: &[String],
    ) -> Result<Vec<Embedding>, EmbeddingError> {
        let mut last_err = None;
        for attempt in 0..MAX_RETRIES {
            match self.embed_chunk(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) if is_retriable(&e) => {
                    last_err = Some(e);
                    if attempt + 1 < MAX_RETRIES {
                        let delay_ms = jittered_backoff(attempt);
                        debug!(
                            attempt = attempt + 1,
                            delay_ms, "retrying embedding request after transient error"
                        );
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or(EmbeddingError::RateLimited))
    }
}

impl Embedder for HttpEmbedder {
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(MAX_BATCH) {
            vectors.extend(self.embed_chunk_with_retry(chunk).await?);
        }
        debug!(inputs = texts.len(), model = %self.model, "batch embedded");
        Ok(vectors)
    }
}

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 500;

fn is_retriable(e: &EmbeddingError) -> bool {
    matches!(
        e,
        EmbeddingError::RateLimited
            | EmbeddingError::Api {
                code: 500..=599,
                ..
            }
    )
}

/// Equal jitter backoff: base/2 + rand(0, base/2).
fn jittered_backoff(attempt: u32) -> u64 {
    let base = INITIAL_BACKOFF_MS * 2u64.pow(attempt);
    let half = base / 2;
    half + fastrand::u64(..half.max(1))
}

/// Services may answer out of order; `index` is authoritative.
fn into_ordered_vectors(
    body: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Embedding>, EmbeddingError> {
    if body.data.len() != expected {
        return Err(EmbeddingError::Malformed(format!(
            "expected {expected} vectors, got {}",
            body.data.len()
        )));
    }
    let mut slots: Vec<Option<Embedding>> = vec![None; expected];
    for item in body.data {
        let slot = slots.get_mut(item.index).ok_or_else(|| {
            EmbeddingError::Malformed(format!("index {} out of range", item.index))
        })?;
        *slot = Some(item.embedding);
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(i, v)| v.ok_or_else(|| EmbeddingError::Malformed(format!("missing index {i}"))))
        .collect()
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
