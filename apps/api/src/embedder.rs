//! Embedding client — the single point of entry for the external embedding
//! service. Ranking code depends on the [`Embedder`] trait, never on the
//! concrete client, so the backend can be swapped (or stubbed in tests).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
/// Embedding model for queries, CVs, and postings alike.
/// Intentionally hardcoded: stored vectors are only comparable to query
/// vectors produced by the same model.
pub const EMBEDDING_MODEL: &str = "text-embedding-ada-002";
/// Vector length produced by [`EMBEDDING_MODEL`].
pub const EMBEDDING_DIM: usize = 1536;
const MAX_RETRIES: u32 = 3;

/// The embedding service could not be reached or returned an unusable reply.
/// Callers degrade to lexical-only results instead of failing the search.
#[derive(Debug, Error)]
#[error("embedding service unavailable: {0}")]
pub struct EmbeddingUnavailable(pub String);

/// Turns text into a fixed-length vector via the external embedding service.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingUnavailable>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    /// Embeds one text. Retries on 429 and 5xx with exponential backoff;
    /// anything that still fails becomes `EmbeddingUnavailable`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingUnavailable> {
        let request_body = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input: text,
        };

        let mut last_error = String::new();

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(OPENAI_EMBEDDINGS_URL)
                .bearer_auth(&self.api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                last_error = format!(
                    "status {}: {}",
                    status,
                    response.text().await.unwrap_or_default()
                );
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EmbeddingUnavailable(format!("status {status}: {body}")));
            }

            let parsed: EmbeddingResponse = response
                .json()
                .await
                .map_err(|e| EmbeddingUnavailable(format!("unparseable response: {e}")))?;

            let vector = parsed
                .data
                .into_iter()
                .next()
                .map(|entry| entry.embedding)
                .ok_or_else(|| EmbeddingUnavailable("response carried no vectors".to_string()))?;
            if vector.len() != EMBEDDING_DIM {
                warn!(
                    got = vector.len(),
                    expected = EMBEDDING_DIM,
                    "embedding length differs from the deployed model's contract"
                );
            }
            return Ok(vector);
        }

        Err(EmbeddingUnavailable(last_error))
    }
}
