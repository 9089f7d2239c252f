//! Semantic Ranker — orders candidates by vector similarity to a query or CV.
//!
//! The query text is embedded exactly once per invocation; per-candidate work
//! is pure in-process arithmetic against the precomputed posting vectors.

use std::cmp::Ordering;

use tracing::warn;

use crate::embedder::{Embedder, EmbeddingUnavailable};
use crate::matching::{JobMatch, MatchedVia};
use crate::models::job::JobRow;

/// Embeds `query_text` once and returns the `top_k` most similar candidates,
/// highest score first. Candidates without a stored vector are excluded;
/// they can still surface through the lexical path.
pub async fn rank(
    query_text: &str,
    candidates: &[JobRow],
    top_k: usize,
    embedder: &dyn Embedder,
) -> Result<Vec<JobMatch>, EmbeddingUnavailable> {
    let query_vec = embedder.embed(query_text).await?;
    Ok(rank_by_vector(&query_vec, candidates, top_k))
}

/// Embeds CV plain text for profile-based matching. Text extraction from the
/// uploaded document happens upstream; this only ever sees plain text.
pub async fn embed_cv(
    cv_text: &str,
    embedder: &dyn Embedder,
) -> Result<Vec<f32>, EmbeddingUnavailable> {
    embedder.embed(cv_text.trim()).await
}

/// Scores candidates against an already-computed query vector.
/// The sort is stable: equal scores keep their catalog order.
pub fn rank_by_vector(query_vec: &[f32], candidates: &[JobRow], top_k: usize) -> Vec<JobMatch> {
    let mut scored: Vec<JobMatch> = candidates
        .iter()
        .filter_map(|job| {
            let embedding = job.embedding.as_ref()?;
            if embedding.len() != query_vec.len() {
                warn!(
                    job_id = job.id,
                    "stored embedding length differs from query vector, skipping"
                );
                return None;
            }
            Some(JobMatch {
                score: cosine_similarity(query_vec, embedding),
                matched_via: MatchedVia::Semantic,
                job: job.clone(),
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(top_k);
    scored
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
