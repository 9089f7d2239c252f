//! Embedding backfill — computes and stores vectors for postings that lack
//! one, so the semantic path can see them. Runs out-of-band; the search path
//! never waits on it.

use sqlx::PgPool;
use tracing::{info, warn};

use super::CatalogError;
use crate::embedder::Embedder;
use crate::models::job::JobRow;

pub const DEFAULT_BATCH_SIZE: i64 = 50;

/// Builds the text sent to the embedding service for one posting.
/// Absent fields are skipped rather than rendered as empty labels.
pub fn prepare_job_text(job: &JobRow) -> String {
    let mut parts = vec![format!("Title: {}", job.job_title)];
    if let Some(location) = &job.location {
        parts.push(format!("Location: {location}"));
    }
    if let Some(seniority) = &job.seniority {
        parts.push(format!("Seniority: {seniority}"));
    }
    if let Some(service) = &job.service {
        parts.push(format!("Service: {service}"));
    }
    if let Some(industry) = &job.industry {
        parts.push(format!("Industry: {industry}"));
    }
    if let Some(employment) = &job.employment {
        parts.push(format!("Employment: {employment}"));
    }
    if let Some(salary) = &job.salary {
        parts.push(format!("Salary: {salary}"));
    }
    if let Some(description) = &job.description {
        parts.push(format!("Description: {description}"));
    }
    parts.join(" | ")
}

/// Embeds up to `batch_size` postings without a stored vector and upserts the
/// results. Returns the number of postings processed. An embedding-service
/// outage ends the run early after a warning; the next run picks up where
/// this one stopped.
pub async fn backfill_job_embeddings(
    pool: &PgPool,
    embedder: &dyn Embedder,
    batch_size: i64,
) -> Result<u64, CatalogError> {
    let jobs: Vec<JobRow> = sqlx::query_as(
        "SELECT j.id, j.firm_id, j.job_title, j.seniority, j.service, j.industry, \
         j.location, j.employment, j.salary, j.description, j.link, \
         j.date_published, e.embedding \
         FROM jobs j LEFT JOIN job_embeddings e ON e.job_id = j.id \
         WHERE e.job_id IS NULL \
         ORDER BY j.id \
         LIMIT $1",
    )
    .bind(batch_size)
    .fetch_all(pool)
    .await
    .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

    if jobs.is_empty() {
        return Ok(0);
    }
    info!(count = jobs.len(), "backfilling job embeddings");

    let mut processed = 0u64;
    for job in &jobs {
        let vector = match embedder.embed(&prepare_job_text(job)).await {
            Ok(vector) => vector,
            Err(err) => {
                warn!(job_id = job.id, error = %err, "stopping backfill run");
                break;
            }
        };

        sqlx::query(
            "INSERT INTO job_embeddings (job_id, embedding) VALUES ($1, $2) \
             ON CONFLICT (job_id) DO UPDATE \
             SET embedding = EXCLUDED.embedding, last_updated = now()",
        )
        .bind(job.id)
        .bind(&vector)
        .execute(pool)
        .await
        .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        processed += 1;
    }

    Ok(processed)
}
