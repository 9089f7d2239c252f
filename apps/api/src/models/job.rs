use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One job posting as read from the catalog. The engine never mutates these;
/// the `embedding` column is populated out-of-band by the backfill job.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub firm_id: i64,
    pub job_title: String,
    pub seniority: Option<String>,
    pub service: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub employment: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub date_published: Option<DateTime<Utc>>,
    /// Precomputed vector for the semantic path, absent until backfilled.
    pub embedding: Option<Vec<f32>>,
}
