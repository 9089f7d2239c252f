use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::state::AppState;

/// Full posting detail, including the description the list endpoints omit.
#[derive(Debug, Serialize)]
pub struct JobDetail {
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
}

impl From<JobRow> for JobDetail {
    fn from(job: JobRow) -> Self {
        Self {
            id: job.id,
            firm_id: job.firm_id,
            job_title: job.job_title,
            seniority: job.seniority,
            service: job.service,
            industry: job.industry,
            location: job.location,
            employment: job.employment,
            salary: job.salary,
            description: job.description,
            link: job.link,
            date_published: job.date_published,
        }
    }
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<JobDetail>, AppError> {
    let job = state
        .catalog
        .job_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(job.into()))
}
