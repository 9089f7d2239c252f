use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::{JobMatch, MatchOptions, MatchedVia, SearchRequest, DEFAULT_TOP_K};
use crate::state::AppState;

/// Hard cap on the result page size, whatever the caller asks for.
const MAX_RESULTS: usize = 25;

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub telegram_id: i64,
    pub query: String,
    pub limit: Option<usize>,
    #[serde(default)]
    pub semantic: bool,
}

#[derive(Debug, Deserialize)]
pub struct CvSearchBody {
    pub telegram_id: i64,
    pub cv_text: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub matches: Vec<MatchSummary>,
}

/// Wire shape for one match, flattened for the bot layer. Embeddings and
/// full descriptions stay out of list responses.
#[derive(Debug, Serialize)]
pub struct MatchSummary {
    pub id: i64,
    pub job_title: String,
    pub seniority: Option<String>,
    pub service: Option<String>,
    pub location: Option<String>,
    pub employment: Option<String>,
    pub salary: Option<String>,
    pub link: Option<String>,
    pub date_published: Option<DateTime<Utc>>,
    pub score: f32,
    pub matched_via: MatchedVia,
}

impl From<JobMatch> for MatchSummary {
    fn from(m: JobMatch) -> Self {
        Self {
            id: m.job.id,
            job_title: m.job.job_title,
            seniority: m.job.seniority,
            service: m.job.service,
            location: m.job.location,
            employment: m.job.employment,
            salary: m.job.salary,
            link: m.job.link,
            date_published: m.job.date_published,
            score: m.score,
            matched_via: m.matched_via,
        }
    }
}

fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_TOP_K).clamp(1, MAX_RESULTS)
}

/// POST /api/v1/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = body.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query must not be empty".to_string()));
    }

    let request = SearchRequest {
        telegram_id: body.telegram_id,
        raw_query: query,
    };
    let options = MatchOptions {
        top_k: clamp_limit(body.limit),
        semantic: body.semantic,
    };

    let matches = state
        .engine
        .match_jobs(&state.catalog, request, options)
        .await?;

    Ok(Json(SearchResponse {
        matches: matches.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/v1/search/cv
pub async fn handle_cv_search(
    State(state): State<AppState>,
    Json(body): Json<CvSearchBody>,
) -> Result<Json<SearchResponse>, AppError> {
    let cv_text = body.cv_text.trim();
    if cv_text.is_empty() {
        return Err(AppError::Validation("cv_text must not be empty".to_string()));
    }

    tracing::debug!(telegram_id = body.telegram_id, "matching catalog against CV");
    let matches = state
        .engine
        .match_cv(&state.catalog, cv_text, clamp_limit(body.limit))
        .await?;

    Ok(Json(SearchResponse {
        matches: matches.into_iter().map(Into::into).collect(),
    }))
}
