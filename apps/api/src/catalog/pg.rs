//! sqlx-backed catalog reader over the `jobs` and `job_embeddings` tables.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{CatalogError, CatalogField, CatalogReader, FieldConstraint};
use crate::models::job::JobRow;

const SELECT_JOBS: &str = "SELECT j.id, j.firm_id, j.job_title, j.seniority, j.service, \
     j.industry, j.location, j.employment, j.salary, j.description, j.link, \
     j.date_published, e.embedding \
     FROM jobs j LEFT JOIN job_embeddings e ON e.job_id = j.id";

#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Single-posting lookup for the job detail endpoint.
    pub async fn job_by_id(&self, id: i64) -> Result<Option<JobRow>, CatalogError> {
        let sql = format!("{SELECT_JOBS} WHERE j.id = $1");
        sqlx::query_as::<_, JobRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))
    }
}

fn build_query(constraints: &[FieldConstraint]) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_JOBS);

    for (i, constraint) in constraints.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        let pattern = format!("%{}%", constraint.value);
        match constraint.field {
            CatalogField::Role => {
                builder.push("(j.job_title ILIKE ");
                builder.push_bind(pattern.clone());
                builder.push(" OR j.service ILIKE ");
                builder.push_bind(pattern);
                builder.push(")");
            }
            CatalogField::Location => {
                builder.push("j.location ILIKE ");
                builder.push_bind(pattern);
            }
            CatalogField::Seniority => {
                builder.push("j.seniority ILIKE ");
                builder.push_bind(pattern);
            }
            CatalogField::Salary => {
                builder.push("j.salary ILIKE ");
                builder.push_bind(pattern);
            }
        }
    }

    builder.push(" ORDER BY j.date_published DESC NULLS LAST, j.id DESC");
    builder
}

#[async_trait]
impl CatalogReader for PgCatalog {
    async fn query(&self, constraints: &[FieldConstraint]) -> Result<Vec<JobRow>, CatalogError> {
        build_query(constraints)
            .build_query_as::<JobRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))
    }
}
