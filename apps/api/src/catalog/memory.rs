//! In-memory catalog backing the unit tests.
//! Mirrors the matching semantics of [`super::pg::PgCatalog`].

use async_trait::async_trait;

use super::{CatalogError, CatalogField, CatalogReader, FieldConstraint};
use crate::models::job::JobRow;

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    jobs: Vec<JobRow>,
}

impl InMemoryCatalog {
    pub fn new(mut jobs: Vec<JobRow>) -> Self {
        // Catalog-default order: newest first, undated postings last.
        jobs.sort_by(|a, b| {
            b.date_published
                .cmp(&a.date_published)
                .then(b.id.cmp(&a.id))
        });
        Self { jobs }
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(needle))
        .unwrap_or(false)
}

fn matches(job: &JobRow, constraint: &FieldConstraint) -> bool {
    let needle = constraint.value.to_lowercase();
    match constraint.field {
        CatalogField::Role => {
            contains_ci(Some(&job.job_title), &needle)
                || contains_ci(job.service.as_deref(), &needle)
        }
        CatalogField::Location => contains_ci(job.location.as_deref(), &needle),
        CatalogField::Seniority => contains_ci(job.seniority.as_deref(), &needle),
        CatalogField::Salary => contains_ci(job.salary.as_deref(), &needle),
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn query(&self, constraints: &[FieldConstraint]) -> Result<Vec<JobRow>, CatalogError> {
        Ok(self
            .jobs
            .iter()
            .filter(|job| constraints.iter().all(|c| matches(job, c)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn job(id: i64, title: &str, service: Option<&str>, location: Option<&str>) -> JobRow {
        JobRow {
            id,
            firm_id: 1,
            job_title: title.to_string(),
            seniority: Some("Senior".to_string()),
            service: service.map(str::to_string),
            industry: None,
            location: location.map(str::to_string),
            employment: Some("Full-time".to_string()),
            salary: None,
            description: None,
            link: None,
            date_published: Utc.with_ymd_and_hms(2025, 1, id as u32, 0, 0, 0).single(),
            embedding: None,
        }
    }

    #[tokio::test]
    async fn empty_constraints_return_everything_newest_first() {
        let catalog = InMemoryCatalog::new(vec![
            job(1, "Auditor", None, None),
            job(3, "Tax Senior", None, None),
            job(2, "Advisory Director", None, None),
        ]);
        let rows = catalog.query(&[]).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn substring_match_is_case_insensitive() {
        let catalog = InMemoryCatalog::new(vec![job(1, "Audit Manager", None, None)]);
        let rows = catalog
            .query(&[FieldConstraint::new(CatalogField::Role, "AUDIT man")])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn role_matches_title_or_service() {
        let catalog = InMemoryCatalog::new(vec![
            job(1, "Manager", Some("Technology Audit"), None),
            job(2, "Audit Manager", None, None),
            job(3, "Tax Senior", Some("Tax"), None),
        ]);
        let rows = catalog
            .query(&[FieldConstraint::new(CatalogField::Role, "audit")])
            .await
            .unwrap();
        let ids: Vec<i64> = rows.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn constraints_are_anded() {
        let catalog = InMemoryCatalog::new(vec![
            job(1, "Auditor", None, Some("New York, USA")),
            job(2, "Auditor", None, Some("Los Angeles, USA")),
        ]);
        let rows = catalog
            .query(&[
                FieldConstraint::new(CatalogField::Role, "auditor"),
                FieldConstraint::new(CatalogField::Location, "new york"),
            ])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
    }

    #[tokio::test]
    async fn absent_column_never_matches() {
        let catalog = InMemoryCatalog::new(vec![job(1, "Auditor", None, None)]);
        let rows = catalog
            .query(&[FieldConstraint::new(CatalogField::Location, "new york")])
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
