//! Catalog access: the read-only store of job postings searched by the engine.
//!
//! The engine only ever reads postings. Writes (embedding backfill, search
//! history) go through their own narrow paths and never touch posting rows.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::job::JobRow;

pub mod backfill;
#[cfg(test)]
pub mod memory;
pub mod pg;

/// The catalog store could not be reached or a query failed.
/// No match is possible without the catalog, so callers surface this as a
/// hard failure instead of degrading.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Catalog columns a preference field can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogField {
    /// Matched against `job_title` OR `service`.
    Role,
    Location,
    Seniority,
    Salary,
}

/// A single case-insensitive substring constraint on one catalog field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConstraint {
    pub field: CatalogField,
    pub value: String,
}

impl FieldConstraint {
    pub fn new(field: CatalogField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Read access to the job catalog.
///
/// Constraints are ANDed together; `Role` alone fans out across both the
/// title and service columns. An empty constraint slice returns the full
/// catalog. Rows come back in catalog-default order: `date_published`
/// descending with undated postings last, then `id` descending.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn query(&self, constraints: &[FieldConstraint]) -> Result<Vec<JobRow>, CatalogError>;
}
