//! Lexical Filter Engine — tiered catalog search with progressive relaxation.
//!
//! Strict tier first: every present preference field becomes one substring
//! constraint. When that matches nothing, constraints are dropped one at a
//! time in a fixed priority order and the query re-runs, stopping at the
//! first non-empty result. Role is the primary intent signal and is never
//! dropped automatically. An empty final result is a valid outcome, distinct
//! from any service failure.

use tracing::debug;

use crate::catalog::{CatalogError, CatalogField, CatalogReader, FieldConstraint};
use crate::matching::extractor::StructuredPreferences;
use crate::models::job::JobRow;

/// Constraint-drop order for the fallback tier.
const RELAXATION_ORDER: [CatalogField; 3] = [
    CatalogField::Seniority,
    CatalogField::Salary,
    CatalogField::Location,
];

pub(crate) fn constraints_for(prefs: &StructuredPreferences) -> Vec<FieldConstraint> {
    let mut constraints = Vec::new();
    if let Some(role) = &prefs.role {
        constraints.push(FieldConstraint::new(CatalogField::Role, role.clone()));
    }
    if let Some(location) = &prefs.location {
        constraints.push(FieldConstraint::new(CatalogField::Location, location.clone()));
    }
    if let Some(experience) = &prefs.experience {
        constraints.push(FieldConstraint::new(
            CatalogField::Seniority,
            experience.clone(),
        ));
    }
    if let Some(salary) = &prefs.salary {
        constraints.push(FieldConstraint::new(CatalogField::Salary, salary.clone()));
    }
    constraints
}

/// Runs the tiered search. Rows come back in catalog-default order; ranking,
/// if any, is the orchestrator's concern.
pub async fn filter_catalog(
    catalog: &dyn CatalogReader,
    prefs: &StructuredPreferences,
) -> Result<Vec<JobRow>, CatalogError> {
    let mut constraints = constraints_for(prefs);

    let rows = catalog.query(&constraints).await?;
    if !rows.is_empty() || constraints.is_empty() {
        return Ok(rows);
    }

    for field in RELAXATION_ORDER {
        let before = constraints.len();
        constraints.retain(|c| c.field != field);
        if constraints.len() == before {
            // Nothing to drop; re-running the same query cannot help.
            continue;
        }

        debug!(dropped = ?field, remaining = constraints.len(), "strict filter empty, relaxing");
        let rows = catalog.query(&constraints).await?;
        if !rows.is_empty() {
            return Ok(rows);
        }
    }

    Ok(Vec::new())
}
