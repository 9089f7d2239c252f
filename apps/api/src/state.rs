use crate::catalog::pg::PgCatalog;
use crate::matching::MatchEngine;

/// Shared application state injected into route handlers via Axum extractors.
///
/// The catalog is deliberately a separate field from the engine: every
/// matching call receives it as an explicit argument, so concurrent searches
/// share nothing but read-only state.
#[derive(Clone)]
pub struct AppState {
    pub catalog: PgCatalog,
    pub engine: MatchEngine,
}
