//! Matching engine — interprets a free-text job search, filters the catalog
//! with graceful relaxation, and ranks the result.
//!
//! Data flows one direction: raw text, structured preferences, candidate
//! set, ranked and capped result. Each invocation is self-contained; the
//! catalog is passed in per call and only ever read.

pub mod extractor;
pub mod filter;
pub mod normalizer;
pub mod prompts;
pub mod ranker;

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::catalog::{CatalogError, CatalogReader};
use crate::embedder::Embedder;
use crate::models::job::JobRow;
use crate::search_log::{NewSearchLog, SearchLogSink};

use self::extractor::{PreferenceExtractor, StructuredPreferences};
use self::filter::filter_catalog;

/// Which path produced a match. Score scales differ between the two kinds
/// and must not be compared across them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedVia {
    Lexical,
    Semantic,
}

/// One ranked result row.
#[derive(Debug, Clone)]
pub struct JobMatch {
    pub job: JobRow,
    /// Cosine similarity for semantic matches; a constant 1.0 for lexical.
    pub score: f32,
    pub matched_via: MatchedVia,
}

/// Result-page size the bot shows by default.
pub const DEFAULT_TOP_K: usize = 5;

/// Caller-supplied knobs for one match invocation.
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    /// Maximum number of results returned.
    pub top_k: usize,
    /// Force semantic re-ranking even when the candidate set already fits.
    pub semantic: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            semantic: false,
        }
    }
}

/// One user search to run against the catalog.
#[derive(Debug, Clone, Copy)]
pub struct SearchRequest<'a> {
    pub telegram_id: i64,
    pub raw_query: &'a str,
}

/// End-to-end matching pipeline: extract, filter with fallback, optionally
/// re-rank semantically, log, cap.
///
/// This is the only place that decides between "give up" and "degrade":
/// extraction and embedding outages narrow the result quality, a catalog
/// outage is the one hard failure.
#[derive(Clone)]
pub struct MatchEngine {
    extractor: Arc<dyn PreferenceExtractor>,
    embedder: Arc<dyn Embedder>,
    search_log: Arc<dyn SearchLogSink>,
}

impl MatchEngine {
    pub fn new(
        extractor: Arc<dyn PreferenceExtractor>,
        embedder: Arc<dyn Embedder>,
        search_log: Arc<dyn SearchLogSink>,
    ) -> Self {
        Self {
            extractor,
            embedder,
            search_log,
        }
    }

    /// Runs one free-text search end to end.
    pub async fn match_jobs(
        &self,
        catalog: &dyn CatalogReader,
        request: SearchRequest<'_>,
        options: MatchOptions,
    ) -> Result<Vec<JobMatch>, CatalogError> {
        let prefs = match self.extractor.extract(request.raw_query).await {
            Ok(prefs) => prefs,
            Err(err) => {
                warn!(error = %err, "searching without filters");
                StructuredPreferences::default()
            }
        };

        let candidates = filter_catalog(catalog, &prefs).await?;

        let matches = if candidates.is_empty() {
            Vec::new()
        } else if options.semantic || candidates.len() > options.top_k {
            match ranker::rank(
                request.raw_query,
                &candidates,
                options.top_k,
                self.embedder.as_ref(),
            )
            .await
            {
                // A candidate set with no stored vectors ranks to nothing;
                // the lexical matches still stand in that case.
                Ok(ranked) if !ranked.is_empty() => ranked,
                Ok(_) => lexical_matches(candidates, options.top_k),
                Err(err) => {
                    warn!(error = %err, "semantic ranking unavailable, returning lexical order");
                    lexical_matches(candidates, options.top_k)
                }
            }
        } else {
            lexical_matches(candidates, options.top_k)
        };

        self.record_search(request, &prefs).await;
        Ok(matches)
    }

    /// Ranks the whole catalog against a CV's plain text.
    pub async fn match_cv(
        &self,
        catalog: &dyn CatalogReader,
        cv_text: &str,
        top_k: usize,
    ) -> Result<Vec<JobMatch>, CatalogError> {
        let candidates = catalog.query(&[]).await?;

        match ranker::embed_cv(cv_text, self.embedder.as_ref()).await {
            Ok(cv_vec) => {
                let ranked = ranker::rank_by_vector(&cv_vec, &candidates, top_k);
                if ranked.is_empty() {
                    Ok(lexical_matches(candidates, top_k))
                } else {
                    Ok(ranked)
                }
            }
            Err(err) => {
                warn!(error = %err, "CV embedding unavailable, returning newest postings");
                Ok(lexical_matches(candidates, top_k))
            }
        }
    }

    async fn record_search(&self, request: SearchRequest<'_>, prefs: &StructuredPreferences) {
        let entry = NewSearchLog {
            telegram_id: request.telegram_id,
            search_query: request.raw_query,
            structured_preferences: if prefs.is_empty() {
                None
            } else {
                serde_json::to_value(prefs).ok()
            },
        };
        if let Err(err) = self.search_log.record(&entry).await {
            warn!(error = %err, "failed to record search, result still returned");
        }
    }
}

fn lexical_matches(candidates: Vec<JobRow>, top_k: usize) -> Vec<JobMatch> {
    candidates
        .into_iter()
        .take(top_k)
        .map(|job| JobMatch {
            job,
            score: 1.0,
            matched_via: MatchedVia::Lexical,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::extractor::ExtractionUnavailable;
    use super::*;
    use crate::catalog::memory::InMemoryCatalog;
    use crate::embedder::EmbeddingUnavailable;

    struct StubExtractor(StructuredPreferences);

    #[async_trait]
    impl PreferenceExtractor for StubExtractor {
        async fn extract(
            &self,
            _raw_query: &str,
        ) -> Result<StructuredPreferences, ExtractionUnavailable> {
            Ok(self.0.clone())
        }
    }

    struct DownExtractor;

    #[async_trait]
    impl PreferenceExtractor for DownExtractor {
        async fn extract(
            &self,
            _raw_query: &str,
        ) -> Result<StructuredPreferences, ExtractionUnavailable> {
            Err(ExtractionUnavailable("request timed out".to_string()))
        }
    }

    struct StubEmbedder {
        vector: Vec<f32>,
    }

    impl StubEmbedder {
        fn new(vector: Vec<f32>) -> Self {
            Self { vector }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingUnavailable> {
            Ok(self.vector.clone())
        }
    }

    struct DownEmbedder;

    #[async_trait]
    impl Embedder for DownEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingUnavailable> {
            Err(EmbeddingUnavailable("connection refused".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingLog {
        entries: Mutex<Vec<(i64, String, Option<Value>)>>,
    }

    #[async_trait]
    impl SearchLogSink for RecordingLog {
        async fn record(&self, entry: &NewSearchLog<'_>) -> anyhow::Result<()> {
            self.entries.lock().unwrap().push((
                entry.telegram_id,
                entry.search_query.to_string(),
                entry.structured_preferences.clone(),
            ));
            Ok(())
        }
    }

    struct DownLog;

    #[async_trait]
    impl SearchLogSink for DownLog {
        async fn record(&self, _entry: &NewSearchLog<'_>) -> anyhow::Result<()> {
            anyhow::bail!("log store offline")
        }
    }

    fn job(id: i64, title: &str, location: &str, embedding: Option<Vec<f32>>) -> JobRow {
        JobRow {
            id,
            firm_id: 1,
            job_title: title.to_string(),
            seniority: None,
            service: None,
            industry: None,
            location: Some(location.to_string()),
            employment: None,
            salary: None,
            description: None,
            link: None,
            date_published: None,
            embedding,
        }
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            job(1, "Audit Manager", "New York, USA", Some(vec![1.0, 0.0])),
            job(2, "Tax Senior", "New York, USA", Some(vec![0.0, 1.0])),
            job(3, "Advisory Director", "Boston, USA", Some(vec![0.6, 0.8])),
            job(4, "Forensic Accountant", "Chicago, USA", None),
        ])
    }

    fn engine(
        extractor: impl PreferenceExtractor + 'static,
        embedder: impl Embedder + 'static,
        log: impl SearchLogSink + 'static,
    ) -> MatchEngine {
        MatchEngine::new(Arc::new(extractor), Arc::new(embedder), Arc::new(log))
    }

    fn request(raw_query: &str) -> SearchRequest<'_> {
        SearchRequest {
            telegram_id: 42,
            raw_query,
        }
    }

    #[tokio::test]
    async fn extraction_outage_degrades_to_unfiltered_search() {
        let engine = engine(DownExtractor, StubEmbedder::new(vec![1.0, 0.0]), RecordingLog::default());
        let matches = engine
            .match_jobs(
                &catalog(),
                request("audit roles"),
                MatchOptions { top_k: 2, semantic: false },
            )
            .await
            .unwrap();
        // Full catalog exceeds top_k, so the semantic path ranks it.
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.matched_via == MatchedVia::Semantic));
    }

    #[tokio::test]
    async fn extraction_outage_with_embedding_outage_still_answers() {
        let engine = engine(DownExtractor, DownEmbedder, RecordingLog::default());
        let matches = engine
            .match_jobs(
                &catalog(),
                request("audit roles"),
                MatchOptions { top_k: 2, semantic: false },
            )
            .await
            .unwrap();
        // Catalog-default order, truncated. No exception reaches the caller.
        assert_eq!(matches.len(), 2);
        let ids: Vec<i64> = matches.iter().map(|m| m.job.id).collect();
        assert_eq!(ids, vec![4, 3]);
        assert!(matches.iter().all(|m| m.matched_via == MatchedVia::Lexical));
    }

    #[tokio::test]
    async fn small_candidate_set_skips_semantic_ranking() {
        let prefs = StructuredPreferences {
            role: Some("audit manager".to_string()),
            location: Some("new york".to_string()),
            ..Default::default()
        };
        let embedder = StubEmbedder::new(vec![1.0, 0.0]);
        let engine = MatchEngine::new(
            Arc::new(StubExtractor(prefs)),
            Arc::new(embedder),
            Arc::new(RecordingLog::default()),
        );
        let matches = engine
            .match_jobs(
                &catalog(),
                request("audit manager in new york"),
                MatchOptions { top_k: 5, semantic: false },
            )
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].job.id, 1);
        assert_eq!(matches[0].matched_via, MatchedVia::Lexical);
        assert_eq!(matches[0].score, 1.0);
    }

    #[tokio::test]
    async fn oversized_candidate_set_is_ranked_semantically() {
        let engine = engine(
            StubExtractor(StructuredPreferences::default()),
            StubEmbedder::new(vec![1.0, 0.0]),
            RecordingLog::default(),
        );
        let matches = engine
            .match_jobs(
                &catalog(),
                request("accounting jobs"),
                MatchOptions { top_k: 2, semantic: false },
            )
            .await
            .unwrap();
        // Job 1 aligns with the query vector, job 3 is next; job 4 has no
        // embedding and cannot rank.
        let ids: Vec<i64> = matches.iter().map(|m| m.job.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(matches[0].score >= matches[1].score);
    }

    #[tokio::test]
    async fn semantic_flag_forces_ranking_of_small_sets() {
        let prefs = StructuredPreferences {
            role: Some("audit manager".to_string()),
            ..Default::default()
        };
        let embedder = StubEmbedder::new(vec![1.0, 0.0]);
        let engine = MatchEngine::new(
            Arc::new(StubExtractor(prefs)),
            Arc::new(embedder),
            Arc::new(RecordingLog::default()),
        );
        let matches = engine
            .match_jobs(
                &catalog(),
                request("audit manager"),
                MatchOptions { top_k: 5, semantic: true },
            )
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_via, MatchedVia::Semantic);
    }

    #[tokio::test]
    async fn embedding_outage_matches_the_purely_lexical_result() {
        let options = MatchOptions { top_k: 2, semantic: true };
        let prefs = StructuredPreferences {
            location: Some("new york".to_string()),
            ..Default::default()
        };

        let degraded = engine(
            StubExtractor(prefs.clone()),
            DownEmbedder,
            RecordingLog::default(),
        )
        .match_jobs(&catalog(), request("jobs in new york"), options)
        .await
        .unwrap();

        let lexical_only = engine(
            StubExtractor(prefs),
            StubEmbedder::new(vec![1.0, 0.0]),
            RecordingLog::default(),
        )
        .match_jobs(
            &catalog(),
            request("jobs in new york"),
            MatchOptions { top_k: 2, semantic: false },
        )
        .await
        .unwrap();

        let degraded_ids: Vec<i64> = degraded.iter().map(|m| m.job.id).collect();
        let lexical_ids: Vec<i64> = lexical_only.iter().map(|m| m.job.id).collect();
        assert_eq!(degraded_ids, lexical_ids);
        assert!(degraded.iter().all(|m| m.matched_via == MatchedVia::Lexical));
    }

    #[tokio::test]
    async fn unembedded_candidates_fall_back_to_lexical_order() {
        let unembedded = InMemoryCatalog::new(vec![
            job(1, "Audit Manager", "New York, USA", None),
            job(2, "Audit Senior", "New York, USA", None),
        ]);
        let engine = engine(
            StubExtractor(StructuredPreferences::default()),
            StubEmbedder::new(vec![1.0, 0.0]),
            RecordingLog::default(),
        );
        let matches = engine
            .match_jobs(
                &unembedded,
                request("audit"),
                MatchOptions { top_k: 1, semantic: false },
            )
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].job.id, 2);
        assert_eq!(matches[0].matched_via, MatchedVia::Lexical);
    }

    #[tokio::test]
    async fn no_catalog_match_is_an_empty_result_not_an_error() {
        let prefs = StructuredPreferences {
            role: Some("actuary".to_string()),
            ..Default::default()
        };
        let engine = engine(
            StubExtractor(prefs),
            StubEmbedder::new(vec![1.0, 0.0]),
            RecordingLog::default(),
        );
        let matches = engine
            .match_jobs(&catalog(), request("actuary"), MatchOptions::default())
            .await
            .unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn every_completed_search_is_logged_with_its_preferences() {
        let prefs = StructuredPreferences {
            role: Some("audit manager".to_string()),
            location: Some("new york".to_string()),
            ..Default::default()
        };
        let log = Arc::new(RecordingLog::default());
        let engine = MatchEngine::new(
            Arc::new(StubExtractor(prefs)),
            Arc::new(StubEmbedder::new(vec![1.0, 0.0])),
            log.clone(),
        );
        engine
            .match_jobs(
                &catalog(),
                request("audit manager in new york"),
                MatchOptions::default(),
            )
            .await
            .unwrap();

        let entries = log.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        let (telegram_id, query, serialized) = &entries[0];
        assert_eq!(*telegram_id, 42);
        assert_eq!(query, "audit manager in new york");
        let serialized = serialized.as_ref().unwrap();
        assert_eq!(serialized["role"], "audit manager");
        assert_eq!(serialized["location"], "new york");
    }

    #[tokio::test]
    async fn empty_preferences_log_no_structured_payload() {
        let log = Arc::new(RecordingLog::default());
        let engine = MatchEngine::new(
            Arc::new(DownExtractor),
            Arc::new(StubEmbedder::new(vec![1.0, 0.0])),
            log.clone(),
        );
        engine
            .match_jobs(&catalog(), request("anything"), MatchOptions::default())
            .await
            .unwrap();
        let entries = log.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].2.is_none());
    }

    #[tokio::test]
    async fn log_outage_never_fails_the_search() {
        let engine = engine(
            StubExtractor(StructuredPreferences::default()),
            StubEmbedder::new(vec![1.0, 0.0]),
            DownLog,
        );
        let matches = engine
            .match_jobs(&catalog(), request("audit"), MatchOptions::default())
            .await
            .unwrap();
        assert!(!matches.is_empty());
    }

    #[tokio::test]
    async fn cv_matching_ranks_the_whole_catalog() {
        let engine = engine(
            StubExtractor(StructuredPreferences::default()),
            StubEmbedder::new(vec![1.0, 0.0]),
            RecordingLog::default(),
        );
        let matches = engine
            .match_cv(&catalog(), "experienced audit professional", 2)
            .await
            .unwrap();
        let ids: Vec<i64> = matches.iter().map(|m| m.job.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(matches.iter().all(|m| m.matched_via == MatchedVia::Semantic));
    }

    #[tokio::test]
    async fn cv_matching_degrades_to_newest_postings() {
        let engine = engine(
            StubExtractor(StructuredPreferences::default()),
            DownEmbedder,
            RecordingLog::default(),
        );
        let matches = engine
            .match_cv(&catalog(), "experienced audit professional", 2)
            .await
            .unwrap();
        let ids: Vec<i64> = matches.iter().map(|m| m.job.id).collect();
        assert_eq!(ids, vec![4, 3]);
        assert!(matches.iter().all(|m| m.matched_via == MatchedVia::Lexical));
    }
}
