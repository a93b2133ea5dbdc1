//! Batch and single-pair orchestration of resume fit analysis.
//!
//! Two strategies over one scoring core (`ResumeScorer`):
//! - `run_batch` is lenient: a candidate whose scoring call fails is recorded
//!   as a zero-score fallback analysis and the batch keeps going. A batch
//!   optimizes for completeness over individual correctness.
//! - `score_one` is strict: scoring failures propagate to the caller and no
//!   record is written. A single request optimizes for correctness.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::parser::FitResult;
use crate::analysis::ranking::rank_by_fit;
use crate::analysis::scorer::ResumeScorer;
use crate::analysis::store::AnalysisStore;
use crate::errors::AppError;
use crate::llm_client::ScoringError;
use crate::models::analysis::AnalysisRow;
use crate::models::candidate::CandidateRow;
use crate::models::job::JobRow;

/// Derived per-batch counters. Never persisted. Fallback records written
/// this run count as new.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total_candidates: usize,
    pub new_analyses: usize,
    pub existing_analyses: usize,
}

/// Result of one batch run: all analyses for the considered candidates,
/// ranked by fit score, plus the counters.
#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub analyses: Vec<AnalysisRow>,
    pub summary: BatchSummary,
}

/// Outcome of a single-pair request; `created` distinguishes 201 from 200.
#[derive(Debug)]
pub struct PairOutcome {
    pub analysis: AnalysisRow,
    pub created: bool,
}

/// What a failed scoring call degrades to in batch mode. Failure becomes
/// data so one bad candidate cannot abort the batch.
fn failure_fallback(cause: &ScoringError) -> FitResult {
    FitResult {
        score: 0,
        strengths: vec!["Analysis failed".to_string()],
        weaknesses: vec!["Unable to analyze".to_string()],
        summary: format!("Analysis failed: {cause}"),
    }
}

/// Scores every candidate against `job`, skipping pairs that already have an
/// analysis. Re-running a batch never re-scores a previously recorded
/// candidate, whether that record came from a success or a fallback.
pub async fn run_batch(
    store: &dyn AnalysisStore,
    scorer: &dyn ResumeScorer,
    job: &JobRow,
    candidates: &[CandidateRow],
) -> Result<BatchOutcome, AppError> {
    if candidates.is_empty() {
        return Err(AppError::NoCandidates);
    }

    // One query up front instead of one existence check per candidate.
    let existing: HashMap<Uuid, AnalysisRow> = store
        .list_by_job(job.id)
        .await?
        .into_iter()
        .map(|a| (a.candidate_id, a))
        .collect();

    let mut analyses = Vec::with_capacity(candidates.len());
    let mut new_analyses = 0;

    for candidate in candidates {
        if let Some(analysis) = existing.get(&candidate.id) {
            analyses.push(analysis.clone());
            continue;
        }

        let result = match scorer
            .evaluate(&job.extracted_text, &candidate.extracted_text)
            .await
        {
            Ok(result) => result,
            Err(cause) => {
                error!("Failed to analyze candidate {}: {cause}", candidate.id);
                failure_fallback(&cause)
            }
        };

        let analysis = store.create(job.id, candidate.id, &result).await?;
        analyses.push(analysis);
        new_analyses += 1;
    }

    rank_by_fit(&mut analyses);

    let summary = BatchSummary {
        total_candidates: candidates.len(),
        new_analyses,
        existing_analyses: candidates.len() - new_analyses,
    };

    info!(
        "Batch analysis for job {} complete: {} candidates, {} new, {} existing",
        job.id, summary.total_candidates, summary.new_analyses, summary.existing_analyses
    );

    Ok(BatchOutcome { analyses, summary })
}

/// Scores one candidate against one job, or returns the existing analysis
/// unchanged. Unlike `run_batch`, a scoring failure propagates and nothing
/// is written.
pub async fn score_one(
    store: &dyn AnalysisStore,
    scorer: &dyn ResumeScorer,
    job: &JobRow,
    candidate: &CandidateRow,
) -> Result<PairOutcome, AppError> {
    if let Some(analysis) = store.find_by_pair(job.id, candidate.id).await? {
        return Ok(PairOutcome {
            analysis,
            created: false,
        });
    }

    let result = scorer
        .evaluate(&job.extracted_text, &candidate.extracted_text)
        .await?;
    let analysis = store.create(job.id, candidate.id, &result).await?;

    Ok(PairOutcome {
        analysis,
        created: true,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory stand-in for the Postgres store, including its
    /// first-write-wins behavior on a pair conflict.
    struct MemoryStore {
        rows: Mutex<Vec<AnalysisRow>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
            }
        }

        fn count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AnalysisStore for MemoryStore {
        async fn find_by_pair(
            &self,
            job_id: Uuid,
            candidate_id: Uuid,
        ) -> Result<Option<AnalysisRow>, AppError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.job_id == job_id && a.candidate_id == candidate_id)
                .cloned())
        }

        async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<AnalysisRow>, AppError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.job_id == job_id)
                .cloned()
                .collect())
        }

        async fn create(
            &self,
            job_id: Uuid,
            candidate_id: Uuid,
            result: &FitResult,
        ) -> Result<AnalysisRow, AppError> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(existing) = rows
                .iter()
                .find(|a| a.job_id == job_id && a.candidate_id == candidate_id)
            {
                return Ok(existing.clone());
            }
            let row = AnalysisRow {
                id: Uuid::new_v4(),
                job_id,
                candidate_id,
                fit_score: result.score,
                strengths: result.strengths.clone(),
                weaknesses: result.weaknesses.clone(),
                analysis_details: result.summary.clone(),
                created_at: Utc::now(),
            };
            rows.push(row.clone());
            Ok(row)
        }
    }

    /// Stub scorer driven by the resume text: "FAIL" errors out, a number
    /// becomes the fit score, anything else scores 75.
    struct StubScorer;

    #[async_trait]
    impl ResumeScorer for StubScorer {
        async fn evaluate(
            &self,
            _job_text: &str,
            resume_text: &str,
        ) -> Result<FitResult, ScoringError> {
            if resume_text.contains("FAIL") {
                return Err(ScoringError::Api {
                    status: 500,
                    message: "upstream down".to_string(),
                });
            }
            Ok(FitResult {
                score: resume_text.trim().parse().unwrap_or(75),
                strengths: vec!["Relevant experience".to_string()],
                weaknesses: vec!["No production Rust".to_string()],
                summary: "Solid match".to_string(),
            })
        }
    }

    fn job() -> JobRow {
        JobRow {
            id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            description: None,
            pdf_key: "jobs/backend.pdf".to_string(),
            extracted_text: "Rust backend role".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn candidate(resume_text: &str) -> CandidateRow {
        CandidateRow {
            id: Uuid::new_v4(),
            name: "Jordan Doe".to_string(),
            email: None,
            pdf_key: "candidates/jordan.pdf".to_string(),
            extracted_text: resume_text.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_batch_is_idempotent_across_runs() {
        let store = MemoryStore::new();
        let job = job();
        let candidates = vec![candidate("80"), candidate("40")];

        let first = run_batch(&store, &StubScorer, &job, &candidates)
            .await
            .unwrap();
        let second = run_batch(&store, &StubScorer, &job, &candidates)
            .await
            .unwrap();

        assert_eq!(store.count(), 2);
        assert_eq!(second.summary.new_analyses, 0);
        assert_eq!(second.summary.existing_analyses, 2);

        let first_ids: HashSet<Uuid> = first.analyses.iter().map(|a| a.id).collect();
        let second_ids: HashSet<Uuid> = second.analyses.iter().map(|a| a.id).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[tokio::test]
    async fn test_one_failing_candidate_degrades_to_fallback() {
        let store = MemoryStore::new();
        let job = job();
        let candidates = vec![candidate("80"), candidate("FAIL"), candidate("40")];

        let outcome = run_batch(&store, &StubScorer, &job, &candidates)
            .await
            .unwrap();

        assert_eq!(outcome.analyses.len(), 3);
        assert_eq!(outcome.summary.new_analyses, 3);

        let fallbacks: Vec<_> = outcome
            .analyses
            .iter()
            .filter(|a| a.fit_score == 0)
            .collect();
        assert_eq!(fallbacks.len(), 1);
        assert!(fallbacks[0].analysis_details.starts_with("Analysis failed:"));
        assert_eq!(fallbacks[0].strengths, vec!["Analysis failed"]);
        assert_eq!(fallbacks[0].weaknesses, vec!["Unable to analyze"]);
    }

    #[tokio::test]
    async fn test_empty_candidate_set_is_rejected_before_any_work() {
        let store = MemoryStore::new();
        let err = run_batch(&store, &StubScorer, &job(), &[]).await.unwrap_err();

        assert!(matches!(err, AppError::NoCandidates));
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn test_batch_output_is_ranked_with_stable_ties() {
        let store = MemoryStore::new();
        let job = job();
        let candidates = vec![
            candidate("40"),
            candidate("90"),
            candidate("90"),
            candidate("10"),
        ];
        let first_ninety = candidates[1].id;
        let second_ninety = candidates[2].id;

        let outcome = run_batch(&store, &StubScorer, &job, &candidates)
            .await
            .unwrap();

        let scores: Vec<i32> = outcome.analyses.iter().map(|a| a.fit_score).collect();
        assert_eq!(scores, vec![90, 90, 40, 10]);
        assert_eq!(outcome.analyses[0].candidate_id, first_ninety);
        assert_eq!(outcome.analyses[1].candidate_id, second_ninety);
    }

    #[tokio::test]
    async fn test_existing_analyses_are_returned_unchanged() {
        let store = MemoryStore::new();
        let job = job();
        let already_scored = candidate("90");
        let fresh = candidate("60");

        // Seeded with a score the stub would never produce for this resume.
        let seeded = FitResult {
            score: 33,
            strengths: vec!["Seeded".to_string()],
            weaknesses: vec![],
            summary: "From an earlier run".to_string(),
        };
        store.create(job.id, already_scored.id, &seeded).await.unwrap();

        let outcome = run_batch(
            &store,
            &StubScorer,
            &job,
            &[already_scored.clone(), fresh.clone()],
        )
        .await
        .unwrap();

        assert_eq!(outcome.summary.new_analyses, 1);
        assert_eq!(outcome.summary.existing_analyses, 1);

        let kept = outcome
            .analyses
            .iter()
            .find(|a| a.candidate_id == already_scored.id)
            .unwrap();
        assert_eq!(kept.fit_score, 33);
        assert_eq!(kept.analysis_details, "From an earlier run");
    }

    #[tokio::test]
    async fn test_score_one_is_an_idempotent_read_through() {
        let store = MemoryStore::new();
        let job = job();
        let candidate = candidate("70");

        let first = score_one(&store, &StubScorer, &job, &candidate)
            .await
            .unwrap();
        let second = score_one(&store, &StubScorer, &job, &candidate)
            .await
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.analysis.id, second.analysis.id);
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_score_one_propagates_failure_without_writing() {
        let store = MemoryStore::new();
        let err = score_one(&store, &StubScorer, &job(), &candidate("FAIL"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Scoring(_)));
        assert_eq!(store.count(), 0);
    }
}
