//! Persistence for analysis records, keyed by (job, candidate) pair.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::analysis::parser::FitResult;
use crate::errors::AppError;
use crate::models::analysis::AnalysisRow;

/// Store contract consumed by the orchestrator. Behind a trait so batch
/// logic is testable against an in-memory implementation.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn find_by_pair(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<AnalysisRow>, AppError>;

    /// All analyses for one job, score descending. Used to bulk-preload a
    /// batch instead of one existence check per candidate.
    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<AnalysisRow>, AppError>;

    /// Persists a new analysis for the pair. Safe under race: the table's
    /// unique constraint on (job_id, candidate_id) makes the first writer
    /// win, and a conflicting insert returns the already-persisted row.
    async fn create(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
        result: &FitResult,
    ) -> Result<AnalysisRow, AppError>;
}

pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn find_by_pair(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<AnalysisRow>, AppError> {
        Ok(sqlx::query_as::<_, AnalysisRow>(
            "SELECT * FROM analyses WHERE job_id = $1 AND candidate_id = $2",
        )
        .bind(job_id)
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<AnalysisRow>, AppError> {
        Ok(sqlx::query_as::<_, AnalysisRow>(
            "SELECT * FROM analyses WHERE job_id = $1 ORDER BY fit_score DESC, created_at ASC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create(
        &self,
        job_id: Uuid,
        candidate_id: Uuid,
        result: &FitResult,
    ) -> Result<AnalysisRow, AppError> {
        let inserted = sqlx::query_as::<_, AnalysisRow>(
            r#"
            INSERT INTO analyses
                (id, job_id, candidate_id, fit_score, strengths, weaknesses, analysis_details)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (job_id, candidate_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job_id)
        .bind(candidate_id)
        .bind(result.score)
        .bind(&result.strengths)
        .bind(&result.weaknesses)
        .bind(&result.summary)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(row) => Ok(row),
            // Lost the race to a concurrent writer: first write wins.
            None => self.find_by_pair(job_id, candidate_id).await?.ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "analysis for job {job_id} / candidate {candidate_id} vanished after conflicting insert"
                ))
            }),
        }
    }
}
