use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One persisted fit analysis binding a job to a candidate.
///
/// At most one row exists per (job_id, candidate_id) pair — the table carries
/// a unique constraint on the pair. Rows are never mutated after creation;
/// they are only deleted, directly or in cascade with their job or candidate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub fit_score: i32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub analysis_details: String,
    pub created_at: DateTime<Utc>,
}
