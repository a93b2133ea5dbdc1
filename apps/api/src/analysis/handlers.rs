//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::analysis::orchestrator::{run_batch, score_one, BatchOutcome};
use crate::candidates::handlers::find_candidate;
use crate::errors::AppError;
use crate::jobs::handlers::find_job;
use crate::models::analysis::AnalysisRow;
use crate::models::candidate::CandidateRow;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JobIdQuery {
    pub job_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeAllRequest {
    pub job_id: Uuid,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/analyses?job_id=
///
/// All analyses for one job, ranked by fit score descending.
pub async fn handle_list_analyses(
    State(state): State<AppState>,
    Query(params): Query<JobIdQuery>,
) -> Result<Json<Vec<AnalysisRow>>, AppError> {
    let analyses = state.analyses.list_by_job(params.job_id).await?;
    Ok(Json(analyses))
}

/// POST /api/v1/analyses
///
/// Scores one (job, candidate) pair. Idempotent read-through: returns 200
/// with the existing analysis if the pair was already scored, 201 otherwise.
/// A scoring failure here is the caller's problem — nothing is written.
pub async fn handle_analyze_pair(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<(StatusCode, Json<AnalysisRow>), AppError> {
    let job = find_job(&state.db, req.job_id).await?;
    let candidate = find_candidate(&state.db, req.candidate_id).await?;

    let outcome = score_one(
        state.analyses.as_ref(),
        state.scorer.as_ref(),
        &job,
        &candidate,
    )
    .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.analysis)))
}

/// POST /api/v1/analyses/analyze-all
///
/// Scores every known candidate against the job. Once the job resolves and
/// at least one candidate exists, this always succeeds structurally —
/// per-candidate scoring failures are visible only inside each analysis.
pub async fn handle_analyze_all(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeAllRequest>,
) -> Result<Json<BatchOutcome>, AppError> {
    let job = find_job(&state.db, req.job_id).await?;

    // Upload order, so tie-breaks in the ranked output stay deterministic
    // across runs.
    let candidates =
        sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates ORDER BY created_at ASC")
            .fetch_all(&state.db)
            .await?;

    let outcome = run_batch(
        state.analyses.as_ref(),
        state.scorer.as_ref(),
        &job,
        &candidates,
    )
    .await?;

    Ok(Json(outcome))
}

/// GET /api/v1/analyses/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisRow>, AppError> {
    let analysis = sqlx::query_as::<_, AnalysisRow>("SELECT * FROM analyses WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))?;
    Ok(Json(analysis))
}

/// DELETE /api/v1/analyses/:id
///
/// The management escape hatch: deleting an analysis is the only way to get
/// a pair re-scored.
pub async fn handle_delete_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM analyses WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Analysis {id} not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}
