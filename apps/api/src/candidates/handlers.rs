//! Axum route handlers for the Candidates API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::{bad_upload, ingest_pdf};
use crate::models::candidate::CandidateRow;
use crate::state::AppState;

/// POST /api/v1/candidates
///
/// Multipart form: `name` (required), `email` (optional), `pdf` (required,
/// max 10 MB). The resume's text is extracted once here and is immutable
/// afterwards.
pub async fn handle_create_candidate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CandidateRow>), AppError> {
    let mut name: Option<String> = None;
    let mut email: Option<String> = None;
    let mut pdf: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("name") => name = Some(field.text().await.map_err(bad_upload)?),
            Some("email") => email = Some(field.text().await.map_err(bad_upload)?),
            Some("pdf") => {
                let filename = field.file_name().unwrap_or("resume.pdf").to_string();
                let data = field.bytes().await.map_err(bad_upload)?;
                pdf = Some((filename, data));
            }
            _ => {}
        }
    }

    let name = name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("name is required".to_string()))?;
    let email = email.filter(|e| !e.trim().is_empty());
    if let Some(email) = &email {
        if !email.contains('@') {
            return Err(AppError::Validation("email is invalid".to_string()));
        }
    }
    let (filename, data) =
        pdf.ok_or_else(|| AppError::Validation("pdf file is required".to_string()))?;

    let ingested = ingest_pdf(
        &state.s3,
        &state.config.s3_bucket,
        "candidates",
        &filename,
        data,
    )
    .await?;

    let candidate = sqlx::query_as::<_, CandidateRow>(
        r#"
        INSERT INTO candidates (id, name, email, pdf_key, extracted_text)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&name)
    .bind(&email)
    .bind(&ingested.key)
    .bind(&ingested.text)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(candidate)))
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateRow>>, AppError> {
    let candidates =
        sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates ORDER BY created_at DESC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(candidates))
}

/// GET /api/v1/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateRow>, AppError> {
    Ok(Json(find_candidate(&state.db, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCandidateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// PATCH /api/v1/candidates/:id
pub async fn handle_update_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCandidateRequest>,
) -> Result<Json<CandidateRow>, AppError> {
    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("name cannot be empty".to_string()));
        }
    }
    if let Some(email) = &req.email {
        if !email.contains('@') {
            return Err(AppError::Validation("email is invalid".to_string()));
        }
    }

    let candidate = sqlx::query_as::<_, CandidateRow>(
        r#"
        UPDATE candidates
        SET name = COALESCE($2, name),
            email = COALESCE($3, email),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.email)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;

    Ok(Json(candidate))
}

/// DELETE /api/v1/candidates/:id
///
/// Analyses for the candidate are removed in cascade.
pub async fn handle_delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM candidates WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Candidate {id} not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn find_candidate(pool: &PgPool, id: Uuid) -> Result<CandidateRow, AppError> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))
}
