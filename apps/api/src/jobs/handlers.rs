//! Axum route handlers for the Jobs API.

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
use crate::models::job::JobRow;
use crate::state::AppState;

/// POST /api/v1/jobs
///
/// Multipart form: `title` (required), `description` (optional), `pdf`
/// (required, max 10 MB). The PDF's text is extracted once here and is
/// immutable afterwards.
pub async fn handle_create_job(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut pdf: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("title") => title = Some(field.text().await.map_err(bad_upload)?),
            Some("description") => description = Some(field.text().await.map_err(bad_upload)?),
            Some("pdf") => {
                let filename = field.file_name().unwrap_or("upload.pdf").to_string();
                let data = field.bytes().await.map_err(bad_upload)?;
                pdf = Some((filename, data));
            }
            _ => {}
        }
    }

    let title = title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("title is required".to_string()))?;
    let (filename, data) =
        pdf.ok_or_else(|| AppError::Validation("pdf file is required".to_string()))?;

    let ingested = ingest_pdf(&state.s3, &state.config.s3_bucket, "jobs", &filename, data).await?;

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs (id, title, description, pdf_key, extracted_text)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&title)
    .bind(&description)
    .bind(&ingested.key)
    .bind(&ingested.text)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    let jobs = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(jobs))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    Ok(Json(find_job(&state.db, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// PATCH /api/v1/jobs/:id
///
/// Title and description only; the extracted text never changes.
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<JobRow>, AppError> {
    if let Some(title) = &req.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }
    }

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET title = COALESCE($2, title),
            description = COALESCE($3, description),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.title)
    .bind(&req.description)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    Ok(Json(job))
}

/// DELETE /api/v1/jobs/:id
///
/// Analyses for the job are removed in cascade.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn find_job(pool: &PgPool, id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}
