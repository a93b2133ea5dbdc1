use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A candidate, with the text extracted from their uploaded resume PDF.
///
/// `extracted_text` is written once at ingestion and never changes; only
/// `name` and `email` are editable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub pdf_key: String,
    pub extracted_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
