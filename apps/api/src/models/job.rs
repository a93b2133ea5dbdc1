use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A job opening, with the text extracted from its uploaded description PDF.
///
/// `extracted_text` is written once at ingestion and never changes; only
/// `title` and `description` are editable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub pdf_key: String,
    pub extracted_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
