use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::analysis::scorer::ResumeScorer;
use crate::analysis::store::AnalysisStore;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// Pluggable scoring backend. Production: `LlmResumeScorer` over the
    /// Anthropic API. Tests substitute stubs.
    pub scorer: Arc<dyn ResumeScorer>,
    /// Analysis persistence behind a trait, so orchestration stays testable
    /// without a database.
    pub analyses: Arc<dyn AnalysisStore>,
}
