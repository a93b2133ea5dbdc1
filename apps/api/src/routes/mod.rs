pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis_handlers;
use crate::candidates::handlers as candidate_handlers;
use crate::ingest::MAX_PDF_BYTES;
use crate::jobs::handlers as job_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs API
        .route(
            "/api/v1/jobs",
            get(job_handlers::handle_list_jobs).post(job_handlers::handle_create_job),
        )
        .route(
            "/api/v1/jobs/:id",
            get(job_handlers::handle_get_job)
                .patch(job_handlers::handle_update_job)
                .delete(job_handlers::handle_delete_job),
        )
        // Candidates API
        .route(
            "/api/v1/candidates",
            get(candidate_handlers::handle_list_candidates)
                .post(candidate_handlers::handle_create_candidate),
        )
        .route(
            "/api/v1/candidates/:id",
            get(candidate_handlers::handle_get_candidate)
                .patch(candidate_handlers::handle_update_candidate)
                .delete(candidate_handlers::handle_delete_candidate),
        )
        // Analysis API
        .route(
            "/api/v1/analyses",
            get(analysis_handlers::handle_list_analyses)
                .post(analysis_handlers::handle_analyze_pair),
        )
        .route(
            "/api/v1/analyses/analyze-all",
            post(analysis_handlers::handle_analyze_all),
        )
        .route(
            "/api/v1/analyses/:id",
            get(analysis_handlers::handle_get_analysis)
                .delete(analysis_handlers::handle_delete_analysis),
        )
        // Room for the multipart envelope around a full-size PDF.
        .layer(DefaultBodyLimit::max(MAX_PDF_BYTES + 1024 * 1024))
        .with_state(state)
}
