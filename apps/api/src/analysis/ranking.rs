//! Deterministic ordering of completed analyses.

use crate::models::analysis::AnalysisRow;

/// Sorts analyses by fit score, descending. The sort is stable, so equal
/// scores keep the order they were merged in. Recomputed on every batch
/// response, never persisted.
pub fn rank_by_fit(analyses: &mut [AnalysisRow]) {
    analyses.sort_by(|a, b| b.fit_score.cmp(&a.fit_score));
}
