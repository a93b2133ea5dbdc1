//! The scoring core shared by the batch and single-pair orchestration paths.
//!
//! Orchestrators decide failure policy (degrade vs propagate); the scorer
//! only produces a `FitResult` or a typed failure. Carried in `AppState` as
//! `Arc<dyn ResumeScorer>` so tests can substitute a stub.

use async_trait::async_trait;

use crate::analysis::parser::{parse_fit_result, FitResult};
use crate::analysis::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM};
use crate::llm_client::{LlmClient, ScoringError};

/// One scoring request: job description text vs resume text.
#[async_trait]
pub trait ResumeScorer: Send + Sync {
    async fn evaluate(
        &self,
        job_text: &str,
        resume_text: &str,
    ) -> Result<FitResult, ScoringError>;
}

/// Production scorer: one LLM call, reply decoded by the lenient parser.
/// A reply that arrives but does not parse is not a failure here — it
/// degrades inside `parse_fit_result`.
pub struct LlmResumeScorer {
    llm: LlmClient,
}

impl LlmResumeScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeScorer for LlmResumeScorer {
    async fn evaluate(
        &self,
        job_text: &str,
        resume_text: &str,
    ) -> Result<FitResult, ScoringError> {
        let prompt = build_analysis_prompt(job_text, resume_text);
        let reply = self.llm.call_text(&prompt, ANALYSIS_SYSTEM).await?;
        Ok(parse_fit_result(&reply))
    }
}
