//! Prompt construction for resume fit analysis.

/// System instruction framing the service as an expert evaluator.
pub const ANALYSIS_SYSTEM: &str = "You are an expert recruiter and HR professional. \
    Analyze resumes against job descriptions and provide honest, constructive feedback.";

/// Builds the user prompt for one (job, candidate) scoring request.
/// The reply is expected to contain exactly one JSON object in the shape
/// decoded by `parser::parse_fit_result`.
pub fn build_analysis_prompt(job_text: &str, resume_text: &str) -> String {
    format!(
        r#"Please analyze this resume against the job description and provide:

JOB DESCRIPTION:
{job_text}

RESUME:
{resume_text}

Please provide your analysis in the following JSON format:
{{
    "fit_score": [number between 0-100],
    "strengths": [array of 3-5 key strengths],
    "weaknesses": [array of 3-5 key weaknesses],
    "analysis_details": "Brief summary of the analysis"
}}

Focus on:
- Technical skills alignment
- Experience relevance
- Education requirements
- Soft skills match
- Overall fit for the role

Be honest and constructive in your assessment."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_both_texts() {
        let prompt = build_analysis_prompt("Rust backend role", "Seven years of Rust");
        assert!(prompt.contains("Rust backend role"));
        assert!(prompt.contains("Seven years of Rust"));
    }

    #[test]
    fn test_prompt_names_every_expected_field() {
        let prompt = build_analysis_prompt("jd", "resume");
        for field in ["fit_score", "strengths", "weaknesses", "analysis_details"] {
            assert!(prompt.contains(field), "prompt is missing {field}");
        }
    }
}
