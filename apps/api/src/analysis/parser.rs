//! Reply parsing for the scoring service.
//!
//! The service replies in natural language that should contain one JSON
//! object. `parse_fit_result` is total: a reply that cannot be decoded
//! degrades to a fixed low-information record instead of failing, so a
//! malformed reply never aborts a batch and never reaches the end user
//! as an error.

use serde::{Deserialize, Deserializer, Serialize};

/// Structured result of scoring one resume against one job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Semantically 0–100. Not clamped: whatever number the service returns
    /// is passed through, truncated to an integer if fractional.
    #[serde(alias = "fit_score", deserialize_with = "lenient_int")]
    pub score: i32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    #[serde(alias = "analysis_details")]
    pub summary: String,
}

/// The record a reply degrades to when it cannot be parsed.
pub fn unparsable_fallback() -> FitResult {
    FitResult {
        score: 50,
        strengths: vec!["Resume submitted successfully".to_string()],
        weaknesses: vec!["Analysis incomplete - manual review needed".to_string()],
        summary: "Unable to parse AI analysis. Please review manually.".to_string(),
    }
}

/// Parses a raw scoring-service reply into a `FitResult`. Total: never fails.
pub fn parse_fit_result(reply: &str) -> FitResult {
    extract_json_object(reply)
        .and_then(|blob| serde_json::from_str::<FitResult>(blob).ok())
        .unwrap_or_else(unparsable_fallback)
}

/// Returns the substring between the first `{` and the last `}`, inclusive.
///
/// Not a real JSON scanner. The greedy span covers braces inside string
/// values, but a decorative brace after the real object drags trailing text
/// into the blob and the decode falls back to the fixed record.
fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&reply[start..=end])
}

/// Accepts integer or fractional scores; fractional values truncate toward
/// zero, values outside the i32 range saturate.
fn lenient_int<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(i) = n.as_i64() {
        Ok(i.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    } else if let Some(f) = n.as_f64() {
        Ok(f as i32)
    } else {
        Err(serde::de::Error::custom("fit score is not a representable number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_with_surrounding_prose() {
        let reply = r#"Here you go: {"fit_score": 82, "strengths": ["A","B"], "weaknesses": ["C"], "analysis_details": "Good fit"}"#;
        let result = parse_fit_result(reply);
        assert_eq!(result.score, 82);
        assert_eq!(result.strengths, vec!["A", "B"]);
        assert_eq!(result.weaknesses, vec!["C"]);
        assert_eq!(result.summary, "Good fit");
    }

    #[test]
    fn test_no_braces_returns_exact_fallback() {
        let result = parse_fit_result("no braces here");
        assert_eq!(result.score, 50);
        assert_eq!(result.strengths, vec!["Resume submitted successfully"]);
        assert_eq!(
            result.weaknesses,
            vec!["Analysis incomplete - manual review needed"]
        );
        assert_eq!(
            result.summary,
            "Unable to parse AI analysis. Please review manually."
        );
    }

    #[test]
    fn test_empty_reply_falls_back() {
        assert_eq!(parse_fit_result(""), unparsable_fallback());
    }

    #[test]
    fn test_score_and_summary_field_aliases() {
        let reply = r#"{"score": 70, "strengths": ["A"], "weaknesses": ["B"], "summary": "ok"}"#;
        let result = parse_fit_result(reply);
        assert_eq!(result.score, 70);
        assert_eq!(result.summary, "ok");
    }

    #[test]
    fn test_braces_inside_string_values_are_covered() {
        let reply = r#"{"fit_score": 61, "strengths": ["knows {braces}"], "weaknesses": ["none"], "analysis_details": "Summary with {notes} inside"}"#;
        let result = parse_fit_result(reply);
        assert_eq!(result.score, 61);
        assert_eq!(result.summary, "Summary with {notes} inside");
    }

    #[test]
    fn test_decorative_trailing_brace_defeats_the_heuristic() {
        // The greedy rfind('}') grabs the decorative brace, the blob no
        // longer decodes, and the reply degrades to the fallback.
        let reply = r#"{"fit_score": 90, "strengths": ["A"], "weaknesses": ["B"], "analysis_details": "x"} and one more }"#;
        assert_eq!(parse_fit_result(reply), unparsable_fallback());
    }

    #[test]
    fn test_closing_brace_before_opening_falls_back() {
        assert_eq!(parse_fit_result("} then {"), unparsable_fallback());
    }

    #[test]
    fn test_missing_required_field_falls_back() {
        let reply = r#"{"fit_score": 80, "strengths": ["A"], "analysis_details": "x"}"#;
        assert_eq!(parse_fit_result(reply), unparsable_fallback());
    }

    #[test]
    fn test_fractional_score_truncates() {
        let reply = r#"{"fit_score": 82.7, "strengths": ["A"], "weaknesses": ["B"], "analysis_details": "x"}"#;
        assert_eq!(parse_fit_result(reply).score, 82);
    }

    #[test]
    fn test_out_of_range_score_passes_through() {
        let reply = r#"{"fit_score": 140, "strengths": ["A"], "weaknesses": ["B"], "analysis_details": "x"}"#;
        assert_eq!(parse_fit_result(reply).score, 140);
    }

    #[test]
    fn test_non_numeric_score_falls_back() {
        let reply = r#"{"fit_score": "high", "strengths": ["A"], "weaknesses": ["B"], "analysis_details": "x"}"#;
        assert_eq!(parse_fit_result(reply), unparsable_fallback());
    }

    #[test]
    fn test_markdown_fenced_reply_still_parses() {
        let reply = "```json\n{\"fit_score\": 55, \"strengths\": [\"A\"], \"weaknesses\": [\"B\"], \"analysis_details\": \"fenced\"}\n```";
        let result = parse_fit_result(reply);
        assert_eq!(result.score, 55);
        assert_eq!(result.summary, "fenced");
    }
}
