//! Sighting credibility analysis

use crate::markers::{apply_markers, score, split_values, MarkerTable};
use chrono::Utc;
use para_core::models::SightingAnalysis;

pub const DEFAULT_CREDIBILITY_SCORE: u8 = 50;
pub const MAX_SIMILAR_CASES: usize = 3;
pub const MAX_INVESTIGATION_STEPS: usize = 4;

static ANALYSIS_TABLE: &MarkerTable<SightingAnalysis> = &[
    ("CREDIBILITY", |a, v| {
        a.credibility_score = score(v, 1, 100, DEFAULT_CREDIBILITY_SCORE)
    }),
    ("SUMMARY", |a, v| {
        if !v.is_empty() {
            a.analysis_summary = v.to_string();
        }
    }),
    ("SIMILAR CASES", |a, v| a.similar_cases = split_values(v)),
    ("INVESTIGATION STEPS", |a, v| {
        a.suggested_investigation_steps = split_values(v)
    }),
];

/// Analysis before any model output has been read
pub fn pending_analysis() -> SightingAnalysis {
    SightingAnalysis {
        credibility_score: DEFAULT_CREDIBILITY_SCORE,
        analysis_summary: "Analysis pending.".to_string(),
        similar_cases: Vec::new(),
        suggested_investigation_steps: Vec::new(),
        timestamp: Utc::now(),
    }
}

/// Analysis substituted when the model is unreachable
pub fn unavailable_analysis() -> SightingAnalysis {
    SightingAnalysis {
        credibility_score: DEFAULT_CREDIBILITY_SCORE,
        analysis_summary: "AI analysis unavailable. Manual review recommended.".to_string(),
        similar_cases: vec!["Unable to fetch similar cases".to_string()],
        suggested_investigation_steps: vec![
            "Document all evidence".to_string(),
            "Interview witnesses".to_string(),
            "Research location history".to_string(),
        ],
        timestamp: Utc::now(),
    }
}

/// Parse a `CREDIBILITY` / `SUMMARY` / `SIMILAR CASES` /
/// `INVESTIGATION STEPS` response.
pub fn parse_sighting_analysis(model_output: &str) -> SightingAnalysis {
    let mut analysis = pending_analysis();
    apply_markers(ANALYSIS_TABLE, &mut analysis, model_output);
    analysis.similar_cases.truncate(MAX_SIMILAR_CASES);
    analysis
        .suggested_investigation_steps
        .truncate(MAX_INVESTIGATION_STEPS);
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_analysis() {
        let a = parse_sighting_analysis(
            "CREDIBILITY: 72\n\
             SUMMARY: Consistent account from two witnesses.\n\
             SIMILAR CASES: Enfield | Borley Rectory | Amityville | Bell Witch\n\
             INVESTIGATION STEPS: Visit site | Check weather | Interview | Review CCTV | Extra",
        );
        assert_eq!(a.credibility_score, 72);
        assert_eq!(a.analysis_summary, "Consistent account from two witnesses.");
        assert_eq!(a.similar_cases, vec!["Enfield", "Borley Rectory", "Amityville"]);
        assert_eq!(a.suggested_investigation_steps.len(), 4);
    }

    #[test]
    fn test_defaults_on_garbage() {
        let a = parse_sighting_analysis("I cannot help with that.");
        assert_eq!(a.credibility_score, 50);
        assert_eq!(a.analysis_summary, "Analysis pending.");
        assert!(a.similar_cases.is_empty());
    }

    #[test]
    fn test_score_is_clamped_and_lenient() {
        assert_eq!(parse_sighting_analysis("CREDIBILITY: 85/100").credibility_score, 85);
        assert_eq!(parse_sighting_analysis("CREDIBILITY: 900").credibility_score, 100);
        assert_eq!(parse_sighting_analysis("CREDIBILITY: 0").credibility_score, 1);
        assert_eq!(parse_sighting_analysis("CREDIBILITY: high").credibility_score, 50);
    }

    #[test]
    fn test_unavailable_analysis() {
        let a = unavailable_analysis();
        assert_eq!(a.credibility_score, 50);
        assert_eq!(a.suggested_investigation_steps.len(), 3);
    }
}
