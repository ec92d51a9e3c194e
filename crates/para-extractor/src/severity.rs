//! Haunting severity assessment

use crate::markers::{apply_markers, score, split_values, MarkerTable};
use chrono::Utc;
use para_core::models::SeverityAssessment;

pub const MAX_LIST_ITEMS: usize = 5;

fn set_text(field: &mut String, value: &str) {
    if !value.is_empty() {
        *field = value.to_string();
    }
}

static SEVERITY_TABLE: &MarkerTable<SeverityAssessment> = &[
    ("SEVERITY", |s, v| set_text(&mut s.overall_severity, v)),
    ("SEVERITY_SCORE", |s, v| s.severity_score = score(v, 1, 100, 50)),
    ("PSYCHOLOGICAL", |s, v| set_text(&mut s.psychological_impact, v)),
    ("PSYCH_SCORE", |s, v| s.psychological_score = score(v, 1, 10, 5)),
    ("PHYSICAL", |s, v| set_text(&mut s.physical_danger, v)),
    ("PHYSICAL_SCORE", |s, v| s.physical_score = score(v, 1, 10, 3)),
    ("URGENCY", |s, v| set_text(&mut s.urgency_level, v)),
    ("ACTIONS", |s, v| s.recommended_actions = split_values(v)),
    ("WARNINGS", |s, v| s.warning_signs = split_values(v)),
];

/// Assessment before any model output has been read
pub fn pending_assessment() -> SeverityAssessment {
    SeverityAssessment {
        overall_severity: "Moderate".to_string(),
        severity_score: 50,
        psychological_impact: "Assessment pending".to_string(),
        psychological_score: 5,
        physical_danger: "Assessment pending".to_string(),
        physical_score: 3,
        urgency_level: "Normal".to_string(),
        recommended_actions: Vec::new(),
        warning_signs: Vec::new(),
        timestamp: Utc::now(),
    }
}

/// Cautious assessment substituted when the model is unreachable
pub fn unavailable_assessment() -> SeverityAssessment {
    SeverityAssessment {
        psychological_impact: "Assessment unavailable - please consult professional".to_string(),
        psychological_score: 5,
        physical_danger: "Unknown - exercise caution".to_string(),
        physical_score: 5,
        recommended_actions: vec![
            "Document all activity".to_string(),
            "Seek professional investigator".to_string(),
            "Consider property blessing".to_string(),
        ],
        warning_signs: vec![
            "Increased activity".to_string(),
            "Physical manifestations".to_string(),
            "Emotional disturbances".to_string(),
        ],
        ..pending_assessment()
    }
}

/// Parse a nine-marker severity response.
pub fn parse_severity(model_output: &str) -> SeverityAssessment {
    let mut assessment = pending_assessment();
    apply_markers(SEVERITY_TABLE, &mut assessment, model_output);
    assessment.recommended_actions.truncate(MAX_LIST_ITEMS);
    assessment.warning_signs.truncate(MAX_LIST_ITEMS);
    assessment
}
