//! Structured record produced from language-model report text

use crate::catalog::ReportCategory;
use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_TITLE: &str = "Untitled Report";
pub const DEFAULT_CREDIBILITY: &str = "Medium - Requires investigation";
pub const DEFAULT_WITNESS_COUNT: u32 = 1;

/// A report draft extracted from free-form model output.
///
/// Sequence fields are never absent; an empty `Vec` is the floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractionResult {
    pub title: String,
    pub category: ReportCategory,
    pub haunting_type: Option<String>,
    pub summary: String,
    pub detailed_description: String,
    #[serde(default)]
    pub locations: Vec<GeoPoint>,
    #[serde(default)]
    pub dates_mentioned: Vec<String>,
    pub witness_count: u32,
    #[serde(default)]
    pub entities_described: Vec<String>,
    pub credibility_assessment: String,
    pub severity_assessment: Option<String>,
    #[serde(default)]
    pub key_evidence: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub similar_cases: Vec<String>,
}

impl Default for ExtractionResult {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            category: ReportCategory::Other,
            haunting_type: None,
            summary: String::new(),
            detailed_description: String::new(),
            locations: Vec::new(),
            dates_mentioned: Vec::new(),
            witness_count: DEFAULT_WITNESS_COUNT,
            entities_described: Vec::new(),
            credibility_assessment: DEFAULT_CREDIBILITY.to_string(),
            severity_assessment: None,
            key_evidence: Vec::new(),
            recommendations: Vec::new(),
            similar_cases: Vec::new(),
        }
    }
}

impl ExtractionResult {
    /// Result substituted when the text-generation collaborator fails
    pub fn unavailable(raw_input: &str) -> Self {
        Self {
            title: "Report from Submitted Information".to_string(),
            summary: "AI analysis unavailable. Please review the raw input below.".to_string(),
            detailed_description: raw_input.to_string(),
            credibility_assessment: "Unable to assess - manual review required".to_string(),
            recommendations: vec![
                "Review the submitted information manually".to_string(),
                "Contact witnesses if possible".to_string(),
                "Document any additional details".to_string(),
            ],
            ..Self::default()
        }
    }

    /// Use the raw submission as the narrative when the model gave none
    pub fn with_fallback_description(mut self, raw_input: &str) -> Self {
        if self.detailed_description.trim().is_empty() {
            self.detailed_description = raw_input.to_string();
        }
        self
    }

    /// First extracted location, or the default coordinate
    pub fn primary_location(&self) -> GeoPoint {
        self.locations.first().cloned().unwrap_or_else(|| {
            let (lat, lon) = crate::geo::DEFAULT_LOCATION;
            GeoPoint::new(lat, lon)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let r = ExtractionResult::default();
        assert_eq!(r.title, DEFAULT_TITLE);
        assert_eq!(r.category, ReportCategory::Other);
        assert_eq!(r.witness_count, 1);
        assert!(r.locations.is_empty());
        assert!(r.haunting_type.is_none());
    }

    #[test]
    fn test_unavailable_keeps_raw_input() {
        let r = ExtractionResult::unavailable("strange lights over the moor");
        assert_eq!(r.detailed_description, "strange lights over the moor");
        assert_eq!(r.recommendations.len(), 3);
        assert_eq!(r.witness_count, 1);
    }

    #[test]
    fn test_fallback_description_only_when_empty() {
        let r = ExtractionResult::default().with_fallback_description("raw");
        assert_eq!(r.detailed_description, "raw");

        let r = ExtractionResult {
            detailed_description: "model narrative".to_string(),
            ..Default::default()
        }
        .with_fallback_description("raw");
        assert_eq!(r.detailed_description, "model narrative");
    }

    #[test]
    fn test_primary_location_defaults_to_london() {
        let p = ExtractionResult::default().primary_location();
        assert_eq!((p.latitude, p.longitude), (51.5074, -0.1278));
        assert!(p.address.is_none());
    }

    #[test]
    fn test_null_sentinels_serialize_as_null() {
        let json = serde_json::to_value(ExtractionResult::default()).unwrap();
        assert!(json["haunting_type"].is_null());
        assert!(json["severity_assessment"].is_null());
        assert_eq!(json["category"], "Other");
        assert!(json["key_evidence"].as_array().unwrap().is_empty());
    }
}
