//! Prompt templates
//!
//! Each template ends with the exact marker layout its parser reads back,
//! so any change here must be mirrored in the matching marker table.

use para_core::catalog::{HAUNTING_TYPES, SEVERITY_LEVELS};
use para_core::models::{HauntingReport, Sighting};
use para_core::{GenerationOptions, ReportCategory};

pub const REPORT_OPTIONS: GenerationOptions = GenerationOptions {
    max_tokens: 2000,
    temperature: 0.7,
};

pub const ANALYSIS_OPTIONS: GenerationOptions = GenerationOptions {
    max_tokens: 500,
    temperature: 0.7,
};

pub const SEVERITY_OPTIONS: GenerationOptions = GenerationOptions {
    max_tokens: 800,
    temperature: 0.5,
};

/// Prompt that turns raw witness text into the 14-marker report format
pub fn report_prompt(raw_text: &str) -> String {
    let categories = ReportCategory::names().join(", ");
    let haunting_types = HAUNTING_TYPES.join(", ");
    let severities = SEVERITY_LEVELS.join("/");

    format!(
        r#"You are an experienced paranormal researcher. Read the raw material below and turn it into a structured report.

RAW INPUT:
{raw_text}

For each field:
- TITLE: a short, descriptive title
- CATEGORY: exactly one of [{categories}]
- HAUNTING_TYPE: one of [{haunting_types}], or N/A when this is not a haunting
- SUMMARY: two or three sentences
- DETAILED_DESCRIPTION: a full narrative of the events on a single line
- LOCATIONS: each place as "lat,lng,address"; estimate coordinates from place names, assume the UK when unclear
- DATES: every date or period mentioned
- WITNESSES: the number of witnesses as a single integer
- ENTITIES: entities or phenomena described
- CREDIBILITY: Low, Medium or High followed by a short reason
- SEVERITY: {severities} for hauntings, otherwise N/A
- KEY_EVIDENCE: the evidence mentioned
- RECOMMENDATIONS: next steps for an investigator
- SIMILAR_CASES: known historical cases that resemble this one

Separate multiple values with " | ". Reply with exactly these lines and nothing else:
TITLE: [title]
CATEGORY: [category]
HAUNTING_TYPE: [type or N/A]
SUMMARY: [summary]
DETAILED_DESCRIPTION: [description]
LOCATIONS: [location1] | [location2]
DATES: [date1] | [date2]
WITNESSES: [number]
ENTITIES: [entity1] | [entity2]
CREDIBILITY: [assessment]
SEVERITY: [severity or N/A]
KEY_EVIDENCE: [evidence1] | [evidence2]
RECOMMENDATIONS: [rec1] | [rec2]
SIMILAR_CASES: [case1] | [case2]"#
    )
}

/// Prompt for a credibility analysis of a submitted sighting
pub fn sighting_prompt(sighting: &Sighting) -> String {
    let location = match &sighting.location.address {
        Some(address) => address.clone(),
        None => format!(
            "Lat: {}, Lon: {}",
            sighting.location.latitude, sighting.location.longitude
        ),
    };

    format!(
        r#"Analyze this paranormal sighting report:
Title: {title}
Category: {category}
Description: {description}
Location: {location}
Witnesses: {witnesses}
Date: {date}

Give a credibility score from 1 to 100, a two or three sentence analysis, two or three similar historical cases and three or four investigation steps.

Format:
CREDIBILITY: [score]
SUMMARY: [summary]
SIMILAR CASES: [case1] | [case2] | [case3]
INVESTIGATION STEPS: [step1] | [step2] | [step3]"#,
        title = sighting.title,
        category = sighting.category,
        description = sighting.description,
        witnesses = sighting.witness_count,
        date = sighting.date_occurred.to_rfc3339(),
    )
}

fn listed(items: &[String]) -> String {
    if items.is_empty() {
        "None reported".to_string()
    } else {
        items.join(", ")
    }
}

/// Prompt for a safety-focused severity assessment of a haunting report
pub fn severity_prompt(report: &HauntingReport) -> String {
    format!(
        r#"Assess the severity of this haunting report, paying attention to psychological and physical safety.

Property Type: {property_type}
Property History: {history}
Haunting Type: {haunting_type}
Activity Description: {activity}
Frequency: {frequency}
Duration: {duration} months
Psychological Symptoms Reported: {psych}
Physical Symptoms Reported: {physical}
Witnesses: {witnesses}
Urgent: {urgent}

Scores: overall 1-100, psychological 1-10, physical 1-10. Severity is one of {levels}.
List three to five recommended actions and the warning signs to watch for.

Format response as:
SEVERITY: [level]
SEVERITY_SCORE: [1-100]
PSYCHOLOGICAL: [description]
PSYCH_SCORE: [1-10]
PHYSICAL: [description]
PHYSICAL_SCORE: [1-10]
URGENCY: [level]
ACTIONS: [action1] | [action2] | [action3]
WARNINGS: [warning1] | [warning2] | [warning3]"#,
        property_type = report.property_type,
        history = report.property_history.as_deref().unwrap_or("Unknown"),
        haunting_type = report.haunting_type,
        activity = report.activity_description,
        frequency = report.frequency,
        duration = report.duration_months,
        psych = listed(&report.psychological_symptoms),
        physical = listed(&report.physical_symptoms),
        witnesses = report.witnesses,
        urgent = report.urgent,
        levels = SEVERITY_LEVELS.join("/"),
    )
}
