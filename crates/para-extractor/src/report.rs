//! Structured report extraction
//!
//! Parses the 14-marker report format into an [`ExtractionResult`].
//! The parser is total: any input, including an empty string or garbage,
//! yields a complete result with defaults for whatever could not be read.
//!
//! Author: hephaex@gmail.com

use crate::markers::{apply_markers, leading_token, optional_value, split_values, MarkerTable};
use para_core::extraction::DEFAULT_WITNESS_COUNT;
use para_core::{ExtractionResult, GeoPoint, ReportCategory};

/// Report markers in priority order
pub const REPORT_MARKERS: [&str; 14] = [
    "TITLE",
    "CATEGORY",
    "HAUNTING_TYPE",
    "SUMMARY",
    "DETAILED_DESCRIPTION",
    "LOCATIONS",
    "DATES",
    "WITNESSES",
    "ENTITIES",
    "CREDIBILITY",
    "SEVERITY",
    "KEY_EVIDENCE",
    "RECOMMENDATIONS",
    "SIMILAR_CASES",
];

static REPORT_TABLE: &MarkerTable<ExtractionResult> = &[
    ("TITLE", |r, v| r.title = v.to_string()),
    ("CATEGORY", |r, v| r.category = ReportCategory::parse_or_other(v)),
    ("HAUNTING_TYPE", |r, v| r.haunting_type = optional_value(v)),
    ("SUMMARY", |r, v| r.summary = v.to_string()),
    ("DETAILED_DESCRIPTION", |r, v| {
        r.detailed_description = v.to_string()
    }),
    ("LOCATIONS", |r, v| r.locations = parse_locations(v)),
    ("DATES", |r, v| r.dates_mentioned = split_values(v)),
    ("WITNESSES", |r, v| r.witness_count = parse_witnesses(v)),
    ("ENTITIES", |r, v| r.entities_described = split_values(v)),
    ("CREDIBILITY", |r, v| r.credibility_assessment = v.to_string()),
    ("SEVERITY", |r, v| r.severity_assessment = optional_value(v)),
    ("KEY_EVIDENCE", |r, v| r.key_evidence = split_values(v)),
    ("RECOMMENDATIONS", |r, v| r.recommendations = split_values(v)),
    ("SIMILAR_CASES", |r, v| r.similar_cases = split_values(v)),
];

/// Parse model output in the report marker format.
pub fn parse_extraction(model_output: &str) -> ExtractionResult {
    let mut result = ExtractionResult::default();
    apply_markers(REPORT_TABLE, &mut result, model_output);
    result
}

/// `LOCATIONS` value: `|`-separated segments of `lat,lon[,address...]`.
/// Segments without a comma are dropped.
pub fn parse_locations(value: &str) -> Vec<GeoPoint> {
    split_values(value)
        .iter()
        .filter_map(|segment| parse_location(segment))
        .collect()
}

/// One location segment, `None` when it has fewer than two comma fields.
///
/// Parsed coordinates are kept as given, range checks belong to the
/// caller. Unreadable or non-finite coordinates fall back to the default
/// coordinate with the whole segment kept as the address.
pub fn parse_location(segment: &str) -> Option<GeoPoint> {
    let mut fields = segment.splitn(3, ',');
    let lat = fields.next()?;
    let lon = fields.next()?;

    let parsed = lat
        .trim()
        .parse::<f64>()
        .ok()
        .zip(lon.trim().parse::<f64>().ok())
        .filter(|(lat, lon)| lat.is_finite() && lon.is_finite());

    Some(match parsed {
        Some((latitude, longitude)) => GeoPoint {
            latitude,
            longitude,
            address: fields
                .next()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
        },
        None => GeoPoint::default_with_address(segment),
    })
}

/// `WITNESSES` value: leading token as a count, else 1
pub fn parse_witnesses(value: &str) -> u32 {
    leading_token(value).unwrap_or(DEFAULT_WITNESS_COUNT)
}
