//! Generated report handlers
//!
//! Raw witness text goes through the model and the marker parser to become
//! a structured draft, which can then be filed as a sighting or a haunting
//! report.
//!
//! Author: hephaex@gmail.com

use super::hauntings::{submit_haunting, CreateHauntingRequest};
use super::sightings::{check_location, new_sighting, submit_sighting};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use para_core::models::{AiGeneratedReport, Visibility};
use para_core::ExtractionResult;
use para_store::{Collection, FindQuery, Sort};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GenerateReportRequest {
    #[validate(length(min = 1, message = "Raw text is required"))]
    #[schema(example = "Last night at the old mill near Pendle Hill three of us saw...")]
    pub raw_text: String,

    #[serde(default = "yes")]
    pub include_location_extraction: bool,

    #[serde(default = "yes")]
    pub include_media_suggestions: bool,

    /// "sighting", "haunting" or "auto"
    #[serde(default = "auto")]
    pub report_type: String,

    pub generator_user_id: Option<String>,
}

fn yes() -> bool {
    true
}

fn auto() -> String {
    "auto".to_string()
}

/// Generate a structured report from raw text.
///
/// Only model-derived reports are stored; when the model is unavailable
/// the fallback draft is returned without being persisted.
#[utoipa::path(
    post,
    path = "/api/ai/generate-report",
    tag = "ai",
    request_body = GenerateReportRequest,
    responses(
        (status = 200, description = "Generated report", body = AiGeneratedReport),
        (status = 400, description = "Empty input", body = crate::error::ApiError)
    )
)]
pub async fn generate_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    req.validate()?;

    let report = match state.analyzer.try_generate_report(&req.raw_text).await {
        Ok(mut extracted) => {
            if !req.include_location_extraction {
                extracted.locations.clear();
            }
            let mut report = AiGeneratedReport::from_text(req.raw_text, extracted);
            report.generator_user_id = req.generator_user_id;
            state.records.insert(Collection::AiReports, &report).await?;
            info!(
                id = %report.id,
                category = %report.report.category,
                locations = report.report.locations.len(),
                "Report generated"
            );
            report
        }
        Err(e) => {
            warn!("Report generation failed, returning fallback: {}", e);
            let fallback = ExtractionResult::unavailable(&req.raw_text);
            let mut report = AiGeneratedReport::from_text(req.raw_text, fallback);
            report.generator_user_id = req.generator_user_id;
            report
        }
    };

    Ok(Json(report))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConvertToSightingQuery {
    pub report_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SightingConverted {
    pub message: String,
    pub sighting_id: String,
}

/// File a stored report as a sighting at its first extracted location
#[utoipa::path(
    post,
    path = "/api/ai/generate-report/convert-to-sighting",
    tag = "ai",
    params(ConvertToSightingQuery),
    responses(
        (status = 200, description = "Sighting created", body = SightingConverted),
        (status = 400, description = "Extracted location out of range", body = crate::error::ApiError),
        (status = 404, description = "Report not found", body = crate::error::ApiError)
    )
)]
pub async fn convert_to_sighting(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConvertToSightingQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let stored: AiGeneratedReport = state
        .records
        .require(Collection::AiReports, &params.report_id, "Report")
        .await?;
    let draft = stored.report;
    let location = draft.primary_location();
    check_location(&location)?;

    let sighting = new_sighting(
        draft.title,
        draft.detailed_description,
        draft.category,
        location,
        Utc::now(),
        draft.witness_count,
    );
    let sighting = submit_sighting(&state, sighting).await?;

    Ok(Json(SightingConverted {
        message: "Sighting created from report".to_string(),
        sighting_id: sighting.id,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConvertToHauntingQuery {
    pub report_id: String,
    pub reporter_name: String,
    pub reporter_email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HauntingConverted {
    pub message: String,
    pub haunting_id: String,
}

/// File a stored report as a subscribers-only haunting report
#[utoipa::path(
    post,
    path = "/api/ai/generate-report/convert-to-haunting",
    tag = "ai",
    params(ConvertToHauntingQuery),
    responses(
        (status = 200, description = "Haunting report created", body = HauntingConverted),
        (status = 400, description = "Extracted location out of range", body = crate::error::ApiError),
        (status = 404, description = "Report not found", body = crate::error::ApiError)
    )
)]
pub async fn convert_to_haunting(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConvertToHauntingQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let stored: AiGeneratedReport = state
        .records
        .require(Collection::AiReports, &params.report_id, "Report")
        .await?;
    let draft = stored.report;
    let location = draft.primary_location();
    check_location(&location)?;

    let request = CreateHauntingRequest {
        property_type: "Other".to_string(),
        property_age: None,
        property_history: None,
        location,
        haunting_type: draft.haunting_type.unwrap_or_else(|| "Other".to_string()),
        activity_description: draft.detailed_description,
        frequency: "Occasional".to_string(),
        duration_months: 1,
        triggers: None,
        psychological_symptoms: Vec::new(),
        physical_symptoms: Vec::new(),
        witnesses: draft.witness_count,
        evidence_photos: Vec::new(),
        reporter_name: params.reporter_name,
        reporter_email: params.reporter_email,
        reporter_phone: None,
        visibility: Visibility::Subscribers,
        seeking_help: true,
        urgent: false,
    };
    let report = submit_haunting(&state, request.into_report()).await?;

    Ok(Json(HauntingConverted {
        message: "Haunting report created from AI report".to_string(),
        haunting_id: report.id,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListReportsQuery {
    #[param(default = 20)]
    pub limit: Option<usize>,
    #[param(default = 0)]
    pub skip: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportListResponse {
    pub reports: Vec<AiGeneratedReport>,
    pub count: usize,
}

/// Stored reports, newest first
#[utoipa::path(
    get,
    path = "/api/ai/reports",
    tag = "ai",
    params(ListReportsQuery),
    responses((status = 200, description = "Reports", body = ReportListResponse))
)]
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListReportsQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let query = FindQuery::new()
        .sort(Sort::desc("generated_at"))
        .skip(params.skip.unwrap_or(0))
        .limit(params.limit.unwrap_or(20));

    let reports: Vec<AiGeneratedReport> = state.records.find(Collection::AiReports, &query).await?;
    Ok(Json(ReportListResponse {
        count: reports.len(),
        reports,
    }))
}

#[utoipa::path(
    get,
    path = "/api/ai/reports/{id}",
    tag = "ai",
    params(("id" = String, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report", body = AiGeneratedReport),
        (status = 404, description = "Report not found", body = crate::error::ApiError)
    )
)]
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let report: AiGeneratedReport = state
        .records
        .require(Collection::AiReports, &id, "Report")
        .await?;
    Ok(Json(report))
}
