//! Haunting report handlers
//!
//! Reports other than public ones are only shown in full to subscribers;
//! everyone else gets a preview.
//!
//! Author: hephaex@gmail.com

use super::sightings::check_location;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use para_core::models::{
    new_id, Booking, BookingStatus, HauntingReport, HauntingStatus, Investigator, Visibility,
};
use para_core::GeoPoint;
use para_store::{Collection, Condition, FindQuery, Sort};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateHauntingRequest {
    /// House, Apartment, Business, Land or Other
    #[schema(example = "House")]
    pub property_type: String,
    pub property_age: Option<String>,
    pub property_history: Option<String>,
    pub location: GeoPoint,
    #[validate(length(min = 1, message = "Haunting type is required"))]
    #[schema(example = "Intelligent Haunting")]
    pub haunting_type: String,
    #[validate(length(min = 1, message = "Activity description is required"))]
    pub activity_description: String,
    /// Daily, Weekly, Monthly or Occasional
    pub frequency: String,
    pub duration_months: u32,
    pub triggers: Option<String>,
    #[serde(default)]
    pub psychological_symptoms: Vec<String>,
    #[serde(default)]
    pub physical_symptoms: Vec<String>,
    #[serde(default = "one")]
    pub witnesses: u32,
    #[serde(default)]
    pub evidence_photos: Vec<String>,
    pub reporter_name: String,
    #[validate(email(message = "Invalid reporter email"))]
    pub reporter_email: String,
    pub reporter_phone: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default = "yes")]
    pub seeking_help: bool,
    #[serde(default)]
    pub urgent: bool,
}

fn one() -> u32 {
    1
}

fn yes() -> bool {
    true
}

impl CreateHauntingRequest {
    pub(crate) fn into_report(self) -> HauntingReport {
        let now = Utc::now();
        HauntingReport {
            id: new_id(),
            property_type: self.property_type,
            property_age: self.property_age,
            property_history: self.property_history,
            location: self.location,
            haunting_type: self.haunting_type,
            activity_description: self.activity_description,
            frequency: self.frequency,
            duration_months: self.duration_months,
            triggers: self.triggers,
            psychological_symptoms: self.psychological_symptoms,
            physical_symptoms: self.physical_symptoms,
            witnesses: self.witnesses,
            evidence_photos: self.evidence_photos,
            evidence_audio: Vec::new(),
            evidence_video: Vec::new(),
            reporter_name: self.reporter_name,
            reporter_email: self.reporter_email,
            reporter_phone: self.reporter_phone,
            visibility: self.visibility,
            seeking_help: self.seeking_help,
            urgent: self.urgent,
            severity_assessment: None,
            created_at: now,
            updated_at: now,
            status: HauntingStatus::Pending,
            assigned_investigator_id: None,
        }
    }
}

/// Store a haunting report after attaching its severity assessment
pub(crate) async fn submit_haunting(
    state: &AppState,
    mut report: HauntingReport,
) -> Result<HauntingReport, AppError> {
    report.severity_assessment = Some(state.analyzer.assess_severity(&report).await);
    state
        .records
        .insert(Collection::HauntingReports, &report)
        .await?;
    info!(id = %report.id, haunting_type = %report.haunting_type, "Haunting report created");
    Ok(report)
}

#[utoipa::path(
    post,
    path = "/api/hauntings",
    tag = "hauntings",
    request_body = CreateHauntingRequest,
    responses(
        (status = 201, description = "Report created", body = HauntingReport),
        (status = 400, description = "Invalid payload", body = crate::error::ApiError)
    )
)]
pub async fn create_haunting(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateHauntingRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    req.validate()?;
    check_location(&req.location)?;

    let report = submit_haunting(&state, req.into_report()).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Location shown in a preview
#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewLocation {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeverityPreview {
    pub overall_severity: String,
}

/// Redacted view of a report for non-subscribers
#[derive(Debug, Serialize, ToSchema)]
pub struct HauntingPreview {
    pub id: String,
    pub haunting_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<PreviewLocation>,
    pub severity_assessment: SeverityPreview,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub preview: bool,
    pub message: String,
}

impl HauntingPreview {
    /// Preview without location or timestamps
    fn of(report: &HauntingReport) -> Self {
        Self {
            id: report.id.clone(),
            haunting_type: report.haunting_type.clone(),
            location: None,
            severity_assessment: SeverityPreview {
                overall_severity: report
                    .severity_assessment
                    .as_ref()
                    .map(|s| s.overall_severity.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
            },
            created_at: None,
            preview: true,
            message: "Subscribe to view full report details".to_string(),
        }
    }

    /// Listing preview, which also carries the coordinates and creation time
    fn listed(report: &HauntingReport) -> Self {
        Self {
            location: Some(PreviewLocation {
                lat: report.location.latitude,
                lon: report.location.longitude,
            }),
            created_at: Some(report.created_at),
            ..Self::of(report)
        }
    }
}

/// A report as a given reader may see it
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum HauntingView {
    Full(Box<HauntingReport>),
    Preview(HauntingPreview),
}

impl HauntingView {
    fn for_reader(report: HauntingReport, is_subscriber: bool, listed: bool) -> Self {
        if is_subscriber || report.visibility == Visibility::Public {
            Self::Full(Box::new(report))
        } else if listed {
            Self::Preview(HauntingPreview::listed(&report))
        } else {
            Self::Preview(HauntingPreview::of(&report))
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListHauntingsQuery {
    /// Only honoured for subscribers; everyone else sees public reports
    pub visibility: Option<Visibility>,
    pub status: Option<HauntingStatus>,
    pub seeking_help: Option<bool>,
    #[param(default = false)]
    pub is_subscriber: Option<bool>,
    #[param(default = 50)]
    pub limit: Option<usize>,
    #[param(default = 0)]
    pub skip: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HauntingListResponse {
    pub reports: Vec<HauntingView>,
    pub count: usize,
}

/// List haunting reports, newest first
#[utoipa::path(
    get,
    path = "/api/hauntings",
    tag = "hauntings",
    params(ListHauntingsQuery),
    responses((status = 200, description = "Reports", body = HauntingListResponse))
)]
pub async fn list_hauntings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListHauntingsQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let is_subscriber = params.is_subscriber.unwrap_or(false);

    let visibility = if is_subscriber {
        params.visibility
    } else {
        Some(Visibility::Public)
    };

    let query = FindQuery::new()
        .filter_opt(visibility, |v| Condition::eq("visibility", v.as_str()))
        .filter_opt(params.status, |s| Condition::eq("status", s.as_str()))
        .filter_opt(params.seeking_help, |h| Condition::eq("seeking_help", h))
        .sort(Sort::desc("created_at"))
        .skip(params.skip.unwrap_or(0))
        .limit(params.limit.unwrap_or(50));

    let reports: Vec<HauntingReport> = state
        .records
        .find(Collection::HauntingReports, &query)
        .await?;

    let reports: Vec<HauntingView> = reports
        .into_iter()
        .map(|r| HauntingView::for_reader(r, is_subscriber, true))
        .collect();

    Ok(Json(HauntingListResponse {
        count: reports.len(),
        reports,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReaderQuery {
    #[param(default = false)]
    pub is_subscriber: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/hauntings/{id}",
    tag = "hauntings",
    params(("id" = String, Path, description = "Report id"), ReaderQuery),
    responses(
        (status = 200, description = "Full report or preview", body = HauntingView),
        (status = 404, description = "Report not found", body = crate::error::ApiError)
    )
)]
pub async fn get_haunting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ReaderQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let report: HauntingReport = state
        .records
        .require(Collection::HauntingReports, &id, "Report")
        .await?;
    Ok(Json(HauntingView::for_reader(
        report,
        params.is_subscriber.unwrap_or(false),
        false,
    )))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RequestHelpQuery {
    pub investigator_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestHelpResponse {
    pub message: String,
    pub booking_id: String,
}

/// Turn a report into a booking request with an investigator
#[utoipa::path(
    post,
    path = "/api/hauntings/{id}/request-help",
    tag = "hauntings",
    params(("id" = String, Path, description = "Report id"), RequestHelpQuery),
    responses(
        (status = 200, description = "Booking created", body = RequestHelpResponse),
        (status = 404, description = "Report or investigator not found", body = crate::error::ApiError)
    )
)]
pub async fn request_help(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<RequestHelpQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let report: HauntingReport = state
        .records
        .require(Collection::HauntingReports, &id, "Report")
        .await?;
    let investigator: Investigator = state
        .records
        .require(Collection::Investigators, &params.investigator_id, "Investigator")
        .await?;

    let now = Utc::now();
    let booking = Booking {
        id: new_id(),
        investigator_id: investigator.id,
        client_user_id: report.reporter_email.clone(),
        haunting_report_id: Some(report.id),
        client_name: report.reporter_name,
        client_email: report.reporter_email,
        client_phone: report.reporter_phone,
        location: report.location,
        preferred_dates: Vec::new(),
        message: format!("Help requested for haunting report: {}", report.haunting_type),
        service_requested: Some("Investigation".to_string()),
        status: BookingStatus::Pending,
        investigator_notes: None,
        created_at: now,
        updated_at: now,
    };
    state.records.insert(Collection::Bookings, &booking).await?;
    info!(booking = %booking.id, investigator = %booking.investigator_id, "Help requested");

    Ok(Json(RequestHelpResponse {
        message: "Help request sent to investigator".to_string(),
        booking_id: booking.id,
    }))
}
