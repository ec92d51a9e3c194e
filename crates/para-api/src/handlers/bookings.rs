//! Booking handlers
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use para_core::models::{new_id, Booking, BookingStatus, Investigator};
use para_core::GeoPoint;
use para_store::{Collection, Condition, FindQuery, Sort};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

const MAX_LISTED_BOOKINGS: usize = 100;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateBookingRequest {
    pub investigator_id: String,
    pub haunting_report_id: Option<String>,
    #[validate(length(min = 1, message = "Client name is required"))]
    pub client_name: String,
    #[validate(email(message = "Invalid client email"))]
    pub client_email: String,
    pub client_phone: Option<String>,
    pub location: GeoPoint,
    #[serde(default)]
    pub preferred_dates: Vec<String>,
    pub message: String,
    pub service_requested: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = Booking),
        (status = 404, description = "Investigator not found", body = crate::error::ApiError)
    )
)]
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    req.validate()?;
    super::sightings::check_location(&req.location)?;

    let _: Investigator = state
        .records
        .require(Collection::Investigators, &req.investigator_id, "Investigator")
        .await?;

    let now = Utc::now();
    let booking = Booking {
        id: new_id(),
        investigator_id: req.investigator_id,
        // No accounts; the client is identified by e-mail
        client_user_id: req.client_email.clone(),
        haunting_report_id: req.haunting_report_id,
        client_name: req.client_name,
        client_email: req.client_email,
        client_phone: req.client_phone,
        location: req.location,
        preferred_dates: req.preferred_dates,
        message: req.message,
        service_requested: req.service_requested,
        status: BookingStatus::Pending,
        investigator_notes: None,
        created_at: now,
        updated_at: now,
    };
    state.records.insert(Collection::Bookings, &booking).await?;
    info!(id = %booking.id, investigator = %booking.investigator_id, "Booking created");

    Ok((StatusCode::CREATED, Json(booking)))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListBookingsQuery {
    pub investigator_id: Option<String>,
    pub client_email: Option<String>,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingListResponse {
    pub bookings: Vec<Booking>,
}

/// Bookings, newest first
#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "bookings",
    params(ListBookingsQuery),
    responses((status = 200, description = "Bookings", body = BookingListResponse))
)]
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListBookingsQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let query = FindQuery::new()
        .filter_opt(params.investigator_id, |i| Condition::eq("investigator_id", i))
        .filter_opt(params.client_email, |e| Condition::eq("client_email", e))
        .filter_opt(params.status, |s| Condition::eq("status", s.as_str()))
        .sort(Sort::desc("created_at"))
        .limit(MAX_LISTED_BOOKINGS);

    let bookings = state.records.find(Collection::Bookings, &query).await?;
    Ok(Json(BookingListResponse { bookings }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BookingStatusQuery {
    /// pending, accepted, declined, completed or cancelled
    pub status: String,
    pub notes: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/bookings/{id}/status",
    tag = "bookings",
    params(("id" = String, Path, description = "Booking id"), BookingStatusQuery),
    responses(
        (status = 200, description = "Updated booking", body = Booking),
        (status = 400, description = "Invalid status", body = crate::error::ApiError),
        (status = 404, description = "Booking not found", body = crate::error::ApiError)
    )
)]
pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<BookingStatusQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let status = BookingStatus::parse(&params.status)
        .ok_or_else(|| AppError::BadRequest("Invalid status".to_string()))?;

    let mut patch = json!({ "status": status.as_str(), "updated_at": Utc::now() });
    if let Some(notes) = params.notes.filter(|n| !n.is_empty()) {
        patch["investigator_notes"] = json!(notes);
    }

    if !state
        .records
        .raw()
        .update(Collection::Bookings, &id, patch)
        .await?
    {
        return Err(AppError::NotFound("Booking".to_string()));
    }
    info!(booking = %id, status = status.as_str(), "Booking status changed");

    let booking: Booking = state
        .records
        .require(Collection::Bookings, &id, "Booking")
        .await?;
    Ok(Json(booking))
}
