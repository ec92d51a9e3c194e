//! Sighting handlers: submission, listing, ratings, analysis and the
//! nearby search
//!
//! Author: hephaex@gmail.com

use super::round_to;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use para_core::models::{new_id, Rating, Sighting, SubscriptionStatus};
use para_core::{find_nearby, GeoPoint, ReportCategory};
use para_store::{Collection, Condition, FindQuery, Sort};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// New sighting submission
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSightingRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    #[schema(example = "Grey lady on the stairs")]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// One of the sighting categories
    #[schema(example = "Ghost/Spirit")]
    pub category: String,

    pub location: GeoPoint,

    pub date_occurred: DateTime<Utc>,

    #[serde(default = "one")]
    pub witness_count: u32,

    pub reporter_name: Option<String>,

    #[validate(email(message = "Invalid reporter email"))]
    pub reporter_email: Option<String>,

    #[serde(default)]
    pub evidence_photos: Vec<String>,
}

fn one() -> u32 {
    1
}

/// Reject coordinates outside the valid latitude/longitude ranges
pub(crate) fn check_location(location: &GeoPoint) -> Result<(), AppError> {
    if location.is_valid() {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid coordinates".to_string()))
    }
}

/// Build a sighting with no ratings or analysis yet
pub(crate) fn new_sighting(
    title: String,
    description: String,
    category: ReportCategory,
    location: GeoPoint,
    date_occurred: DateTime<Utc>,
    witness_count: u32,
) -> Sighting {
    let now = Utc::now();
    Sighting {
        id: new_id(),
        title,
        description,
        category,
        location,
        date_occurred,
        evidence_photos: Vec::new(),
        witness_count,
        created_at: now,
        updated_at: now,
        ratings: Vec::new(),
        ai_analysis: None,
        verified: false,
        reporter_name: None,
        reporter_email: None,
    }
}

/// Store a sighting after attaching its analysis
pub(crate) async fn submit_sighting(state: &AppState, mut sighting: Sighting) -> Result<Sighting, AppError> {
    sighting.ai_analysis = Some(state.analyzer.analyze_sighting(&sighting).await);
    state.records.insert(Collection::Sightings, &sighting).await?;
    info!(id = %sighting.id, category = %sighting.category, "Sighting created");
    Ok(sighting)
}

#[utoipa::path(
    post,
    path = "/api/sightings",
    tag = "sightings",
    request_body = CreateSightingRequest,
    responses(
        (status = 201, description = "Sighting created", body = Sighting),
        (status = 400, description = "Invalid category or payload", body = crate::error::ApiError)
    )
)]
pub async fn create_sighting(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSightingRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    req.validate()?;
    check_location(&req.location)?;

    let category = ReportCategory::parse(&req.category)
        .ok_or_else(|| AppError::BadRequest("Invalid category".to_string()))?;

    let mut sighting = new_sighting(
        req.title,
        req.description,
        category,
        req.location,
        req.date_occurred,
        req.witness_count,
    );
    sighting.evidence_photos = req.evidence_photos;
    sighting.reporter_name = req.reporter_name;
    sighting.reporter_email = req.reporter_email;

    let sighting = submit_sighting(&state, sighting).await?;
    Ok((StatusCode::CREATED, Json(sighting)))
}

/// Query parameters for sighting listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSightingsQuery {
    /// Filter by category name
    pub category: Option<String>,

    pub verified: Option<bool>,

    #[param(default = 100)]
    pub limit: Option<usize>,

    #[param(default = 0)]
    pub skip: Option<usize>,
}

/// List sightings, newest first
#[utoipa::path(
    get,
    path = "/api/sightings",
    tag = "sightings",
    params(ListSightingsQuery),
    responses((status = 200, description = "Sightings", body = [Sighting]))
)]
pub async fn list_sightings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListSightingsQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let query = FindQuery::new()
        .filter_opt(params.category, |c| Condition::eq("category", c))
        .filter_opt(params.verified, |v| Condition::eq("verified", v))
        .sort(Sort::desc("created_at"))
        .skip(params.skip.unwrap_or(0))
        .limit(params.limit.unwrap_or(100));

    let sightings: Vec<Sighting> = state.records.find(Collection::Sightings, &query).await?;
    Ok(Json(sightings))
}

#[utoipa::path(
    get,
    path = "/api/sightings/{id}",
    tag = "sightings",
    params(("id" = String, Path, description = "Sighting id")),
    responses(
        (status = 200, description = "Sighting", body = Sighting),
        (status = 404, description = "Sighting not found", body = crate::error::ApiError)
    )
)]
pub async fn get_sighting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let sighting: Sighting = state
        .records
        .require(Collection::Sightings, &id, "Sighting")
        .await?;
    Ok(Json(sighting))
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RateSightingRequest {
    pub user_id: String,

    #[validate(range(min = 1, max = 5, message = "Score must be 1-5"))]
    pub score: u8,

    pub comment: Option<String>,
}

/// Append a 1-5 rating to a sighting
#[utoipa::path(
    post,
    path = "/api/sightings/{id}/rate",
    tag = "sightings",
    params(("id" = String, Path, description = "Sighting id")),
    request_body = RateSightingRequest,
    responses(
        (status = 200, description = "Updated sighting", body = Sighting),
        (status = 400, description = "Score out of range", body = crate::error::ApiError),
        (status = 404, description = "Sighting not found", body = crate::error::ApiError)
    )
)]
pub async fn rate_sighting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<RateSightingRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    req.validate()?;

    let rating = Rating {
        user_id: req.user_id,
        score: req.score,
        comment: req.comment,
        timestamp: Utc::now(),
    };

    let store = state.records.raw();
    if !store
        .push(Collection::Sightings, &id, "ratings", serde_json::to_value(&rating)?)
        .await?
    {
        return Err(AppError::NotFound("Sighting".to_string()));
    }
    store
        .update(Collection::Sightings, &id, json!({ "updated_at": Utc::now() }))
        .await?;

    let sighting: Sighting = state
        .records
        .require(Collection::Sightings, &id, "Sighting")
        .await?;
    Ok(Json(sighting))
}

/// Re-run the model analysis for a sighting
#[utoipa::path(
    post,
    path = "/api/sightings/{id}/analyze",
    tag = "sightings",
    params(("id" = String, Path, description = "Sighting id")),
    responses(
        (status = 200, description = "Sighting with fresh analysis", body = Sighting),
        (status = 404, description = "Sighting not found", body = crate::error::ApiError)
    )
)]
pub async fn analyze_sighting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let mut sighting: Sighting = state
        .records
        .require(Collection::Sightings, &id, "Sighting")
        .await?;

    let analysis = state.analyzer.analyze_sighting(&sighting).await;
    let now = Utc::now();
    state
        .records
        .raw()
        .update(
            Collection::Sightings,
            &id,
            json!({ "ai_analysis": analysis, "updated_at": now }),
        )
        .await?;

    sighting.ai_analysis = Some(analysis);
    sighting.updated_at = now;
    Ok(Json(sighting))
}

/// Nearby search origin and radius
#[derive(Debug, Deserialize, ToSchema)]
pub struct NearbyRequest {
    #[schema(example = 51.5074)]
    pub latitude: f64,

    #[schema(example = -0.1278)]
    pub longitude: f64,

    /// Inclusive radius; the configured default when omitted
    #[schema(example = 50.0)]
    pub radius_km: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NearbySighting {
    #[serde(flatten)]
    pub sighting: Sighting,

    /// Great-circle distance from the origin, rounded to 2 decimals
    pub distance_km: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NearbyResponse {
    pub sightings: Vec<NearbySighting>,
    pub count: usize,
}

/// Sightings within a radius of a point, nearest first
#[utoipa::path(
    post,
    path = "/api/sightings/nearby",
    tag = "sightings",
    request_body = NearbyRequest,
    responses(
        (status = 200, description = "Sightings in range", body = NearbyResponse),
        (status = 400, description = "Invalid coordinates or radius", body = crate::error::ApiError)
    )
)]
pub async fn nearby_sightings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NearbyRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let origin = GeoPoint::new(req.latitude, req.longitude);
    check_location(&origin)?;
    let radius_km = req.radius_km.unwrap_or(state.config.geo.default_radius_km);
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(AppError::BadRequest("Invalid radius".to_string()));
    }

    let candidates: Vec<Sighting> = state
        .records
        .find(
            Collection::Sightings,
            &FindQuery::new().limit(state.nearby_scan_limit()),
        )
        .await?;
    let scanned = candidates.len();

    let sightings: Vec<NearbySighting> = find_nearby(candidates, &origin, radius_km)
        .into_iter()
        .map(|n| NearbySighting {
            sighting: n.item,
            distance_km: round_to(n.distance_km, 2),
        })
        .collect();

    debug!(scanned, matched = sightings.len(), radius_km, "Nearby search");

    Ok(Json(NearbyResponse {
        count: sightings.len(),
        sightings,
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_sightings: u64,
    pub verified_sightings: u64,
    /// Categories with at least one sighting, most common first
    pub categories: Vec<CategoryCount>,
    pub haunting_reports: u64,
    pub active_investigators: u64,
    pub equipment_reviews: u64,
}

/// Platform-wide counters
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "sightings",
    responses((status = 200, description = "Counters", body = StatsResponse))
)]
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let records = &state.records;

    let mut categories = Vec::new();
    for category in ReportCategory::ALL {
        let count = records
            .count(
                Collection::Sightings,
                &[Condition::eq("category", category.as_str())],
            )
            .await?;
        if count > 0 {
            categories.push(CategoryCount {
                category: category.as_str().to_string(),
                count,
            });
        }
    }
    categories.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(Json(StatsResponse {
        total_sightings: records.count(Collection::Sightings, &[]).await?,
        verified_sightings: records
            .count(Collection::Sightings, &[Condition::eq("verified", true)])
            .await?,
        categories,
        haunting_reports: records.count(Collection::HauntingReports, &[]).await?,
        active_investigators: records
            .count(
                Collection::Investigators,
                &[Condition::eq(
                    "subscription_status",
                    SubscriptionStatus::Active.as_str(),
                )],
            )
            .await?,
        equipment_reviews: records.count(Collection::EquipmentReviews, &[]).await?,
    }))
}
