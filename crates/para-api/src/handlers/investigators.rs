//! Investigator directory, reviews and donations
//!
//! Author: hephaex@gmail.com

use super::{pence_to_gbp, round_to};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use para_core::models::{
    new_id, Donation, Investigator, InvestigatorReview, InvestigatorService, SubscriptionStatus,
};
use para_core::{GeoPoint, SubscriptionPlan};
use para_store::{Collection, Condition, FindQuery, Sort};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Reviews embedded in an investigator profile
const PROFILE_REVIEWS: usize = 20;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateInvestigatorRequest {
    #[validate(length(min = 1, message = "User id is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    pub phone: Option<String>,
    pub profile_photo: Option<String>,
    pub bio: String,
    pub years_experience: u32,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    pub notable_cases: Option<String>,
    #[serde(default)]
    pub services: Vec<InvestigatorService>,
    #[serde(default)]
    pub service_areas: Vec<String>,
    pub location: Option<GeoPoint>,
    #[serde(default = "yes")]
    pub willing_to_travel: bool,
    #[serde(default = "default_travel_radius")]
    pub travel_radius_km: u32,
    #[serde(default)]
    pub equipment_list: Vec<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
}

fn yes() -> bool {
    true
}

fn default_travel_radius() -> u32 {
    100
}

impl CreateInvestigatorRequest {
    /// New profiles start unsubscribed, unrated and unverified
    fn into_investigator(self) -> Investigator {
        let now = Utc::now();
        Investigator {
            id: new_id(),
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            profile_photo: self.profile_photo,
            bio: self.bio,
            years_experience: self.years_experience,
            specializations: self.specializations,
            certifications: self.certifications,
            notable_cases: self.notable_cases,
            services: self.services,
            service_areas: self.service_areas,
            location: self.location,
            willing_to_travel: self.willing_to_travel,
            travel_radius_km: self.travel_radius_km,
            equipment_list: self.equipment_list,
            website: self.website,
            social_links: self.social_links,
            subscription_type: SubscriptionPlan::Monthly,
            subscription_status: SubscriptionStatus::Inactive,
            subscription_expires: None,
            featured: false,
            total_investigations: 0,
            rating: 0.0,
            review_count: 0,
            created_at: now,
            updated_at: now,
            verified: false,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/investigators",
    tag = "investigators",
    request_body = CreateInvestigatorRequest,
    responses(
        (status = 201, description = "Profile created", body = Investigator),
        (status = 400, description = "Profile already exists", body = crate::error::ApiError)
    )
)]
pub async fn create_investigator(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateInvestigatorRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    req.validate()?;
    if let Some(location) = &req.location {
        super::sightings::check_location(location)?;
    }

    let existing: Option<Investigator> = state
        .records
        .find_one(
            Collection::Investigators,
            &[Condition::eq("user_id", req.user_id.as_str())],
        )
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest("Profile already exists".to_string()));
    }

    let investigator = req.into_investigator();
    state
        .records
        .insert(Collection::Investigators, &investigator)
        .await?;
    info!(id = %investigator.id, user = %investigator.user_id, "Investigator profile created");

    Ok((StatusCode::CREATED, Json(investigator)))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListInvestigatorsQuery {
    /// Exact specialization
    pub specialization: Option<String>,
    /// Case-insensitive match against any service area
    pub service_area: Option<String>,
    pub featured: Option<bool>,
    /// Only investigators with an active subscription
    #[param(default = true)]
    pub active_only: Option<bool>,
    #[param(default = 50)]
    pub limit: Option<usize>,
    #[param(default = 0)]
    pub skip: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvestigatorListResponse {
    pub investigators: Vec<Investigator>,
    pub count: usize,
}

/// Directory listing: featured first, then by rating
#[utoipa::path(
    get,
    path = "/api/investigators",
    tag = "investigators",
    params(ListInvestigatorsQuery),
    responses((status = 200, description = "Investigators", body = InvestigatorListResponse))
)]
pub async fn list_investigators(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListInvestigatorsQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let active = params
        .active_only
        .unwrap_or(true)
        .then_some(SubscriptionStatus::Active);

    let query = FindQuery::new()
        .filter_opt(active, |s| Condition::eq("subscription_status", s.as_str()))
        .filter_opt(params.specialization, |s| {
            Condition::contains("specializations", s)
        })
        .filter_opt(params.service_area, |a| {
            Condition::contains_text("service_areas", a)
        })
        .filter_opt(params.featured, |f| Condition::eq("featured", f))
        .sort(Sort::desc("featured"))
        .sort(Sort::desc("rating"))
        .skip(params.skip.unwrap_or(0))
        .limit(params.limit.unwrap_or(50));

    let investigators: Vec<Investigator> = state
        .records
        .find(Collection::Investigators, &query)
        .await?;

    Ok(Json(InvestigatorListResponse {
        count: investigators.len(),
        investigators,
    }))
}

/// Profile with its most recent reviews
#[derive(Debug, Serialize, ToSchema)]
pub struct InvestigatorDetail {
    #[serde(flatten)]
    pub investigator: Investigator,
    pub reviews: Vec<InvestigatorReview>,
}

async fn load_detail(state: &AppState, id: &str) -> Result<InvestigatorDetail, AppError> {
    let investigator: Investigator = state
        .records
        .require(Collection::Investigators, id, "Investigator")
        .await?;
    let reviews = state
        .records
        .find(
            Collection::InvestigatorReviews,
            &FindQuery::new()
                .filter(Condition::eq("investigator_id", id))
                .sort(Sort::desc("timestamp"))
                .limit(PROFILE_REVIEWS),
        )
        .await?;
    Ok(InvestigatorDetail {
        investigator,
        reviews,
    })
}

#[utoipa::path(
    get,
    path = "/api/investigators/{id}",
    tag = "investigators",
    params(("id" = String, Path, description = "Investigator id")),
    responses(
        (status = 200, description = "Profile with latest reviews", body = InvestigatorDetail),
        (status = 404, description = "Investigator not found", body = crate::error::ApiError)
    )
)]
pub async fn get_investigator(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    Ok(Json(load_detail(&state, &id).await?))
}

/// Editable profile fields; absent fields are left unchanged
#[derive(Debug, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateInvestigatorRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specializations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notable_cases: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<InvestigatorService>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_areas: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub willing_to_travel: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_radius_km: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

#[utoipa::path(
    put,
    path = "/api/investigators/{id}",
    tag = "investigators",
    params(("id" = String, Path, description = "Investigator id")),
    request_body = UpdateInvestigatorRequest,
    responses(
        (status = 200, description = "Updated profile", body = InvestigatorDetail),
        (status = 404, description = "Investigator not found", body = crate::error::ApiError)
    )
)]
pub async fn update_investigator(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateInvestigatorRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    req.validate()?;
    if let Some(location) = &req.location {
        super::sightings::check_location(location)?;
    }

    let mut patch = serde_json::to_value(&req)?;
    if let Some(fields) = patch.as_object_mut() {
        fields.insert("updated_at".to_string(), json!(Utc::now()));
    }

    if !state
        .records
        .raw()
        .update(Collection::Investigators, &id, patch)
        .await?
    {
        return Err(AppError::NotFound("Investigator".to_string()));
    }

    Ok(Json(load_detail(&state, &id).await?))
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct ReviewQuery {
    pub user_id: String,
    pub user_name: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be 1-5"))]
    pub rating: u8,
    pub review_text: String,
    pub case_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub message: String,
    pub review_id: String,
}

/// Record a review and refresh the profile's average rating
#[utoipa::path(
    post,
    path = "/api/investigators/{id}/review",
    tag = "investigators",
    params(("id" = String, Path, description = "Investigator id"), ReviewQuery),
    responses(
        (status = 200, description = "Review stored", body = ReviewResponse),
        (status = 400, description = "Rating out of range", body = crate::error::ApiError),
        (status = 404, description = "Investigator not found", body = crate::error::ApiError)
    )
)]
pub async fn review_investigator(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ReviewQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    params.validate()?;

    let _: Investigator = state
        .records
        .require(Collection::Investigators, &id, "Investigator")
        .await?;

    let review = InvestigatorReview {
        id: new_id(),
        investigator_id: id.clone(),
        user_id: params.user_id,
        user_name: params.user_name,
        rating: params.rating,
        review_text: params.review_text,
        case_type: params.case_type,
        timestamp: Utc::now(),
    };
    state
        .records
        .insert(Collection::InvestigatorReviews, &review)
        .await?;

    let reviews: Vec<InvestigatorReview> = state
        .records
        .find(
            Collection::InvestigatorReviews,
            &FindQuery::new().filter(Condition::eq("investigator_id", id.as_str())),
        )
        .await?;
    let (rating, review_count) = average_rating(&reviews);
    state
        .records
        .raw()
        .update(
            Collection::Investigators,
            &id,
            json!({ "rating": rating, "review_count": review_count }),
        )
        .await?;
    info!(investigator = %id, rating, review_count, "Review submitted");

    Ok(Json(ReviewResponse {
        message: "Review submitted".to_string(),
        review_id: review.id,
    }))
}

/// Mean rating to one decimal place, and the number of reviews
fn average_rating(reviews: &[InvestigatorReview]) -> (f64, u32) {
    if reviews.is_empty() {
        return (0.0, 0);
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    let mean = f64::from(total) / reviews.len() as f64;
    (round_to(mean, 1), reviews.len() as u32)
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct DonationRequest {
    pub donor_id: Option<String>,
    pub donor_name: String,
    /// Amount in pence
    #[validate(range(min = 1, message = "Amount must be positive"))]
    #[schema(example = 500)]
    pub amount_gbp: u32,
    pub message: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DonationResponse {
    pub message: String,
    pub donation_id: String,
    /// Amount in pounds
    pub amount_gbp: f64,
}

#[utoipa::path(
    post,
    path = "/api/investigators/{id}/donate",
    tag = "investigators",
    params(("id" = String, Path, description = "Investigator id")),
    request_body = DonationRequest,
    responses(
        (status = 200, description = "Donation recorded", body = DonationResponse),
        (status = 404, description = "Investigator not found", body = crate::error::ApiError)
    )
)]
pub async fn donate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<DonationRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    req.validate()?;

    let _: Investigator = state
        .records
        .require(Collection::Investigators, &id, "Investigator")
        .await?;

    let donation = Donation {
        id: new_id(),
        investigator_id: id,
        donor_id: req.donor_id,
        donor_name: req.donor_name,
        amount_gbp: req.amount_gbp,
        message: req.message,
        anonymous: req.anonymous,
        created_at: Utc::now(),
    };
    state.records.insert(Collection::Donations, &donation).await?;

    Ok(Json(DonationResponse {
        message: "Donation recorded".to_string(),
        donation_id: donation.id,
        amount_gbp: pence_to_gbp(u64::from(donation.amount_gbp)),
    }))
}
