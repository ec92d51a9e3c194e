//! Equipment review handlers
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
use chrono::Utc;
use para_core::catalog::is_equipment_category;
use para_core::models::{new_id, EquipmentReview};
use para_store::{Collection, Condition, FindQuery, Sort};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateEquipmentReviewRequest {
    #[validate(length(min = 1, message = "Product name is required"))]
    #[schema(example = "K2 Meter")]
    pub name: String,
    pub brand: String,
    /// One of the equipment categories
    #[schema(example = "EMF Detectors")]
    pub category: String,
    pub model_number: Option<String>,
    /// Budget, Mid-range or Professional
    pub price_range: String,
    pub purchase_link: Option<String>,
    pub image_url: Option<String>,
    pub reviewer_id: String,
    pub reviewer_name: String,
    /// "investigator" or "user"
    pub reviewer_type: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be 1-5"))]
    pub rating: u8,
    #[validate(length(min = 1, message = "Review title is required"))]
    pub review_title: String,
    pub review_text: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default = "yes")]
    pub recommended: bool,
    #[serde(default)]
    pub use_cases: Vec<String>,
}

fn yes() -> bool {
    true
}

#[utoipa::path(
    post,
    path = "/api/equipment",
    tag = "equipment",
    request_body = CreateEquipmentReviewRequest,
    responses(
        (status = 201, description = "Review created", body = EquipmentReview),
        (status = 400, description = "Invalid category or payload", body = crate::error::ApiError)
    )
)]
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEquipmentReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    if !is_equipment_category(&req.category) {
        return Err(AppError::BadRequest("Invalid category".to_string()));
    }
    req.validate()?;

    let review = EquipmentReview {
        id: new_id(),
        name: req.name,
        brand: req.brand,
        category: req.category,
        model_number: req.model_number,
        price_range: req.price_range,
        purchase_link: req.purchase_link,
        image_url: req.image_url,
        reviewer_id: req.reviewer_id,
        reviewer_name: req.reviewer_name,
        reviewer_type: req.reviewer_type,
        rating: req.rating,
        review_title: req.review_title,
        review_text: req.review_text,
        pros: req.pros,
        cons: req.cons,
        recommended: req.recommended,
        use_cases: req.use_cases,
        created_at: Utc::now(),
        helpful_votes: 0,
        verified_purchase: false,
    };
    state
        .records
        .insert(Collection::EquipmentReviews, &review)
        .await?;
    info!(id = %review.id, product = %review.name, "Equipment review created");

    Ok((StatusCode::CREATED, Json(review)))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListReviewsQuery {
    pub category: Option<String>,
    pub recommended: Option<bool>,
    pub min_rating: Option<u8>,
    #[param(default = 50)]
    pub limit: Option<usize>,
    #[param(default = 0)]
    pub skip: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewListResponse {
    pub reviews: Vec<EquipmentReview>,
    pub count: usize,
}

/// Reviews, most helpful first, then by rating
#[utoipa::path(
    get,
    path = "/api/equipment",
    tag = "equipment",
    params(ListReviewsQuery),
    responses((status = 200, description = "Reviews", body = ReviewListResponse))
)]
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListReviewsQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let query = FindQuery::new()
        .filter_opt(params.category, |c| Condition::eq("category", c))
        .filter_opt(params.recommended, |r| Condition::eq("recommended", r))
        .filter_opt(params.min_rating, |m| Condition::gte("rating", m))
        .sort(Sort::desc("helpful_votes"))
        .sort(Sort::desc("rating"))
        .skip(params.skip.unwrap_or(0))
        .limit(params.limit.unwrap_or(50));

    let reviews: Vec<EquipmentReview> = state
        .records
        .find(Collection::EquipmentReviews, &query)
        .await?;

    Ok(Json(ReviewListResponse {
        count: reviews.len(),
        reviews,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TopRatedQuery {
    pub category: Option<String>,
    #[param(default = 10)]
    pub limit: Option<usize>,
}

/// Review totals for one product name
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductRating {
    pub name: String,
    pub avg_rating: f64,
    pub review_count: u32,
    pub recommended_count: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopRatedResponse {
    pub top_equipment: Vec<ProductRating>,
}

/// Products ranked by average rating, then by number of reviews
#[utoipa::path(
    get,
    path = "/api/equipment/top-rated",
    tag = "equipment",
    params(TopRatedQuery),
    responses((status = 200, description = "Top products", body = TopRatedResponse))
)]
pub async fn top_rated(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopRatedQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let reviews: Vec<EquipmentReview> = state
        .records
        .find(
            Collection::EquipmentReviews,
            &FindQuery::new().filter_opt(params.category, |c| Condition::eq("category", c)),
        )
        .await?;

    let mut top_equipment = rank_products(&reviews);
    top_equipment.truncate(params.limit.unwrap_or(10));
    Ok(Json(TopRatedResponse { top_equipment }))
}

/// Group reviews by product name and rank the groups
pub(crate) fn rank_products(reviews: &[EquipmentReview]) -> Vec<ProductRating> {
    // name -> (rating sum, reviews, recommended)
    let mut groups: HashMap<&str, (u32, u32, u32)> = HashMap::new();
    for review in reviews {
        let entry = groups.entry(review.name.as_str()).or_default();
        entry.0 += u32::from(review.rating);
        entry.1 += 1;
        entry.2 += u32::from(review.recommended);
    }

    let mut ranked: Vec<ProductRating> = groups
        .into_iter()
        .map(|(name, (sum, count, recommended))| ProductRating {
            name: name.to_string(),
            avg_rating: round_to(f64::from(sum) / f64::from(count), 2),
            review_count: count,
            recommended_count: recommended,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.avg_rating
            .total_cmp(&a.avg_rating)
            .then(b.review_count.cmp(&a.review_count))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked
}

#[utoipa::path(
    get,
    path = "/api/equipment/{id}",
    tag = "equipment",
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review", body = EquipmentReview),
        (status = 404, description = "Review not found", body = crate::error::ApiError)
    )
)]
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let review: EquipmentReview = state
        .records
        .require(Collection::EquipmentReviews, &id, "Review")
        .await?;
    Ok(Json(review))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/equipment/{id}/helpful",
    tag = "equipment",
    params(("id" = String, Path, description = "Review id")),
    responses(
        (status = 200, description = "Vote counted", body = MessageResponse),
        (status = 404, description = "Review not found", body = crate::error::ApiError)
    )
)]
pub async fn mark_helpful(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    if !state
        .records
        .raw()
        .increment(Collection::EquipmentReviews, &id, "helpful_votes", 1)
        .await?
    {
        return Err(AppError::NotFound("Review".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Marked as helpful".to_string(),
    }))
}
