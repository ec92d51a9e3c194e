//! Video advertising handlers
//!
//! Author: hephaex@gmail.com

use super::pence_to_gbp;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use para_core::catalog::{
    is_ad_category, AdPlan, AD_CATEGORIES, AD_INTRO_PERIOD_MONTHS, AD_MAX_VIDEO_SECONDS,
    AD_SUPPORTED_FORMATS,
};
use para_core::models::{new_id, AdStatus, VideoAd};
use para_store::{Collection, Condition, FindQuery};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct AdPlanListing {
    pub id: String,
    pub name: String,
    pub price_gbp: f64,
    pub price_pence: u32,
    pub duration_days: i64,
    pub description: String,
    pub is_intro: bool,
}

impl From<AdPlan> for AdPlanListing {
    fn from(plan: AdPlan) -> Self {
        Self {
            id: plan.as_str().to_string(),
            name: plan.display_name().to_string(),
            price_gbp: pence_to_gbp(u64::from(plan.price_pence())),
            price_pence: plan.price_pence(),
            duration_days: plan.duration_days(),
            description: plan.description().to_string(),
            is_intro: plan.is_intro(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdPricingResponse {
    pub plans: Vec<AdPlanListing>,
    pub categories: Vec<String>,
    pub max_video_duration_seconds: u32,
    pub supported_formats: Vec<String>,
    pub intro_period_months: u32,
    pub intro_offer: String,
}

#[utoipa::path(
    get,
    path = "/api/ads/pricing",
    tag = "ads",
    responses((status = 200, description = "Ad plans and constraints", body = AdPricingResponse))
)]
pub async fn pricing(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.increment_requests();
    Json(AdPricingResponse {
        plans: AdPlan::ALL.into_iter().map(AdPlanListing::from).collect(),
        categories: AD_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        max_video_duration_seconds: AD_MAX_VIDEO_SECONDS,
        supported_formats: AD_SUPPORTED_FORMATS.iter().map(|f| f.to_string()).collect(),
        intro_period_months: AD_INTRO_PERIOD_MONTHS,
        intro_offer: "£20/week for the first 3 months, then £50/week thereafter".to_string(),
    })
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateAdRequest {
    pub advertiser_name: String,
    #[validate(email(message = "Invalid advertiser email"))]
    pub advertiser_email: String,
    pub company_name: String,
    /// One of the advertising categories
    #[schema(example = "Podcast")]
    pub category: String,
    #[validate(length(min = 1, message = "Video URL is required"))]
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: String,
    pub click_url: String,
    /// Pages to show the ad on; empty means every page
    #[serde(default)]
    pub target_pages: Vec<String>,
    /// Unknown plan names are billed at the weekly introductory rate
    #[schema(example = "weekly_intro")]
    pub plan: String,
}

/// Submit an ad; it runs from now for the plan's duration once approved
#[utoipa::path(
    post,
    path = "/api/ads",
    tag = "ads",
    request_body = CreateAdRequest,
    responses(
        (status = 201, description = "Ad submitted for approval", body = VideoAd),
        (status = 400, description = "Invalid category or payload", body = crate::error::ApiError)
    )
)]
pub async fn create_ad(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAdRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    if !is_ad_category(&req.category) {
        return Err(AppError::BadRequest("Invalid category".to_string()));
    }
    req.validate()?;

    let plan = AdPlan::parse_or_intro(&req.plan);
    let now = Utc::now();
    let ad = VideoAd {
        id: new_id(),
        advertiser_name: req.advertiser_name,
        advertiser_email: req.advertiser_email,
        company_name: req.company_name,
        category: req.category,
        video_url: req.video_url,
        thumbnail_url: req.thumbnail_url,
        title: req.title,
        description: req.description,
        click_url: req.click_url,
        target_pages: req.target_pages,
        plan,
        amount_paid_gbp: plan.price_pence(),
        start_date: now,
        end_date: now + Duration::days(plan.duration_days()),
        impressions: 0,
        clicks: 0,
        status: AdStatus::Pending,
        approved: false,
        created_at: now,
        updated_at: now,
    };
    state.records.insert(Collection::VideoAds, &ad).await?;
    info!(id = %ad.id, plan = plan.as_str(), "Video ad submitted");

    Ok((StatusCode::CREATED, Json(ad)))
}

/// Conditions for an ad that may be shown right now
fn running_now() -> Vec<Condition> {
    vec![
        Condition::eq("status", "active"),
        Condition::eq("approved", true),
        Condition::gt("end_date", json!(Utc::now())),
    ]
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAdsQuery {
    /// Ignored unless `active_only` is false
    pub status: Option<AdStatus>,
    pub category: Option<String>,
    #[param(default = true)]
    pub active_only: Option<bool>,
    #[param(default = 10)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdListResponse {
    pub ads: Vec<VideoAd>,
    pub count: usize,
}

#[utoipa::path(
    get,
    path = "/api/ads",
    tag = "ads",
    params(ListAdsQuery),
    responses((status = 200, description = "Ads", body = AdListResponse))
)]
pub async fn list_ads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListAdsQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let mut query = FindQuery::new();
    if params.active_only.unwrap_or(true) {
        query.conditions.extend(running_now());
    } else if let Some(status) = params.status {
        query = query.filter(Condition::eq("status", json!(status)));
    }
    let query = query
        .filter_opt(params.category, |c| Condition::eq("category", c))
        .limit(params.limit.unwrap_or(10));

    let ads: Vec<VideoAd> = state.records.find(Collection::VideoAds, &query).await?;
    Ok(Json(AdListResponse {
        count: ads.len(),
        ads,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RotationQuery {
    /// Page being rendered; untargeted ads always qualify
    pub page: Option<String>,
    #[param(default = 5)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RotationResponse {
    pub ads: Vec<VideoAd>,
}

/// Running ads eligible for a page
#[utoipa::path(
    get,
    path = "/api/ads/rotation",
    tag = "ads",
    params(RotationQuery),
    responses((status = 200, description = "Ads to rotate", body = RotationResponse))
)]
pub async fn rotation(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RotationQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let mut query = FindQuery::new();
    query.conditions = running_now();
    let query = query
        .filter_opt(params.page, |page| {
            Condition::AnyOf(vec![
                Condition::contains("target_pages", page),
                Condition::IsEmpty("target_pages"),
            ])
        })
        .limit(params.limit.unwrap_or(5));

    let ads = state.records.find(Collection::VideoAds, &query).await?;
    Ok(Json(RotationResponse { ads }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImpressionResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/ads/{id}/impression",
    tag = "ads",
    params(("id" = String, Path, description = "Ad id")),
    responses(
        (status = 200, description = "Impression counted", body = ImpressionResponse),
        (status = 404, description = "Ad not found", body = crate::error::ApiError)
    )
)]
pub async fn record_impression(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    if !state
        .records
        .raw()
        .increment(Collection::VideoAds, &id, "impressions", 1)
        .await?
    {
        return Err(AppError::NotFound("Ad".to_string()));
    }
    Ok(Json(ImpressionResponse {
        message: "Impression recorded".to_string(),
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClickResponse {
    pub click_url: String,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/ads/{id}/click",
    tag = "ads",
    params(("id" = String, Path, description = "Ad id")),
    responses(
        (status = 200, description = "Click counted", body = ClickResponse),
        (status = 404, description = "Ad not found", body = crate::error::ApiError)
    )
)]
pub async fn record_click(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    if !state
        .records
        .raw()
        .increment(Collection::VideoAds, &id, "clicks", 1)
        .await?
    {
        return Err(AppError::NotFound("Ad".to_string()));
    }
    let ad: VideoAd = state.records.require(Collection::VideoAds, &id, "Ad").await?;
    Ok(Json(ClickResponse {
        click_url: ad.click_url,
        message: "Click recorded".to_string(),
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ApproveQuery {
    #[param(default = true)]
    pub approved: Option<bool>,
}

/// Approve (activate) or reject an ad
#[utoipa::path(
    put,
    path = "/api/ads/{id}/approve",
    tag = "ads",
    params(("id" = String, Path, description = "Ad id"), ApproveQuery),
    responses(
        (status = 200, description = "Updated ad", body = VideoAd),
        (status = 404, description = "Ad not found", body = crate::error::ApiError)
    )
)]
pub async fn approve_ad(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ApproveQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let approved = params.approved.unwrap_or(true);
    let status = if approved {
        AdStatus::Active
    } else {
        AdStatus::Rejected
    };

    if !state
        .records
        .raw()
        .update(
            Collection::VideoAds,
            &id,
            json!({ "approved": approved, "status": status, "updated_at": Utc::now() }),
        )
        .await?
    {
        return Err(AppError::NotFound("Ad".to_string()));
    }
    info!(ad = %id, approved, "Ad reviewed");

    let ad: VideoAd = state.records.require(Collection::VideoAds, &id, "Ad").await?;
    Ok(Json(ad))
}

#[utoipa::path(
    get,
    path = "/api/ads/{id}",
    tag = "ads",
    params(("id" = String, Path, description = "Ad id")),
    responses(
        (status = 200, description = "Ad", body = VideoAd),
        (status = 404, description = "Ad not found", body = crate::error::ApiError)
    )
)]
pub async fn get_ad(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let ad: VideoAd = state.records.require(Collection::VideoAds, &id, "Ad").await?;
    Ok(Json(ad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_listing() {
        let listing = AdPlanListing::from(AdPlan::MonthlyIntro);
        assert_eq!(listing.id, "monthly_intro");
        assert_eq!(listing.price_gbp, 80.0);
        assert_eq!(listing.duration_days, 30);
        assert!(listing.is_intro);
    }

    #[test]
    fn test_running_now_conditions() {
        let conditions = running_now();
        assert_eq!(conditions.len(), 3);
        assert_eq!(conditions[0], Condition::eq("status", "active"));
    }
}
