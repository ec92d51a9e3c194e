//! Subscription and revenue handlers
//!
//! Prices come from the catalog tables; no payment is captured here.
//!
//! Author: hephaex@gmail.com

use super::pence_to_gbp;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use para_core::catalog::{subscription_plans, PlanListing};
use para_core::models::{Donation, Subscription, SubscriptionStatus};
use para_core::{SubscriptionPlan, SubscriptionType};
use para_store::{Collection, Condition, FindQuery};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub plans: Vec<PlanListing>,
}

#[utoipa::path(
    get,
    path = "/api/subscription/plans",
    tag = "subscriptions",
    responses((status = 200, description = "Purchasable plans"))
)]
pub async fn list_plans(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.increment_requests();
    Json(PlansResponse {
        plans: subscription_plans(),
    })
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSubscriptionRequest {
    #[validate(length(min = 1, message = "User id is required"))]
    pub user_id: String,
    #[validate(email(message = "Invalid email"))]
    pub user_email: String,
    pub subscription_type: SubscriptionType,
    pub plan: SubscriptionPlan,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionCreated {
    pub subscription: Subscription,
    pub message: String,
}

/// Start a subscription; an investigator subscription also activates the
/// matching investigator profile.
#[utoipa::path(
    post,
    path = "/api/subscription/create",
    tag = "subscriptions",
    request_body = CreateSubscriptionRequest,
    responses((status = 201, description = "Subscription created", body = SubscriptionCreated))
)]
pub async fn create_subscription(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    req.validate()?;

    let subscription = Subscription::new(
        req.user_id,
        req.user_email,
        req.subscription_type,
        req.plan,
    );
    state
        .records
        .insert(Collection::Subscriptions, &subscription)
        .await?;

    if subscription.subscription_type == SubscriptionType::Investigator {
        let activated = state
            .records
            .raw()
            .update_where(
                Collection::Investigators,
                &[Condition::eq("user_id", subscription.user_id.as_str())],
                json!({
                    "subscription_status": SubscriptionStatus::Active,
                    "subscription_type": subscription.plan,
                    "subscription_expires": subscription.expires_at,
                }),
            )
            .await?;
        info!(user = %subscription.user_id, activated, "Investigator subscription started");
    }

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionCreated {
            subscription,
            message: "Subscription created successfully".to_string(),
        }),
    ))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionCheck {
    pub is_subscriber: bool,
    pub subscription: Option<Subscription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Whether a user holds an active subscription; a lapsed one is marked
/// expired on the way.
#[utoipa::path(
    get,
    path = "/api/subscription/check/{user_id}",
    tag = "subscriptions",
    params(("user_id" = String, Path, description = "User id")),
    responses((status = 200, description = "Subscription status", body = SubscriptionCheck))
)]
pub async fn check_subscription(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let active: Option<Subscription> = state
        .records
        .find_one(
            Collection::Subscriptions,
            &[
                Condition::eq("user_id", user_id.as_str()),
                Condition::eq("status", SubscriptionStatus::Active.as_str()),
            ],
        )
        .await?;

    let check = match active {
        None => SubscriptionCheck {
            is_subscriber: false,
            subscription: None,
            message: None,
        },
        Some(sub) if sub.is_expired_at(Utc::now()) => {
            state
                .records
                .raw()
                .update(
                    Collection::Subscriptions,
                    &sub.id,
                    json!({ "status": SubscriptionStatus::Expired }),
                )
                .await?;
            info!(subscription = %sub.id, "Subscription expired");
            SubscriptionCheck {
                is_subscriber: false,
                subscription: None,
                message: Some("Subscription expired".to_string()),
            }
        }
        Some(sub) => SubscriptionCheck {
            is_subscriber: true,
            subscription: Some(sub),
            message: None,
        },
    };

    Ok(Json(check))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CancelResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/subscription/cancel/{id}",
    tag = "subscriptions",
    params(("id" = String, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Cancelled", body = CancelResponse),
        (status = 404, description = "Subscription not found", body = crate::error::ApiError)
    )
)]
pub async fn cancel_subscription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let found = state
        .records
        .raw()
        .update(
            Collection::Subscriptions,
            &id,
            json!({ "status": SubscriptionStatus::Cancelled, "auto_renew": false }),
        )
        .await?;
    if !found {
        return Err(AppError::NotFound("Subscription".to_string()));
    }
    info!(subscription = %id, "Subscription cancelled");
    Ok(Json(CancelResponse {
        message: "Subscription cancelled".to_string(),
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueResponse {
    pub active_subscriptions: u64,
    pub investigator_subscriptions: u64,
    pub user_subscriptions: u64,
    pub monthly_recurring_revenue_pence: u64,
    pub monthly_recurring_revenue_gbp: f64,
    pub total_donations_pence: u64,
    pub total_donations_gbp: f64,
}

/// Subscription counts, recurring revenue from monthly plans and donation
/// totals
#[utoipa::path(
    get,
    path = "/api/admin/revenue",
    tag = "subscriptions",
    responses((status = 200, description = "Revenue summary", body = RevenueResponse))
)]
pub async fn revenue(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();
    let records = &state.records;
    let active = Condition::eq("status", SubscriptionStatus::Active.as_str());

    let subscriptions: Vec<Subscription> = records
        .find(
            Collection::Subscriptions,
            &FindQuery::new().filter(active.clone()),
        )
        .await?;
    let donations: Vec<Donation> = records
        .find(Collection::Donations, &FindQuery::new())
        .await?;

    let mrr = monthly_recurring_pence(&subscriptions);
    let donated: u64 = donations.iter().map(|d| u64::from(d.amount_gbp)).sum();

    let of_type = |kind: SubscriptionType| {
        subscriptions
            .iter()
            .filter(|s| s.subscription_type == kind)
            .count() as u64
    };

    Ok(Json(RevenueResponse {
        active_subscriptions: subscriptions.len() as u64,
        investigator_subscriptions: of_type(SubscriptionType::Investigator),
        user_subscriptions: of_type(SubscriptionType::User),
        monthly_recurring_revenue_pence: mrr,
        monthly_recurring_revenue_gbp: pence_to_gbp(mrr),
        total_donations_pence: donated,
        total_donations_gbp: pence_to_gbp(donated),
    }))
}

/// Only monthly plans count towards recurring revenue
fn monthly_recurring_pence(subscriptions: &[Subscription]) -> u64 {
    subscriptions
        .iter()
        .filter(|s| s.plan == SubscriptionPlan::Monthly)
        .map(|s| u64::from(s.amount_gbp))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_recurring_ignores_yearly() {
        let subs = vec![
            Subscription::new("a", "a@x.com", SubscriptionType::User, SubscriptionPlan::Monthly),
            Subscription::new(
                "b",
                "b@x.com",
                SubscriptionType::Investigator,
                SubscriptionPlan::Monthly,
            ),
            Subscription::new(
                "c",
                "c@x.com",
                SubscriptionType::Investigator,
                SubscriptionPlan::Yearly,
            ),
        ];
        assert_eq!(monthly_recurring_pence(&subs), 999 + 2000);
    }
}
