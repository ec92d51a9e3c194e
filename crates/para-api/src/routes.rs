//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::handlers::{
    ads, ai_reports, bookings, catalog, equipment, hauntings, investigators, sightings,
    subscriptions,
};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

/// Routes served under `/api`; the bare `/api` root is registered by the
/// top-level router.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(catalog::categories))
        .route("/stats", get(sightings::stats))
        // Sightings
        .route(
            "/sightings",
            get(sightings::list_sightings).post(sightings::create_sighting),
        )
        .route("/sightings/nearby", post(sightings::nearby_sightings))
        .route("/sightings/:id", get(sightings::get_sighting))
        .route("/sightings/:id/rate", post(sightings::rate_sighting))
        .route("/sightings/:id/analyze", post(sightings::analyze_sighting))
        // Haunting reports
        .route(
            "/hauntings",
            get(hauntings::list_hauntings).post(hauntings::create_haunting),
        )
        .route("/hauntings/:id", get(hauntings::get_haunting))
        .route("/hauntings/:id/request-help", post(hauntings::request_help))
        // Investigators
        .route(
            "/investigators",
            get(investigators::list_investigators).post(investigators::create_investigator),
        )
        .route(
            "/investigators/:id",
            get(investigators::get_investigator).put(investigators::update_investigator),
        )
        .route(
            "/investigators/:id/review",
            post(investigators::review_investigator),
        )
        .route("/investigators/:id/donate", post(investigators::donate))
        // Bookings
        .route(
            "/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/bookings/:id/status", put(bookings::update_booking_status))
        // Equipment reviews
        .route(
            "/equipment",
            get(equipment::list_reviews).post(equipment::create_review),
        )
        .route("/equipment/top-rated", get(equipment::top_rated))
        .route("/equipment/:id", get(equipment::get_review))
        .route("/equipment/:id/helpful", post(equipment::mark_helpful))
        // Subscriptions and revenue
        .route("/subscription/plans", get(subscriptions::list_plans))
        .route(
            "/subscription/create",
            post(subscriptions::create_subscription),
        )
        .route(
            "/subscription/check/:user_id",
            get(subscriptions::check_subscription),
        )
        .route(
            "/subscription/cancel/:id",
            post(subscriptions::cancel_subscription),
        )
        .route("/admin/revenue", get(subscriptions::revenue))
        // Video ads
        .route("/ads", get(ads::list_ads).post(ads::create_ad))
        .route("/ads/pricing", get(ads::pricing))
        .route("/ads/rotation", get(ads::rotation))
        .route("/ads/:id", get(ads::get_ad))
        .route("/ads/:id/impression", post(ads::record_impression))
        .route("/ads/:id/click", post(ads::record_click))
        .route("/ads/:id/approve", put(ads::approve_ad))
        // Generated reports
        .route("/ai/generate-report", post(ai_reports::generate_report))
        .route(
            "/ai/generate-report/convert-to-sighting",
            post(ai_reports::convert_to_sighting),
        )
        .route(
            "/ai/generate-report/convert-to-haunting",
            post(ai_reports::convert_to_haunting),
        )
        .route("/ai/reports", get(ai_reports::list_reports))
        .route("/ai/reports/:id", get(ai_reports::get_report))
}
