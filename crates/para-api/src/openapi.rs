//! OpenAPI document
//!
//! Served as JSON at `/api-docs/openapi.json` with Swagger UI at `/swagger-ui`.

use crate::error::ApiError;
use crate::handlers::{
    ads, ai_reports, bookings, catalog, equipment, hauntings, health, investigators, sightings,
    subscriptions,
};
use para_core::models::{
    AdStatus, AiGeneratedReport, Booking, BookingStatus, Donation, EquipmentReview,
    HauntingReport, HauntingStatus, Investigator, InvestigatorReview, InvestigatorService, Rating,
    SeverityAssessment, Sighting, SightingAnalysis, Subscription, SubscriptionStatus, VideoAd,
    Visibility,
};
use para_core::catalog::AdPlan;
use para_core::{ExtractionResult, GeoPoint, ReportCategory, SubscriptionPlan, SubscriptionType};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ParaInvestigate API",
        description = "Sighting reports, haunting cases, investigator marketplace and report generation",
        contact(name = "hephaex", email = "hephaex@gmail.com")
    ),
    paths(
        health::health_check,
        health::readiness_check,
        health::metrics,
        catalog::root,
        catalog::categories,
        sightings::create_sighting,
        sightings::list_sightings,
        sightings::get_sighting,
        sightings::rate_sighting,
        sightings::analyze_sighting,
        sightings::nearby_sightings,
        sightings::stats,
        hauntings::create_haunting,
        hauntings::list_hauntings,
        hauntings::get_haunting,
        hauntings::request_help,
        investigators::create_investigator,
        investigators::list_investigators,
        investigators::get_investigator,
        investigators::update_investigator,
        investigators::review_investigator,
        investigators::donate,
        bookings::create_booking,
        bookings::list_bookings,
        bookings::update_booking_status,
        equipment::create_review,
        equipment::list_reviews,
        equipment::top_rated,
        equipment::get_review,
        equipment::mark_helpful,
        subscriptions::list_plans,
        subscriptions::create_subscription,
        subscriptions::check_subscription,
        subscriptions::cancel_subscription,
        subscriptions::revenue,
        ads::pricing,
        ads::create_ad,
        ads::list_ads,
        ads::rotation,
        ads::record_impression,
        ads::record_click,
        ads::approve_ad,
        ads::get_ad,
        ai_reports::generate_report,
        ai_reports::convert_to_sighting,
        ai_reports::convert_to_haunting,
        ai_reports::list_reports,
        ai_reports::get_report,
    ),
    components(schemas(
        ApiError,
        // Domain records
        GeoPoint,
        ReportCategory,
        Rating,
        SightingAnalysis,
        Sighting,
        SeverityAssessment,
        Visibility,
        HauntingStatus,
        HauntingReport,
        InvestigatorService,
        Investigator,
        InvestigatorReview,
        BookingStatus,
        Booking,
        EquipmentReview,
        SubscriptionType,
        SubscriptionPlan,
        SubscriptionStatus,
        Subscription,
        Donation,
        AdPlan,
        AdStatus,
        VideoAd,
        ExtractionResult,
        AiGeneratedReport,
        // Health
        health::HealthResponse,
        health::BuildInfo,
        health::ReadinessResponse,
        health::ReadinessChecks,
        health::MetricsResponse,
        // Catalog
        catalog::RootResponse,
        catalog::CategoriesResponse,
        // Sightings
        sightings::CreateSightingRequest,
        sightings::RateSightingRequest,
        sightings::NearbyRequest,
        sightings::NearbySighting,
        sightings::NearbyResponse,
        sightings::CategoryCount,
        sightings::StatsResponse,
        // Hauntings
        hauntings::CreateHauntingRequest,
        hauntings::PreviewLocation,
        hauntings::SeverityPreview,
        hauntings::HauntingPreview,
        hauntings::HauntingView,
        hauntings::HauntingListResponse,
        hauntings::RequestHelpResponse,
        // Investigators
        investigators::CreateInvestigatorRequest,
        investigators::InvestigatorListResponse,
        investigators::InvestigatorDetail,
        investigators::UpdateInvestigatorRequest,
        investigators::ReviewResponse,
        investigators::DonationRequest,
        investigators::DonationResponse,
        // Bookings
        bookings::CreateBookingRequest,
        bookings::BookingListResponse,
        // Equipment
        equipment::CreateEquipmentReviewRequest,
        equipment::ReviewListResponse,
        equipment::ProductRating,
        equipment::TopRatedResponse,
        equipment::MessageResponse,
        // Subscriptions
        subscriptions::CreateSubscriptionRequest,
        subscriptions::SubscriptionCreated,
        subscriptions::SubscriptionCheck,
        subscriptions::CancelResponse,
        subscriptions::RevenueResponse,
        // Ads
        ads::AdPlanListing,
        ads::AdPricingResponse,
        ads::CreateAdRequest,
        ads::AdListResponse,
        ads::RotationResponse,
        ads::ImpressionResponse,
        ads::ClickResponse,
        // Generated reports
        ai_reports::GenerateReportRequest,
        ai_reports::SightingConverted,
        ai_reports::HauntingConverted,
        ai_reports::ReportListResponse,
    )),
    tags(
        (name = "health", description = "Liveness, readiness and metrics"),
        (name = "catalog", description = "Service info and category lists"),
        (name = "sightings", description = "Sighting reports and proximity search"),
        (name = "hauntings", description = "Haunting cases and help requests"),
        (name = "investigators", description = "Investigator directory, reviews and donations"),
        (name = "bookings", description = "Investigation bookings"),
        (name = "equipment", description = "Equipment reviews"),
        (name = "subscriptions", description = "Plans, subscriptions and revenue"),
        (name = "ads", description = "Video ad marketplace"),
        (name = "ai", description = "Structured report generation")
    )
)]
pub struct ApiDoc;
