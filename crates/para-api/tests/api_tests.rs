//! API Integration Tests
//!
//! Every test runs against the in-memory store. Flows that need model
//! output use a scripted client that replies with a fixed marker block.
//!
//! Author: hephaex@gmail.com

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use para_api::{create_router_for_testing, create_router_with_llm};
use para_core::{GenerationOptions, LlmClient};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the JSON body
async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(create_json_request(method, uri, body))
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Replies with a fixed marker block
struct ScriptedLlm(&'static str);

const SCRIPT: &str = "\
TITLE: Poltergeist activity at Manchester terrace
CATEGORY: Poltergeist
HAUNTING_TYPE: Poltergeist
SUMMARY: Objects thrown in a kitchen over several nights
DETAILED_DESCRIPTION: Plates moved and were thrown while three family members watched.
LOCATIONS: 53.4808,-2.2426,Manchester Town Hall | not, a place | Pendle Hill
DATES: 2024-10-31 | N/A
WITNESSES: 3 adults
ENTITIES: Unseen force
CREDIBILITY: 85
SEVERITY: High
SEVERITY_SCORE: 72
PSYCHOLOGICAL: Family reports disturbed sleep
PSYCH_SCORE: 6
PHYSICAL: Thrown crockery
PHYSICAL_SCORE: 5
URGENCY: Urgent
ACTIONS: Keep a log | Install cameras
WARNINGS: Escalation
KEY_EVIDENCE: Broken plates | Phone video
RECOMMENDATIONS: Contact an investigator
SIMILAR_CASES: Enfield 1977
SIMILAR CASES: Enfield 1977
INVESTIGATION STEPS: Interview witnesses | Record EMF readings";

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(&self, _prompt: &str, _options: GenerationOptions) -> para_core::Result<String> {
        Ok(self.0.to_string())
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

fn scripted_app() -> Router {
    create_router_with_llm(Arc::new(ScriptedLlm(SCRIPT)))
}

fn sighting_body(title: &str, category: &str, lat: f64, lon: f64) -> Value {
    json!({
        "title": title,
        "description": "A figure crossed the landing and vanished.",
        "category": category,
        "location": {"latitude": lat, "longitude": lon},
        "date_occurred": "2024-10-31T22:15:00Z",
        "reporter_name": "Alex"
    })
}

fn haunting_body(visibility: &str) -> Value {
    json!({
        "property_type": "House",
        "location": {"latitude": 53.48, "longitude": -2.24, "address": "Salford"},
        "haunting_type": "Intelligent Haunting",
        "activity_description": "Doors slam and voices call names at night",
        "frequency": "Weekly",
        "duration_months": 4,
        "reporter_name": "Sam",
        "reporter_email": "sam@example.com",
        "visibility": visibility
    })
}

fn investigator_body(user_id: &str) -> Value {
    json!({
        "user_id": user_id,
        "name": "Jo Marsh",
        "email": "jo@example.com",
        "bio": "Twenty years of residential cases",
        "years_experience": 20,
        "specializations": ["Residential", "EVP"],
        "service_areas": ["Greater Manchester", "Lancashire"]
    })
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();
    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_check() {
    let app = create_router_for_testing();
    let (status, json) = send(&app, "GET", "/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
    assert_eq!(json["checks"]["store_backend"], "memory");
    assert_eq!(json["checks"]["llm"], false);
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let app = create_router_for_testing();
    send(&app, "GET", "/api/categories", None).await;
    send(&app, "GET", "/api/stats", None).await;

    let (status, json) = send(&app, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_requests"], 2);
    assert!(json["llm_model"].is_null());
}

// =============================================================================
// Catalog Tests
// =============================================================================

#[tokio::test]
async fn test_root_and_categories() {
    let app = create_router_for_testing();

    let (status, json) = send(&app, "GET", "/api/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "ParaInvestigate API");

    let (status, json) = send(&app, "GET", "/api/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    let categories = json["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 9);
    assert_eq!(categories[0], "Ghost/Spirit");
    assert!(json["equipment_categories"]
        .as_array()
        .unwrap()
        .contains(&json!("EMF Detectors")));
}

// =============================================================================
// Sighting Tests
// =============================================================================

#[tokio::test]
async fn test_create_and_get_sighting() {
    let app = create_router_for_testing();
    let (status, created) = send(
        &app,
        "POST",
        "/api/sightings",
        Some(sighting_body("Grey lady", "Ghost/Spirit", 51.5074, -0.1278)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["witness_count"], 1);
    assert_eq!(created["verified"], false);
    // No model configured, so the fallback analysis is attached
    assert_eq!(created["ai_analysis"]["credibility_score"], 50);

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/api/sightings/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Grey lady");
}

#[tokio::test]
async fn test_create_sighting_rejects_bad_input() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        "POST",
        "/api/sightings",
        Some(sighting_body("Lights", "Fairy", 51.0, 0.0)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid category");

    let (status, json) = send(
        &app,
        "POST",
        "/api/sightings",
        Some(sighting_body("Lights", "Orb", 91.0, 0.0)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid coordinates");
}

#[tokio::test]
async fn test_sighting_not_found() {
    let app = create_router_for_testing();
    let (status, json) = send(&app, "GET", "/api/sightings/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Sighting not found");
}

#[tokio::test]
async fn test_list_sightings_filters_by_category() {
    let app = create_router_for_testing();
    for (title, category) in [("a", "Orb"), ("b", "Cryptid"), ("c", "Orb")] {
        send(
            &app,
            "POST",
            "/api/sightings",
            Some(sighting_body(title, category, 51.5, -0.1)),
        )
        .await;
    }

    let (status, json) = send(&app, "GET", "/api/sightings?category=Orb", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (_, json) = send(&app, "GET", "/api/sightings?limit=1", None).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rate_sighting() {
    let app = create_router_for_testing();
    let (_, created) = send(
        &app,
        "POST",
        "/api/sightings",
        Some(sighting_body("Rated", "Orb", 51.5, -0.1)),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/sightings/{id}/rate"),
        Some(json!({"user_id": "u1", "score": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Score must be 1-5");

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/sightings/{id}/rate"),
        Some(json!({"user_id": "u1", "score": 4, "comment": "Convincing"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ratings"].as_array().unwrap().len(), 1);
    assert_eq!(json["ratings"][0]["score"], 4);
}

#[tokio::test]
async fn test_nearby_sightings_nearest_first() {
    let app = create_router_for_testing();
    // Westminster, Greenwich and Manchester
    send(
        &app,
        "POST",
        "/api/sightings",
        Some(sighting_body("Manchester", "Orb", 53.4808, -2.2426)),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/sightings",
        Some(sighting_body("Greenwich", "Orb", 51.4769, -0.0005)),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/sightings",
        Some(sighting_body("Westminster", "Orb", 51.4995, -0.1248)),
    )
    .await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/sightings/nearby",
        Some(json!({"latitude": 51.5074, "longitude": -0.1278, "radius_km": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    let sightings = json["sightings"].as_array().unwrap();
    assert_eq!(sightings[0]["title"], "Westminster");
    assert_eq!(sightings[1]["title"], "Greenwich");
    let first = sightings[0]["distance_km"].as_f64().unwrap();
    assert!(first > 0.8 && first < 1.0, "{first}");

    // Default radius is 50 km as well
    let (_, json) = send(
        &app,
        "POST",
        "/api/sightings/nearby",
        Some(json!({"latitude": 51.5074, "longitude": -0.1278})),
    )
    .await;
    assert_eq!(json["count"], 2);

    let (_, json) = send(
        &app,
        "POST",
        "/api/sightings/nearby",
        Some(json!({"latitude": 51.5074, "longitude": -0.1278, "radius_km": 300})),
    )
    .await;
    assert_eq!(json["count"], 3);
    assert_eq!(json["sightings"][2]["title"], "Manchester");
}

#[tokio::test]
async fn test_nearby_sightings_rejects_bad_origin_and_radius() {
    let app = create_router_for_testing();
    send(
        &app,
        "POST",
        "/api/sightings",
        Some(sighting_body("Westminster", "Orb", 51.4995, -0.1248)),
    )
    .await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/sightings/nearby",
        Some(json!({"latitude": 500, "longitude": -0.1278, "radius_km": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid coordinates");

    let (status, json) = send(
        &app,
        "POST",
        "/api/sightings/nearby",
        Some(json!({"latitude": 51.5074, "longitude": -0.1278, "radius_km": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid radius");

    // Zero radius only matches the origin itself
    let (status, json) = send(
        &app,
        "POST",
        "/api/sightings/nearby",
        Some(json!({"latitude": 51.4995, "longitude": -0.1248, "radius_km": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
}

#[tokio::test]
async fn test_stats_orders_categories() {
    let app = create_router_for_testing();
    for category in ["Cryptid", "Orb", "Orb"] {
        send(
            &app,
            "POST",
            "/api/sightings",
            Some(sighting_body("s", category, 51.5, -0.1)),
        )
        .await;
    }

    let (status, json) = send(&app, "GET", "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_sightings"], 3);
    assert_eq!(json["verified_sightings"], 0);
    assert_eq!(json["categories"][0]["category"], "Orb");
    assert_eq!(json["categories"][0]["count"], 2);
    assert_eq!(json["categories"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_analyze_sighting_with_model() {
    let app = scripted_app();
    let (_, created) = send(
        &app,
        "POST",
        "/api/sightings",
        Some(sighting_body("Analysed", "Poltergeist", 53.48, -2.24)),
    )
    .await;
    assert_eq!(created["ai_analysis"]["credibility_score"], 85);

    let id = created["id"].as_str().unwrap();
    let (status, json) = send(&app, "POST", &format!("/api/sightings/{id}/analyze"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["ai_analysis"]["suggested_investigation_steps"][1],
        "Record EMF readings"
    );
}

// =============================================================================
// Haunting Report Tests
// =============================================================================

#[tokio::test]
async fn test_haunting_visibility() {
    let app = create_router_for_testing();
    let (status, public) = send(&app, "POST", "/api/hauntings", Some(haunting_body("public"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(public["severity_assessment"].is_object());

    let (_, hidden) = send(
        &app,
        "POST",
        "/api/hauntings",
        Some(haunting_body("subscribers")),
    )
    .await;
    let hidden_id = hidden["id"].as_str().unwrap();

    // Non-subscribers only see public reports
    let (_, json) = send(&app, "GET", "/api/hauntings", None).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["reports"][0]["activity_description"], public["activity_description"]);

    let (_, json) = send(&app, "GET", "/api/hauntings?is_subscriber=true", None).await;
    assert_eq!(json["count"], 2);

    let (_, preview) = send(&app, "GET", &format!("/api/hauntings/{hidden_id}"), None).await;
    assert_eq!(preview["preview"], true);
    assert!(preview.get("activity_description").is_none());

    let (_, full) = send(
        &app,
        "GET",
        &format!("/api/hauntings/{hidden_id}?is_subscriber=true"),
        None,
    )
    .await;
    assert_eq!(full["reporter_email"], "sam@example.com");
}

#[tokio::test]
async fn test_request_help_creates_booking() {
    let app = create_router_for_testing();
    let (_, report) = send(&app, "POST", "/api/hauntings", Some(haunting_body("private"))).await;
    let (_, investigator) = send(
        &app,
        "POST",
        "/api/investigators",
        Some(investigator_body("inv-1")),
    )
    .await;
    let report_id = report["id"].as_str().unwrap();
    let investigator_id = investigator["id"].as_str().unwrap();

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/hauntings/{report_id}/request-help?investigator_id={investigator_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Help request sent to investigator");

    let (_, json) = send(
        &app,
        "GET",
        &format!("/api/bookings?investigator_id={investigator_id}"),
        None,
    )
    .await;
    let bookings = json["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["haunting_report_id"], report_id);
    assert_eq!(bookings[0]["status"], "pending");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/hauntings/{report_id}/request-help?investigator_id=nobody"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Investigator Tests
// =============================================================================

#[tokio::test]
async fn test_investigator_profile_and_reviews() {
    let app = create_router_for_testing();
    let (status, created) = send(
        &app,
        "POST",
        "/api/investigators",
        Some(investigator_body("inv-1")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["subscription_status"], "inactive");
    assert_eq!(created["rating"], 0.0);

    let (status, json) = send(
        &app,
        "POST",
        "/api/investigators",
        Some(investigator_body("inv-1")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Profile already exists");

    let id = created["id"].as_str().unwrap();
    for rating in [5, 4] {
        let (status, json) = send(
            &app,
            "POST",
            &format!(
                "/api/investigators/{id}/review?user_id=u{rating}&user_name=Reviewer&rating={rating}&review_text=Thorough"
            ),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Review submitted");
    }

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/investigators/{id}/review?user_id=u&user_name=R&rating=0&review_text=x"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, detail) = send(&app, "GET", &format!("/api/investigators/{id}"), None).await;
    assert_eq!(detail["rating"], 4.5);
    assert_eq!(detail["review_count"], 2);
    assert_eq!(detail["reviews"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_investigator_update_and_donation() {
    let app = create_router_for_testing();
    let (_, created) = send(
        &app,
        "POST",
        "/api/investigators",
        Some(investigator_body("inv-2")),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/investigators/{id}"),
        Some(json!({"bio": "Now retired", "years_experience": 25})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["bio"], "Now retired");
    assert_eq!(updated["name"], "Jo Marsh");

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/investigators/{id}/donate"),
        Some(json!({"donor_name": "Fan", "amount_gbp": 1250})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["amount_gbp"], 12.5);

    let (_, revenue) = send(&app, "GET", "/api/admin/revenue", None).await;
    assert_eq!(revenue["total_donations_pence"], 1250);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/investigators/missing",
        Some(json!({"bio": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Subscription Tests
// =============================================================================

#[tokio::test]
async fn test_investigator_subscription_activates_profile() {
    let app = create_router_for_testing();
    send(
        &app,
        "POST",
        "/api/investigators",
        Some(investigator_body("inv-3")),
    )
    .await;

    // Inactive profiles are hidden by default
    let (_, json) = send(&app, "GET", "/api/investigators", None).await;
    assert_eq!(json["count"], 0);

    let (status, json) = send(
        &app,
        "POST",
        "/api/subscription/create",
        Some(json!({
            "user_id": "inv-3",
            "user_email": "jo@example.com",
            "subscription_type": "investigator",
            "plan": "monthly"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "Subscription created successfully");
    let sub_id = json["subscription"]["id"].as_str().unwrap().to_string();

    let (_, json) = send(
        &app,
        "GET",
        "/api/investigators?service_area=manchester",
        None,
    )
    .await;
    assert_eq!(json["count"], 1);

    let (_, check) = send(&app, "GET", "/api/subscription/check/inv-3", None).await;
    assert_eq!(check["is_subscriber"], true);

    let (_, revenue) = send(&app, "GET", "/api/admin/revenue", None).await;
    assert_eq!(revenue["investigator_subscriptions"], 1);
    assert_eq!(revenue["monthly_recurring_revenue_pence"], 2000);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/subscription/cancel/{sub_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, check) = send(&app, "GET", "/api/subscription/check/inv-3", None).await;
    assert_eq!(check["is_subscriber"], false);
}

#[tokio::test]
async fn test_subscription_plans() {
    let app = create_router_for_testing();
    let (status, json) = send(&app, "GET", "/api/subscription/plans", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!json["plans"].as_array().unwrap().is_empty());
}

// =============================================================================
// Booking Tests
// =============================================================================

#[tokio::test]
async fn test_booking_lifecycle() {
    let app = create_router_for_testing();
    let (_, investigator) = send(
        &app,
        "POST",
        "/api/investigators",
        Some(investigator_body("inv-4")),
    )
    .await;
    let investigator_id = investigator["id"].as_str().unwrap();

    let (status, booking) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(json!({
            "investigator_id": investigator_id,
            "client_name": "Pat",
            "client_email": "pat@example.com",
            "location": {"latitude": 53.4, "longitude": -2.2},
            "message": "Knocking in the walls"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["client_user_id"], "pat@example.com");
    let booking_id = booking["id"].as_str().unwrap();

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/bookings/{booking_id}/status?status=maybe"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid status");

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/bookings/{booking_id}/status?status=accepted&notes=Friday"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "accepted");
    assert_eq!(json["investigator_notes"], "Friday");

    let (status, _) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(json!({
            "investigator_id": "nobody",
            "client_name": "Pat",
            "client_email": "pat@example.com",
            "location": {"latitude": 53.4, "longitude": -2.2},
            "message": "Hello"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Equipment Tests
// =============================================================================

#[tokio::test]
async fn test_equipment_reviews_and_top_rated() {
    let app = create_router_for_testing();
    let review = |name: &str, rating: u8| {
        json!({
            "name": name,
            "brand": "Acme",
            "category": "EMF Detectors",
            "price_range": "Budget",
            "reviewer_id": "r1",
            "reviewer_name": "Rev",
            "reviewer_type": "user",
            "rating": rating,
            "review_title": "Solid",
            "review_text": "Works as described"
        })
    };

    let mut ids = Vec::new();
    for (name, rating) in [("K2", 5), ("K2", 3), ("Mel Meter", 5)] {
        let (status, json) = send(&app, "POST", "/api/equipment", Some(review(name, rating))).await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(json["id"].as_str().unwrap().to_string());
    }

    let mut bad = review("X", 4);
    bad["category"] = json!("Crystals");
    let (status, json) = send(&app, "POST", "/api/equipment", Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid category");

    let (_, json) = send(&app, "GET", "/api/equipment/top-rated", None).await;
    let top = json["top_equipment"].as_array().unwrap();
    assert_eq!(top[0]["name"], "Mel Meter");
    assert_eq!(top[1]["name"], "K2");
    assert_eq!(top[1]["avg_rating"], 4.0);

    let (status, _) = send(&app, "POST", &format!("/api/equipment/{}/helpful", ids[1]), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, "GET", "/api/equipment", None).await;
    assert_eq!(json["reviews"][0]["id"], ids[1].as_str());
    assert_eq!(json["reviews"][0]["helpful_votes"], 1);

    let (_, json) = send(&app, "GET", "/api/equipment?min_rating=4", None).await;
    assert_eq!(json["count"], 2);
}

// =============================================================================
// Ad Tests
// =============================================================================

#[tokio::test]
async fn test_ad_approval_and_rotation() {
    let app = create_router_for_testing();
    let ad = |title: &str, pages: Value| {
        json!({
            "advertiser_name": "Dee",
            "advertiser_email": "dee@example.com",
            "company_name": "Haunted Hour",
            "category": "Podcast",
            "video_url": "https://cdn.example.com/ad.mp4",
            "title": title,
            "description": "Weekly ghost stories",
            "click_url": "https://example.com/listen",
            "target_pages": pages,
            "plan": "no_such_plan"
        })
    };

    let (status, targeted) = send(&app, "POST", "/api/ads", Some(ad("Targeted", json!(["map"])))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(targeted["plan"], "weekly_intro");
    assert_eq!(targeted["amount_paid_gbp"], 2000);
    assert_eq!(targeted["status"], "pending");
    let (_, everywhere) = send(&app, "POST", "/api/ads", Some(ad("Everywhere", json!([])))).await;

    // Pending ads never rotate
    let (_, json) = send(&app, "GET", "/api/ads/rotation", None).await;
    assert!(json["ads"].as_array().unwrap().is_empty());

    for ad in [&targeted, &everywhere] {
        let id = ad["id"].as_str().unwrap();
        let (status, json) = send(&app, "PUT", &format!("/api/ads/{id}/approve"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "active");
    }

    let (_, json) = send(&app, "GET", "/api/ads/rotation?page=sightings", None).await;
    let ads = json["ads"].as_array().unwrap();
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0]["title"], "Everywhere");

    let (_, json) = send(&app, "GET", "/api/ads/rotation?page=map", None).await;
    assert_eq!(json["ads"].as_array().unwrap().len(), 2);

    let id = targeted["id"].as_str().unwrap();
    let (_, json) = send(&app, "POST", &format!("/api/ads/{id}/click"), None).await;
    assert_eq!(json["click_url"], "https://example.com/listen");
    send(&app, "POST", &format!("/api/ads/{id}/impression"), None).await;

    let (_, json) = send(&app, "GET", &format!("/api/ads/{id}"), None).await;
    assert_eq!(json["clicks"], 1);
    assert_eq!(json["impressions"], 1);
}

#[tokio::test]
async fn test_ad_pricing() {
    let app = create_router_for_testing();
    let (status, json) = send(&app, "GET", "/api/ads/pricing", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["plans"].as_array().unwrap().len(), 4);
    assert_eq!(json["plans"][0]["price_gbp"], 20.0);
    assert_eq!(json["max_video_duration_seconds"], 20);
}

// =============================================================================
// Report Generation Tests
// =============================================================================

#[tokio::test]
async fn test_generate_report_without_model_is_not_stored() {
    let app = create_router_for_testing();
    let raw = "Saw a light over the marsh at midnight";
    let (status, json) = send(
        &app,
        "POST",
        "/api/ai/generate-report",
        Some(json!({"raw_text": raw})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Report from Submitted Information");
    assert_eq!(json["detailed_description"], raw);
    assert_eq!(json["raw_input"], raw);

    let (_, json) = send(&app, "GET", "/api/ai/reports", None).await;
    assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn test_generate_report_rejects_empty_text() {
    let app = create_router_for_testing();
    let (status, json) = send(
        &app,
        "POST",
        "/api/ai/generate-report",
        Some(json!({"raw_text": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Raw text is required");
}

#[tokio::test]
async fn test_generate_and_convert_report() {
    let app = scripted_app();
    let (status, report) = send(
        &app,
        "POST",
        "/api/ai/generate-report",
        Some(json!({"raw_text": "Plates flew across the kitchen while we watched"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["category"], "Poltergeist");
    assert_eq!(report["witness_count"], 3);
    assert_eq!(report["dates_mentioned"], json!(["2024-10-31"]));
    let locations = report["locations"].as_array().unwrap();
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0]["address"], "Manchester Town Hall");
    // Unreadable coordinates fall back to the default; no comma means no location
    assert_eq!(locations[1]["latitude"], 51.5074);
    assert_eq!(locations[1]["address"], "not, a place");

    let report_id = report["id"].as_str().unwrap();
    let (_, json) = send(&app, "GET", "/api/ai/reports", None).await;
    assert_eq!(json["count"], 1);
    let (status, _) = send(&app, "GET", &format!("/api/ai/reports/{report_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/ai/generate-report/convert-to-sighting?report_id={report_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Sighting created from report");
    let sighting_id = json["sighting_id"].as_str().unwrap();

    let (_, sighting) = send(&app, "GET", &format!("/api/sightings/{sighting_id}"), None).await;
    assert_eq!(sighting["category"], "Poltergeist");
    assert_eq!(sighting["location"]["latitude"], 53.4808);
    assert_eq!(sighting["witness_count"], 3);

    let (status, json) = send(
        &app,
        "POST",
        &format!(
            "/api/ai/generate-report/convert-to-haunting?report_id={report_id}&reporter_name=Sam&reporter_email=sam@example.com"
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let haunting_id = json["haunting_id"].as_str().unwrap();

    let (_, haunting) = send(
        &app,
        "GET",
        &format!("/api/hauntings/{haunting_id}?is_subscriber=true"),
        None,
    )
    .await;
    assert_eq!(haunting["visibility"], "subscribers");
    assert_eq!(haunting["haunting_type"], "Poltergeist");
    assert_eq!(haunting["frequency"], "Occasional");
    assert_eq!(haunting["severity_assessment"]["overall_severity"], "High");
}

#[tokio::test]
async fn test_convert_missing_report() {
    let app = create_router_for_testing();
    let (status, json) = send(
        &app,
        "POST",
        "/api/ai/generate-report/convert-to-sighting?report_id=missing",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Report not found");
}

#[tokio::test]
async fn test_convert_rejects_out_of_range_location() {
    let app = create_router_with_llm(Arc::new(ScriptedLlm(
        "TITLE: Lights over the sea\nCATEGORY: UFO/UAP\nLOCATIONS: 123.0,45.0,Nowhere",
    )));
    let (status, report) = send(
        &app,
        "POST",
        "/api/ai/generate-report",
        Some(json!({"raw_text": "Lights hovered far out at sea"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["locations"][0]["latitude"], 123.0);
    assert_eq!(report["locations"][0]["address"], "Nowhere");
    let report_id = report["id"].as_str().unwrap();

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/ai/generate-report/convert-to-sighting?report_id={report_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid coordinates");

    let (status, _) = send(
        &app,
        "POST",
        &format!(
            "/api/ai/generate-report/convert-to-haunting?report_id={report_id}&reporter_name=Sam&reporter_email=sam@example.com"
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, json) = send(&app, "GET", "/api/sightings", None).await;
    assert_eq!(json, json!([]));
}
