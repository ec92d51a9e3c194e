//! Persistent records
//!
//! Every record is stored as one document keyed by its `id` (a UUIDv4
//! string). Timestamps are UTC and serialize as RFC 3339.
//!
//! Author: hephaex@gmail.com

use crate::catalog::{AdPlan, ReportCategory, SubscriptionPlan, SubscriptionType};
use crate::extraction::ExtractionResult;
use crate::geo::{GeoPoint, Located};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Fresh record identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Sightings
// ============================================================================

/// A 1–5 community rating on a sighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Rating {
    pub user_id: String,
    pub score: u8,
    pub comment: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Model-produced credibility analysis of a sighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SightingAnalysis {
    /// 1–100
    pub credibility_score: u8,
    pub analysis_summary: String,
    pub similar_cases: Vec<String>,
    pub suggested_investigation_steps: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Sighting {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub location: GeoPoint,
    pub date_occurred: DateTime<Utc>,
    #[serde(default)]
    pub evidence_photos: Vec<String>,
    pub witness_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    pub ai_analysis: Option<SightingAnalysis>,
    #[serde(default)]
    pub verified: bool,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
}

impl Located for Sighting {
    fn location(&self) -> &GeoPoint {
        &self.location
    }
}

// ============================================================================
// Haunting reports
// ============================================================================

/// Model-produced severity assessment of a haunting report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SeverityAssessment {
    /// One of Low, Moderate, High, Severe, Critical
    pub overall_severity: String,
    /// 1–100
    pub severity_score: u8,
    pub psychological_impact: String,
    /// 1–10
    pub psychological_score: u8,
    pub physical_danger: String,
    /// 1–10
    pub physical_score: u8,
    pub urgency_level: String,
    pub recommended_actions: Vec<String>,
    pub warning_signs: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Who may read a haunting report in full
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Subscribers,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Subscribers => "subscribers",
            Self::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HauntingStatus {
    #[default]
    Pending,
    UnderReview,
    Investigated,
    Resolved,
}

impl HauntingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Investigated => "investigated",
            Self::Resolved => "resolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HauntingReport {
    pub id: String,
    /// House, Apartment, Business, Land, Other
    pub property_type: String,
    pub property_age: Option<String>,
    pub property_history: Option<String>,
    pub location: GeoPoint,
    pub haunting_type: String,
    pub activity_description: String,
    /// Daily, Weekly, Monthly, Occasional
    pub frequency: String,
    pub duration_months: u32,
    pub triggers: Option<String>,
    #[serde(default)]
    pub psychological_symptoms: Vec<String>,
    #[serde(default)]
    pub physical_symptoms: Vec<String>,
    pub witnesses: u32,
    #[serde(default)]
    pub evidence_photos: Vec<String>,
    #[serde(default)]
    pub evidence_audio: Vec<String>,
    #[serde(default)]
    pub evidence_video: Vec<String>,
    pub reporter_name: String,
    pub reporter_email: String,
    pub reporter_phone: Option<String>,
    pub visibility: Visibility,
    pub seeking_help: bool,
    pub urgent: bool,
    pub severity_assessment: Option<SeverityAssessment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: HauntingStatus,
    pub assigned_investigator_id: Option<String>,
}

impl Located for HauntingReport {
    fn location(&self) -> &GeoPoint {
        &self.location
    }
}

// ============================================================================
// Investigators
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvestigatorService {
    pub name: String,
    pub description: String,
    pub price_range: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    #[default]
    Inactive,
    Cancelled,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Investigator {
    pub id: String,
    pub user_id: String,
    pub name: String,
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
    /// Cities or regions covered
    #[serde(default)]
    pub service_areas: Vec<String>,
    pub location: Option<GeoPoint>,
    pub willing_to_travel: bool,
    pub travel_radius_km: u32,
    #[serde(default)]
    pub equipment_list: Vec<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
    pub subscription_type: SubscriptionPlan,
    pub subscription_status: SubscriptionStatus,
    pub subscription_expires: Option<DateTime<Utc>>,
    /// Premium placement in listings
    pub featured: bool,
    pub total_investigations: u32,
    pub rating: f64,
    pub review_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvestigatorReview {
    pub id: String,
    pub investigator_id: String,
    pub user_id: String,
    pub user_name: String,
    /// 1–5
    pub rating: u8,
    pub review_text: String,
    pub case_type: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: String,
    pub investigator_id: String,
    pub client_user_id: String,
    pub haunting_report_id: Option<String>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub location: GeoPoint,
    #[serde(default)]
    pub preferred_dates: Vec<String>,
    pub message: String,
    pub service_requested: Option<String>,
    pub status: BookingStatus,
    pub investigator_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Located for Booking {
    fn location(&self) -> &GeoPoint {
        &self.location
    }
}

// ============================================================================
// Equipment
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EquipmentReview {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub model_number: Option<String>,
    /// Budget, Mid-range, Professional
    pub price_range: String,
    /// Affiliate link
    pub purchase_link: Option<String>,
    pub image_url: Option<String>,
    pub reviewer_id: String,
    pub reviewer_name: String,
    /// "investigator" or "user"
    pub reviewer_type: String,
    /// 1–5
    pub rating: u8,
    pub review_title: String,
    pub review_text: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    pub recommended: bool,
    #[serde(default)]
    pub use_cases: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub helpful_votes: u32,
    pub verified_purchase: bool,
}

// ============================================================================
// Subscriptions and donations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub subscription_type: SubscriptionType,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    /// Pence
    pub amount_gbp: u32,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub auto_renew: bool,
}

impl Subscription {
    pub fn new(
        user_id: impl Into<String>,
        user_email: impl Into<String>,
        subscription_type: SubscriptionType,
        plan: SubscriptionPlan,
    ) -> Self {
        let started_at = Utc::now();
        Self {
            id: new_id(),
            user_id: user_id.into(),
            user_email: user_email.into(),
            subscription_type,
            plan,
            status: SubscriptionStatus::Active,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            amount_gbp: crate::catalog::subscription_price_pence(subscription_type, plan),
            started_at,
            expires_at: started_at + chrono::Duration::days(plan.duration_days()),
            auto_renew: true,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Donation {
    pub id: String,
    pub investigator_id: String,
    pub donor_id: Option<String>,
    pub donor_name: String,
    /// Pence
    pub amount_gbp: u32,
    pub message: Option<String>,
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Video advertising
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    #[default]
    Pending,
    Active,
    Paused,
    Expired,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VideoAd {
    pub id: String,
    pub advertiser_name: String,
    pub advertiser_email: String,
    pub company_name: String,
    pub category: String,
    /// URL of the video file
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub title: String,
    pub description: String,
    /// Redirect target on click
    pub click_url: String,
    /// Pages the ad is shown on; empty means every page
    #[serde(default)]
    pub target_pages: Vec<String>,
    pub plan: AdPlan,
    /// Pence
    pub amount_paid_gbp: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub impressions: u64,
    pub clicks: u64,
    pub status: AdStatus,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Generated reports
// ============================================================================

/// A persisted report draft produced from raw submitted text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AiGeneratedReport {
    pub id: String,
    pub raw_input: String,
    /// "text", "url" or "mixed"
    pub input_type: String,
    #[serde(flatten)]
    pub report: ExtractionResult,
    #[serde(default)]
    pub suggested_images: Vec<String>,
    #[serde(default)]
    pub audio_transcriptions: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub generator_user_id: Option<String>,
}

impl AiGeneratedReport {
    pub fn from_text(raw_input: impl Into<String>, report: ExtractionResult) -> Self {
        Self {
            id: new_id(),
            raw_input: raw_input.into(),
            input_type: "text".to_string(),
            report,
            suggested_images: Vec::new(),
            audio_transcriptions: Vec::new(),
            generated_at: Utc::now(),
            generator_user_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_expiry() {
        let sub = Subscription::new(
            "u1",
            "u1@example.com",
            SubscriptionType::Investigator,
            SubscriptionPlan::Yearly,
        );
        assert_eq!(sub.amount_gbp, 20000);
        assert_eq!((sub.expires_at - sub.started_at).num_days(), 365);
        assert!(!sub.is_expired_at(Utc::now()));
        assert!(sub.is_expired_at(sub.expires_at + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_value(HauntingStatus::UnderReview).unwrap(),
            "under_review"
        );
        assert_eq!(
            serde_json::to_value(SubscriptionStatus::Active).unwrap(),
            SubscriptionStatus::Active.as_str()
        );
        assert_eq!(BookingStatus::parse("declined"), Some(BookingStatus::Declined));
        assert_eq!(BookingStatus::parse("lost"), None);
    }

    #[test]
    fn test_generated_report_flattens_extraction() {
        let report = AiGeneratedReport::from_text("raw", ExtractionResult::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["title"], "Untitled Report");
        assert_eq!(json["raw_input"], "raw");
        assert_eq!(json["input_type"], "text");

        let back: AiGeneratedReport = serde_json::from_value(json).unwrap();
        assert_eq!(back.report, report.report);
    }
}
