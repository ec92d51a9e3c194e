//! Fixed catalogs and price tables
//!
//! All amounts are in GBP pence.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Category of a sighting or generated report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ReportCategory {
    #[serde(rename = "Ghost/Spirit")]
    GhostSpirit,
    #[serde(rename = "UFO/UAP")]
    UfoUap,
    #[serde(rename = "Cryptid")]
    Cryptid,
    #[serde(rename = "Poltergeist")]
    Poltergeist,
    #[serde(rename = "Shadow Figure")]
    ShadowFigure,
    #[serde(rename = "Orb")]
    Orb,
    #[serde(rename = "EVP/Audio")]
    EvpAudio,
    #[serde(rename = "Unexplained Phenomenon")]
    UnexplainedPhenomenon,
    #[serde(rename = "Other")]
    #[default]
    Other,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 9] = [
        Self::GhostSpirit,
        Self::UfoUap,
        Self::Cryptid,
        Self::Poltergeist,
        Self::ShadowFigure,
        Self::Orb,
        Self::EvpAudio,
        Self::UnexplainedPhenomenon,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GhostSpirit => "Ghost/Spirit",
            Self::UfoUap => "UFO/UAP",
            Self::Cryptid => "Cryptid",
            Self::Poltergeist => "Poltergeist",
            Self::ShadowFigure => "Shadow Figure",
            Self::Orb => "Orb",
            Self::EvpAudio => "EVP/Audio",
            Self::UnexplainedPhenomenon => "Unexplained Phenomenon",
            Self::Other => "Other",
        }
    }

    /// Exact catalog lookup, then a case-insensitive one
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .iter()
            .find(|c| c.as_str() == value)
            .or_else(|| {
                Self::ALL
                    .iter()
                    .find(|c| c.as_str().eq_ignore_ascii_case(value))
            })
            .copied()
    }

    /// Lenient conversion for model output: anything unknown is `Other`
    pub fn parse_or_other(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.as_str()).collect()
    }
}

impl std::fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const HAUNTING_TYPES: [&str; 9] = [
    "Residual Haunting",
    "Intelligent Haunting",
    "Poltergeist Activity",
    "Demonic/Negative Entity",
    "Shadow People",
    "Portal Haunting",
    "Object Attachment",
    "Land/Location Based",
    "Other",
];

pub const SEVERITY_LEVELS: [&str; 5] = ["Low", "Moderate", "High", "Severe", "Critical"];

pub const EQUIPMENT_CATEGORIES: [&str; 11] = [
    "EMF Detectors",
    "Spirit Boxes",
    "Thermal Cameras",
    "Audio Recorders",
    "Full Spectrum Cameras",
    "Motion Sensors",
    "Laser Grids",
    "Dowsing Rods",
    "K-II Meters",
    "REM Pods",
    "Other",
];

pub const AD_CATEGORIES: [&str; 8] = [
    "Paranormal Investigation Company",
    "YouTube Channel",
    "Podcast",
    "Equipment Retailer",
    "Paranormal Events",
    "Books/Media",
    "Training/Courses",
    "Other",
];

pub const AD_SUPPORTED_FORMATS: [&str; 3] = ["mp4", "webm", "mov"];
pub const AD_MAX_VIDEO_SECONDS: u32 = 20;
pub const AD_INTRO_PERIOD_MONTHS: u32 = 3;

// ============================================================================
// Subscriptions
// ============================================================================

/// Who a subscription is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    User,
    Investigator,
}

/// Billing period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    #[default]
    Monthly,
    Yearly,
}

impl SubscriptionPlan {
    pub fn duration_days(&self) -> i64 {
        match self {
            Self::Monthly => 30,
            Self::Yearly => 365,
        }
    }
}

/// Price for a plan; combinations without their own row use the
/// user-monthly or investigator-yearly price.
pub fn subscription_price_pence(kind: SubscriptionType, plan: SubscriptionPlan) -> u32 {
    match (plan, kind) {
        (SubscriptionPlan::Monthly, SubscriptionType::User) => 999,
        (SubscriptionPlan::Monthly, SubscriptionType::Investigator) => 2000,
        (SubscriptionPlan::Yearly, SubscriptionType::Investigator) => 20000,
        (SubscriptionPlan::Yearly, SubscriptionType::User) => 20000,
    }
}

/// A purchasable subscription plan as listed to clients
#[derive(Debug, Clone, Serialize)]
pub struct PlanListing {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: SubscriptionType,
    pub price_gbp: f64,
    pub price_pence: u32,
    pub features: Vec<&'static str>,
}

pub fn subscription_plans() -> Vec<PlanListing> {
    vec![
        PlanListing {
            id: "user_monthly",
            name: "Monthly Subscription",
            kind: SubscriptionType::User,
            price_gbp: 9.99,
            price_pence: 999,
            features: vec![
                "Access all detailed reports",
                "View haunting case details",
                "Contact investigators",
                "Equipment reviews",
                "Community features",
            ],
        },
        PlanListing {
            id: "investigator_monthly",
            name: "Investigator Monthly",
            kind: SubscriptionType::Investigator,
            price_gbp: 20.0,
            price_pence: 2000,
            features: vec![
                "List your services",
                "Receive booking requests",
                "Featured in directory",
                "Accept donations",
                "All user features",
            ],
        },
        PlanListing {
            id: "investigator_yearly",
            name: "Investigator Yearly",
            kind: SubscriptionType::Investigator,
            price_gbp: 200.0,
            price_pence: 20000,
            features: vec![
                "All monthly features",
                "Save £40/year",
                "Priority support",
                "Featured listing boost",
            ],
        },
    ]
}

// ============================================================================
// Video advertising
// ============================================================================

/// Video ad plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdPlan {
    WeeklyIntro,
    WeeklyStandard,
    MonthlyIntro,
    MonthlyStandard,
}

impl AdPlan {
    pub const ALL: [AdPlan; 4] = [
        Self::WeeklyIntro,
        Self::WeeklyStandard,
        Self::MonthlyIntro,
        Self::MonthlyStandard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeeklyIntro => "weekly_intro",
            Self::WeeklyStandard => "weekly_standard",
            Self::MonthlyIntro => "monthly_intro",
            Self::MonthlyStandard => "monthly_standard",
        }
    }

    /// Unknown plan names are billed as the weekly introductory rate
    pub fn parse_or_intro(value: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == value)
            .unwrap_or(Self::WeeklyIntro)
    }

    pub fn duration_days(&self) -> i64 {
        match self {
            Self::WeeklyIntro | Self::WeeklyStandard => 7,
            Self::MonthlyIntro | Self::MonthlyStandard => 30,
        }
    }

    pub fn price_pence(&self) -> u32 {
        match self {
            Self::WeeklyIntro => 2000,
            Self::WeeklyStandard => 5000,
            Self::MonthlyIntro => 8000,
            Self::MonthlyStandard => 20000,
        }
    }

    pub fn is_intro(&self) -> bool {
        matches!(self, Self::WeeklyIntro | Self::MonthlyIntro)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::WeeklyIntro => "Weekly (Introductory)",
            Self::WeeklyStandard => "Weekly (Standard)",
            Self::MonthlyIntro => "Monthly (Introductory)",
            Self::MonthlyStandard => "Monthly (Standard)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::WeeklyIntro => "First 3 months - special launch rate!",
            Self::MonthlyIntro => "First 3 months - save £80 vs weekly!",
            Self::WeeklyStandard | Self::MonthlyStandard => {
                "Standard rate after introductory period"
            }
        }
    }
}

pub fn is_equipment_category(value: &str) -> bool {
    EQUIPMENT_CATEGORIES.contains(&value)
}

pub fn is_ad_category(value: &str) -> bool {
    AD_CATEGORIES.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!(
            ReportCategory::parse("Ghost/Spirit"),
            Some(ReportCategory::GhostSpirit)
        );
        assert_eq!(
            ReportCategory::parse("  ufo/uap "),
            Some(ReportCategory::UfoUap)
        );
        assert_eq!(ReportCategory::parse("Banshee"), None);
        assert_eq!(
            ReportCategory::parse_or_other("Banshee"),
            ReportCategory::Other
        );
    }

    #[test]
    fn test_category_serde_uses_display_names() {
        let json = serde_json::to_string(&ReportCategory::ShadowFigure).unwrap();
        assert_eq!(json, "\"Shadow Figure\"");
        let back: ReportCategory = serde_json::from_str("\"EVP/Audio\"").unwrap();
        assert_eq!(back, ReportCategory::EvpAudio);
    }

    #[test]
    fn test_subscription_prices() {
        use SubscriptionPlan::*;
        use SubscriptionType::*;
        assert_eq!(subscription_price_pence(User, Monthly), 999);
        assert_eq!(subscription_price_pence(Investigator, Monthly), 2000);
        assert_eq!(subscription_price_pence(Investigator, Yearly), 20000);
        assert_eq!(Yearly.duration_days(), 365);
    }

    #[test]
    fn test_ad_plan_lookup() {
        assert_eq!(
            AdPlan::parse_or_intro("monthly_standard"),
            AdPlan::MonthlyStandard
        );
        assert_eq!(AdPlan::parse_or_intro("quarterly"), AdPlan::WeeklyIntro);
        assert_eq!(AdPlan::MonthlyIntro.price_pence(), 8000);
        assert_eq!(AdPlan::WeeklyStandard.duration_days(), 7);
    }

    #[test]
    fn test_catalog_membership() {
        assert!(is_equipment_category("REM Pods"));
        assert!(!is_equipment_category("Ouija Boards"));
        assert!(is_ad_category("Podcast"));
    }
}
