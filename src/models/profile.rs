//! The backend profile row: one record per user holding onboarding answers
//! and preferences.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::mode::AppMode;

/// Every amount in a profile is denominated in Jordanian dinars.
pub const DEFAULT_CURRENCY: &str = "JD";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Which facet the user wants to land in.
#[derive(
    Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PreferredMode {
    #[default]
    Financial,
    Personal,
    /// No preference; keep whatever facet is active.
    Both,
}

impl From<AppMode> for PreferredMode {
    fn from(mode: AppMode) -> Self {
        match mode {
            AppMode::Financial => PreferredMode::Financial,
            AppMode::Personal => PreferredMode::Personal,
        }
    }
}

impl PreferredMode {
    /// The facet this preference selects, if it selects one at all.
    pub fn as_app_mode(self) -> Option<AppMode> {
        match self {
            PreferredMode::Financial => Some(AppMode::Financial),
            PreferredMode::Personal => Some(AppMode::Personal),
            PreferredMode::Both => None,
        }
    }
}

#[derive(
    Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

/// A profile row as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub preferred_mode: PreferredMode,
    #[serde(default)]
    pub has_completed_onboarding: bool,
    #[serde(default)]
    pub monthly_income: f64,
    #[serde(default)]
    pub household_size: u32,
    #[serde(default)]
    pub primary_goals: Vec<String>,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
    #[serde(default)]
    pub personal_interests: Vec<String>,
    #[serde(default)]
    pub daily_routine_start: Option<String>,
    #[serde(default)]
    pub daily_routine_end: Option<String>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Payload for a first-time profile insert; the row id is supplied by the
/// caller at insert time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    pub email: String,
    pub name: String,
    pub preferred_mode: PreferredMode,
    pub has_completed_onboarding: bool,
    pub monthly_income: f64,
    pub household_size: u32,
    pub primary_goals: Vec<String>,
    pub risk_tolerance: RiskTolerance,
    pub personal_interests: Vec<String>,
    pub daily_routine_start: Option<String>,
    pub daily_routine_end: Option<String>,
    pub focus_areas: Vec<String>,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn profile_deserializes_from_row_json() {
        let raw = r#"{
            "id": "5e3f1a2c-9f3e-4e8a-b8a1-0c6a4b6f2d11",
            "email": "lina@example.com",
            "name": "Lina",
            "preferred_mode": "personal",
            "has_completed_onboarding": true,
            "monthly_income": 850.0,
            "household_size": 3,
            "primary_goals": ["emergency fund", "debt free"],
            "risk_tolerance": "low",
            "personal_interests": ["reading"],
            "daily_routine_start": "07:30",
            "daily_routine_end": "22:00",
            "focus_areas": ["budgeting", "sleep"]
        }"#;
        let profile: Profile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.preferred_mode, PreferredMode::Personal);
        assert_eq!(profile.risk_tolerance, RiskTolerance::Low);
        assert_eq!(profile.household_size, 3);
        assert_eq!(profile.daily_routine_start.as_deref(), Some("07:30"));
        // Currency is fixed; rows that predate the column fall back to JD.
        assert_eq!(profile.currency, DEFAULT_CURRENCY);
    }

    #[test]
    fn sparse_row_uses_defaults() {
        let raw = r#"{"id": "u1", "email": "x@example.com", "name": "X"}"#;
        let profile: Profile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.preferred_mode, PreferredMode::Financial);
        assert!(!profile.has_completed_onboarding);
        assert_eq!(profile.monthly_income, 0.0);
        assert!(profile.primary_goals.is_empty());
        assert_eq!(profile.daily_routine_end, None);
    }

    #[test]
    fn preferred_mode_maps_to_facet() {
        assert_eq!(
            PreferredMode::Financial.as_app_mode(),
            Some(AppMode::Financial)
        );
        assert_eq!(
            PreferredMode::Personal.as_app_mode(),
            Some(AppMode::Personal)
        );
        assert_eq!(PreferredMode::Both.as_app_mode(), None);
        assert_eq!(PreferredMode::from(AppMode::Personal), PreferredMode::Personal);
    }

    #[test]
    fn new_profile_serializes_snake_case() {
        let profile = NewProfile {
            email: "lina@example.com".into(),
            name: "Lina".into(),
            preferred_mode: PreferredMode::Both,
            has_completed_onboarding: true,
            currency: DEFAULT_CURRENCY.into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["preferred_mode"], "both");
        assert_eq!(value["has_completed_onboarding"], true);
        assert_eq!(value["currency"], "JD");
        assert_eq!(value["risk_tolerance"], "medium");
    }
}
