//! Entitlement check and upgrade prompt types

use serde::{Deserialize, Serialize};

use crate::{Feature, TierName, TierSummary, UsageCheck, UsageType};

/// Feature access check result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCheck {
    /// Feature being checked
    pub feature: Feature,
    /// Whether access is allowed
    pub allowed: bool,
}

/// Usage limit check result, tagged with its usage type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLimitCheck {
    /// Usage type being checked
    pub usage_type: UsageType,
    /// Outcome
    #[serde(flatten)]
    pub check: UsageCheck,
}

/// Data needed to render an upgrade call-to-action for a denied feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeModalData {
    /// Requested feature
    pub feature: Feature,
    /// Display name of the feature
    pub feature_name: String,
    /// Benefits of the feature
    pub benefits: Vec<String>,
    /// User's current tier, `free` without a subscription record
    pub current_tier: TierName,
    /// Cheapest active tier granting the feature; `None` means omit pricing
    pub recommended_tier: Option<TierSummary>,
    /// Whether the user has never subscribed
    pub trial_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_limit_check_flattens() {
        let check = UsageLimitCheck {
            usage_type: UsageType::PhotoUploads,
            check: UsageCheck::unlimited(),
        };
        let json = serde_json::to_value(check).unwrap();
        assert_eq!(json["usage_type"], "photo_uploads");
        assert_eq!(json["allowed"], true);
        assert!(json["remaining"].is_null());
    }

    #[test]
    fn test_upgrade_modal_serializes_missing_recommendation_as_null() {
        let data = UpgradeModalData {
            feature: Feature::PrioritySupport,
            feature_name: Feature::PrioritySupport.display_name().to_string(),
            benefits: vec![],
            current_tier: TierName::free(),
            recommended_tier: None,
            trial_available: true,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["current_tier"], "free");
        assert!(json["recommended_tier"].is_null());
    }
}
