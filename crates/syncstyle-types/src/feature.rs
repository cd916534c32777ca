//! Premium feature catalog
//!
//! Features form a closed set. Their display metadata (name, benefits,
//! minimum tier) is static configuration and never derived from the
//! tier catalog.

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Gated premium capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// AI-generated outfit suggestions
    AiOutfitSuggestions,
    /// Weather-driven outfit suggestions
    WeatherIntegration,
    /// No cap on catalogued wardrobe items
    UnlimitedWardrobe,
    /// Wear statistics and cost-per-wear charts
    AdvancedAnalytics,
    /// Carbon footprint estimates for the wardrobe
    CarbonFootprintTracking,
    /// Buying and selling in the marketplace
    MarketplaceAccess,
    /// Priority support channel
    PrioritySupport,
}

impl Feature {
    /// Every feature, in catalog order
    pub const ALL: [Feature; 7] = [
        Self::AiOutfitSuggestions,
        Self::WeatherIntegration,
        Self::UnlimitedWardrobe,
        Self::AdvancedAnalytics,
        Self::CarbonFootprintTracking,
        Self::MarketplaceAccess,
        Self::PrioritySupport,
    ];

    /// Get the feature ID string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AiOutfitSuggestions => "ai_outfit_suggestions",
            Self::WeatherIntegration => "weather_integration",
            Self::UnlimitedWardrobe => "unlimited_wardrobe",
            Self::AdvancedAnalytics => "advanced_analytics",
            Self::CarbonFootprintTracking => "carbon_footprint_tracking",
            Self::MarketplaceAccess => "marketplace_access",
            Self::PrioritySupport => "priority_support",
        }
    }

    /// Human readable name shown in upgrade prompts
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::AiOutfitSuggestions => "AI Outfit Suggestions",
            Self::WeatherIntegration => "Weather Integration",
            Self::UnlimitedWardrobe => "Unlimited Wardrobe",
            Self::AdvancedAnalytics => "Advanced Analytics",
            Self::CarbonFootprintTracking => "Carbon Footprint Tracking",
            Self::MarketplaceAccess => "Marketplace Access",
            Self::PrioritySupport => "Priority Support",
        }
    }

    /// Benefit bullet points shown in upgrade prompts
    pub const fn benefits(&self) -> &'static [&'static str] {
        match self {
            Self::AiOutfitSuggestions => &[
                "Personalized outfits generated from your wardrobe",
                "Suggestions tuned to occasion and style",
                "Fresh combinations every day",
            ],
            Self::WeatherIntegration => &[
                "Outfits matched to today's forecast",
                "Layering tips for changing conditions",
            ],
            Self::UnlimitedWardrobe => &[
                "Catalog as many items as you own",
                "No limits on saved outfits",
            ],
            Self::AdvancedAnalytics => &[
                "Cost-per-wear tracking",
                "Most and least worn items",
                "Seasonal wardrobe insights",
            ],
            Self::CarbonFootprintTracking => &[
                "Estimated footprint for every item",
                "Track the impact of rewearing",
            ],
            Self::MarketplaceAccess => &[
                "Sell items you no longer wear",
                "Discover pieces that match your style",
            ],
            Self::PrioritySupport => &[
                "Responses within one business day",
                "Dedicated support channel",
            ],
        }
    }

    /// Name of the lowest tier this feature is marketed under
    pub const fn min_tier(&self) -> &'static str {
        match self {
            Self::AiOutfitSuggestions | Self::WeatherIntegration | Self::UnlimitedWardrobe => {
                "pro"
            }
            Self::AdvancedAnalytics
            | Self::CarbonFootprintTracking
            | Self::MarketplaceAccess => "premium",
            Self::PrioritySupport => "enterprise",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Feature {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| ParseError::UnknownFeature(s.to_string()))
    }
}

/// Static metadata for a feature, as served by the feature catalog endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureInfo {
    /// Feature identifier
    pub id: Feature,
    /// Display name
    pub name: String,
    /// Benefit list
    pub benefits: Vec<String>,
    /// Lowest tier the feature is marketed under
    pub min_tier: String,
}

impl From<Feature> for FeatureInfo {
    fn from(feature: Feature) -> Self {
        Self {
            id: feature,
            name: feature.display_name().to_string(),
            benefits: feature.benefits().iter().map(|b| (*b).to_string()).collect(),
            min_tier: feature.min_tier().to_string(),
        }
    }
}

/// Metadata for every feature in catalog order
pub fn feature_catalog() -> Vec<FeatureInfo> {
    Feature::ALL.into_iter().map(FeatureInfo::from).collect()
}
