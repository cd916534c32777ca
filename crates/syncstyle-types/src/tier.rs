//! Subscription tier catalog types
//!
//! Tiers are data, not code: each row of the catalog names a tier, prices it,
//! and lists the features and monthly usage caps it grants. The implicit
//! `free` tier has no catalog row.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{Feature, ParseError, UsageType};

/// Maximum length of a tier name
const MAX_TIER_NAME_LEN: usize = 64;

/// Tier name, the key into the tier catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TierName(String);

impl TierName {
    /// Name reported for users without a subscription record
    pub const FREE: &'static str = "free";

    /// Create a validated tier name
    pub fn new(name: impl Into<String>) -> Result<Self, ParseError> {
        let name = name.into();
        let valid = !name.is_empty()
            && name.len() <= MAX_TIER_NAME_LEN
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

        if valid {
            Ok(Self(name))
        } else {
            Err(ParseError::InvalidTierName(name))
        }
    }

    /// The implicit free tier
    pub fn free() -> Self {
        Self(Self::FREE.to_string())
    }

    /// Get the tier name string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the implicit free tier
    pub fn is_free(&self) -> bool {
        self.0 == Self::FREE
    }
}

impl std::fmt::Display for TierName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TierName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TierName {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TierName> for String {
    fn from(name: TierName) -> Self {
        name.0
    }
}

/// Monthly cap for one usage type
///
/// Stored as an integer where `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum UsageLimit {
    /// No cap
    Unlimited,
    /// At most this many units per billing period
    Capped(u64),
}

impl UsageLimit {
    /// Raw value used for unlimited
    pub const UNLIMITED_RAW: i64 = -1;

    /// Parse the stored integer representation
    pub fn from_raw(raw: i64) -> Result<Self, ParseError> {
        match raw {
            Self::UNLIMITED_RAW => Ok(Self::Unlimited),
            n if n >= 0 => Ok(Self::Capped(n.unsigned_abs())),
            n => Err(ParseError::InvalidLimit(n)),
        }
    }

    /// Stored integer representation
    pub fn to_raw(self) -> i64 {
        match self {
            Self::Unlimited => Self::UNLIMITED_RAW,
            Self::Capped(n) => i64::try_from(n).unwrap_or(i64::MAX),
        }
    }
}

impl TryFrom<i64> for UsageLimit {
    type Error = ParseError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_raw(value)
    }
}

impl From<UsageLimit> for i64 {
    fn from(limit: UsageLimit) -> Self {
        limit.to_raw()
    }
}

/// Monthly caps of a tier, keyed by usage type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierLimits(BTreeMap<UsageType, UsageLimit>);

impl TierLimits {
    /// Empty limits (every usage type unconfigured)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cap for a usage type
    #[must_use]
    pub fn with(mut self, usage_type: UsageType, limit: UsageLimit) -> Self {
        self.0.insert(usage_type, limit);
        self
    }

    /// Set the cap for a usage type in place
    pub fn insert(&mut self, usage_type: UsageType, limit: UsageLimit) {
        self.0.insert(usage_type, limit);
    }

    /// Cap for a usage type, `None` when the tier does not configure one
    pub fn get(&self, usage_type: UsageType) -> Option<UsageLimit> {
        self.0.get(&usage_type).copied()
    }

    /// Iterate over configured caps
    pub fn iter(&self) -> impl Iterator<Item = (UsageType, UsageLimit)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Render as the stored `<usage_type>_per_month` → integer object
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(usage_type, limit)| (usage_type.limit_key().to_string(), limit.to_raw().into()))
            .collect();
        serde_json::Value::Object(map)
    }
}

/// Tier catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    /// Unique tier name
    pub name: TierName,
    /// Monthly price in cents
    pub price_monthly_cents: i64,
    /// Yearly price in cents
    pub price_yearly_cents: i64,
    /// Features granted by the tier
    pub features: BTreeSet<Feature>,
    /// Monthly usage caps
    pub limits: TierLimits,
    /// Inactive tiers are neither enforced nor recommended
    pub is_active: bool,
}

impl Tier {
    /// Whether the tier grants a feature
    pub fn includes(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Monthly cap for a usage type
    pub fn limit_for(&self, usage_type: UsageType) -> Option<UsageLimit> {
        self.limits.get(usage_type)
    }

    /// Pricing summary for upgrade prompts
    pub fn summary(&self) -> TierSummary {
        TierSummary {
            name: self.name.clone(),
            price_monthly_cents: self.price_monthly_cents,
            price_yearly_cents: self.price_yearly_cents,
        }
    }
}

/// Tier name and pricing, without features or limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSummary {
    /// Tier name
    pub name: TierName,
    /// Monthly price in cents
    pub price_monthly_cents: i64,
    /// Yearly price in cents
    pub price_yearly_cents: i64,
}
