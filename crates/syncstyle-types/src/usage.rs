//! Metered usage types, billing periods and limit check results

use chrono::{DateTime, Datelike, Days, Months, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Countable, rate-limited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageType {
    /// AI outfit recommendation requests
    AiRecommendations,
    /// Wardrobe photo uploads
    PhotoUploads,
    /// Generated outfits
    OutfitGenerations,
}

impl UsageType {
    /// Every usage type
    pub const ALL: [UsageType; 3] = [
        Self::AiRecommendations,
        Self::PhotoUploads,
        Self::OutfitGenerations,
    ];

    /// Get the usage type ID string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AiRecommendations => "ai_recommendations",
            Self::PhotoUploads => "photo_uploads",
            Self::OutfitGenerations => "outfit_generations",
        }
    }

    /// Key under which a tier stores the monthly cap for this usage type
    pub const fn limit_key(&self) -> &'static str {
        match self {
            Self::AiRecommendations => "ai_recommendations_per_month",
            Self::PhotoUploads => "photo_uploads_per_month",
            Self::OutfitGenerations => "outfit_generations_per_month",
        }
    }

    /// Resolve a tier limit key back to its usage type
    pub fn from_limit_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.limit_key() == key)
    }
}

impl std::fmt::Display for UsageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UsageType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseError::UnknownUsageType(s.to_string()))
    }
}

/// Calendar-month aggregation window, half open: `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    /// First instant of the month
    pub start: DateTime<Utc>,
    /// First instant of the following month
    pub end: DateTime<Utc>,
}

impl BillingPeriod {
    /// The calendar month containing `at`
    pub fn containing(at: DateTime<Utc>) -> Self {
        let date = at.date_naive();
        let first = date - Days::new(u64::from(date.day0()));
        let next = first + Months::new(1);

        Self {
            start: first.and_time(NaiveTime::MIN).and_utc(),
            end: next.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    /// The calendar month containing the current server time
    pub fn current() -> Self {
        Self::containing(Utc::now())
    }

    /// Whether a record spanning `[start, end)` overlaps this period
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }

    /// Period label (YYYY-MM)
    pub fn label(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of a usage limit check
///
/// `remaining: None` means unlimited and must never be read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCheck {
    /// Whether one more unit may be consumed
    pub allowed: bool,
    /// Units left this period, `None` when unlimited
    pub remaining: Option<u64>,
}

impl UsageCheck {
    /// Fail-closed result
    pub const fn denied() -> Self {
        Self {
            allowed: false,
            remaining: Some(0),
        }
    }

    /// Unlimited usage
    pub const fn unlimited() -> Self {
        Self {
            allowed: true,
            remaining: None,
        }
    }

    /// Check `used` against a finite monthly cap
    pub fn capped(limit: u64, used: u64) -> Self {
        Self {
            allowed: used < limit,
            remaining: Some(limit.saturating_sub(used)),
        }
    }
}
