//! In-memory tier catalog repository

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use syncstyle_types::{Tier, TierName};

use crate::error::DbResult;
use crate::repo::TierRepository;

/// In-memory tier catalog
#[derive(Default, Clone)]
pub struct MemoryTierRepository {
    tiers: Arc<DashMap<TierName, Tier>>,
}

impl MemoryTierRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a catalog entry
    pub fn insert(&self, tier: Tier) {
        self.tiers.insert(tier.name.clone(), tier);
    }
}

#[async_trait]
impl TierRepository for MemoryTierRepository {
    async fn find_active(&self, name: &TierName) -> DbResult<Option<Tier>> {
        Ok(self
            .tiers
            .get(name)
            .filter(|t| t.is_active)
            .map(|t| t.value().clone()))
    }

    async fn list_active(&self) -> DbResult<Vec<Tier>> {
        let mut tiers: Vec<Tier> = self
            .tiers
            .iter()
            .filter(|t| t.is_active)
            .map(|t| t.value().clone())
            .collect();
        tiers.sort_by(|a, b| {
            a.price_monthly_cents
                .cmp(&b.price_monthly_cents)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(tiers)
    }

    async fn upsert(&self, tier: &Tier) -> DbResult<()> {
        self.insert(tier.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncstyle_types::TierLimits;

    fn tier(name: &str, price: i64, is_active: bool) -> Tier {
        Tier {
            name: TierName::new(name).unwrap(),
            price_monthly_cents: price,
            price_yearly_cents: price * 10,
            features: Default::default(),
            limits: TierLimits::new(),
            is_active,
        }
    }

    #[tokio::test]
    async fn test_inactive_tiers_are_hidden() {
        let repo = MemoryTierRepository::new();
        repo.insert(tier("legacy", 100, false));

        let name = TierName::new("legacy").unwrap();
        assert!(repo.find_active(&name).await.unwrap().is_none());
        assert!(repo.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_by_price_then_name() {
        let repo = MemoryTierRepository::new();
        repo.insert(tier("premium", 999, true));
        repo.insert(tier("zeta", 499, true));
        repo.insert(tier("alpha", 499, true));

        let names: Vec<String> = repo
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta", "premium"]);
    }
}
