//! PostgreSQL repository implementations

mod subscription;
mod tier;
mod usage;

pub use subscription::PgSubscriptionRepository;
pub use tier::PgTierRepository;
pub use usage::PgUsageRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub subscriptions: PgSubscriptionRepository,
    pub tiers: PgTierRepository,
    pub usage: PgUsageRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            subscriptions: PgSubscriptionRepository::new(pool.clone()),
            tiers: PgTierRepository::new(pool.clone()),
            usage: PgUsageRepository::new(pool),
        }
    }
}
