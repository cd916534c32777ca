//! In-memory store implementations
//!
//! DashMap-backed repositories with the same semantics as the PostgreSQL
//! ones. Used by tests and for running the service without a database.

mod subscription;
mod tier;
mod usage;

pub use subscription::MemorySubscriptionRepository;
pub use tier::MemoryTierRepository;
pub use usage::MemoryUsageRepository;

/// Bundle of in-memory repositories
#[derive(Clone, Default)]
pub struct MemoryRepositories {
    pub subscriptions: MemorySubscriptionRepository,
    pub tiers: MemoryTierRepository,
    pub usage: MemoryUsageRepository,
}

impl MemoryRepositories {
    /// Create empty stores
    pub fn new() -> Self {
        Self::default()
    }
}
