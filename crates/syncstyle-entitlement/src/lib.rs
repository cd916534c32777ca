//! SyncStyle Entitlement - Premium feature gate
//!
//! Decides whether a user may use a premium feature or consume one more unit
//! of a metered action, and builds the data for the upgrade prompt shown when
//! the answer is no.
//!
//! Every decision is computed from the subscription record, the tier catalog
//! and the usage ledger at query time. Nothing is cached. Any failure to read
//! a store denies access; errors are logged and counted, never returned from
//! the checks.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use syncstyle_db::Repositories;
//! use syncstyle_entitlement::{EntitlementConfig, EntitlementEngine};
//!
//! let repos = Repositories::new(pool);
//! let engine = EntitlementEngine::new(
//!     Arc::new(repos.subscriptions),
//!     Arc::new(repos.tiers),
//!     Arc::new(repos.usage),
//!     EntitlementConfig::default(),
//! );
//!
//! if !engine.check_feature_access(user_id, Feature::AdvancedAnalytics).await {
//!     let prompt = engine.get_upgrade_prompt_data(user_id, Feature::AdvancedAnalytics).await;
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod prompt;
pub mod recorder;
mod store;

pub use config::{EntitlementConfig, FreeTierAllowance};
pub use engine::{EntitlementEngine, MemoryEntitlementEngine, PgEntitlementEngine};
pub use error::EntitlementError;
pub use prompt::recommend_tier;
pub use recorder::{MemoryUsageRecorder, PgUsageRecorder, UsageRecorder};
