//! SyncStyle Types - Shared domain types
//!
//! This crate contains domain types used across the SyncStyle entitlement services:
//! - User identity
//! - Premium features and metered usage types
//! - Tier catalog entries, limits and pricing
//! - Subscription records and billing periods
//! - Entitlement check results and upgrade prompt data

pub mod billing;
pub mod entitlement;
pub mod error;
pub mod feature;
pub mod subscription;
pub mod tier;
pub mod usage;
pub mod user;

pub use billing::*;
pub use entitlement::*;
pub use error::*;
pub use feature::*;
pub use subscription::*;
pub use tier::*;
pub use usage::*;
pub use user::*;
