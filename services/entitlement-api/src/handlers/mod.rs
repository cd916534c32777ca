//! REST API handlers

pub mod billing;
pub mod entitlement;
pub mod features;
pub mod health;
pub mod shared;
pub mod usage;
pub mod webhook;

pub use billing::*;
pub use entitlement::*;
pub use features::*;
pub use health::*;
pub use usage::*;
pub use webhook::*;
