//! Common test utilities for syncstyle-entitlement integration tests

pub mod failing_repos;
pub mod fixtures;

#[allow(unused_imports)]
pub use failing_repos::{FailingStore, SlowStore};
#[allow(unused_imports)]
pub use fixtures::*;
