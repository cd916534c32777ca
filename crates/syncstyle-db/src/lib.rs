//! SyncStyle DB - Entitlement stores
//!
//! Read and write access to the three collaborators of the entitlement engine:
//! the subscription record store, the tier catalog and the usage ledger.
//! Rows are validated into `syncstyle-types` domain types at this boundary, so
//! nothing loosely typed leaves the crate.
//!
//! Two implementations are provided: PostgreSQL via SQLx, and an in-memory
//! store used by tests and local development.
//!
//! # Example
//!
//! ```rust,ignore
//! use syncstyle_db::{create_pool, run_migrations, Repositories};
//!
//! let pool = create_pool("postgres://localhost/syncstyle").await?;
//! run_migrations(&pool).await?;
//! let repos = Repositories::new(pool);
//!
//! let record = repos.subscriptions.find_by_user_id(user_id).await?;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use memory::MemoryRepositories;
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_options, run_migrations, DbPool, PoolOptions};
pub use repo::*;
