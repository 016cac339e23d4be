//! Infrastructure Database Layer
//!
//! PostgreSQL adapters for the ownership claim subsystem, using SQLx.
//!
//! # Architecture
//!
//! The crate implements the domain ports rather than exposing repositories
//! of its own:
//!
//! - [`PgClaimStore`] implements `domain_claims::ClaimStore`
//! - [`PgAccountStore`] implements `domain_account::AccountStore`
//!
//! The schema lives in `migrations/` and is applied with [`run_migrations`].
//! Exclusivity is enforced twice: by the listing lock each claim
//! transaction takes, and by partial unique indexes.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PgClaimStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/ownership_claims")).await?;
//! run_migrations(&pool).await?;
//! let claims = PgClaimStore::new(pool.clone());
//! ```

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, ping, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{PgAccountStore, PgClaimStore};
