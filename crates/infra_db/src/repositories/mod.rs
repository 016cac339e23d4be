//! PostgreSQL implementations of the domain stores
//!
//! Queries are built at runtime with `sqlx::query_as` and `FromRow` rows, so
//! the crate builds without a live database. Rows are mapped to domain types
//! at the adapter boundary and database errors leave as `PortError`.

pub mod accounts;
pub mod claims;

pub use accounts::{AccountRow, AccountTypeDb, PgAccountStore};
pub use claims::{ClaimRow, ClaimStatusDb, PgClaimStore, PgClaimTransaction};
