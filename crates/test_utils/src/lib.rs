//! Test Utilities Crate
//!
//! Shared test infrastructure for the ownership claim workspace.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built claims, listings and accounts
//! - `builders`: Builders for submit requests and claims in any status
//! - `database`: PostgreSQL test containers with migrations applied
//! - `assertions`: Assertions over claim collections and accounts
//! - `generators`: Property-based test data generators

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use database::*;
pub use fixtures::*;
pub use generators::*;
