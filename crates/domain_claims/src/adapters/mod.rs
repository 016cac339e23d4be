//! Adapters for the ownership claim ports
//!
//! # Available Adapters
//!
//! - **HttpPlaceLookup**: place provider over REST, with a circuit breaker
//! - **TracingNotifier**: logs review notices
//! - **ReviewerAllowlist**: reviewer capability from configuration
//! - **InMemoryClaimStore**, **InMemoryPlaceDirectory**, **InMemoryOutbox**:
//!   process-local adapters for tests and local runs
//!
//! The PostgreSQL claim store lives in `infra_db`.

pub mod memory;
pub mod notifier;
pub mod place_lookup;
pub mod reviewers;

pub use memory::{InMemoryClaimStore, InMemoryOutbox, InMemoryPlaceDirectory};
pub use notifier::TracingNotifier;
pub use place_lookup::{HttpPlaceLookup, HttpPlaceLookupConfig};
pub use reviewers::ReviewerAllowlist;
