//! Core Kernel - Foundational types shared by the ownership-claim subsystem
//!
//! This crate provides the building blocks used across the domain and
//! infrastructure crates:
//! - Strongly-typed identifiers for claims, accounts and external listings
//! - The `PortError` taxonomy every adapter reports through
//! - Marker traits and metadata for ports and adapters

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{ClaimId, AccountId, TargetId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    CircuitBreakerConfig, OperationMetadata,
};
