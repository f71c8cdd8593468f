//! Core Kernel - Foundational types and utilities for provider hub
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Surrogate-id newtypes for every entity in the relational model
//! - The generic child-set reconciliation algorithm (remove / update / insert)
//! - Typed write outcomes replacing ad-hoc status strings
//! - Port infrastructure shared by storage and external-feed adapters

pub mod identifiers;
pub mod outcome;
pub mod ports;
pub mod reconcile;

pub use identifiers::{
    CountryId, CustomFieldId, ProviderId, ProviderServiceId, ServiceCountryId, ServiceId,
};
pub use outcome::WriteOutcome;
pub use ports::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
pub use reconcile::{diff_by_natural_key, diff_children, ChildDiff, NaturalKeyDiff};
