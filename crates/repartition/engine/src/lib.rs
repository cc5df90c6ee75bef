//! # repartition-engine
//!
//! The revenue-distribution engine: given a validated payment against a
//! case, compute how the amount splits across the institutional funds and
//! the case's agents, tier by tier, so that every minor unit collected is
//! accounted for.
//!
//! - [`RoleDirectory`] resolves a case's staffing (who holds which role)
//! - [`DistributionEngine`] applies the tier waterfall of a
//!   [`DistributionRuleSet`](repartition_rules::DistributionRuleSet)
//! - [`RepartitionBuilder`] accumulates tiers and line items, then freezes
//!   them into an immutable [`RepartitionResult`](repartition_types::RepartitionResult)
//!
//! The computation is pure and synchronous: no clocks, no randomness, no
//! shared mutable state. Identical inputs produce field-for-field
//! identical results.

#![deny(unsafe_code)]

pub mod builder;
pub mod directory;
pub mod engine;
pub mod error;

pub use builder::RepartitionBuilder;
pub use directory::{InMemoryRoleDirectory, RoleDirectory};
pub use engine::DistributionEngine;
pub use error::RepartitionError;
