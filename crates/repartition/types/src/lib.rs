//! # repartition-types
//!
//! Domain types for the revenue-distribution engine:
//!
//! - identifiers for cases (affaires), agents, and payments (encaissements)
//! - the validated [`Payment`] consumed by the engine
//! - case staffing: [`Role`] tags and the resolved [`RoleAssignment`]
//! - the distribution breakdown: [`BeneficiaryLine`] items and the
//!   immutable [`RepartitionResult`]
//!
//! Amounts are `i64` minor units throughout. The result type is a pure
//! value: it carries no generated identifiers and no clock reads, so two
//! distributions of the same inputs compare equal field for field.

#![deny(unsafe_code)]

pub mod ids;
pub mod payment;
pub mod result;
pub mod roles;

pub use ids::{AgentId, CaseId, PaymentId};
pub use payment::{Payment, PaymentStatus};
pub use result::{BeneficiaryLine, RepartitionResult, RuleSetRef, ShareTier};
pub use roles::{Role, RoleAssignment};
