use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CaseId, PaymentId};

/// Lifecycle status of a payment.
///
/// Only `Validated` payments may be distributed. A validated payment is
/// immutable; distribution never mutates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Draft,
    Validated,
    Cancelled,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PaymentStatus::Draft => "draft",
            PaymentStatus::Validated => "validated",
            PaymentStatus::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

/// A payment (encaissement) recorded against a case.
///
/// `amount_minor` is in minor currency units (millimes, cents, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub case_id: CaseId,
    pub amount_minor: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub received_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        payment_id: impl Into<String>,
        case_id: impl Into<String>,
        amount_minor: i64,
        currency: impl Into<String>,
        status: PaymentStatus,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            payment_id: PaymentId::new(payment_id),
            case_id: CaseId::new(case_id),
            amount_minor,
            currency: currency.into(),
            status,
            received_at,
        }
    }

    pub fn is_validated(&self) -> bool {
        self.status == PaymentStatus::Validated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(status: PaymentStatus) -> Payment {
        Payment::new(
            "ENC-1",
            "AFF-2024-001",
            1_000_000,
            "TND",
            status,
            Utc::now(),
        )
    }

    #[test]
    fn only_validated_payments_are_distributable() {
        assert!(payment(PaymentStatus::Validated).is_validated());
        assert!(!payment(PaymentStatus::Draft).is_validated());
        assert!(!payment(PaymentStatus::Cancelled).is_validated());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&PaymentStatus::Validated).unwrap();
        assert_eq!(json, "\"validated\"");
        let restored: PaymentStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, PaymentStatus::Validated);
    }

    #[test]
    fn payment_roundtrips_through_json() {
        let p = payment(PaymentStatus::Validated);
        let json = serde_json::to_string(&p).unwrap();
        let restored: Payment = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, p);
    }
}
