use thiserror::Error;

use repartition_rules::RuleSetError;
use repartition_types::{AgentId, CaseId, PaymentId, PaymentStatus};

/// Distribution errors.
///
/// All variants are fatal to the calculation that raised them; nothing is
/// retried inside the engine. An out-of-tolerance result is NOT an error:
/// it is returned with `equilibre = false` and the caller decides.
#[derive(Debug, Error)]
pub enum RepartitionError {
    #[error("payment {payment_id} has non-positive amount {amount_minor}")]
    InvalidAmount {
        payment_id: PaymentId,
        amount_minor: i64,
    },

    #[error("payment {payment_id} is {status}, only validated payments are distributable")]
    PaymentNotValidated {
        payment_id: PaymentId,
        status: PaymentStatus,
    },

    #[error("case {0} not found")]
    CaseNotFound(CaseId),

    #[error("case {case_id} references agent {agent_id} which no longer exists")]
    StaleRoleAssignment { case_id: CaseId, agent_id: AgentId },

    #[error("rule set rejected: {0}")]
    RuleSet(#[from] RuleSetError),
}
