use serde::{Deserialize, Serialize};

/// Case identifier — a string wrapper for case (affaire) numbers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseId(pub String);

impl CaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Agent identifier (matricule).
///
/// `Ord` on the wrapped string is the canonical ordering used when a role
/// pool is divided among agents, so identical inputs always produce line
/// items in the same order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payment (encaissement) identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaymentId(pub String);

impl PaymentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_their_inner_value() {
        assert_eq!(format!("{}", CaseId::new("AFF-2024-001")), "AFF-2024-001");
        assert_eq!(format!("{}", AgentId::new("MAT-042")), "MAT-042");
        assert_eq!(format!("{}", PaymentId::new("ENC-7")), "ENC-7");
    }

    #[test]
    fn agent_ids_order_by_identifier() {
        let mut agents = vec![
            AgentId::new("MAT-200"),
            AgentId::new("MAT-005"),
            AgentId::new("MAT-100"),
        ];
        agents.sort();
        assert_eq!(agents[0], AgentId::new("MAT-005"));
        assert_eq!(agents[2], AgentId::new("MAT-200"));
    }
}
