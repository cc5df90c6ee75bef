use serde::{Deserialize, Serialize};

use crate::ids::AgentId;

/// Role an agent may hold on a given case.
///
/// A closed set: role handling in the engine is matched exhaustively, so a
/// new role cannot be introduced without the compiler pointing at every
/// place that must decide what to do with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Chief,
    Seizer,
    Verifier,
    Indicator,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Chief, Role::Seizer, Role::Verifier, Role::Indicator];

    /// French register label, used in line-item descriptions and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Chief => "chef",
            Role::Seizer => "saisissant",
            Role::Verifier => "verificateur",
            Role::Indicator => "indicateur",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The resolved staffing of one case.
///
/// Each role maps to an ordered, deduplicated list of agents (ascending by
/// identifier — the canonical pool-division order). Empty lists are a
/// normal state, not an error. The two permanent institutional
/// beneficiaries (DD/DG) are resolved here as well; `None` means the tier
/// falls back to a generic placeholder line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    chiefs: Vec<AgentId>,
    seizers: Vec<AgentId>,
    verifiers: Vec<AgentId>,
    indicators: Vec<AgentId>,
    pub direction_departementale: Option<AgentId>,
    pub direction_generale: Option<AgentId>,
}

impl RoleAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `(agent, role)` pairs; sorts and deduplicates per role.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (AgentId, Role)>) -> Self {
        let mut assignment = Self::new();
        for (agent, role) in pairs {
            assignment.push(agent, role);
        }
        assignment.normalize();
        assignment
    }

    /// Append an agent under a role. Ordering is restored by [`normalize`],
    /// which [`from_pairs`] calls; push alone keeps insertion order.
    ///
    /// [`normalize`]: RoleAssignment::normalize
    /// [`from_pairs`]: RoleAssignment::from_pairs
    pub fn push(&mut self, agent: AgentId, role: Role) {
        self.slot_mut(role).push(agent);
    }

    /// Sort each role's agents ascending by identifier and drop duplicates.
    pub fn normalize(&mut self) {
        for role in Role::ALL {
            let slot = self.slot_mut(role);
            slot.sort();
            slot.dedup();
        }
    }

    pub fn agents(&self, role: Role) -> &[AgentId] {
        match role {
            Role::Chief => &self.chiefs,
            Role::Seizer => &self.seizers,
            Role::Verifier => &self.verifiers,
            Role::Indicator => &self.indicators,
        }
    }

    pub fn count(&self, role: Role) -> usize {
        self.agents(role).len()
    }

    pub fn has_agents(&self, role: Role) -> bool {
        !self.agents(role).is_empty()
    }

    /// Every agent referenced anywhere in the assignment, in role order.
    pub fn referenced_agents(&self) -> Vec<&AgentId> {
        let mut agents: Vec<&AgentId> = Role::ALL
            .iter()
            .flat_map(|role| self.agents(*role).iter())
            .collect();
        agents.extend(self.direction_departementale.iter());
        agents.extend(self.direction_generale.iter());
        agents
    }

    fn slot_mut(&mut self, role: Role) -> &mut Vec<AgentId> {
        match role {
            Role::Chief => &mut self.chiefs,
            Role::Seizer => &mut self.seizers,
            Role::Verifier => &mut self.verifiers,
            Role::Indicator => &mut self.indicators,
        }
    }
}
