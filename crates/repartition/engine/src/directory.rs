use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use repartition_types::{AgentId, CaseId, Role, RoleAssignment};

use crate::error::RepartitionError;

/// Resolves the role assignments of a case.
///
/// Must be deterministic for a given case state: same case, same staffing,
/// same ordering of agents within each role. A role with no assigned agent
/// resolves to an empty set, which is a normal state, not an error.
pub trait RoleDirectory {
    fn resolve_roles(&self, case_id: &CaseId) -> Result<RoleAssignment, RepartitionError>;
}

/// In-memory role directory over the case/agent relation.
///
/// Holds the minimum reference data role resolution needs: the agent
/// registry, the case registry, per-case `(agent, role)` assignments, and
/// the two permanent institutional beneficiary holders. Ordered maps keep
/// iteration (and therefore resolution) deterministic.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRoleDirectory {
    agents: BTreeMap<AgentId, String>,
    cases: BTreeSet<CaseId>,
    /// Per case, the role of each agent. The role for a `(case, agent)`
    /// pair is authoritative: re-assigning replaces the previous role.
    assignments: BTreeMap<CaseId, BTreeMap<AgentId, Role>>,
    direction_departementale: Option<AgentId>,
    direction_generale: Option<AgentId>,
}

impl InMemoryRoleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_agent(&mut self, agent_id: AgentId, display_name: impl Into<String>) {
        self.agents.insert(agent_id, display_name.into());
    }

    /// Remove an agent from the registry.
    ///
    /// Assignments referencing the agent are left in place; resolving a
    /// case that still references it fails with `StaleRoleAssignment`
    /// rather than silently shrinking a pool's division count.
    pub fn remove_agent(&mut self, agent_id: &AgentId) {
        self.agents.remove(agent_id);
    }

    pub fn register_case(&mut self, case_id: CaseId) {
        self.cases.insert(case_id);
    }

    /// Assign `agent_id` to `case_id` under `role`.
    ///
    /// Replaces the agent's previous role on that case, if any. The agent
    /// registry is checked at resolution time, not here.
    pub fn assign(
        &mut self,
        case_id: &CaseId,
        agent_id: AgentId,
        role: Role,
    ) -> Result<(), RepartitionError> {
        if !self.cases.contains(case_id) {
            return Err(RepartitionError::CaseNotFound(case_id.clone()));
        }
        self.assignments
            .entry(case_id.clone())
            .or_default()
            .insert(agent_id, role);
        Ok(())
    }

    pub fn set_direction_departementale(&mut self, holder: Option<AgentId>) {
        self.direction_departementale = holder;
    }

    pub fn set_direction_generale(&mut self, holder: Option<AgentId>) {
        self.direction_generale = holder;
    }

    pub fn agent_name(&self, agent_id: &AgentId) -> Option<&str> {
        self.agents.get(agent_id).map(String::as_str)
    }

    fn check_exists(
        &self,
        case_id: &CaseId,
        agent_id: &AgentId,
    ) -> Result<(), RepartitionError> {
        if self.agents.contains_key(agent_id) {
            Ok(())
        } else {
            Err(RepartitionError::StaleRoleAssignment {
                case_id: case_id.clone(),
                agent_id: agent_id.clone(),
            })
        }
    }
}

impl RoleDirectory for InMemoryRoleDirectory {
    fn resolve_roles(&self, case_id: &CaseId) -> Result<RoleAssignment, RepartitionError> {
        if !self.cases.contains(case_id) {
            return Err(RepartitionError::CaseNotFound(case_id.clone()));
        }

        let mut assignment = RoleAssignment::new();
        if let Some(pairs) = self.assignments.get(case_id) {
            for (agent_id, role) in pairs {
                self.check_exists(case_id, agent_id)?;
                assignment.push(agent_id.clone(), *role);
            }
        }
        assignment.normalize();

        if let Some(holder) = &self.direction_departementale {
            self.check_exists(case_id, holder)?;
            assignment.direction_departementale = Some(holder.clone());
        }
        if let Some(holder) = &self.direction_generale {
            self.check_exists(case_id, holder)?;
            assignment.direction_generale = Some(holder.clone());
        }

        debug!(
            case = %case_id,
            chiefs = assignment.count(Role::Chief),
            seizers = assignment.count(Role::Seizer),
            verifiers = assignment.count(Role::Verifier),
            indicators = assignment.count(Role::Indicator),
            "Resolved case roles"
        );

        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staffed_directory() -> InMemoryRoleDirectory {
        let mut directory = InMemoryRoleDirectory::new();
        directory.register_agent(AgentId::new("MAT-2"), "Ben Salah");
        directory.register_agent(AgentId::new("MAT-1"), "Trabelsi");
        directory.register_agent(AgentId::new("MAT-3"), "Haddad");
        directory.register_case(CaseId::new("AFF-1"));
        directory
            .assign(&CaseId::new("AFF-1"), AgentId::new("MAT-2"), Role::Chief)
            .unwrap();
        directory
            .assign(&CaseId::new("AFF-1"), AgentId::new("MAT-1"), Role::Chief)
            .unwrap();
        directory
            .assign(&CaseId::new("AFF-1"), AgentId::new("MAT-3"), Role::Seizer)
            .unwrap();
        directory
    }

    #[test]
    fn resolves_roles_in_ascending_agent_order() {
        let directory = staffed_directory();
        let assignment = directory.resolve_roles(&CaseId::new("AFF-1")).unwrap();
        assert_eq!(
            assignment.agents(Role::Chief),
            &[AgentId::new("MAT-1"), AgentId::new("MAT-2")]
        );
        assert_eq!(assignment.agents(Role::Seizer), &[AgentId::new("MAT-3")]);
        assert!(assignment.agents(Role::Indicator).is_empty());
    }

    #[test]
    fn unknown_case_is_not_found() {
        let directory = staffed_directory();
        assert!(matches!(
            directory.resolve_roles(&CaseId::new("AFF-404")),
            Err(RepartitionError::CaseNotFound(_))
        ));
    }

    #[test]
    fn unstaffed_case_resolves_to_empty_roles() {
        let mut directory = staffed_directory();
        directory.register_case(CaseId::new("AFF-2"));
        let assignment = directory.resolve_roles(&CaseId::new("AFF-2")).unwrap();
        for role in Role::ALL {
            assert!(!assignment.has_agents(role));
        }
    }

    #[test]
    fn reassigning_a_pair_replaces_the_role() {
        let mut directory = staffed_directory();
        directory
            .assign(&CaseId::new("AFF-1"), AgentId::new("MAT-3"), Role::Verifier)
            .unwrap();
        let assignment = directory.resolve_roles(&CaseId::new("AFF-1")).unwrap();
        assert!(assignment.agents(Role::Seizer).is_empty());
        assert_eq!(assignment.agents(Role::Verifier), &[AgentId::new("MAT-3")]);
    }

    #[test]
    fn removed_agent_makes_resolution_stale() {
        let mut directory = staffed_directory();
        directory.remove_agent(&AgentId::new("MAT-3"));
        assert!(matches!(
            directory.resolve_roles(&CaseId::new("AFF-1")),
            Err(RepartitionError::StaleRoleAssignment { agent_id, .. })
                if agent_id == AgentId::new("MAT-3")
        ));
    }

    #[test]
    fn stale_permanent_holder_is_detected() {
        let mut directory = staffed_directory();
        directory.set_direction_departementale(Some(AgentId::new("MAT-404")));
        assert!(matches!(
            directory.resolve_roles(&CaseId::new("AFF-1")),
            Err(RepartitionError::StaleRoleAssignment { agent_id, .. })
                if agent_id == AgentId::new("MAT-404")
        ));
    }

    #[test]
    fn permanent_holders_appear_in_the_assignment() {
        let mut directory = staffed_directory();
        directory.set_direction_departementale(Some(AgentId::new("MAT-1")));
        directory.set_direction_generale(Some(AgentId::new("MAT-2")));
        let assignment = directory.resolve_roles(&CaseId::new("AFF-1")).unwrap();
        assert_eq!(
            assignment.direction_departementale,
            Some(AgentId::new("MAT-1"))
        );
        assert_eq!(assignment.direction_generale, Some(AgentId::new("MAT-2")));
    }

    #[test]
    fn assign_to_unknown_case_fails() {
        let mut directory = staffed_directory();
        assert!(matches!(
            directory.assign(&CaseId::new("AFF-404"), AgentId::new("MAT-1"), Role::Chief),
            Err(RepartitionError::CaseNotFound(_))
        ));
    }

    #[test]
    fn resolution_is_deterministic() {
        let directory = staffed_directory();
        let first = directory.resolve_roles(&CaseId::new("AFF-1")).unwrap();
        let second = directory.resolve_roles(&CaseId::new("AFF-1")).unwrap();
        assert_eq!(first, second);
    }
}
