//! End-to-end distribution flow: rule set loaded from configuration,
//! roles resolved through the directory, payment distributed.

use chrono::Utc;

use repartition_engine::{DistributionEngine, InMemoryRoleDirectory, RepartitionError};
use repartition_rules::DistributionRuleSet;
use repartition_types::{AgentId, CaseId, Payment, PaymentStatus, Role, ShareTier};

const BAREME_JSON: &str = r#"{
    "name": "bareme-2024",
    "version": 1,
    "indicateur_bps": 1000,
    "flcf_bps": 500,
    "tresor_bps": 1500,
    "dd_bps": 500,
    "dg_bps": 500,
    "chefs_bps": 2000,
    "saisissants_bps": 2000,
    "mutuelle_bps": 1000,
    "masse_commune_bps": 1000
}"#;

fn staffed_directory() -> InMemoryRoleDirectory {
    let mut directory = InMemoryRoleDirectory::new();
    for (id, name) in [
        ("MAT-1", "Trabelsi"),
        ("MAT-2", "Ben Salah"),
        ("MAT-3", "Haddad"),
        ("MAT-DD", "Direction departementale"),
    ] {
        directory.register_agent(AgentId::new(id), name);
    }
    directory.register_case(CaseId::new("AFF-2024-001"));
    directory
        .assign(&CaseId::new("AFF-2024-001"), AgentId::new("MAT-1"), Role::Chief)
        .unwrap();
    directory
        .assign(&CaseId::new("AFF-2024-001"), AgentId::new("MAT-2"), Role::Chief)
        .unwrap();
    directory
        .assign(&CaseId::new("AFF-2024-001"), AgentId::new("MAT-3"), Role::Seizer)
        .unwrap();
    directory.set_direction_departementale(Some(AgentId::new("MAT-DD")));
    directory
}

fn validated_payment(amount_minor: i64) -> Payment {
    Payment::new(
        "ENC-2024-17",
        "AFF-2024-001",
        amount_minor,
        "TND",
        PaymentStatus::Validated,
        Utc::now(),
    )
}

#[test]
fn distributes_a_validated_payment_end_to_end() {
    let rules = DistributionRuleSet::from_json_str(BAREME_JSON).unwrap();
    let engine = DistributionEngine::new(rules).unwrap();
    let directory = staffed_directory();

    let result = engine
        .distribute_for_case(&validated_payment(1_000_000), &directory)
        .unwrap();

    assert_eq!(result.rule_set.to_string(), "bareme-2024@v1");
    assert_eq!(result.produit_disponible, 1_000_000);
    assert_eq!(result.part_indicateur, 100_000);
    assert_eq!(result.part_flcf, 45_000);
    assert_eq!(result.part_tresor, 135_000);
    assert_eq!(result.part_dd, 36_000);
    assert_eq!(result.part_dg, 36_000);
    assert_eq!(result.part_chefs, 129_600);
    assert_eq!(result.part_saisissants, 129_600);
    assert_eq!(result.part_interessement, 259_200);
    assert_eq!(result.total_reparti, 1_000_000);
    assert!(result.equilibre);
    assert!(result.verify());

    // Two chiefs at 64,800 each, one seizer at the full seizer pool, the
    // resolved DD holder, and the DG placeholder fallback.
    assert_eq!(result.lines_total(ShareTier::Chefs), 129_600);
    assert_eq!(result.lines_total(ShareTier::Saisissants), 129_600);
    let dd_line = result
        .lines
        .iter()
        .find(|line| line.tier() == ShareTier::DirectionDepartementale)
        .unwrap();
    assert!(!dd_line.is_placeholder());
    let dg_line = result
        .lines
        .iter()
        .find(|line| line.tier() == ShareTier::DirectionGenerale)
        .unwrap();
    assert!(dg_line.is_placeholder());
    assert_eq!(dg_line.amount_minor(), 36_000);
}

#[test]
fn unknown_case_surfaces_not_found_through_the_flow() {
    let rules = DistributionRuleSet::from_json_str(BAREME_JSON).unwrap();
    let engine = DistributionEngine::new(rules).unwrap();
    let directory = staffed_directory();

    let mut payment = validated_payment(500_000);
    payment.case_id = CaseId::new("AFF-404");

    assert!(matches!(
        engine.distribute_for_case(&payment, &directory),
        Err(RepartitionError::CaseNotFound(_))
    ));
}

#[test]
fn stale_agent_aborts_the_distribution() {
    let rules = DistributionRuleSet::from_json_str(BAREME_JSON).unwrap();
    let engine = DistributionEngine::new(rules).unwrap();
    let mut directory = staffed_directory();
    directory.remove_agent(&AgentId::new("MAT-2"));

    assert!(matches!(
        engine.distribute_for_case(&validated_payment(500_000), &directory),
        Err(RepartitionError::StaleRoleAssignment { agent_id, .. })
            if agent_id == AgentId::new("MAT-2")
    ));
}

#[test]
fn recomputation_under_the_same_rules_is_reproducible() {
    let rules = DistributionRuleSet::from_json_str(BAREME_JSON).unwrap();
    let engine = DistributionEngine::new(rules).unwrap();
    let directory = staffed_directory();
    let payment = validated_payment(123_457);

    let first = engine.distribute_for_case(&payment, &directory).unwrap();
    let second = engine.distribute_for_case(&payment, &directory).unwrap();
    assert_eq!(first, second);
}
