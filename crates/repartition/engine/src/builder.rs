use repartition_types::{
    AgentId, BeneficiaryLine, Payment, RepartitionResult, RuleSetRef, ShareTier,
};

/// Accumulates tier amounts and beneficiary lines, then freezes them into
/// an immutable [`RepartitionResult`].
///
/// The totals, discrepancy and equilibrium flag are computed exactly once,
/// at [`build`](RepartitionBuilder::build); no half-built result is ever
/// observable outside the builder.
pub struct RepartitionBuilder {
    result: RepartitionResult,
}

impl RepartitionBuilder {
    pub fn new(payment: &Payment, rule_set: RuleSetRef, tolerance_minor: i64) -> Self {
        Self {
            result: RepartitionResult {
                payment_id: payment.payment_id.clone(),
                case_id: payment.case_id.clone(),
                rule_set,
                produit_disponible: payment.amount_minor,
                part_indicateur: 0,
                produit_net: 0,
                part_flcf: 0,
                part_tresor: 0,
                produit_net_ayants_droits: 0,
                part_dd: 0,
                part_dg: 0,
                part_chefs: 0,
                part_saisissants: 0,
                part_mutuelle: 0,
                part_masse_commune: 0,
                part_interessement: 0,
                lines: Vec::new(),
                total_reparti: 0,
                ecart_minor: 0,
                tolerance_minor,
                equilibre: false,
            },
        }
    }

    /// Indicator tier: the share and the net amount it leaves.
    pub fn indicator_tier(mut self, part_indicateur: i64, produit_net: i64) -> Self {
        self.result.part_indicateur = part_indicateur;
        self.result.produit_net = produit_net;
        self
    }

    /// Institutional split of the net amount.
    pub fn institutional_tier(
        mut self,
        part_flcf: i64,
        part_tresor: i64,
        produit_net_ayants_droits: i64,
    ) -> Self {
        self.result.part_flcf = part_flcf;
        self.result.part_tresor = part_tresor;
        self.result.produit_net_ayants_droits = produit_net_ayants_droits;
        self
    }

    /// Permanent-beneficiary tier (DD/DG).
    pub fn permanent_tier(mut self, part_dd: i64, part_dg: i64) -> Self {
        self.result.part_dd = part_dd;
        self.result.part_dg = part_dg;
        self
    }

    /// Role-dependent pools; `part_interessement` is the tier's remainder.
    pub fn pool_tier(
        mut self,
        part_chefs: i64,
        part_saisissants: i64,
        part_mutuelle: i64,
        part_masse_commune: i64,
        part_interessement: i64,
    ) -> Self {
        self.result.part_chefs = part_chefs;
        self.result.part_saisissants = part_saisissants;
        self.result.part_mutuelle = part_mutuelle;
        self.result.part_masse_commune = part_masse_commune;
        self.result.part_interessement = part_interessement;
        self
    }

    /// Append an individual agent line.
    pub fn agent_line(
        mut self,
        agent_id: AgentId,
        tier: ShareTier,
        amount_minor: i64,
        description: impl Into<String>,
    ) -> Self {
        self.result.lines.push(BeneficiaryLine::Agent {
            agent_id,
            tier,
            amount_minor,
            description: description.into(),
        });
        self
    }

    /// Append a generic placeholder line carrying a tier's money under its
    /// fixed label.
    pub fn placeholder_line(mut self, tier: ShareTier, amount_minor: i64) -> Self {
        self.result.lines.push(BeneficiaryLine::Placeholder {
            tier,
            label: tier.placeholder_label().to_string(),
            amount_minor,
        });
        self
    }

    /// Append already-built lines.
    pub fn lines(mut self, lines: impl IntoIterator<Item = BeneficiaryLine>) -> Self {
        self.result.lines.extend(lines);
        self
    }

    /// Freeze into an immutable result.
    ///
    /// Computes `total_reparti`, the signed discrepancy and the
    /// equilibrium flag from the accumulated tiers.
    pub fn build(mut self) -> RepartitionResult {
        self.result.total_reparti = self.result.tier_total();
        self.result.ecart_minor = self.result.produit_disponible - self.result.total_reparti;
        self.result.equilibre = self.result.ecart_minor.abs() <= self.result.tolerance_minor;

        debug_assert!(
            self.result.verify(),
            "built repartition is internally inconsistent"
        );
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use repartition_types::PaymentStatus;

    fn payment(amount_minor: i64) -> Payment {
        Payment::new(
            "ENC-1",
            "AFF-1",
            amount_minor,
            "TND",
            PaymentStatus::Validated,
            Utc::now(),
        )
    }

    fn rule_set_ref() -> RuleSetRef {
        RuleSetRef {
            name: "bareme-test".into(),
            version: 1,
        }
    }

    #[test]
    fn build_computes_total_and_equilibrium() {
        let result = RepartitionBuilder::new(&payment(1_000), rule_set_ref(), 10)
            .indicator_tier(100, 900)
            .institutional_tier(45, 135, 720)
            .permanent_tier(36, 36)
            .pool_tier(0, 0, 72, 72, 504)
            .placeholder_line(ShareTier::DirectionDepartementale, 36)
            .placeholder_line(ShareTier::DirectionGenerale, 36)
            .build();

        assert_eq!(result.total_reparti, 1_000);
        assert_eq!(result.ecart_minor, 0);
        assert!(result.equilibre);
        assert!(result.verify());
    }

    #[test]
    fn discrepancy_beyond_tolerance_clears_the_flag() {
        // 20 units deliberately unaccounted for against a tolerance of 10.
        let result = RepartitionBuilder::new(&payment(1_000), rule_set_ref(), 10)
            .indicator_tier(100, 900)
            .institutional_tier(45, 135, 720)
            .permanent_tier(0, 0)
            .pool_tier(0, 0, 0, 0, 700)
            .build();

        assert_eq!(result.total_reparti, 980);
        assert_eq!(result.ecart_minor, 20);
        assert!(!result.equilibre);
    }

    #[test]
    fn discrepancy_within_tolerance_keeps_the_flag() {
        let result = RepartitionBuilder::new(&payment(1_000), rule_set_ref(), 10)
            .indicator_tier(100, 900)
            .institutional_tier(45, 135, 720)
            .permanent_tier(0, 0)
            .pool_tier(0, 0, 0, 0, 713)
            .build();

        assert_eq!(result.ecart_minor, 7);
        assert!(result.equilibre);
    }
}
