use tracing::{debug, warn};

use repartition_rules::{share_half_up, DistributionRuleSet, IndicatorPolicy};
use repartition_types::{AgentId, Payment, RepartitionResult, Role, RoleAssignment, ShareTier};

use crate::builder::RepartitionBuilder;
use crate::directory::RoleDirectory;
use crate::error::RepartitionError;

/// The distribution engine.
///
/// Holds a validated rule set and computes distributions as a pure
/// function of (payment, resolved roles). Invalid configuration is
/// rejected here, at construction, never during a calculation.
#[derive(Debug, Clone)]
pub struct DistributionEngine {
    rules: DistributionRuleSet,
}

impl DistributionEngine {
    pub fn new(rules: DistributionRuleSet) -> Result<Self, RepartitionError> {
        rules.validate()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &DistributionRuleSet {
        &self.rules
    }

    /// Resolve the case's roles through `directory`, then distribute.
    pub fn distribute_for_case(
        &self,
        payment: &Payment,
        directory: &dyn RoleDirectory,
    ) -> Result<RepartitionResult, RepartitionError> {
        let roles = directory.resolve_roles(&payment.case_id)?;
        self.distribute(payment, &roles)
    }

    /// Compute the full distribution of a validated payment.
    ///
    /// Tiered waterfall; each tier's base is the previous tier's exact
    /// remainder. An out-of-tolerance result is returned with
    /// `equilibre = false`, not raised as an error.
    pub fn distribute(
        &self,
        payment: &Payment,
        roles: &RoleAssignment,
    ) -> Result<RepartitionResult, RepartitionError> {
        if !payment.is_validated() {
            return Err(RepartitionError::PaymentNotValidated {
                payment_id: payment.payment_id.clone(),
                status: payment.status,
            });
        }
        if payment.amount_minor <= 0 {
            return Err(RepartitionError::InvalidAmount {
                payment_id: payment.payment_id.clone(),
                amount_minor: payment.amount_minor,
            });
        }

        let rules = &self.rules;
        let amount = payment.amount_minor;
        debug!(
            payment = %payment.payment_id,
            case = %payment.case_id,
            amount,
            rule_set = %rules.reference(),
            "Distributing payment"
        );

        // Tier 1 — indicator share of the available amount.
        let indicators = roles.agents(Role::Indicator);
        let indicateur_bps = match rules.indicator_policy {
            IndicatorPolicy::RequiresAgent if indicators.is_empty() => 0,
            _ => rules.indicateur_bps,
        };
        let part_indicateur = share_half_up(amount, indicateur_bps);
        let produit_net = amount - part_indicateur;

        // Tier 2 — institutional split of the net amount.
        let part_flcf = share_half_up(produit_net, rules.flcf_bps);
        let part_tresor = share_half_up(produit_net, rules.tresor_bps);
        let produit_net_ayants_droits = produit_net - part_flcf - part_tresor;

        // Tier 3 — permanent beneficiaries.
        let part_dd = share_half_up(produit_net_ayants_droits, rules.dd_bps);
        let part_dg = share_half_up(produit_net_ayants_droits, rules.dg_bps);
        let pool_restant = produit_net_ayants_droits - part_dd - part_dg;

        // Tier 4 — role-dependent pools. An unstaffed role pool does not
        // fire; its money stays in the remainder, which the incentive pool
        // absorbs, so it still appears in the total.
        let chiefs = roles.agents(Role::Chief);
        let seizers = roles.agents(Role::Seizer);
        let part_chefs = if chiefs.is_empty() {
            0
        } else {
            share_half_up(pool_restant, rules.chefs_bps)
        };
        let part_saisissants = if seizers.is_empty() {
            0
        } else {
            share_half_up(pool_restant, rules.saisissants_bps)
        };
        let part_mutuelle = share_half_up(pool_restant, rules.mutuelle_bps);
        let part_masse_commune = share_half_up(pool_restant, rules.masse_commune_bps);
        // The incentive pool is never rounded independently: it takes the
        // exact remainder, so the tier sums to pool_restant by construction.
        let part_interessement =
            pool_restant - part_chefs - part_saisissants - part_mutuelle - part_masse_commune;

        let mut builder =
            RepartitionBuilder::new(payment, rules.reference(), rules.tolerance_minor)
                .indicator_tier(part_indicateur, produit_net)
                .institutional_tier(part_flcf, part_tresor, produit_net_ayants_droits)
                .permanent_tier(part_dd, part_dg)
                .pool_tier(
                    part_chefs,
                    part_saisissants,
                    part_mutuelle,
                    part_masse_commune,
                    part_interessement,
                );

        // Tier 5 — individual lines within each staffed pool.
        if indicateur_bps > 0 && !indicators.is_empty() {
            builder = push_pool_lines(builder, ShareTier::Indicateur, part_indicateur, indicators);
        }
        if rules.chefs_bps > 0 && !chiefs.is_empty() {
            builder = push_pool_lines(builder, ShareTier::Chefs, part_chefs, chiefs);
        }
        if rules.saisissants_bps > 0 && !seizers.is_empty() {
            builder = push_pool_lines(builder, ShareTier::Saisissants, part_saisissants, seizers);
        }

        // Tier 6 — permanent-beneficiary fallback: without a resolvable
        // holder the tier's money goes to a named placeholder, never to an
        // unrelated agent and never dropped.
        if rules.dd_bps > 0 {
            builder = match &roles.direction_departementale {
                Some(holder) => builder.agent_line(
                    holder.clone(),
                    ShareTier::DirectionDepartementale,
                    part_dd,
                    line_description(ShareTier::DirectionDepartementale),
                ),
                None => builder.placeholder_line(ShareTier::DirectionDepartementale, part_dd),
            };
        }
        if rules.dg_bps > 0 {
            builder = match &roles.direction_generale {
                Some(holder) => builder.agent_line(
                    holder.clone(),
                    ShareTier::DirectionGenerale,
                    part_dg,
                    line_description(ShareTier::DirectionGenerale),
                ),
                None => builder.placeholder_line(ShareTier::DirectionGenerale, part_dg),
            };
        }

        // Tier 7 — self-check, computed by the freeze.
        let result = builder.build();
        if result.equilibre {
            debug!(
                payment = %payment.payment_id,
                total = result.total_reparti,
                lines = result.lines.len(),
                "Distribution balanced"
            );
        } else {
            warn!(
                payment = %payment.payment_id,
                total = result.total_reparti,
                ecart = result.ecart_minor,
                tolerance = result.tolerance_minor,
                "Distribution out of tolerance"
            );
        }
        Ok(result)
    }
}

fn line_description(tier: ShareTier) -> &'static str {
    match tier {
        ShareTier::Indicateur => "part indicateur",
        ShareTier::DirectionDepartementale => "part direction departementale",
        ShareTier::DirectionGenerale => "part direction generale",
        ShareTier::Chefs => "part chef",
        ShareTier::Saisissants => "part saisissant",
    }
}

/// Divide `pool_minor` evenly among `count` beneficiaries.
///
/// Integer division in minor units; the last share absorbs the leftover
/// units so the shares always sum exactly to the pool.
fn split_evenly(pool_minor: i64, count: usize) -> Vec<i64> {
    let n = count as i64;
    let each = pool_minor / n;
    let mut shares = vec![each; count];
    if let Some(last) = shares.last_mut() {
        *last = pool_minor - each * (n - 1);
    }
    shares
}

fn push_pool_lines(
    mut builder: RepartitionBuilder,
    tier: ShareTier,
    pool_minor: i64,
    agents: &[AgentId],
) -> RepartitionBuilder {
    let shares = split_evenly(pool_minor, agents.len());
    for (agent, share) in agents.iter().zip(shares) {
        builder = builder.agent_line(agent.clone(), tier, share, line_description(tier));
    }
    builder
}
