use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, CaseId, PaymentId};

/// The tier a beneficiary line item is paid from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareTier {
    Indicateur,
    DirectionDepartementale,
    DirectionGenerale,
    Chefs,
    Saisissants,
}

impl ShareTier {
    /// Fixed label used for the generic placeholder beneficiary of a tier.
    pub fn placeholder_label(&self) -> &'static str {
        match self {
            ShareTier::Indicateur => "Fonds indicateur",
            ShareTier::DirectionDepartementale => "Direction departementale",
            ShareTier::DirectionGenerale => "Direction generale",
            ShareTier::Chefs => "Pool chefs",
            ShareTier::Saisissants => "Pool saisissants",
        }
    }
}

impl std::fmt::Display for ShareTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ShareTier::Indicateur => "indicateur",
            ShareTier::DirectionDepartementale => "direction_departementale",
            ShareTier::DirectionGenerale => "direction_generale",
            ShareTier::Chefs => "chefs",
            ShareTier::Saisissants => "saisissants",
        };
        write!(f, "{label}")
    }
}

/// One beneficiary line item of a distribution.
///
/// Individual agent shares and generic placeholder shares are variants of
/// the same type, so the store and report consumers handle a single ordered
/// list. A `Placeholder` carries a tier's money when no agent is resolvable
/// for it; the amount is never silently dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BeneficiaryLine {
    Agent {
        agent_id: AgentId,
        tier: ShareTier,
        amount_minor: i64,
        description: String,
    },
    Placeholder {
        tier: ShareTier,
        label: String,
        amount_minor: i64,
    },
}

impl BeneficiaryLine {
    pub fn amount_minor(&self) -> i64 {
        match self {
            BeneficiaryLine::Agent { amount_minor, .. } => *amount_minor,
            BeneficiaryLine::Placeholder { amount_minor, .. } => *amount_minor,
        }
    }

    pub fn tier(&self) -> ShareTier {
        match self {
            BeneficiaryLine::Agent { tier, .. } => *tier,
            BeneficiaryLine::Placeholder { tier, .. } => *tier,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, BeneficiaryLine::Placeholder { .. })
    }
}

/// Reference to the rule set a result was computed under.
///
/// Recomputing under an old version is reproducible because the result
/// names exactly which coefficient table produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetRef {
    pub name: String,
    pub version: u32,
}

impl std::fmt::Display for RuleSetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@v{}", self.name, self.version)
    }
}

/// The immutable record of one computed distribution.
///
/// Tier fields are minor units. The waterfall is:
///
/// ```text
/// produit_disponible
///   -> part_indicateur                      | produit_net
///   -> part_flcf + part_tresor              | produit_net_ayants_droits
///   -> part_dd + part_dg                    | pool restant
///   -> part_chefs + part_saisissants
///      + part_mutuelle + part_masse_commune | part_interessement (absorber)
/// ```
///
/// A result is created once per payment and superseded, never mutated, if
/// recomputation is requested.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepartitionResult {
    pub payment_id: PaymentId,
    pub case_id: CaseId,
    pub rule_set: RuleSetRef,

    pub produit_disponible: i64,
    pub part_indicateur: i64,
    pub produit_net: i64,
    pub part_flcf: i64,
    pub part_tresor: i64,
    pub produit_net_ayants_droits: i64,
    pub part_dd: i64,
    pub part_dg: i64,
    pub part_chefs: i64,
    pub part_saisissants: i64,
    pub part_mutuelle: i64,
    pub part_masse_commune: i64,
    pub part_interessement: i64,

    /// Ordered beneficiary lines: agent shares and placeholder shares.
    pub lines: Vec<BeneficiaryLine>,

    pub total_reparti: i64,
    /// Signed discrepancy `produit_disponible - total_reparti`.
    pub ecart_minor: i64,
    /// Tolerance the equilibrium flag was evaluated against.
    pub tolerance_minor: i64,
    /// True iff `|ecart_minor| <= tolerance_minor`.
    pub equilibre: bool,
}

impl RepartitionResult {
    /// Sum of the ten terminal tier fields.
    ///
    /// `produit_net` and `produit_net_ayants_droits` are running remainders,
    /// not terminal tiers, and are excluded.
    pub fn tier_total(&self) -> i64 {
        self.part_indicateur
            + self.part_flcf
            + self.part_tresor
            + self.part_dd
            + self.part_dg
            + self.part_chefs
            + self.part_saisissants
            + self.part_mutuelle
            + self.part_masse_commune
            + self.part_interessement
    }

    /// Sum of the line items paying from `tier`.
    pub fn lines_total(&self, tier: ShareTier) -> i64 {
        self.lines
            .iter()
            .filter(|line| line.tier() == tier)
            .map(|line| line.amount_minor())
            .sum()
    }

    /// Independent re-verification of the self-check.
    ///
    /// Recomputes the total from the tier fields, re-derives the running
    /// remainders, checks that every individualized tier's lines sum
    /// exactly to the tier amount, and re-evaluates the equilibrium flag.
    /// Returns `true` iff the stored flags and totals are consistent with
    /// the recomputation.
    pub fn verify(&self) -> bool {
        let total = self.tier_total();
        if total != self.total_reparti {
            return false;
        }
        if self.produit_net != self.produit_disponible - self.part_indicateur {
            return false;
        }
        if self.produit_net_ayants_droits != self.produit_net - self.part_flcf - self.part_tresor {
            return false;
        }

        // Lines subdivide their tier; a tier with lines must be covered
        // exactly, and a tier without lines must have none claiming it.
        for (tier, amount) in [
            (ShareTier::Chefs, self.part_chefs),
            (ShareTier::Saisissants, self.part_saisissants),
            (ShareTier::DirectionDepartementale, self.part_dd),
            (ShareTier::DirectionGenerale, self.part_dg),
            (ShareTier::Indicateur, self.part_indicateur),
        ] {
            let has_lines = self.lines.iter().any(|line| line.tier() == tier);
            if has_lines && self.lines_total(tier) != amount {
                return false;
            }
        }

        let ecart = self.produit_disponible - total;
        if ecart != self.ecart_minor {
            return false;
        }
        self.equilibre == (ecart.abs() <= self.tolerance_minor)
    }
}
