//! # repartition-rules
//!
//! The [`DistributionRuleSet`]: a named, versioned table of basis-point
//! coefficients defining each tier of a distribution, validated once at
//! load time. The engine never re-validates during a calculation.
//!
//! Coefficients are basis points on a 10,000 scale (1 bps = 0.01%), the
//! exact fixed-point representation; amounts are minor currency units.
//! All share arithmetic goes through [`share_half_up`], which widens to
//! `i128` so no `i64` amount can overflow an intermediate product.

#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use repartition_types::RuleSetRef;

/// Scale of the coefficient fixed-point representation.
pub const BPS_SCALE: u32 = 10_000;

/// Default equilibrium tolerance, in minor units.
pub const DEFAULT_TOLERANCE_MINOR: i64 = 10;

/// Rule-set validation errors, raised at configuration time only.
#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("coefficient {name} is {bps} bps, above the {BPS_SCALE} bps scale")]
    CoefficientAboveScale { name: &'static str, bps: u32 },

    #[error("coefficients over base {base} sum to {total} bps, above the {BPS_SCALE} bps scale")]
    BaseOversubscribed { base: &'static str, total: u32 },

    #[error("tolerance must be non-negative, got {0}")]
    NegativeTolerance(i64),

    #[error("rule set configuration is not valid JSON: {0}")]
    Parse(String),
}

/// What the indicator tier does when no agent holds the Indicator role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorPolicy {
    /// The share is deducted regardless; it funds an institutional pool.
    #[default]
    InstitutionalPool,
    /// The share requires an individual; with none assigned the
    /// coefficient is treated as 0 for that payment.
    RequiresAgent,
}

/// A named, versioned set of tier coefficients plus rounding parameters.
///
/// The intéressement pool carries no coefficient: it is always the exact
/// remainder of the role-dependent tier, so that tier sums exactly by
/// construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionRuleSet {
    pub name: String,
    pub version: u32,

    /// Indicator share, applied to the available amount.
    pub indicateur_bps: u32,
    /// Oversight-fund share, applied to the net amount.
    pub flcf_bps: u32,
    /// Treasury share, applied to the net amount.
    pub tresor_bps: u32,
    /// Permanent-beneficiary shares, applied to the rights-holder amount.
    pub dd_bps: u32,
    pub dg_bps: u32,
    /// Role-dependent pool shares, applied to the remaining pool.
    pub chefs_bps: u32,
    pub saisissants_bps: u32,
    pub mutuelle_bps: u32,
    pub masse_commune_bps: u32,

    #[serde(default)]
    pub indicator_policy: IndicatorPolicy,
    #[serde(default = "default_tolerance")]
    pub tolerance_minor: i64,
}

fn default_tolerance() -> i64 {
    DEFAULT_TOLERANCE_MINOR
}

impl DistributionRuleSet {
    /// Validate the coefficient table.
    ///
    /// Each coefficient must fit the scale, coefficients applied to the
    /// same base must not oversubscribe it, and the tolerance must be
    /// non-negative. Runs once at load time.
    pub fn validate(&self) -> Result<(), RuleSetError> {
        for (name, bps) in [
            ("indicateur_bps", self.indicateur_bps),
            ("flcf_bps", self.flcf_bps),
            ("tresor_bps", self.tresor_bps),
            ("dd_bps", self.dd_bps),
            ("dg_bps", self.dg_bps),
            ("chefs_bps", self.chefs_bps),
            ("saisissants_bps", self.saisissants_bps),
            ("mutuelle_bps", self.mutuelle_bps),
            ("masse_commune_bps", self.masse_commune_bps),
        ] {
            if bps > BPS_SCALE {
                return Err(RuleSetError::CoefficientAboveScale { name, bps });
            }
        }

        for (base, total) in [
            ("produit_net", self.flcf_bps + self.tresor_bps),
            ("produit_net_ayants_droits", self.dd_bps + self.dg_bps),
            (
                "pool_restant",
                self.chefs_bps + self.saisissants_bps + self.mutuelle_bps + self.masse_commune_bps,
            ),
        ] {
            if total > BPS_SCALE {
                return Err(RuleSetError::BaseOversubscribed { base, total });
            }
        }

        if self.tolerance_minor < 0 {
            return Err(RuleSetError::NegativeTolerance(self.tolerance_minor));
        }

        Ok(())
    }

    /// Load a rule set from its JSON configuration form and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, RuleSetError> {
        let rule_set: DistributionRuleSet =
            serde_json::from_str(json).map_err(|e| RuleSetError::Parse(e.to_string()))?;
        rule_set.validate()?;
        Ok(rule_set)
    }

    pub fn reference(&self) -> RuleSetRef {
        RuleSetRef {
            name: self.name.clone(),
            version: self.version,
        }
    }
}

/// Share of `base_minor` at `bps`, rounded half-up at the smallest
/// currency unit.
///
/// Widens to `i128` before multiplying; `i64::MAX * 10_000` fits with
/// room to spare, so the computation cannot overflow.
pub fn share_half_up(base_minor: i64, bps: u32) -> i64 {
    let scaled = base_minor as i128 * bps as i128 + (BPS_SCALE as i128 / 2);
    (scaled / BPS_SCALE as i128) as i64
}
