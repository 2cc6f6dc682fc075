//! Sizing of distribution transformers against the peak load they serve.
//!
//! A transformer is overloaded in a year when its peak load exceeds
//! `bank_kva * power_factor * overloading_factor`. Overloads are resolved greedily, one year at a
//! time: each upgrade adds another bank of the transformer's nameplate size, which persists for the
//! rest of the simulation.
use crate::units::{ApparentPower, Dimensionless, Money, Power};
use crate::year::YearRange;
use log::warn;

/// Engineering constants used when sizing transformers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformerConstants {
    /// Ratio of real to apparent power
    pub power_factor: Dimensionless,
    /// How far above its rating a transformer can be loaded before it must be upgraded
    pub overloading_factor: Dimensionless,
    /// Capital cost of a single upgrade
    pub upgrade_cost: Money,
    /// Maximum number of upgrades for a single transformer over the simulation
    pub max_upgrades: u32,
}

impl TransformerConstants {
    /// The peak load a bank of the given size can carry
    pub fn threshold(&self, bank_kva: ApparentPower) -> Power {
        bank_kva.to_real_power(self.power_factor) * self.overloading_factor
    }
}

/// Whether the upgrade plan resolved every overload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpgradeOutcome {
    /// No year is left overloaded
    Resolved,
    /// The upgrade limit was reached with overloads remaining
    CapacityExceeded {
        /// The first year which is still overloaded
        year: u32,
        /// How far the peak exceeds the threshold in that year
        residual_overload: Power,
    },
}

/// The result of sizing a transformer over the simulation window
#[derive(Debug, Clone, PartialEq)]
pub struct TransformerResults {
    /// Nameplate size of a single bank
    pub nameplate_kva: ApparentPower,
    /// Installed capacity in each year
    pub annual_bank_kva: Vec<ApparentPower>,
    /// Number of upgrades carried out in each year
    pub annual_upgrades: Vec<u32>,
    /// Years in which at least one upgrade was carried out
    pub upgrade_years: Vec<u32>,
    /// True in each year from the first upgrade on
    pub is_replacement: Vec<bool>,
    /// Capital spent on upgrades in each year
    pub upgrade_cost: Vec<Money>,
    /// True in each year in which the peak exceeds the final threshold
    pub overloading_flag: Vec<bool>,
    /// Peak load divided by the threshold in each year
    pub overloading_ratio: Vec<Dimensionless>,
    /// Whether every overload was resolved
    pub outcome: UpgradeOutcome,
}

impl TransformerResults {
    /// Total number of upgrades over the simulation window
    pub fn total_upgrades(&self) -> u32 {
        self.annual_upgrades.iter().sum()
    }

    /// Total spent on upgrades over the simulation window
    pub fn total_upgrade_cost(&self) -> Money {
        self.upgrade_cost.iter().sum()
    }
}

/// Plan upgrades for a transformer so that, where possible, no year is overloaded.
///
/// # Arguments
///
/// * `id` - ID of the transformer, for logging
/// * `peak` - Peak load served in each simulated year
/// * `nameplate_kva` - Size of the existing bank, which is also the size of each upgrade
/// * `constants` - Engineering constants
/// * `years` - The simulation window
pub fn plan_upgrades(
    id: &str,
    peak: &[Power],
    nameplate_kva: ApparentPower,
    constants: &TransformerConstants,
    years: YearRange,
) -> TransformerResults {
    let mut annual_bank_kva = vec![nameplate_kva; peak.len()];
    let mut annual_upgrades = vec![0; peak.len()];
    let mut total_upgrades = 0;
    let mut outcome = UpgradeOutcome::Resolved;

    'years: for (i, peak) in peak.iter().enumerate() {
        while *peak > constants.threshold(annual_bank_kva[i]) {
            if total_upgrades >= constants.max_upgrades {
                outcome = UpgradeOutcome::CapacityExceeded {
                    year: years.year_at(i),
                    residual_overload: *peak - constants.threshold(annual_bank_kva[i]),
                };
                break 'years;
            }

            // An upgrade is permanent, so applies to this and all later years
            for bank_kva in &mut annual_bank_kva[i..] {
                *bank_kva += nameplate_kva;
            }
            annual_upgrades[i] += 1;
            total_upgrades += 1;
        }
    }

    if let UpgradeOutcome::CapacityExceeded {
        year,
        residual_overload,
    } = outcome
    {
        warn!(
            "Transformer {id} reached the limit of {} upgrades but is still overloaded by \
            {residual_overload} kW in {year}",
            constants.max_upgrades
        );
    }

    let upgrade_years = annual_upgrades
        .iter()
        .enumerate()
        .filter(|(_, upgrades)| **upgrades > 0)
        .map(|(i, _)| years.year_at(i))
        .collect();
    let is_replacement = annual_upgrades
        .iter()
        .scan(false, |upgraded, upgrades| {
            *upgraded |= *upgrades > 0;
            Some(*upgraded)
        })
        .collect();
    let upgrade_cost = annual_upgrades
        .iter()
        .map(|upgrades| Money(constants.upgrade_cost.value() * f64::from(*upgrades)))
        .collect();
    let thresholds: Vec<_> = annual_bank_kva
        .iter()
        .map(|bank_kva| constants.threshold(*bank_kva))
        .collect();
    let overloading_flag = peak
        .iter()
        .zip(&thresholds)
        .map(|(peak, threshold)| peak > threshold)
        .collect();
    let overloading_ratio = peak
        .iter()
        .zip(&thresholds)
        .map(|(peak, threshold)| *peak / *threshold)
        .collect();

    TransformerResults {
        nameplate_kva,
        annual_bank_kva,
        annual_upgrades,
        upgrade_years,
        is_replacement,
        upgrade_cost,
        overloading_flag,
        overloading_ratio,
        outcome,
    }
}
