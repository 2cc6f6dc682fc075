//! Assets are the physical, depreciable pieces of the energy system: meters, pipes, lines and
//! transformers.
//!
//! Each asset follows the same lifecycle over the simulation window. It is not yet installed before
//! its install year, operational from its install year until (but not including) its replacement
//! year and retired from then on. All of the per-year vectors describing an asset are derived once,
//! when it is constructed.
use crate::id::define_id_type;
use crate::units::Money;
use crate::year::YearRange;
use anyhow::{Result, ensure};

define_id_type! {AssetID}

/// How the book value of an asset is written down over time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepreciationPolicy {
    /// Straight-line depreciation to zero salvage value over the given lifetime (years)
    StraightLine {
        /// The useful lifetime of the asset in years
        lifetime: u32,
    },
    /// The asset has no known lifetime and carries no book value
    NotDepreciated,
}

impl DepreciationPolicy {
    /// Choose a policy from an optional lifetime
    pub fn from_lifetime(lifetime: Option<u32>) -> Self {
        match lifetime {
            Some(lifetime) => Self::StraightLine { lifetime },
            None => Self::NotDepreciated,
        }
    }
}

/// Static attributes shared by every kind of asset, as supplied in the input tables
#[derive(Debug, Clone, PartialEq)]
pub struct AssetParameters {
    /// Unique identifier for the asset
    pub asset_id: AssetID,
    /// The ID of the asset this one is connected to upstream, if any
    pub parent_id: Option<AssetID>,
    /// The year the asset was (or will be) installed
    pub install_year: u32,
    /// The year the asset is retired or replaced. `None` means it outlives the simulation.
    pub replacement_year: Option<u32>,
    /// Useful lifetime in years
    pub lifetime: Option<u32>,
    /// Installed cost in the cost-basis year
    pub install_cost: Option<Money>,
}

/// The lifecycle of a single asset over the simulation window
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    id: AssetID,
    parent_id: Option<AssetID>,
    install_year: u32,
    replacement_year: Option<u32>,
    depreciation_policy: DepreciationPolicy,
    cost: Money,
    years: YearRange,
    operational_vector: Vec<bool>,
    replacement_vector: Vec<bool>,
    install_cost: Vec<Money>,
    depreciation: Vec<Money>,
    stranded_value: Vec<Money>,
}

impl Asset {
    /// Create a new asset and derive its lifecycle vectors.
    ///
    /// # Arguments
    ///
    /// * `params` - The asset's static attributes
    /// * `years` - The simulation window
    ///
    /// # Returns
    ///
    /// The new [`Asset`] or an error if its attributes are inconsistent.
    pub fn new(params: &AssetParameters, years: YearRange) -> Result<Self> {
        Self::with_replacement_year(params, params.replacement_year, years)
    }

    /// Create a new asset, overriding the replacement year given in `params`.
    ///
    /// This is used when the retirement of an asset is dictated by the network it belongs to (e.g.
    /// a gas meter is removed when its building leaves the gas network).
    pub fn with_replacement_year(
        params: &AssetParameters,
        replacement_year: Option<u32>,
        years: YearRange,
    ) -> Result<Self> {
        if let Some(replacement_year) = replacement_year {
            ensure!(
                params.install_year <= replacement_year,
                "Asset {} has install year {} after its replacement year {}",
                params.asset_id,
                params.install_year,
                replacement_year
            );
        }
        if let Some(lifetime) = params.lifetime {
            ensure!(
                lifetime > 0,
                "Asset {} must have a lifetime greater than zero",
                params.asset_id
            );
        }
        let asset_cost = params.install_cost.unwrap_or_default();
        ensure!(
            asset_cost.is_finite() && asset_cost >= Money(0.0),
            "Asset {} must have a finite, non-negative install cost",
            params.asset_id
        );

        let depreciation_policy = DepreciationPolicy::from_lifetime(params.lifetime);
        let operational_vector = years
            .iter()
            .map(|year| {
                params.install_year <= year && replacement_year.is_none_or(|repl| year < repl)
            })
            .collect();
        let replacement_vector = years.one_hot(replacement_year);
        let install_cost = years
            .iter()
            .map(|year| {
                if year == params.install_year {
                    asset_cost
                } else {
                    Money(0.0)
                }
            })
            .collect();
        let depreciation = depreciation_schedule(
            asset_cost,
            params.install_year,
            replacement_year,
            depreciation_policy,
            years,
        );
        let stranded_value = stranded_value(&depreciation, &replacement_vector);

        Ok(Self {
            id: params.asset_id.clone(),
            parent_id: params.parent_id.clone(),
            install_year: params.install_year,
            replacement_year,
            depreciation_policy,
            cost: asset_cost,
            years,
            operational_vector,
            replacement_vector,
            install_cost,
            depreciation,
            stranded_value,
        })
    }

    /// The asset's ID
    pub fn id(&self) -> &AssetID {
        &self.id
    }

    /// The ID of the upstream asset this one is connected to
    pub fn parent_id(&self) -> Option<&AssetID> {
        self.parent_id.as_ref()
    }

    /// The year the asset is installed
    pub fn install_year(&self) -> u32 {
        self.install_year
    }

    /// The year the asset is retired or replaced, if any
    pub fn replacement_year(&self) -> Option<u32> {
        self.replacement_year
    }

    /// The useful lifetime of the asset, if known
    pub fn lifetime(&self) -> Option<u32> {
        match self.depreciation_policy {
            DepreciationPolicy::StraightLine { lifetime } => Some(lifetime),
            DepreciationPolicy::NotDepreciated => None,
        }
    }

    /// The installed cost of the asset
    pub fn cost(&self) -> Money {
        self.cost
    }

    /// The simulation window the vectors are aligned to
    pub fn years(&self) -> YearRange {
        self.years
    }

    /// True in each year in which the asset is installed and not yet replaced
    pub fn operational_vector(&self) -> &[bool] {
        &self.operational_vector
    }

    /// True in each year in which the asset is not operational
    pub fn retrofit_vector(&self) -> Vec<bool> {
        self.operational_vector.iter().map(|op| !op).collect()
    }

    /// True only in the year of replacement
    pub fn replacement_vector(&self) -> &[bool] {
        &self.replacement_vector
    }

    /// Capital spent on the asset in each year
    pub fn install_cost(&self) -> &[Money] {
        &self.install_cost
    }

    /// Book value of the asset at the start of each year
    pub fn depreciation(&self) -> &[Money] {
        &self.depreciation
    }

    /// Book value written off in the year of an early replacement
    pub fn stranded_value(&self) -> &[Money] {
        &self.stranded_value
    }

    /// The total value stranded by an early replacement, over the simulation window
    pub fn total_stranded_value(&self) -> Money {
        self.stranded_value.iter().sum()
    }
}

/// Compute the straight-line book value of an asset at the start of each simulated year.
///
/// The asset is amortised over `min(replacement_year - install_year, lifetime)` years and the
/// resulting curve is clipped to the simulation window. Book value is zero before installation and
/// after the asset is fully amortised or replaced.
pub fn depreciation_schedule(
    asset_cost: Money,
    install_year: u32,
    replacement_year: Option<u32>,
    policy: DepreciationPolicy,
    years: YearRange,
) -> Vec<Money> {
    let mut out = vec![Money(0.0); years.len()];
    let DepreciationPolicy::StraightLine { lifetime } = policy else {
        return out;
    };

    let amortized_lifetime = replacement_year
        .map_or(lifetime, |repl| (repl - install_year).min(lifetime));
    let annual_depreciation = asset_cost.value() / lifetime as f64;
    let curve = (0..=amortized_lifetime)
        .map(|i| Money((asset_cost.value() - annual_depreciation * i as f64).max(0.0)));

    // Entries before the simulation start are dropped
    let skip = years.start().saturating_sub(install_year) as usize;
    let offset = install_year.saturating_sub(years.start()) as usize;
    for (slot, value) in out.iter_mut().skip(offset).zip(curve.skip(skip)) {
        *slot = value;
    }

    out
}

/// The book value written off in the (single) replacement year
fn stranded_value(depreciation: &[Money], replacement_vector: &[bool]) -> Vec<Money> {
    depreciation
        .iter()
        .zip(replacement_vector)
        .map(|(value, replaced)| if *replaced { *value } else { Money(0.0) })
        .collect()
}
