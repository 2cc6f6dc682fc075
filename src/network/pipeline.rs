//! Methane leakage and operating costs of gas pipelines.
use crate::asset::AssetID;
use crate::units::{Leakage, LeakagePerLength, Length, Money, MoneyPerLength};
use crate::year::YearRange;
use itertools::Itertools;
use log::warn;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::collections::HashMap;
use std::rc::Rc;

/// The kind of pipe, used to look up per-length factors
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum PipelineType {
    /// A service line from a main to a meter
    #[string = "service"]
    Service,
    /// A distribution main
    #[string = "main"]
    Main,
}

/// A pipe material code, e.g. "PL" for plastic or "BS" for bare steel
pub type Material = Rc<str>;

/// Physical attributes of a pipe
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSpec {
    /// The material the pipe is made of before any retrofit
    pub material: Material,
    /// Nominal diameter (inches), if known
    pub diameter: Option<f64>,
    /// Length of the pipe
    pub length: Length,
}

/// A table of per-length values keyed by pipe type and material
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialTable<T>(HashMap<PipelineType, HashMap<Material, T>>);

impl<T> Default for MaterialTable<T> {
    fn default() -> Self {
        Self(HashMap::new())
    }
}

impl<T: Copy> MaterialTable<T> {
    /// Look up the value for a pipe type and material
    pub fn get(&self, pipeline_type: PipelineType, material: &str) -> Option<T> {
        self.0.get(&pipeline_type)?.get(material).copied()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> FromIterator<((PipelineType, Material), T)> for MaterialTable<T> {
    fn from_iter<I: IntoIterator<Item = ((PipelineType, Material), T)>>(iter: I) -> Self {
        let mut map: HashMap<_, HashMap<_, _>> = HashMap::new();
        for ((pipeline_type, material), value) in iter {
            map.entry(pipeline_type).or_default().insert(material, value);
        }

        Self(map)
    }
}

/// Methane leak rates per unit length of pipe
pub type LeakFactorTable = MaterialTable<LeakagePerLength>;

/// Operation and maintenance costs per unit length of pipe
pub type OmCostTable = MaterialTable<MoneyPerLength>;

/// Per-year leakage and operating costs of a pipe
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResults {
    /// The material of the pipe in each year
    pub material: Vec<Material>,
    /// Methane leaked in each year
    pub annual_total_leakage: Vec<Leakage>,
    /// Operation and maintenance cost in each year
    pub operating_expense: Vec<Money>,
    /// True only in the year the pipe is shut off, if it is
    pub shutoff_vector: Vec<bool>,
}

impl PipelineResults {
    /// Total leakage over the simulation window
    pub fn total_leakage(&self) -> Leakage {
        self.annual_total_leakage.iter().sum()
    }
}

/// Inputs needed to compute a pipe's results
pub struct PipelineContext<'a> {
    /// Leak rates per material
    pub leak_factors: &'a LeakFactorTable,
    /// O&M costs per material
    pub om_costs: &'a OmCostTable,
    /// The material pipes are replaced with
    pub retrofit_material: &'a Material,
    /// The simulation window
    pub years: YearRange,
}

impl PipelineContext<'_> {
    /// Compute leakage and operating costs for a pipe.
    ///
    /// From its replacement year on, the pipe is assumed to be made of the retrofit material. A pipe
    /// leaks and costs money only in years in which it is active, i.e. installed and not yet shut
    /// off. If there is no entry for a
    /// pipe's material in one of the tables, a warning is logged and the corresponding quantity is
    /// taken as zero.
    pub fn compute(
        &self,
        asset_id: &AssetID,
        pipeline_type: PipelineType,
        spec: &PipelineSpec,
        replacement_year: Option<u32>,
        active: &[bool],
        shutoff_year: Option<u32>,
    ) -> PipelineResults {
        let material: Vec<Material> = self
            .years
            .iter()
            .map(|year| {
                if replacement_year.is_some_and(|repl| year >= repl) {
                    self.retrofit_material.clone()
                } else {
                    spec.material.clone()
                }
            })
            .collect();

        let mut missing_leak_factor = Vec::new();
        let mut missing_om_cost = Vec::new();
        let mut annual_total_leakage = Vec::with_capacity(material.len());
        let mut operating_expense = Vec::with_capacity(material.len());
        for (material, active) in material.iter().zip(active) {
            if !active {
                annual_total_leakage.push(Leakage(0.0));
                operating_expense.push(Money(0.0));
                continue;
            }

            let leak_factor = self
                .leak_factors
                .get(pipeline_type, material)
                .unwrap_or_else(|| {
                    missing_leak_factor.push(material.clone());
                    LeakagePerLength(0.0)
                });
            let om_cost = self.om_costs.get(pipeline_type, material).unwrap_or_else(|| {
                missing_om_cost.push(material.clone());
                MoneyPerLength(0.0)
            });
            annual_total_leakage.push(leak_factor * spec.length);
            operating_expense.push(om_cost * spec.length);
        }

        warn_missing(asset_id, pipeline_type, "leak factor", missing_leak_factor);
        warn_missing(asset_id, pipeline_type, "O&M cost", missing_om_cost);

        PipelineResults {
            material,
            annual_total_leakage,
            operating_expense,
            shutoff_vector: self.years.one_hot(shutoff_year),
        }
    }
}

fn warn_missing(
    asset_id: &AssetID,
    pipeline_type: PipelineType,
    what: &str,
    missing: Vec<Material>,
) {
    for material in missing.into_iter().unique() {
        warn!(
            "No {what} for {} pipes of material {material} (asset {asset_id}); assuming zero",
            pipeline_type
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::sim_years;
    use float_cmp::assert_approx_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn leak_factors() -> LeakFactorTable {
        [
            ((PipelineType::Main, "BS".into()), LeakagePerLength(0.5)),
            ((PipelineType::Main, "PL".into()), LeakagePerLength(0.01)),
        ]
        .into_iter()
        .collect()
    }

    #[fixture]
    fn om_costs() -> OmCostTable {
        [
            ((PipelineType::Main, "BS".into()), MoneyPerLength(2.0)),
            ((PipelineType::Main, "PL".into()), MoneyPerLength(1.0)),
        ]
        .into_iter()
        .collect()
    }

    fn spec(material: &str) -> PipelineSpec {
        PipelineSpec {
            material: material.into(),
            diameter: Some(4.0),
            length: Length(100.0),
        }
    }

    #[rstest]
    fn test_leakage_switches_material_on_replacement(
        leak_factors: LeakFactorTable,
        om_costs: OmCostTable,
        sim_years: YearRange,
    ) {
        let retrofit_material: Material = "PL".into();
        let context = PipelineContext {
            leak_factors: &leak_factors,
            om_costs: &om_costs,
            retrofit_material: &retrofit_material,
            years: sim_years,
        };
        let active = vec![true; sim_years.len()];
        let results = context.compute(
            &"main1".into(),
            PipelineType::Main,
            &spec("BS"),
            Some(2030),
            &active,
            None,
        );

        assert_eq!(&*results.material[9], "BS");
        assert_eq!(&*results.material[10], "PL");
        assert_approx_eq!(Leakage, results.annual_total_leakage[9], Leakage(50.0));
        assert_approx_eq!(Leakage, results.annual_total_leakage[10], Leakage(1.0));
        assert_approx_eq!(Money, results.operating_expense[9], Money(200.0));
        assert_approx_eq!(Money, results.operating_expense[10], Money(100.0));
        assert!(results.shutoff_vector.iter().all(|s| !s));
    }

    #[rstest]
    fn test_no_leakage_after_shutoff(
        leak_factors: LeakFactorTable,
        om_costs: OmCostTable,
        sim_years: YearRange,
    ) {
        let retrofit_material: Material = "PL".into();
        let context = PipelineContext {
            leak_factors: &leak_factors,
            om_costs: &om_costs,
            retrofit_material: &retrofit_material,
            years: sim_years,
        };
        let active: Vec<_> = (0..sim_years.len()).map(|i| i < 10).collect();
        let results = context.compute(
            &"main1".into(),
            PipelineType::Main,
            &spec("BS"),
            Some(2030),
            &active,
            Some(2030),
        );

        assert!(results.annual_total_leakage[10..].iter().all(|l| *l == Leakage(0.0)));
        assert!(results.operating_expense[10..].iter().all(|c| *c == Money(0.0)));
        assert_approx_eq!(Leakage, results.total_leakage(), Leakage(500.0));
        assert!(results.shutoff_vector[10]);
    }

    #[rstest]
    fn test_missing_material_counts_as_zero(
        leak_factors: LeakFactorTable,
        om_costs: OmCostTable,
        sim_years: YearRange,
    ) {
        let retrofit_material: Material = "PL".into();
        let context = PipelineContext {
            leak_factors: &leak_factors,
            om_costs: &om_costs,
            retrofit_material: &retrofit_material,
            years: sim_years,
        };
        let active = vec![true; sim_years.len()];
        let results = context.compute(
            &"service1".into(),
            PipelineType::Service,
            &spec("CI"),
            None,
            &active,
            None,
        );
        assert_eq!(results.total_leakage(), Leakage(0.0));
    }
}
