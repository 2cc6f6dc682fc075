//! Decarbonization pathways which can be simulated for a segment.
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// A decarbonization pathway.
///
/// Each scenario is simulated independently, with its own copy of the utility networks.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
    strum::EnumIter,
)]
pub enum Scenario {
    /// No building retrofits take place
    #[string = "bau"]
    BusinessAsUsual,
    /// Buildings electrify at their retrofit year but the gas network stays in service
    #[string = "natural_elec"]
    NaturalElectrification,
    /// Buildings electrify and gas infrastructure is retired once its last customer has left
    #[string = "accelerated_elec"]
    AcceleratedElectrification,
    /// Non-pipeline alternative: as for accelerated electrification, but remaining gas end uses
    /// are served by propane instead of the gas network
    #[string = "hybrid_npa"]
    NonPipelineAlternative,
}

impl Scenario {
    /// Whether buildings are retrofitted in this scenario
    pub fn has_retrofits(&self) -> bool {
        !matches!(self, Self::BusinessAsUsual)
    }

    /// Whether gas mains and services are shut off once every building they serve has left
    pub fn is_shutoff_scenario(&self) -> bool {
        matches!(
            self,
            Self::AcceleratedElectrification | Self::NonPipelineAlternative
        )
    }

    /// Whether retrofitted buildings switch their remaining gas loads to propane
    pub fn shifts_gas_to_propane(&self) -> bool {
        matches!(self, Self::NonPipelineAlternative)
    }
}
