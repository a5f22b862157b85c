use crate::core::models::amounts::{ElementalMap, MolarMap, PhaseVolumeMap};
use thiserror::Error;

/// Phase identifier reserved for vacant lattice sites.
pub const FREE_SPACE: &str = "Free Space";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum PhaseError {
    #[error("Phase '{0}' is not defined in the phase registry")]
    UnknownPhase(String),
    #[error("Element '{0}' does not occur in any phase of the registry")]
    UnknownElement(String),
}

/// Thermodynamic phase data needed to turn lattice occupancy into chemistry.
///
/// Implementations are free to source this data however they like; anything that
/// answers these questions can drive the analyzers and the regrind engine.
pub trait PhaseRegistry {
    /// Whether `phase` is liquid at `temperature`.
    fn is_melted(&self, phase: &str, temperature: f64) -> bool;

    fn vol_amts_to_moles(&self, volumes: &PhaseVolumeMap) -> Result<MolarMap, PhaseError>;

    fn mole_amts_to_el_amts(&self, moles: &MolarMap) -> Result<ElementalMap, PhaseError>;

    /// Total atoms in one formula unit of `phase`.
    fn atoms_per_formula_unit(&self, phase: &str) -> Result<f64, PhaseError>;

    /// Whether any registered phase contains `element`.
    fn contains_element(&self, element: &str) -> bool;
}
