use super::amounts::PhaseVolumeMap;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StateError {
    #[error("Site index {index} is out of bounds for a lattice of {num_sites} sites")]
    SiteOutOfBounds { index: usize, num_sites: usize },
}

/// The state of one lattice site: the occupying phase and its volume contribution
/// before scaling by the snapshot's volume multiplier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteState {
    pub phase: String,
    pub volume: f64,
}

impl SiteState {
    pub fn new(phase: impl Into<String>, volume: f64) -> Self {
        Self {
            phase: phase.into(),
            volume,
        }
    }
}

/// Lattice-wide fields of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralState {
    /// Current temperature; `None` until the driver applies the first schedule step.
    pub temperature: Option<f64>,
    /// Converts per-site volume into absolute volume. Only shrinks across regrinds.
    pub vol_multiplier: f64,
    /// Phase volumes removed from the lattice by the most recent regrind.
    pub melted_amounts: PhaseVolumeMap,
}

impl Default for GeneralState {
    fn default() -> Self {
        Self {
            temperature: None,
            vol_multiplier: 1.0,
            melted_amounts: PhaseVolumeMap::new(),
        }
    }
}

/// Changes to the general state; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneralStateUpdate {
    pub temperature: Option<f64>,
    pub vol_multiplier: Option<f64>,
    pub melted_amounts: Option<PhaseVolumeMap>,
}

impl GeneralStateUpdate {
    pub fn apply_to(self, general: &mut GeneralState) {
        if let Some(temperature) = self.temperature {
            general.temperature = Some(temperature);
        }
        if let Some(vol_multiplier) = self.vol_multiplier {
            general.vol_multiplier = vol_multiplier;
        }
        if let Some(melted_amounts) = self.melted_amounts {
            general.melted_amounts = melted_amounts;
        }
    }
}

/// A set of general-state and site-state changes applied in one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub general: GeneralStateUpdate,
    pub sites: BTreeMap<usize, SiteState>,
}

impl StateUpdate {
    pub fn general(general: GeneralStateUpdate) -> Self {
        Self {
            general,
            sites: BTreeMap::new(),
        }
    }
}

/// Capability set of a lattice engine's per-step state.
///
/// Copying is [`Clone`]. Analysis code only ever reads through this trait; the
/// only mutation is `batch_update`, which the regrind engine applies to its own
/// copies and never to a snapshot it was handed.
pub trait Snapshot: Clone {
    fn all_site_states(&self) -> impl Iterator<Item = &SiteState>;

    fn general_state(&self) -> &GeneralState;

    fn batch_update(&mut self, updates: StateUpdate) -> Result<(), StateError>;
}
