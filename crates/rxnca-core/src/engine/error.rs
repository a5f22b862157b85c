use crate::core::heating::ScheduleError;
use crate::core::models::snapshot::StateError;
use crate::core::phases::registry::PhaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error("Invalid heating schedule: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Failed to update lattice state: {0}")]
    State(#[from] StateError),

    #[error("Lattice setup failed: {0}")]
    LatticeSetup(String),

    #[error("Cannot regrind at {temperature} K: the lattice holds no volume")]
    EmptyLattice { temperature: f64 },

    #[error("Transition rule failed at step {step}: {message}")]
    Rule { step: usize, message: String },
}
