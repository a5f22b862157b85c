use super::config::RegrindConfig;
use super::error::EngineError;
use super::lattice::LatticeSetup;
use crate::analysis::step_analyzer::ReactionStepAnalyzer;
use crate::core::models::snapshot::{GeneralStateUpdate, Snapshot, StateUpdate};
use crate::core::phases::registry::PhaseRegistry;
use std::slice;
use tracing::{debug, info, instrument, warn};

/// Outcome of applying a new target temperature to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThermalTransition {
    /// Only the temperature changed.
    Stable,
    /// The lattice was rebuilt from its solid composition.
    Regrind {
        solid_ratio: f64,
        previous_vol_multiplier: f64,
        vol_multiplier: f64,
    },
}

#[derive(Debug, Clone)]
pub struct Advance<S> {
    pub state: S,
    /// Fraction of unmelted lattice volume that is melted at the new temperature.
    pub melted_fraction: f64,
    pub transition: ThermalTransition,
}

impl<S> Advance<S> {
    pub fn is_regrind(&self) -> bool {
        matches!(self.transition, ThermalTransition::Regrind { .. })
    }

    pub fn into_state(self) -> S {
        self.state
    }
}

/// Decides, at each temperature change, whether enough of the lattice has melted
/// to rebuild it from the remaining solid.
///
/// Input snapshots are never modified: both transitions return a new state.
pub struct MeltAndRegrind<'a, R: PhaseRegistry + ?Sized, L: LatticeSetup> {
    analyzer: ReactionStepAnalyzer<'a, R>,
    setup: &'a L,
    config: RegrindConfig,
}

impl<'a, R: PhaseRegistry + ?Sized, L: LatticeSetup> MeltAndRegrind<'a, R, L> {
    pub fn new(phases: &'a R, setup: &'a L, config: RegrindConfig) -> Self {
        Self {
            analyzer: ReactionStepAnalyzer::new(phases),
            setup,
            config,
        }
    }

    pub fn config(&self) -> &RegrindConfig {
        &self.config
    }

    /// Sum of the volume fractions of phases melted at `temperature`.
    ///
    /// Fractions are taken over the snapshot's own site volumes only: melted
    /// carryover from an earlier regrind is excluded from both numerator and
    /// denominator.
    pub fn melted_fraction<S: Snapshot>(&self, step: &S, temperature: f64) -> f64 {
        let phases = self.analyzer.phases();
        self.analyzer
            .volume_fractions(slice::from_ref(step), false)
            .into_iter()
            .filter(|(phase, _)| phases.is_melted(phase, temperature))
            .map(|(_, fraction)| fraction)
            .sum()
    }

    /// Solid volume (carryover included) over the lattice's own volume.
    pub fn solid_ratio<S: Snapshot>(&self, step: &S, temperature: f64) -> Result<f64, EngineError> {
        let group = slice::from_ref(step);
        let total_grid_volume = self.analyzer.total_volume(group, false);
        if total_grid_volume <= 0.0 {
            return Err(EngineError::EmptyLattice { temperature });
        }
        Ok(self.analyzer.total_solid_volume(group, temperature) / total_grid_volume)
    }

    /// Applies `temperature` to `step`, regrinding when the melted fraction
    /// strictly exceeds the configured threshold.
    #[instrument(skip_all, name = "advance_temperature", fields(temperature = temperature))]
    pub fn advance_temperature(
        &self,
        step: &L::State,
        temperature: f64,
    ) -> Result<Advance<L::State>, EngineError> {
        let melted_fraction = self.melted_fraction(step, temperature);

        if melted_fraction > self.config.melt_threshold {
            info!(
                melted_fraction,
                threshold = self.config.melt_threshold,
                "Melted volume exceeds threshold, rebuilding lattice from solid fraction."
            );
            let (state, transition) = self.separate_solid_and_melt(step, temperature)?;
            return Ok(Advance {
                state,
                melted_fraction,
                transition,
            });
        }

        debug!(melted_fraction, "Below melt threshold, updating temperature only.");
        let mut state = step.clone();
        state.batch_update(StateUpdate::general(GeneralStateUpdate {
            temperature: Some(temperature),
            ..Default::default()
        }))?;

        Ok(Advance {
            state,
            melted_fraction,
            transition: ThermalTransition::Stable,
        })
    }

    fn separate_solid_and_melt(
        &self,
        step: &L::State,
        temperature: f64,
    ) -> Result<(L::State, ThermalTransition), EngineError> {
        let group = slice::from_ref(step);

        let melted_volumes = self.analyzer.absolute_melted_volumes(group, temperature);
        debug!(?melted_volumes, "Melted volumes from previous state.");
        let solid_volumes = self.analyzer.absolute_solid_volumes(group, temperature);
        debug!(?solid_volumes, "Solid volumes from previous state.");

        let solid_moles = self.analyzer.phases().vol_amts_to_moles(&solid_volumes)?;

        let previous_vol_multiplier = step.general_state().vol_multiplier;
        let mut solid_ratio = self.solid_ratio(step, temperature)?;
        if solid_ratio > 1.0 {
            warn!(
                solid_ratio,
                "Re-solidified carryover exceeds lattice volume; clamping solid ratio to 1."
            );
            solid_ratio = 1.0;
        }
        let vol_multiplier = previous_vol_multiplier * solid_ratio;

        info!(
            previous_vol_multiplier,
            solid_ratio, vol_multiplier, "Constructing new state from solid composition."
        );

        let mut state = self.setup.setup(&solid_moles, vol_multiplier)?;
        state.batch_update(StateUpdate::general(GeneralStateUpdate {
            temperature: Some(temperature),
            vol_multiplier: Some(vol_multiplier),
            melted_amounts: Some(melted_volumes),
        }))?;

        Ok((
            state,
            ThermalTransition::Regrind {
                solid_ratio,
                previous_vol_multiplier,
                vol_multiplier,
            },
        ))
    }
}
