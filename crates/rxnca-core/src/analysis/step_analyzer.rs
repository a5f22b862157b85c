use crate::core::models::amounts::{self, ElementalMap, MolarMap, PhaseVolumeMap};
use crate::core::models::snapshot::Snapshot;
use crate::core::phases::registry::{FREE_SPACE, PhaseError, PhaseRegistry};

/// Aggregates lattice snapshots into physical quantities.
///
/// Every operation takes a step group, a slice of snapshots aggregated volume-additively.
/// A single snapshot is passed as a one-element group with [`std::slice::from_ref`].
/// None of the operations fail on empty input: they return empty maps or zero.
/// Conversion failures come from the phase registry and are returned unmodified.
pub struct ReactionStepAnalyzer<'a, R: PhaseRegistry + ?Sized> {
    phases: &'a R,
}

impl<'a, R: PhaseRegistry + ?Sized> ReactionStepAnalyzer<'a, R> {
    pub fn new(phases: &'a R) -> Self {
        Self { phases }
    }

    pub fn phases(&self) -> &'a R {
        self.phases
    }

    /// Sums site volumes by phase, scaling each snapshot's sites by that snapshot's
    /// own volume multiplier. Free space is excluded. With `include_melted`, each
    /// snapshot's melted carryover is added on top.
    pub fn absolute_phase_volumes<S: Snapshot>(
        &self,
        steps: &[S],
        include_melted: bool,
    ) -> PhaseVolumeMap {
        let mut volumes = PhaseVolumeMap::new();

        for step in steps {
            let general = step.general_state();
            for site in step.all_site_states() {
                if site.phase == FREE_SPACE {
                    continue;
                }
                *volumes.entry(site.phase.clone()).or_insert(0.0) +=
                    site.volume * general.vol_multiplier;
            }

            if include_melted {
                amounts::accumulate(&mut volumes, &general.melted_amounts);
            }
        }

        volumes
    }

    pub fn phases_present<S: Snapshot>(&self, steps: &[S], include_melted: bool) -> Vec<String> {
        self.absolute_phase_volumes(steps, include_melted)
            .into_keys()
            .collect()
    }

    pub fn absolute_phase_volume<S: Snapshot>(
        &self,
        steps: &[S],
        phase: &str,
        include_melted: bool,
    ) -> Option<f64> {
        self.absolute_phase_volumes(steps, include_melted)
            .get(phase)
            .copied()
    }

    /// Volumes (carryover included) of phases that are liquid at `temperature`.
    pub fn absolute_melted_volumes<S: Snapshot>(
        &self,
        steps: &[S],
        temperature: f64,
    ) -> PhaseVolumeMap {
        self.partition_by_melting(steps, temperature, true)
    }

    /// Volumes (carryover included) of phases that are solid at `temperature`.
    pub fn absolute_solid_volumes<S: Snapshot>(
        &self,
        steps: &[S],
        temperature: f64,
    ) -> PhaseVolumeMap {
        self.partition_by_melting(steps, temperature, false)
    }

    pub fn total_volume<S: Snapshot>(&self, steps: &[S], include_melted: bool) -> f64 {
        amounts::total(&self.absolute_phase_volumes(steps, include_melted))
    }

    pub fn total_solid_volume<S: Snapshot>(&self, steps: &[S], temperature: f64) -> f64 {
        amounts::total(&self.absolute_solid_volumes(steps, temperature))
    }

    /// Number of sites in the snapshot, i.e. its volume at unit site volume and multiplier.
    pub fn ideal_step_volume<S: Snapshot>(&self, step: &S) -> usize {
        step.all_site_states().count()
    }

    pub fn volume_fractions<S: Snapshot>(&self, steps: &[S], include_melted: bool) -> PhaseVolumeMap {
        amounts::normalize(&self.absolute_phase_volumes(steps, include_melted))
    }

    pub fn phase_volume_fraction<S: Snapshot>(
        &self,
        steps: &[S],
        phase: &str,
        include_melted: bool,
    ) -> Option<f64> {
        self.volume_fractions(steps, include_melted)
            .get(phase)
            .copied()
    }

    pub fn absolute_molar_amounts<S: Snapshot>(
        &self,
        steps: &[S],
        include_melted: bool,
    ) -> Result<MolarMap, PhaseError> {
        self.phases
            .vol_amts_to_moles(&self.absolute_phase_volumes(steps, include_melted))
    }

    pub fn absolute_molar_amount<S: Snapshot>(
        &self,
        steps: &[S],
        phase: &str,
        include_melted: bool,
    ) -> Result<Option<f64>, PhaseError> {
        Ok(self
            .absolute_molar_amounts(steps, include_melted)?
            .get(phase)
            .copied())
    }

    pub fn mole_fractions<S: Snapshot>(
        &self,
        steps: &[S],
        include_melted: bool,
    ) -> Result<MolarMap, PhaseError> {
        Ok(amounts::normalize(
            &self.absolute_molar_amounts(steps, include_melted)?,
        ))
    }

    pub fn mole_fraction<S: Snapshot>(
        &self,
        steps: &[S],
        phase: &str,
        include_melted: bool,
    ) -> Result<Option<f64>, PhaseError> {
        Ok(self
            .mole_fractions(steps, include_melted)?
            .get(phase)
            .copied())
    }

    pub fn molar_elemental_composition<S: Snapshot>(
        &self,
        steps: &[S],
        include_melted: bool,
    ) -> Result<ElementalMap, PhaseError> {
        self.phases
            .mole_amts_to_el_amts(&self.absolute_molar_amounts(steps, include_melted)?)
    }

    pub fn fractional_elemental_composition<S: Snapshot>(
        &self,
        steps: &[S],
        include_melted: bool,
    ) -> Result<ElementalMap, PhaseError> {
        Ok(amounts::normalize(
            &self.molar_elemental_composition(steps, include_melted)?,
        ))
    }

    fn partition_by_melting<S: Snapshot>(
        &self,
        steps: &[S],
        temperature: f64,
        melted: bool,
    ) -> PhaseVolumeMap {
        self.absolute_phase_volumes(steps, true)
            .into_iter()
            .filter(|(phase, _)| self.phases.is_melted(phase, temperature) == melted)
            .collect()
    }
}
