use super::step_analyzer::ReactionStepAnalyzer;
use crate::core::heating::HeatingSchedule;
use crate::core::models::amounts::MolarMap;
use crate::core::models::result::ReactionResult;
use crate::core::models::snapshot::Snapshot;
use crate::core::phases::registry::{FREE_SPACE, PhaseError, PhaseRegistry};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const MAX_TRACE_POINTS: usize = 100;

/// A named series of `(x, y)` values, ready to hand to a plotting front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Trace {
    pub fn max(&self) -> f64 {
        self.ys.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// The states of every run at one step index, aggregated together to smooth
/// out per-run noise.
#[derive(Debug, Clone)]
pub struct StepGroup<S> {
    pub step: usize,
    pub states: Vec<S>,
}

/// Analysis across several independent runs of the same recipe.
pub struct BulkReactionAnalyzer<'a, R: PhaseRegistry + ?Sized, S: Snapshot> {
    step_analyzer: ReactionStepAnalyzer<'a, R>,
    heating_schedule: &'a HeatingSchedule,
    results: &'a [ReactionResult<S>],
    result_length: usize,
}

impl<'a, R: PhaseRegistry + ?Sized, S: Snapshot> BulkReactionAnalyzer<'a, R, S> {
    pub fn new(
        results: &'a [ReactionResult<S>],
        phases: &'a R,
        heating_schedule: &'a HeatingSchedule,
    ) -> Self {
        let result_length = results.iter().map(ReactionResult::len).min().unwrap_or(0);
        Self {
            step_analyzer: ReactionStepAnalyzer::new(phases),
            heating_schedule,
            results,
            result_length,
        }
    }

    pub fn step_analyzer(&self) -> &ReactionStepAnalyzer<'a, R> {
        &self.step_analyzer
    }

    /// Length of the shortest run.
    pub fn result_length(&self) -> usize {
        self.result_length
    }

    /// One state per run at step `index`.
    pub fn steps_at(&self, index: usize) -> Vec<S> {
        self.results
            .iter()
            .filter_map(|r| r.step(index).cloned())
            .collect()
    }

    pub fn first_steps(&self) -> Vec<S> {
        self.results
            .iter()
            .filter_map(|r| r.first_step().cloned())
            .collect()
    }

    pub fn final_steps(&self) -> Vec<S> {
        self.results
            .iter()
            .filter_map(|r| r.last_step().cloned())
            .collect()
    }

    /// Evenly spaced step groups, about one hundred of them. The stride is
    /// rounded half to even.
    pub fn step_groups(&self) -> Vec<StepGroup<S>> {
        if self.result_length == 0 {
            return Vec::new();
        }
        let num_points = MAX_TRACE_POINTS.min(self.result_length);
        let step_size =
            ((self.result_length as f64 / num_points as f64).round_ties_even() as usize).max(1);

        (0..self.result_length)
            .step_by(step_size)
            .map(|step| StepGroup {
                step,
                states: self.steps_at(step),
            })
            .collect()
    }

    pub fn absolute_molar_amounts_at(
        &self,
        index: usize,
        include_melted: bool,
    ) -> Result<MolarMap, PhaseError> {
        self.step_analyzer
            .absolute_molar_amounts(&self.steps_at(index), include_melted)
    }

    /// Mole fraction of every phase over time, dropping phases that never exceed
    /// `min_prevalence`. `phases` restricts the output to the named phases, in
    /// that order.
    pub fn mole_fraction_traces(
        &self,
        min_prevalence: f64,
        phases: Option<&[&str]>,
    ) -> Result<Vec<Trace>, PhaseError> {
        let (xs, breakdowns) = self.breakdowns(|group| {
            self.step_analyzer.mole_fractions(&group.states, true)
        })?;
        Ok(phase_traces(&xs, &breakdowns, phases, Some(min_prevalence)))
    }

    /// Absolute moles of every phase over time.
    ///
    /// With `xrd_adjust`, each phase's moles are multiplied by its atoms per
    /// formula unit, which tracks relative diffraction intensity more closely than
    /// raw moles. The prevalence cutoff applies to the weighted values.
    pub fn molar_phase_traces(
        &self,
        min_prevalence: f64,
        xrd_adjust: bool,
        phases: Option<&[&str]>,
    ) -> Result<Vec<Trace>, PhaseError> {
        let (xs, mut breakdowns) = self.breakdowns(|group| {
            self.step_analyzer.absolute_molar_amounts(&group.states, true)
        })?;
        if xrd_adjust {
            for breakdown in &mut breakdowns {
                self.weight_by_atoms(breakdown)?;
            }
        }
        Ok(phase_traces(&xs, &breakdowns, phases, Some(min_prevalence)))
    }

    /// Absolute moles of a single phase at every step group. A phase absent from
    /// the runs yields zeros.
    pub fn mole_trace(&self, phase: &str, xrd_adjust: bool) -> Result<Vec<f64>, PhaseError> {
        let weight = if xrd_adjust {
            self.step_analyzer.phases().atoms_per_formula_unit(phase)?
        } else {
            1.0
        };
        let (_, breakdowns) = self.breakdowns(|group| {
            self.step_analyzer.absolute_molar_amounts(&group.states, true)
        })?;
        Ok(breakdowns
            .iter()
            .map(|bd| bd.get(phase).copied().unwrap_or(0.0) * weight)
            .collect())
    }

    pub fn elemental_amount_traces(&self) -> Result<Vec<Trace>, PhaseError> {
        let (xs, breakdowns) = self.breakdowns(|group| {
            self.step_analyzer
                .molar_elemental_composition(&group.states, true)
        })?;
        Ok(phase_traces(&xs, &breakdowns, None, None))
    }

    /// Moles of one element over time. Fails for an element no registered phase
    /// contains.
    pub fn elemental_amount_trace(&self, element: &str) -> Result<Trace, PhaseError> {
        if !self.step_analyzer.phases().contains_element(element) {
            return Err(PhaseError::UnknownElement(element.to_string()));
        }
        let (xs, breakdowns) = self.breakdowns(|group| {
            self.step_analyzer
                .molar_elemental_composition(&group.states, true)
        })?;
        Ok(Trace {
            name: element.to_string(),
            xs,
            ys: breakdowns
                .iter()
                .map(|bd| bd.get(element).copied().unwrap_or(0.0))
                .collect(),
        })
    }

    pub fn elemental_fraction_traces(&self) -> Result<Vec<Trace>, PhaseError> {
        let (xs, breakdowns) = self.breakdowns(|group| {
            self.step_analyzer
                .fractional_elemental_composition(&group.states, true)
        })?;
        Ok(phase_traces(&xs, &breakdowns, None, None))
    }

    pub fn phase_volume_traces(&self, min_volume: f64) -> Vec<Trace> {
        let groups = self.step_groups();
        let xs: Vec<f64> = groups.iter().map(|g| g.step as f64).collect();
        let breakdowns: Vec<_> = groups
            .iter()
            .map(|g| self.step_analyzer.absolute_phase_volumes(&g.states, true))
            .collect();
        phase_traces(&xs, &breakdowns, None, Some(min_volume))
    }

    /// Summed mole fractions of named phase groups, one trace per group.
    pub fn group_traces(
        &self,
        groups: &BTreeMap<String, Vec<String>>,
    ) -> Result<Vec<Trace>, PhaseError> {
        let (xs, breakdowns) = self.breakdowns(|group| {
            self.step_analyzer.mole_fractions(&group.states, true)
        })?;

        Ok(groups
            .iter()
            .map(|(name, members)| Trace {
                name: name.clone(),
                xs: xs.clone(),
                ys: breakdowns
                    .iter()
                    .map(|bd| {
                        members
                            .iter()
                            .filter(|m| m.as_str() != FREE_SPACE)
                            .filter_map(|m| bd.get(m))
                            .sum()
                    })
                    .collect(),
            })
            .collect())
    }

    pub fn heating_trace(&self, step_scale: f64) -> Trace {
        let (xs, ys) = self
            .heating_schedule
            .xy_for_plot(step_scale)
            .into_iter()
            .unzip();
        Trace {
            name: "Temperature".to_string(),
            xs,
            ys,
        }
    }

    fn weight_by_atoms(&self, breakdown: &mut BTreeMap<String, f64>) -> Result<(), PhaseError> {
        for (phase, amount) in breakdown.iter_mut() {
            if phase != FREE_SPACE {
                *amount *= self.step_analyzer.phases().atoms_per_formula_unit(phase)?;
            }
        }
        Ok(())
    }

    fn breakdowns<F>(&self, breakdown: F) -> Result<(Vec<f64>, Vec<BTreeMap<String, f64>>), PhaseError>
    where
        F: Fn(&StepGroup<S>) -> Result<BTreeMap<String, f64>, PhaseError>,
    {
        let groups = self.step_groups();
        let xs = groups.iter().map(|g| g.step as f64).collect();
        let breakdowns = groups.iter().map(breakdown).collect::<Result<_, _>>()?;
        Ok((xs, breakdowns))
    }
}

fn phase_traces(
    xs: &[f64],
    breakdowns: &[BTreeMap<String, f64>],
    selection: Option<&[&str]>,
    cutoff: Option<f64>,
) -> Vec<Trace> {
    let names: Vec<&str> = match selection {
        Some(selected) => selected.to_vec(),
        None => breakdowns
            .iter()
            .flat_map(|bd| bd.keys().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    };

    names
        .into_iter()
        .filter(|&name| name != FREE_SPACE)
        .map(|name| Trace {
            name: name.to_string(),
            xs: xs.to_vec(),
            ys: breakdowns
                .iter()
                .map(|bd| bd.get(name).copied().unwrap_or(0.0))
                .collect(),
        })
        .filter(|trace| cutoff.is_none_or(|c| trace.max() > c))
        .collect()
}
