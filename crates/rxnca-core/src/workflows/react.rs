use crate::core::models::result::{ReactionResult, RegrindEvent};
use crate::core::models::snapshot::Snapshot;
use crate::core::models::lattice::Lattice;
use crate::core::phases::phase_set::PhaseSet;
use crate::core::phases::registry::PhaseRegistry;
use crate::engine::config::ReactionConfig;
use crate::engine::error::EngineError;
use crate::engine::lattice::{LatticeSetup, RandomPacking};
use crate::engine::melt::{MeltAndRegrind, ThermalTransition};
use crate::engine::progress::{Progress, ProgressReporter};
use std::convert::Infallible;
use std::fmt::Display;
use tracing::{debug, info, instrument};

/// Advances a snapshot by one simulation step at a fixed temperature.
pub trait TransitionRule<S> {
    type Error: Display;

    fn evolve(&self, state: &S, temperature: f64) -> Result<S, Self::Error>;
}

/// A rule under which nothing reacts; only melting and regrinding change the lattice.
#[derive(Debug, Clone, Copy, Default)]
pub struct InertRule;

impl<S: Clone> TransitionRule<S> for InertRule {
    type Error = Infallible;

    fn evolve(&self, state: &S, _temperature: f64) -> Result<S, Infallible> {
        Ok(state.clone())
    }
}

/// Runs the recipe on a [`RandomPacking`] built from `config.lattice`, so the
/// site count and seed always match the configuration.
pub fn run_packed<T>(
    config: &ReactionConfig,
    phases: &PhaseSet,
    rule: &T,
    reporter: &ProgressReporter,
) -> Result<ReactionResult<Lattice>, EngineError>
where
    T: TransitionRule<Lattice>,
{
    info!(
        num_sites = config.lattice.num_sites,
        seed = config.lattice.seed,
        "Using random packing from the lattice configuration."
    );
    let packing = RandomPacking::from_config(phases, &config.lattice);
    run(config, phases, &packing, rule, reporter)
}

/// Runs the recipe on a caller-supplied lattice setup. `config.lattice` is not
/// consulted; the setup decides the site count and layout.
#[instrument(skip_all, name = "reaction_workflow")]
pub fn run<R, L, T>(
    config: &ReactionConfig,
    phases: &R,
    setup: &L,
    rule: &T,
    reporter: &ProgressReporter,
) -> Result<ReactionResult<L::State>, EngineError>
where
    R: PhaseRegistry + ?Sized,
    L: LatticeSetup,
    T: TransitionRule<L::State>,
{
    let schedule = &config.heating_schedule;
    let total_steps = schedule.total_duration();

    // === Phase 1: Initial lattice ===
    reporter.report(Progress::PhaseStart {
        name: "Building Lattice",
    });
    info!(
        precursors = config.precursor_moles.len(),
        "Packing initial lattice from precursors."
    );
    let mut state = setup.setup(&config.precursor_moles, 1.0)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Walk the heating schedule ===
    reporter.report(Progress::PhaseStart { name: "Heating" });
    reporter.report(Progress::TaskStart {
        total_steps: total_steps as u64,
    });

    let engine = MeltAndRegrind::new(phases, setup, config.regrind);
    let mut result = ReactionResult::new();
    let mut current_temperature: Option<f64> = None;

    let temperatures = schedule
        .steps()
        .iter()
        .flat_map(|s| std::iter::repeat_n(s.temperature(), s.duration()));

    for (step, temperature) in temperatures.enumerate() {
        if current_temperature != Some(temperature) {
            reporter.report(Progress::TemperatureChange { step, temperature });
            let advance = engine.advance_temperature(&state, temperature)?;

            if let ThermalTransition::Regrind {
                solid_ratio,
                vol_multiplier,
                ..
            } = advance.transition
            {
                let event = RegrindEvent {
                    step,
                    temperature,
                    melted_fraction: advance.melted_fraction,
                    solid_ratio,
                    vol_multiplier,
                };
                debug!(?event, "Recorded regrind.");
                result.push_regrind(event);
                reporter.report(Progress::Regrind {
                    step,
                    temperature,
                    melted_fraction: advance.melted_fraction,
                });
            }

            state = advance.into_state();
            current_temperature = Some(temperature);
        }

        state = rule
            .evolve(&state, temperature)
            .map_err(|e| EngineError::Rule {
                step,
                message: e.to_string(),
            })?;

        if step % config.record_interval == 0 || step + 1 == total_steps {
            result.record(step, state.clone());
        }
        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    info!(
        steps = total_steps,
        regrinds = result.regrinds().len(),
        final_vol_multiplier = state.general_state().vol_multiplier,
        "Reaction workflow complete."
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::heating::HeatingSchedule;
    use crate::core::models::amounts::MolarMap;
    use crate::core::models::snapshot::SiteState;
    use crate::engine::config::ReactionConfigBuilder;
    use std::sync::Mutex;

    const PHASES: &str = r#"
        [A]
        molar-volume = 1.0
        melting-point = 1000.0
        elements = { X = 1.0 }

        [B]
        molar-volume = 1.0
        elements = { Y = 1.0 }
    "#;

    fn precursors() -> MolarMap {
        [("A".to_string(), 1.0), ("B".to_string(), 1.0)]
            .into_iter()
            .collect()
    }

    fn config(schedule: HeatingSchedule, record_interval: usize) -> ReactionConfig {
        ReactionConfigBuilder::new()
            .heating_schedule(schedule)
            .precursor_moles(precursors())
            .num_sites(10)
            .seed(5)
            .record_interval(record_interval)
            .build()
            .unwrap()
    }

    #[test]
    fn inert_run_regrinds_when_melting_point_is_crossed() {
        let phases: PhaseSet = PHASES.parse().unwrap();
        let packing = RandomPacking::new(&phases, 10, 5);
        let schedule = HeatingSchedule::builder()
            .hold(800.0, 3)
            .hold(1200.0, 2)
            .build()
            .unwrap();
        let config = config(schedule, 2);

        let result = run(&config, &phases, &packing, &InertRule, &ProgressReporter::new()).unwrap();

        assert_eq!(result.len(), 5);
        assert_eq!(result.recorded_steps().collect::<Vec<_>>(), vec![0, 2, 4]);

        let regrinds = result.regrinds();
        assert_eq!(regrinds.len(), 1);
        assert_eq!(regrinds[0].step, 3);
        assert_eq!(regrinds[0].temperature, 1200.0);
        assert!((regrinds[0].melted_fraction - 0.5).abs() < 1e-9);
        assert!((regrinds[0].vol_multiplier - 0.5).abs() < 1e-9);

        let before = result.step(2).unwrap();
        assert_eq!(before.general_state().temperature, Some(800.0));
        assert_eq!(before.general_state().vol_multiplier, 1.0);

        let last = result.last_step().unwrap();
        assert_eq!(last.general_state().temperature, Some(1200.0));
        assert!((last.general_state().melted_amounts["A"] - 5.0).abs() < 1e-9);
        assert!(last.sites().iter().all(|s| s.phase == "B"));
    }

    #[test]
    fn regrind_is_checked_at_the_first_step() {
        let phases: PhaseSet = PHASES.parse().unwrap();
        let packing = RandomPacking::new(&phases, 10, 5);
        let schedule = HeatingSchedule::builder().hold(1200.0, 3).build().unwrap();

        let result = run(
            &config(schedule, 1),
            &phases,
            &packing,
            &InertRule,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(result.regrinds().len(), 1);
        assert_eq!(result.regrinds()[0].step, 0);
        assert_eq!(result.recorded_steps().count(), 3);
    }

    #[test]
    fn packed_run_uses_the_configured_lattice() {
        let phases: PhaseSet = PHASES.parse().unwrap();
        let schedule = HeatingSchedule::builder().hold(800.0, 2).build().unwrap();
        let mut config = config(schedule, 1);
        config.lattice.num_sites = 16;

        let packed = run_packed(&config, &phases, &InertRule, &ProgressReporter::new()).unwrap();
        let first = packed.first_step().unwrap();
        assert_eq!(first.num_sites(), 16);

        let packing = RandomPacking::new(&phases, 16, 5);
        let explicit = run(&config, &phases, &packing, &InertRule, &ProgressReporter::new()).unwrap();
        assert_eq!(first.sites(), explicit.first_step().unwrap().sites());

        config.lattice.seed = 6;
        let reseeded = run_packed(&config, &phases, &InertRule, &ProgressReporter::new()).unwrap();
        assert_eq!(reseeded.first_step().unwrap().num_sites(), 16);
    }

    struct ConvertRule;

    impl TransitionRule<Lattice> for ConvertRule {
        type Error = String;

        fn evolve(&self, state: &Lattice, temperature: f64) -> Result<Lattice, String> {
            if temperature > 2000.0 {
                return Err("too hot".to_string());
            }
            let mut sites: Vec<SiteState> = state.sites().to_vec();
            if let Some(site) = sites.iter_mut().find(|s| s.phase == "A") {
                site.phase = "B".to_string();
            }
            Ok(Lattice::new(sites).with_general_state(state.general_state().clone()))
        }
    }

    #[test]
    fn rule_is_applied_every_step() {
        let phases: PhaseSet = PHASES.parse().unwrap();
        let packing = RandomPacking::new(&phases, 10, 5);
        let schedule = HeatingSchedule::builder().hold(500.0, 3).build().unwrap();

        let result = run(
            &config(schedule, 1),
            &phases,
            &packing,
            &ConvertRule,
            &ProgressReporter::new(),
        )
        .unwrap();

        let count_a =
            |step: usize| result.step(step).unwrap().sites().iter().filter(|s| s.phase == "A").count();
        assert_eq!(count_a(0), 4);
        assert_eq!(count_a(1), 3);
        assert_eq!(count_a(2), 2);
    }

    #[test]
    fn rule_failure_reports_the_step() {
        let phases: PhaseSet = PHASES.parse().unwrap();
        let packing = RandomPacking::new(&phases, 10, 5);
        let schedule = HeatingSchedule::builder()
            .hold(500.0, 2)
            .hold(2500.0, 2)
            .build()
            .unwrap();

        let err = run(
            &config(schedule, 1),
            &phases,
            &packing,
            &ConvertRule,
            &ProgressReporter::new(),
        )
        .unwrap_err();

        assert!(matches!(err, EngineError::Rule { step: 2, ref message } if message == "too hot"));
    }

    #[test]
    fn progress_follows_the_schedule() {
        let phases: PhaseSet = PHASES.parse().unwrap();
        let packing = RandomPacking::new(&phases, 10, 5);
        let schedule = HeatingSchedule::builder()
            .hold(800.0, 2)
            .hold(1200.0, 1)
            .build()
            .unwrap();
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));

        run(&config(schedule, 1), &phases, &packing, &InertRule, &reporter).unwrap();
        drop(reporter);
        let events = events.into_inner().unwrap();

        assert_eq!(events.first(), Some(&Progress::PhaseStart { name: "Building Lattice" }));
        assert!(events.contains(&Progress::TaskStart { total_steps: 3 }));
        assert_eq!(
            events.iter().filter(|e| **e == Progress::TaskIncrement).count(),
            3
        );
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, Progress::TemperatureChange { .. }))
                .count(),
            2
        );
        assert!(events.iter().any(|e| matches!(e, Progress::Regrind { step: 2, .. })));
        assert_eq!(events.last(), Some(&Progress::PhaseFinish));
    }
}
