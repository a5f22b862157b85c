use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ScheduleError {
    #[error("Initial and final temperatures of a sweep cannot be the same ({temperature} K)")]
    ZeroLengthSweep { temperature: f64 },
    #[error("Sweep step size must be a finite, non-zero temperature increment, got {0}")]
    InvalidStepSize(f64),
    #[error("Heating step at {temperature} K must last at least one simulation step")]
    ZeroDuration { temperature: f64 },
    #[error("Heating temperatures must be finite, got {0}")]
    NonFiniteTemperature(f64),
    #[error("A heating schedule must contain at least one step")]
    Empty,
}

fn check_finite(temperature: f64) -> Result<(), ScheduleError> {
    if temperature.is_finite() {
        Ok(())
    } else {
        Err(ScheduleError::NonFiniteTemperature(temperature))
    }
}

/// A single constant-temperature segment of a heating schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatingStep {
    duration: usize,
    temperature: f64,
}

impl HeatingStep {
    pub fn new(duration: usize, temperature: f64) -> Result<Self, ScheduleError> {
        check_finite(temperature)?;
        if duration == 0 {
            return Err(ScheduleError::ZeroDuration { temperature });
        }
        Ok(Self {
            duration,
            temperature,
        })
    }

    /// One step of length `duration` held at `temperature`.
    pub fn hold(temperature: f64, duration: usize) -> Result<Self, ScheduleError> {
        Self::new(duration, temperature)
    }

    /// `duration` unit-length steps, all held at `temperature`.
    pub fn hold_expanded(temperature: f64, duration: usize) -> Result<Vec<Self>, ScheduleError> {
        check_finite(temperature)?;
        if duration == 0 {
            return Err(ScheduleError::ZeroDuration { temperature });
        }
        Ok(vec![
            Self {
                duration: 1,
                temperature,
            };
            duration
        ])
    }

    /// Ramps from `t0` towards `tf` in increments of `step_size`, holding each
    /// temperature for `stage_length` steps.
    ///
    /// The sign of `step_size` is ignored; the ramp always moves towards `tf`.
    /// `tf` is always the last temperature, included exactly once, even when the
    /// arithmetic sequence does not land on it.
    pub fn sweep(
        t0: f64,
        tf: f64,
        stage_length: usize,
        step_size: f64,
    ) -> Result<Vec<Self>, ScheduleError> {
        check_finite(t0)?;
        check_finite(tf)?;
        if t0 == tf {
            return Err(ScheduleError::ZeroLengthSweep { temperature: t0 });
        }
        if step_size == 0.0 || !step_size.is_finite() {
            return Err(ScheduleError::InvalidStepSize(step_size));
        }
        if stage_length == 0 {
            return Err(ScheduleError::ZeroDuration { temperature: t0 });
        }

        let ascending = tf > t0;
        let increment = if ascending {
            step_size.abs()
        } else {
            -step_size.abs()
        };
        // Tolerance keeps float drift from emitting a near-duplicate of `tf`.
        let tolerance = step_size.abs() * 1e-9;

        let mut temps: Vec<f64> = (0u32..)
            .map(|k| t0 + f64::from(k) * increment)
            .take_while(|&t| {
                if ascending {
                    t < tf - tolerance
                } else {
                    t > tf + tolerance
                }
            })
            .collect();
        temps.push(tf);

        Ok(temps
            .into_iter()
            .map(|temperature| Self {
                duration: stage_length,
                temperature,
            })
            .collect())
    }

    pub fn duration(&self) -> usize {
        self.duration
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

/// An immutable, non-empty sequence of heating steps, e.g. ramping up to a
/// temperature, holding, and cooling back down.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HeatingSchedule {
    steps: Vec<HeatingStep>,
}

impl HeatingSchedule {
    pub fn new(steps: Vec<HeatingStep>) -> Result<Self, ScheduleError> {
        if steps.is_empty() {
            return Err(ScheduleError::Empty);
        }
        if let Some(step) = steps.iter().find(|s| s.duration == 0) {
            return Err(ScheduleError::ZeroDuration {
                temperature: step.temperature,
            });
        }
        Ok(Self { steps })
    }

    pub fn builder() -> HeatingScheduleBuilder {
        HeatingScheduleBuilder::new()
    }

    pub fn steps(&self) -> &[HeatingStep] {
        &self.steps
    }

    pub fn total_duration(&self) -> usize {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// Target temperature at simulation step `step_index`.
    ///
    /// Returns `None` when `step_index` is at or beyond [`Self::total_duration`];
    /// the schedule does not define a temperature past its end and callers must
    /// decide how to handle that boundary.
    pub fn temp_at(&self, step_index: usize) -> Option<f64> {
        let mut elapsed = 0;
        for step in &self.steps {
            elapsed += step.duration;
            if elapsed > step_index {
                return Some(step.temperature);
            }
        }
        None
    }

    /// Step-function coordinates for plotting the schedule.
    ///
    /// Each step contributes a point at its start and at its end, both at the
    /// step's temperature, so consecutive steps are joined by vertical edges.
    /// A single-step schedule additionally emits a terminal point at its end.
    /// The x coordinate is the step index multiplied by `step_scale`.
    pub fn xy_for_plot(&self, step_scale: f64) -> Vec<(f64, f64)> {
        let mut points = Vec::with_capacity(self.steps.len() * 2 + 1);
        let mut current = 0usize;

        for step in &self.steps {
            points.push((current as f64 * step_scale, step.temperature));
            current += step.duration;
            points.push((current as f64 * step_scale, step.temperature));
        }

        if let [only] = self.steps.as_slice() {
            points.push((current as f64 * step_scale, only.temperature));
        }

        points
    }

    /// Distinct temperatures visited by the schedule, in ascending order.
    pub fn all_temps(&self) -> Vec<f64> {
        let mut temps: Vec<f64> = self.steps.iter().map(|s| s.temperature).collect();
        temps.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        temps.dedup();
        temps
    }
}

#[derive(Debug, Default)]
pub struct HeatingScheduleBuilder {
    steps: Vec<HeatingStep>,
    error: Option<ScheduleError>,
}

impl HeatingScheduleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, step: HeatingStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn hold(self, temperature: f64, duration: usize) -> Self {
        self.push_result(HeatingStep::hold(temperature, duration).map(|s| vec![s]))
    }

    pub fn hold_expanded(self, temperature: f64, duration: usize) -> Self {
        self.push_result(HeatingStep::hold_expanded(temperature, duration))
    }

    pub fn sweep(self, t0: f64, tf: f64, stage_length: usize, step_size: f64) -> Self {
        self.push_result(HeatingStep::sweep(t0, tf, stage_length, step_size))
    }

    /// Fails with the first error produced by any of the chained segments.
    pub fn build(self) -> Result<HeatingSchedule, ScheduleError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        HeatingSchedule::new(self.steps)
    }

    fn push_result(mut self, result: Result<Vec<HeatingStep>, ScheduleError>) -> Self {
        match result {
            Ok(steps) => self.steps.extend(steps),
            Err(e) if self.error.is_none() => self.error = Some(e),
            Err(_) => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temps_of(steps: &[HeatingStep]) -> Vec<f64> {
        steps.iter().map(|s| s.temperature()).collect()
    }

    #[test]
    fn sweep_includes_every_increment_and_final_temperature() {
        let schedule = HeatingSchedule::builder()
            .sweep(300.0, 900.0, 100, 100.0)
            .build()
            .unwrap();

        assert_eq!(
            schedule.all_temps(),
            vec![300.0, 400.0, 500.0, 600.0, 700.0, 800.0, 900.0]
        );
        assert!(schedule.steps().iter().all(|s| s.duration() == 100));
        assert_eq!(schedule.total_duration(), 700);
    }

    #[test]
    fn sweep_appends_final_temperature_when_not_reached_exactly() {
        let steps = HeatingStep::sweep(300.0, 950.0, 10, 100.0).unwrap();
        assert_eq!(
            temps_of(&steps),
            vec![300.0, 400.0, 500.0, 600.0, 700.0, 800.0, 900.0, 950.0]
        );
    }

    #[test]
    fn sweep_corrects_step_sign_when_cooling() {
        let steps = HeatingStep::sweep(900.0, 600.0, 5, 100.0).unwrap();
        assert_eq!(temps_of(&steps), vec![900.0, 800.0, 700.0, 600.0]);

        let steps = HeatingStep::sweep(600.0, 900.0, 5, -100.0).unwrap();
        assert_eq!(temps_of(&steps), vec![600.0, 700.0, 800.0, 900.0]);
    }

    #[test]
    fn sweep_does_not_duplicate_final_temperature_under_float_drift() {
        let steps = HeatingStep::sweep(0.7, 1.0, 1, 0.1).unwrap();
        let temps = temps_of(&steps);
        assert_eq!(temps.len(), 4);
        assert_eq!(*temps.last().unwrap(), 1.0);
    }

    #[test]
    fn zero_length_sweep_is_rejected() {
        assert_eq!(
            HeatingStep::sweep(300.0, 300.0, 100, 100.0),
            Err(ScheduleError::ZeroLengthSweep { temperature: 300.0 })
        );

        let result = HeatingSchedule::builder()
            .hold(300.0, 10)
            .sweep(300.0, 300.0, 100, 100.0)
            .build();
        assert!(matches!(result, Err(ScheduleError::ZeroLengthSweep { .. })));
    }

    #[test]
    fn zero_step_size_is_rejected() {
        assert_eq!(
            HeatingStep::sweep(300.0, 900.0, 10, 0.0),
            Err(ScheduleError::InvalidStepSize(0.0))
        );
    }

    #[test]
    fn non_finite_temperatures_are_rejected() {
        assert!(matches!(
            HeatingStep::hold(f64::NAN, 1),
            Err(ScheduleError::NonFiniteTemperature(t)) if t.is_nan()
        ));
        assert_eq!(
            HeatingStep::hold_expanded(f64::NEG_INFINITY, 3),
            Err(ScheduleError::NonFiniteTemperature(f64::NEG_INFINITY))
        );
        assert!(matches!(
            HeatingStep::sweep(300.0, f64::NAN, 1, 100.0),
            Err(ScheduleError::NonFiniteTemperature(t)) if t.is_nan()
        ));
        assert_eq!(
            HeatingStep::sweep(300.0, f64::INFINITY, 1, 100.0),
            Err(ScheduleError::NonFiniteTemperature(f64::INFINITY))
        );
        assert_eq!(
            HeatingStep::sweep(f64::INFINITY, 300.0, 1, 100.0),
            Err(ScheduleError::NonFiniteTemperature(f64::INFINITY))
        );

        let result = HeatingSchedule::builder()
            .hold(300.0, 2)
            .sweep(300.0, f64::INFINITY, 10, 50.0)
            .build();
        assert_eq!(
            result,
            Err(ScheduleError::NonFiniteTemperature(f64::INFINITY))
        );
    }

    #[test]
    fn temp_at_walks_cumulative_durations() {
        let schedule = HeatingSchedule::builder()
            .hold(300.0, 2)
            .hold(900.0, 3)
            .build()
            .unwrap();

        assert_eq!(schedule.temp_at(0), Some(300.0));
        assert_eq!(schedule.temp_at(1), Some(300.0));
        assert_eq!(schedule.temp_at(2), Some(900.0));
        assert_eq!(schedule.temp_at(3), Some(900.0));
        assert_eq!(schedule.temp_at(4), Some(900.0));
    }

    #[test]
    fn temp_at_is_undefined_past_schedule_end() {
        let schedule = HeatingSchedule::builder().hold(300.0, 2).build().unwrap();
        assert_eq!(schedule.temp_at(2), None);
        assert_eq!(schedule.temp_at(1000), None);
    }

    #[test]
    fn expanded_hold_produces_unit_steps() {
        let schedule = HeatingSchedule::builder()
            .hold_expanded(500.0, 4)
            .build()
            .unwrap();

        assert_eq!(schedule.steps().len(), 4);
        assert!(schedule.steps().iter().all(|s| s.duration() == 1));
        assert_eq!(schedule.total_duration(), 4);
        assert_eq!(schedule.temp_at(3), Some(500.0));
    }

    #[test]
    fn empty_and_zero_duration_schedules_are_rejected() {
        assert_eq!(HeatingSchedule::builder().build(), Err(ScheduleError::Empty));
        assert_eq!(
            HeatingSchedule::builder().hold(300.0, 0).build(),
            Err(ScheduleError::ZeroDuration { temperature: 300.0 })
        );
        assert!(HeatingStep::hold_expanded(300.0, 0).is_err());
    }

    #[test]
    fn xy_for_plot_emits_step_edges() {
        let schedule = HeatingSchedule::builder()
            .hold(300.0, 2)
            .hold(900.0, 3)
            .build()
            .unwrap();

        assert_eq!(
            schedule.xy_for_plot(1.0),
            vec![(0.0, 300.0), (2.0, 300.0), (2.0, 900.0), (5.0, 900.0)]
        );
        assert_eq!(
            schedule.xy_for_plot(10.0),
            vec![(0.0, 300.0), (20.0, 300.0), (20.0, 900.0), (50.0, 900.0)]
        );
    }

    #[test]
    fn xy_for_plot_single_step_ends_with_terminal_point() {
        let schedule = HeatingSchedule::builder().hold(300.0, 4).build().unwrap();
        let points = schedule.xy_for_plot(1.0);

        assert_eq!(points.len(), 3);
        assert_eq!(points.first(), Some(&(0.0, 300.0)));
        assert_eq!(points.last(), Some(&(4.0, 300.0)));
    }

    #[test]
    fn all_temps_deduplicates_repeated_holds() {
        let schedule = HeatingSchedule::builder()
            .hold(300.0, 1)
            .hold(900.0, 1)
            .hold(300.0, 1)
            .build()
            .unwrap();
        assert_eq!(schedule.all_temps(), vec![300.0, 900.0]);
    }
}
