use serde::Serialize;

/// A lattice rewrite performed by the melt-and-regrind engine during a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegrindEvent {
    pub step: usize,
    pub temperature: f64,
    pub melted_fraction: f64,
    pub solid_ratio: f64,
    pub vol_multiplier: f64,
}

/// The trajectory of one simulation run.
///
/// States are recorded sparsely; [`ReactionResult::step`] resolves any step index
/// to the most recent recorded state at or before it.
#[derive(Debug, Clone)]
pub struct ReactionResult<S> {
    recorded: Vec<(usize, S)>,
    regrinds: Vec<RegrindEvent>,
}

impl<S> Default for ReactionResult<S> {
    fn default() -> Self {
        Self {
            recorded: Vec::new(),
            regrinds: Vec::new(),
        }
    }
}

impl<S> ReactionResult<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state reached at `step`. Steps must be recorded in increasing
    /// order; recording the same step again replaces the earlier state.
    pub fn record(&mut self, step: usize, state: S) {
        match self.recorded.last_mut() {
            Some((last, existing)) if *last == step => *existing = state,
            _ => {
                debug_assert!(self.recorded.last().is_none_or(|(last, _)| *last < step));
                self.recorded.push((step, state));
            }
        }
    }

    pub fn push_regrind(&mut self, event: RegrindEvent) {
        self.regrinds.push(event);
    }

    /// Number of simulation steps covered, i.e. one past the last recorded step.
    pub fn len(&self) -> usize {
        self.recorded.last().map_or(0, |(step, _)| step + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.recorded.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&S> {
        let position = self.recorded.partition_point(|(step, _)| *step <= index);
        position
            .checked_sub(1)
            .map(|position| &self.recorded[position].1)
    }

    pub fn first_step(&self) -> Option<&S> {
        self.recorded.first().map(|(_, state)| state)
    }

    pub fn last_step(&self) -> Option<&S> {
        self.recorded.last().map(|(_, state)| state)
    }

    pub fn recorded_steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.recorded.iter().map(|(step, _)| *step)
    }

    pub fn regrinds(&self) -> &[RegrindEvent] {
        &self.regrinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_resolves_to_latest_recorded_state() {
        let mut result = ReactionResult::new();
        result.record(0, "a");
        result.record(10, "b");
        result.record(19, "c");

        assert_eq!(result.len(), 20);
        assert_eq!(result.step(0), Some(&"a"));
        assert_eq!(result.step(9), Some(&"a"));
        assert_eq!(result.step(10), Some(&"b"));
        assert_eq!(result.step(18), Some(&"b"));
        assert_eq!(result.step(19), Some(&"c"));
        assert_eq!(result.step(500), Some(&"c"));
        assert_eq!(result.first_step(), Some(&"a"));
        assert_eq!(result.last_step(), Some(&"c"));
    }

    #[test]
    fn step_before_first_record_is_none() {
        let mut result = ReactionResult::new();
        result.record(5, 1);
        assert_eq!(result.step(4), None);
        assert_eq!(result.step(5), Some(&1));
    }

    #[test]
    fn recording_same_step_replaces_state() {
        let mut result = ReactionResult::new();
        result.record(0, 1);
        result.record(0, 2);
        assert_eq!(result.recorded_steps().collect::<Vec<_>>(), vec![0]);
        assert_eq!(result.step(0), Some(&2));
    }

    #[test]
    fn empty_result_has_zero_length() {
        let result: ReactionResult<u8> = ReactionResult::new();
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
        assert_eq!(result.last_step(), None);
    }
}
