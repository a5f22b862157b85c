use super::snapshot::{GeneralState, SiteState, Snapshot, StateError, StateUpdate};
use serde::Serialize;

/// A flat, vector-backed lattice snapshot. Site identity is the index into `sites`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lattice {
    sites: Vec<SiteState>,
    general: GeneralState,
}

impl Lattice {
    pub fn new(sites: Vec<SiteState>) -> Self {
        Self {
            sites,
            general: GeneralState::default(),
        }
    }

    pub fn with_general_state(mut self, general: GeneralState) -> Self {
        self.general = general;
        self
    }

    /// Builds a lattice of unit-volume sites occupied by the given phases in order.
    pub fn from_phases<I, P>(phases: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self::new(
            phases
                .into_iter()
                .map(|phase| SiteState::new(phase, 1.0))
                .collect(),
        )
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn sites(&self) -> &[SiteState] {
        &self.sites
    }
}

impl Snapshot for Lattice {
    fn all_site_states(&self) -> impl Iterator<Item = &SiteState> {
        self.sites.iter()
    }

    fn general_state(&self) -> &GeneralState {
        &self.general
    }

    /// Applies every change or none: site indices are validated before anything is written.
    fn batch_update(&mut self, updates: StateUpdate) -> Result<(), StateError> {
        let num_sites = self.sites.len();
        if let Some(&index) = updates.sites.keys().find(|&&index| index >= num_sites) {
            return Err(StateError::SiteOutOfBounds { index, num_sites });
        }

        updates.general.apply_to(&mut self.general);
        for (index, site) in updates.sites {
            self.sites[index] = site;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::snapshot::GeneralStateUpdate;
    use std::collections::BTreeMap;

    #[test]
    fn new_lattice_has_default_general_state() {
        let lattice = Lattice::from_phases(["A", "B"]);
        assert_eq!(lattice.num_sites(), 2);
        assert_eq!(lattice.general_state().vol_multiplier, 1.0);
        assert_eq!(lattice.general_state().temperature, None);
        assert!(lattice.general_state().melted_amounts.is_empty());
    }

    #[test]
    fn batch_update_applies_general_and_site_changes() {
        let mut lattice = Lattice::from_phases(["A", "B"]);
        let mut sites = BTreeMap::new();
        sites.insert(1, SiteState::new("C", 0.5));

        lattice
            .batch_update(StateUpdate {
                general: GeneralStateUpdate {
                    temperature: Some(800.0),
                    ..Default::default()
                },
                sites,
            })
            .unwrap();

        assert_eq!(lattice.general_state().temperature, Some(800.0));
        assert_eq!(lattice.general_state().vol_multiplier, 1.0);
        assert_eq!(lattice.sites()[0], SiteState::new("A", 1.0));
        assert_eq!(lattice.sites()[1], SiteState::new("C", 0.5));
    }

    #[test]
    fn batch_update_out_of_bounds_leaves_lattice_untouched() {
        let mut lattice = Lattice::from_phases(["A"]);
        let original = lattice.clone();
        let mut sites = BTreeMap::new();
        sites.insert(3, SiteState::new("B", 1.0));

        let result = lattice.batch_update(StateUpdate {
            general: GeneralStateUpdate {
                temperature: Some(500.0),
                ..Default::default()
            },
            sites,
        });

        assert_eq!(
            result,
            Err(StateError::SiteOutOfBounds {
                index: 3,
                num_sites: 1
            })
        );
        assert_eq!(lattice, original);
    }
}
