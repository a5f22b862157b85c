use super::config::LatticeConfig;
use super::error::EngineError;
use crate::core::models::amounts::{self, MolarMap};
use crate::core::models::lattice::Lattice;
use crate::core::models::snapshot::{GeneralState, SiteState, Snapshot};
use crate::core::phases::phase_set::PhaseSet;
use crate::core::phases::registry::FREE_SPACE;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::cell::RefCell;
use std::cmp::Ordering;
use tracing::debug;

/// Builds a fresh lattice from a molar composition.
///
/// The site count and spatial layout belong entirely to the implementation; the
/// regrind engine only supplies the composition and the volume multiplier.
pub trait LatticeSetup {
    type State: Snapshot;

    fn setup(&self, moles: &MolarMap, vol_multiplier: f64) -> Result<Self::State, EngineError>;
}

/// Fills a fixed number of unit-volume sites in proportion to each phase's volume
/// fraction, then shuffles them with a seeded generator.
///
/// Successive calls continue the same random stream, so repeated regrinds of one
/// run produce different layouts while the run as a whole stays reproducible.
pub struct RandomPacking<'a> {
    phases: &'a PhaseSet,
    num_sites: usize,
    rng: RefCell<StdRng>,
}

impl<'a> RandomPacking<'a> {
    pub fn new(phases: &'a PhaseSet, num_sites: usize, seed: u64) -> Self {
        Self {
            phases,
            num_sites,
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_config(phases: &'a PhaseSet, config: &LatticeConfig) -> Self {
        Self::new(phases, config.num_sites, config.seed)
    }

    pub fn num_sites(&self) -> usize {
        self.num_sites
    }
}

impl LatticeSetup for RandomPacking<'_> {
    type State = Lattice;

    fn setup(&self, moles: &MolarMap, vol_multiplier: f64) -> Result<Lattice, EngineError> {
        if !(vol_multiplier.is_finite() && vol_multiplier >= 0.0) {
            return Err(EngineError::LatticeSetup(format!(
                "volume multiplier must be non-negative and finite, got {}",
                vol_multiplier
            )));
        }

        let volumes = self.phases.mole_amts_to_vol_amts(moles)?;
        let fractions: Vec<(String, f64)> = amounts::normalize(&volumes).into_iter().collect();
        let counts = allocate_sites(&fractions, self.num_sites);

        let mut sites: Vec<SiteState> = Vec::with_capacity(self.num_sites);
        for ((phase, _), count) in fractions.iter().zip(&counts) {
            sites.extend((0..*count).map(|_| SiteState::new(phase.clone(), 1.0)));
        }
        let vacant = self.num_sites.saturating_sub(sites.len());
        sites.extend((0..vacant).map(|_| SiteState::new(FREE_SPACE, 1.0)));

        sites.shuffle(&mut *self.rng.borrow_mut());

        debug!(
            num_sites = self.num_sites,
            vacant, vol_multiplier, "Packed new lattice."
        );

        Ok(Lattice::new(sites).with_general_state(GeneralState {
            vol_multiplier,
            ..GeneralState::default()
        }))
    }
}

/// Largest-remainder apportionment of `num_sites` across `fractions`.
///
/// Returns one count per fraction. The counts sum to `num_sites` whenever the
/// fractions sum to one, and to zero when `fractions` is empty.
fn allocate_sites(fractions: &[(String, f64)], num_sites: usize) -> Vec<usize> {
    if fractions.is_empty() {
        return Vec::new();
    }

    let exact: Vec<f64> = fractions
        .iter()
        .map(|(_, f)| f * num_sites as f64)
        .collect();
    let mut counts: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let assigned: usize = counts.iter().sum();
    let mut by_remainder: Vec<usize> = (0..exact.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra).unwrap_or(Ordering::Equal).then(a.cmp(&b))
    });

    for &index in by_remainder
        .iter()
        .take(num_sites.saturating_sub(assigned))
    {
        counts[index] += 1;
    }
    counts
}
