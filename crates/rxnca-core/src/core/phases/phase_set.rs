use super::registry::{FREE_SPACE, PhaseError, PhaseRegistry};
use crate::core::models::amounts::{ElementalMap, MolarMap, PhaseVolumeMap};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PhaseData {
    /// Volume occupied by one mole of the phase.
    pub molar_volume: f64,
    /// `None` for phases that never melt within the simulated range.
    #[serde(default)]
    pub melting_point: Option<f64>,
    /// Moles of each element per mole of the phase.
    pub elements: BTreeMap<String, f64>,
}

#[derive(Debug, Error)]
pub enum PhaseLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid data for phase '{phase}': {message}")]
    InvalidPhase { phase: String, message: String },
}

/// A [`PhaseRegistry`] backed by a table of per-phase molar volumes, melting
/// points, and elemental compositions.
#[derive(Debug, Clone, Default)]
pub struct PhaseSet {
    phases: HashMap<String, PhaseData>,
}

impl PhaseSet {
    pub fn new(phases: HashMap<String, PhaseData>) -> Result<Self, PhaseLoadError> {
        for (name, data) in &phases {
            validate(name, data)?;
        }
        Ok(Self { phases })
    }

    pub fn load(path: &Path) -> Result<Self, PhaseLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| PhaseLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        content.parse()
    }

    pub fn get(&self, phase: &str) -> Option<&PhaseData> {
        self.phases.get(phase)
    }

    pub fn contains(&self, phase: &str) -> bool {
        self.phases.contains_key(phase)
    }

    /// Phase names in lexical order.
    pub fn phase_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.phases.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn melting_point(&self, phase: &str) -> Option<f64> {
        self.phases.get(phase).and_then(|p| p.melting_point)
    }

    pub fn mole_amts_to_vol_amts(&self, moles: &MolarMap) -> Result<PhaseVolumeMap, PhaseError> {
        moles
            .iter()
            .filter(|(phase, _)| phase.as_str() != FREE_SPACE)
            .map(|(phase, amount)| {
                let data = self.lookup(phase)?;
                Ok((phase.clone(), amount * data.molar_volume))
            })
            .collect()
    }

    fn lookup(&self, phase: &str) -> Result<&PhaseData, PhaseError> {
        self.phases
            .get(phase)
            .ok_or_else(|| PhaseError::UnknownPhase(phase.to_string()))
    }
}

impl FromStr for PhaseSet {
    type Err = PhaseLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let phases: HashMap<String, PhaseData> = toml::from_str(s)?;
        Self::new(phases)
    }
}

impl PhaseRegistry for PhaseSet {
    /// A phase is melted at or above its melting point. Unknown phases and the
    /// free-space sentinel never melt.
    fn is_melted(&self, phase: &str, temperature: f64) -> bool {
        self.melting_point(phase)
            .is_some_and(|melting_point| temperature >= melting_point)
    }

    fn vol_amts_to_moles(&self, volumes: &PhaseVolumeMap) -> Result<MolarMap, PhaseError> {
        volumes
            .iter()
            .filter(|(phase, _)| phase.as_str() != FREE_SPACE)
            .map(|(phase, volume)| {
                let data = self.lookup(phase)?;
                Ok((phase.clone(), volume / data.molar_volume))
            })
            .collect()
    }

    fn mole_amts_to_el_amts(&self, moles: &MolarMap) -> Result<ElementalMap, PhaseError> {
        let mut elements = ElementalMap::new();
        for (phase, amount) in moles {
            if phase == FREE_SPACE {
                continue;
            }
            let data = self.lookup(phase)?;
            for (element, per_mole) in &data.elements {
                *elements.entry(element.clone()).or_insert(0.0) += amount * per_mole;
            }
        }
        Ok(elements)
    }

    fn atoms_per_formula_unit(&self, phase: &str) -> Result<f64, PhaseError> {
        Ok(self.lookup(phase)?.elements.values().sum())
    }

    fn contains_element(&self, element: &str) -> bool {
        self.phases
            .values()
            .any(|data| data.elements.contains_key(element))
    }
}

fn validate(name: &str, data: &PhaseData) -> Result<(), PhaseLoadError> {
    let invalid = |message: &str| PhaseLoadError::InvalidPhase {
        phase: name.to_string(),
        message: message.to_string(),
    };

    if name == FREE_SPACE {
        return Err(invalid("the free-space phase is reserved and cannot be defined"));
    }
    if !(data.molar_volume.is_finite() && data.molar_volume > 0.0) {
        return Err(invalid("molar-volume must be a positive, finite number"));
    }
    if data.melting_point.is_some_and(|mp| !mp.is_finite()) {
        return Err(invalid("melting-point must be finite"));
    }
    if data.elements.values().any(|&n| !(n.is_finite() && n >= 0.0)) {
        return Err(invalid("element counts must be non-negative and finite"));
    }
    Ok(())
}
