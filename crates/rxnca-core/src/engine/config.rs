use crate::core::heating::HeatingSchedule;
use crate::core::models::amounts::MolarMap;
use thiserror::Error;

/// Fraction of unmelted lattice volume that must newly melt before the lattice is rebuilt.
pub const DEFAULT_MELT_THRESHOLD: f64 = 0.25;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegrindConfig {
    pub melt_threshold: f64,
}

impl RegrindConfig {
    pub fn with_threshold(melt_threshold: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&melt_threshold) {
            return Err(ConfigError::InvalidParameter {
                name: "melt_threshold",
                reason: format!("must lie in [0, 1], got {}", melt_threshold),
            });
        }
        Ok(Self { melt_threshold })
    }
}

impl Default for RegrindConfig {
    fn default() -> Self {
        Self {
            melt_threshold: DEFAULT_MELT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticeConfig {
    pub num_sites: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReactionConfig {
    pub heating_schedule: HeatingSchedule,
    pub precursor_moles: MolarMap,
    pub lattice: LatticeConfig,
    pub regrind: RegrindConfig,
    /// Record the state every this many steps (the final step is always recorded).
    pub record_interval: usize,
}

#[derive(Default)]
pub struct ReactionConfigBuilder {
    heating_schedule: Option<HeatingSchedule>,
    precursor_moles: Option<MolarMap>,
    num_sites: Option<usize>,
    seed: Option<u64>,
    melt_threshold: Option<f64>,
    record_interval: Option<usize>,
}

impl ReactionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heating_schedule(mut self, schedule: HeatingSchedule) -> Self {
        self.heating_schedule = Some(schedule);
        self
    }
    pub fn precursor_moles(mut self, moles: MolarMap) -> Self {
        self.precursor_moles = Some(moles);
        self
    }
    pub fn num_sites(mut self, num_sites: usize) -> Self {
        self.num_sites = Some(num_sites);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn melt_threshold(mut self, threshold: f64) -> Self {
        self.melt_threshold = Some(threshold);
        self
    }
    pub fn record_interval(mut self, interval: usize) -> Self {
        self.record_interval = Some(interval);
        self
    }

    pub fn build(self) -> Result<ReactionConfig, ConfigError> {
        let heating_schedule = self
            .heating_schedule
            .ok_or(ConfigError::MissingParameter("heating_schedule"))?;

        let precursor_moles = self
            .precursor_moles
            .ok_or(ConfigError::MissingParameter("precursor_moles"))?;
        if precursor_moles.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "precursor_moles",
                reason: "at least one precursor is required".to_string(),
            });
        }
        if let Some((phase, amount)) = precursor_moles
            .iter()
            .find(|(_, amount)| !(amount.is_finite() && **amount >= 0.0))
        {
            return Err(ConfigError::InvalidParameter {
                name: "precursor_moles",
                reason: format!("amount of '{}' must be non-negative, got {}", phase, amount),
            });
        }

        let num_sites = self
            .num_sites
            .ok_or(ConfigError::MissingParameter("num_sites"))?;
        if num_sites == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "num_sites",
                reason: "the lattice needs at least one site".to_string(),
            });
        }

        let record_interval = self.record_interval.unwrap_or(1);
        if record_interval == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "record_interval",
                reason: "must be at least 1".to_string(),
            });
        }

        let regrind = match self.melt_threshold {
            Some(threshold) => RegrindConfig::with_threshold(threshold)?,
            None => RegrindConfig::default(),
        };

        Ok(ReactionConfig {
            heating_schedule,
            precursor_moles,
            lattice: LatticeConfig {
                num_sites,
                seed: self.seed.unwrap_or(0),
            },
            regrind,
            record_interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> HeatingSchedule {
        HeatingSchedule::builder().hold(300.0, 10).build().unwrap()
    }

    fn precursors() -> MolarMap {
        [("A".to_string(), 1.0), ("B".to_string(), 2.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn build_applies_defaults_for_optional_parameters() {
        let config = ReactionConfigBuilder::new()
            .heating_schedule(schedule())
            .precursor_moles(precursors())
            .num_sites(100)
            .build()
            .unwrap();

        assert_eq!(config.regrind.melt_threshold, DEFAULT_MELT_THRESHOLD);
        assert_eq!(config.lattice, LatticeConfig { num_sites: 100, seed: 0 });
        assert_eq!(config.record_interval, 1);
    }

    #[test]
    fn build_reports_missing_parameters() {
        assert_eq!(
            ReactionConfigBuilder::new().build(),
            Err(ConfigError::MissingParameter("heating_schedule"))
        );
        assert_eq!(
            ReactionConfigBuilder::new()
                .heating_schedule(schedule())
                .precursor_moles(precursors())
                .build(),
            Err(ConfigError::MissingParameter("num_sites"))
        );
    }

    #[test]
    fn build_rejects_invalid_values() {
        let base = || {
            ReactionConfigBuilder::new()
                .heating_schedule(schedule())
                .precursor_moles(precursors())
                .num_sites(10)
        };

        assert!(matches!(
            base().melt_threshold(1.5).build(),
            Err(ConfigError::InvalidParameter { name: "melt_threshold", .. })
        ));
        assert!(matches!(
            base().num_sites(0).build(),
            Err(ConfigError::InvalidParameter { name: "num_sites", .. })
        ));
        assert!(matches!(
            base().record_interval(0).build(),
            Err(ConfigError::InvalidParameter { name: "record_interval", .. })
        ));
        assert!(matches!(
            base().precursor_moles(MolarMap::new()).build(),
            Err(ConfigError::InvalidParameter { name: "precursor_moles", .. })
        ));

        let mut negative = precursors();
        negative.insert("C".to_string(), -1.0);
        assert!(matches!(
            base().precursor_moles(negative).build(),
            Err(ConfigError::InvalidParameter { name: "precursor_moles", .. })
        ));
    }
}
