use crate::error::{CliError, Result};
use rxnca::core::heating::{HeatingSchedule, HeatingScheduleBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileRecipe {
    pub phases: Option<PathBuf>,
    #[serde(default)]
    pub precursors: BTreeMap<String, f64>,
    pub lattice: Option<FileLatticeConfig>,
    pub regrind: Option<FileRegrindConfig>,
    pub simulation: Option<FileSimulationConfig>,
    #[serde(default)]
    pub heating: Vec<FileHeatingSegment>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileLatticeConfig {
    #[serde(rename = "num-sites")]
    pub num_sites: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileRegrindConfig {
    #[serde(rename = "melt-threshold")]
    pub melt_threshold: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileSimulationConfig {
    pub runs: Option<usize>,
    #[serde(rename = "record-interval")]
    pub record_interval: Option<usize>,
}

/// One `[[heating]]` entry; segments are appended to the schedule in file order.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum FileHeatingSegment {
    Hold {
        temperature: f64,
        duration: usize,
        #[serde(default)]
        expand: bool,
    },
    #[serde(rename_all = "kebab-case")]
    Sweep {
        start: f64,
        end: f64,
        stage_length: usize,
        step_size: f64,
    },
}

impl FileHeatingSegment {
    fn append_to(&self, builder: HeatingScheduleBuilder) -> HeatingScheduleBuilder {
        match *self {
            Self::Hold {
                temperature,
                duration,
                expand: false,
            } => builder.hold(temperature, duration),
            Self::Hold {
                temperature,
                duration,
                expand: true,
            } => builder.hold_expanded(temperature, duration),
            Self::Sweep {
                start,
                end,
                stage_length,
                step_size,
            } => builder.sweep(start, end, stage_length, step_size),
        }
    }
}

impl FileRecipe {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading recipe file from {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn heating_schedule(&self) -> Result<HeatingSchedule> {
        if self.heating.is_empty() {
            return Err(CliError::Config(
                "Recipe defines no [[heating]] segments.".to_string(),
            ));
        }
        let schedule = self
            .heating
            .iter()
            .fold(HeatingSchedule::builder(), |builder, segment| {
                segment.append_to(builder)
            })
            .build()?;
        Ok(schedule)
    }
}
