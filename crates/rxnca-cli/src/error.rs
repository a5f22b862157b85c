use rxnca::core::heating::ScheduleError;
use rxnca::core::phases::registry::PhaseError;
use rxnca::engine::config::ConfigError;
use rxnca::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    RxnCore(#[from] EngineError),

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error("Invalid heating schedule: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Invalid reaction configuration: {0}")]
    CoreConfig(#[from] ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to serialize run summary: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
