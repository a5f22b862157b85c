use rxnca::engine::config as core_config;
use std::path::PathBuf;

pub struct AppConfig {
    pub phases_path: PathBuf,
    pub runs: usize,
    pub core_config: core_config::ReactionConfig,
}
