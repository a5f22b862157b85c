use rxnca::engine::config::DEFAULT_MELT_THRESHOLD;

pub struct DefaultsConfig {
    pub phases: String,
    pub num_sites: usize,
    pub seed: u64,
    pub melt_threshold: f64,
    pub runs: usize,
    pub record_interval: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            phases: "phases.toml".to_string(),
            num_sites: 400,
            seed: 0,
            melt_threshold: DEFAULT_MELT_THRESHOLD,
            runs: 1,
            record_interval: 1,
        }
    }
}
