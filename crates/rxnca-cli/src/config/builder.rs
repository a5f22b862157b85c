use super::defaults::DefaultsConfig;
use super::file::FileRecipe;
use super::models::AppConfig;
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use rxnca::core::heating::HeatingSchedule;
use rxnca::engine::config::ReactionConfigBuilder;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

pub fn build_config(args: &RunArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = FileRecipe::from_file(&args.recipe)?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let heating_schedule = file_config.heating_schedule()?;

    let lattice_file = file_config.lattice.take().unwrap_or_default();
    let num_sites = args
        .num_sites
        .or(lattice_file.num_sites)
        .unwrap_or(defaults.num_sites);
    let seed = args.seed.or(lattice_file.seed).unwrap_or(defaults.seed);

    let regrind_file = file_config.regrind.take().unwrap_or_default();
    let melt_threshold = args
        .melt_threshold
        .or(regrind_file.melt_threshold)
        .unwrap_or(defaults.melt_threshold);

    let simulation_file = file_config.simulation.take().unwrap_or_default();
    let runs = args
        .runs
        .or(simulation_file.runs)
        .unwrap_or(defaults.runs);
    if runs == 0 {
        return Err(CliError::Config(
            "At least one run is required.".to_string(),
        ));
    }
    let record_interval = args
        .record_interval
        .or(simulation_file.record_interval)
        .unwrap_or(defaults.record_interval);

    let phases_path = resolve_relative_to_recipe(
        &args.recipe,
        file_config
            .phases
            .take()
            .unwrap_or_else(|| PathBuf::from(defaults.phases)),
    );
    debug!("Resolved phase data path to {:?}", &phases_path);

    let core_config = ReactionConfigBuilder::new()
        .heating_schedule(heating_schedule)
        .precursor_moles(file_config.precursors)
        .num_sites(num_sites)
        .seed(seed)
        .melt_threshold(melt_threshold)
        .record_interval(record_interval)
        .build()?;

    Ok(AppConfig {
        phases_path,
        runs,
        core_config,
    })
}

pub fn build_schedule(recipe_path: &Path) -> Result<HeatingSchedule> {
    FileRecipe::from_file(recipe_path)?.heating_schedule()
}

fn resolve_relative_to_recipe(recipe_path: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match recipe_path.parent() {
        Some(dir) => dir.join(path),
        None => path,
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
    })
}

fn apply_set_values(mut config: FileRecipe, set_values: &[String]) -> Result<FileRecipe> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "phases" => {
                config.phases = Some(PathBuf::from(value_str));
            }
            "lattice.num-sites" => {
                config
                    .lattice
                    .get_or_insert_with(Default::default)
                    .num_sites = Some(parse_value(key, value_str, "integer")?);
            }
            "lattice.seed" => {
                config.lattice.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "regrind.melt-threshold" => {
                config
                    .regrind
                    .get_or_insert_with(Default::default)
                    .melt_threshold = Some(parse_value(key, value_str, "float")?);
            }
            "simulation.runs" => {
                config.simulation.get_or_insert_with(Default::default).runs =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "simulation.record-interval" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .record_interval = Some(parse_value(key, value_str, "integer")?);
            }
            _ => match key.strip_prefix("precursors.") {
                Some(phase) if !phase.is_empty() => {
                    let amount = parse_value(key, value_str, "float")?;
                    config.precursors.insert(phase.to_string(), amount);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            },
        }
    }
    Ok(config)
}
