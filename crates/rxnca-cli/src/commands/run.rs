use crate::cli::RunArgs;
use crate::config::{AppConfig, build_config};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use rxnca::analysis::bulk::{BulkReactionAnalyzer, Trace};
use rxnca::core::models::amounts::MolarMap;
use rxnca::core::models::lattice::Lattice;
use rxnca::core::models::result::{ReactionResult, RegrindEvent};
use rxnca::core::models::snapshot::Snapshot;
use rxnca::core::phases::phase_set::PhaseSet;
use rxnca::engine::progress::{Progress, ProgressReporter};
use rxnca::workflows::react::{self, InertRule};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

const TRACE_CUTOFF: f64 = 0.01;

#[derive(Debug, Serialize)]
struct RunRecord {
    seed: u64,
    final_vol_multiplier: f64,
    regrinds: Vec<RegrindEvent>,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    total_steps: usize,
    runs: Vec<RunRecord>,
    final_mole_fractions: MolarMap,
    mole_fraction_traces: Vec<Trace>,
    heating: Trace,
}

pub fn run(args: RunArgs) -> Result<()> {
    info!("Merging configuration from recipe and CLI arguments...");
    let app_config = build_config(&args)?;

    info!("Loading phase data from {:?}", &app_config.phases_path);
    let phases = PhaseSet::load(&app_config.phases_path).map_err(|e| CliError::FileParsing {
        path: app_config.phases_path.clone(),
        source: e.into(),
    })?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting {} thermal run(s) over {} steps...",
        app_config.runs,
        app_config.core_config.heating_schedule.total_duration()
    );
    let (seeds, results) = simulate(&app_config, &phases, &reporter)?;
    let summary = summarize(&app_config, &phases, &seeds, &results)?;

    print_summary(&summary);

    if let Some(output) = &args.output {
        info!("Writing run summary to {:?}", output);
        write_summary(&summary, output)?;
        println!("✓ Summary written to: {}", output.display());
    }

    Ok(())
}

fn simulate(
    app_config: &AppConfig,
    phases: &PhaseSet,
    reporter: &ProgressReporter,
) -> Result<(Vec<u64>, Vec<ReactionResult<Lattice>>)> {
    let base_seed = app_config.core_config.lattice.seed;
    let mut config = app_config.core_config.clone();
    let mut seeds = Vec::with_capacity(app_config.runs);
    let mut results = Vec::with_capacity(app_config.runs);

    for run_index in 0..app_config.runs {
        let seed = base_seed.wrapping_add(run_index as u64);
        reporter.report(Progress::Message(format!(
            "Run {}/{} (seed {})",
            run_index + 1,
            app_config.runs,
            seed
        )));

        config.lattice.seed = seed;
        let result = react::run_packed(&config, phases, &InertRule, reporter)?;
        info!(
            run = run_index + 1,
            regrinds = result.regrinds().len(),
            "Run finished."
        );

        seeds.push(seed);
        results.push(result);
    }
    Ok((seeds, results))
}

fn summarize(
    app_config: &AppConfig,
    phases: &PhaseSet,
    seeds: &[u64],
    results: &[ReactionResult<Lattice>],
) -> Result<RunSummary> {
    let schedule = &app_config.core_config.heating_schedule;
    let analyzer = BulkReactionAnalyzer::new(results, phases, schedule);

    let final_mole_fractions = analyzer
        .step_analyzer()
        .mole_fractions(&analyzer.final_steps(), true)?;
    let mole_fraction_traces = analyzer.mole_fraction_traces(TRACE_CUTOFF, None)?;

    let runs = seeds
        .iter()
        .zip(results)
        .map(|(&seed, result)| RunRecord {
            seed,
            final_vol_multiplier: result
                .last_step()
                .map_or(1.0, |s| s.general_state().vol_multiplier),
            regrinds: result.regrinds().to_vec(),
        })
        .collect();

    Ok(RunSummary {
        total_steps: schedule.total_duration(),
        runs,
        final_mole_fractions,
        mole_fraction_traces,
        heating: analyzer.heating_trace(1.0),
    })
}

fn print_summary(summary: &RunSummary) {
    for (i, record) in summary.runs.iter().enumerate() {
        println!(
            "Run {} (seed {}): {} regrind(s), final volume multiplier {:.4}",
            i + 1,
            record.seed,
            record.regrinds.len(),
            record.final_vol_multiplier
        );
        for event in &record.regrinds {
            println!(
                "  step {:>6} at {:>8.1} K: {:>5.1}% melted, solid ratio {:.4}, multiplier {:.4}",
                event.step,
                event.temperature,
                event.melted_fraction * 100.0,
                event.solid_ratio,
                event.vol_multiplier
            );
        }
    }

    println!("Final mole fractions (averaged across runs, melt included):");
    for (phase, fraction) in &summary.final_mole_fractions {
        println!("  {:<20} {:.4}", phase, fraction);
    }
}

fn write_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}
