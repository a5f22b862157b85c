use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Reaction CA Developers",
    version,
    about = "rxnca CLI - Thermal dry runs and schedule inspection for solid-state reaction cellular automata.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the heating schedule described by a recipe.
    Schedule(ScheduleArgs),
    /// Walk the heating schedule, melting and regrinding the lattice as it heats.
    Run(RunArgs),
}

/// Arguments for the `schedule` subcommand.
#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Path to the recipe file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub recipe: PathBuf,

    /// Multiply step indices by this factor in the printed plot coordinates.
    #[arg(long, value_name = "FLOAT", default_value_t = 1.0)]
    pub step_scale: f64,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    // --- Core Arguments ---
    /// Path to the recipe file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub recipe: PathBuf,

    /// Write a JSON summary of the runs to this path.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    // --- Simulation Overrides ---
    /// Override the number of independent runs.
    #[arg(short = 'n', long, value_name = "INT")]
    pub runs: Option<usize>,

    /// Override the base random seed; run `i` uses `seed + i`.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Override the number of lattice sites.
    #[arg(long, value_name = "INT")]
    pub num_sites: Option<usize>,

    /// Override the melted volume fraction that triggers a regrind.
    #[arg(long, value_name = "FLOAT")]
    pub melt_threshold: Option<f64>,

    /// Override how often (in steps) the lattice state is recorded.
    #[arg(long, value_name = "INT")]
    pub record_interval: Option<usize>,

    /// Set a specific configuration value, overriding the recipe file.
    /// Can be used multiple times. Example: -S lattice.num-sites=900
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
