//! Difficulty retargeting simulator
//!
//! Usage:
//!   diffsim [divisor] [alg] [runs]     Monte Carlo over the reference experiment
//!   diffsim trace [divisor] [--json]   one grow_to_diff run with its difficulty trace
//!
//! `alg` is one of grow_to_diff (default), drop_to_diff, iterations.
//! Environment (a `.env` file is honoured): DIFFSIM_SEED, DIFFSIM_WORKERS,
//! DIFFSIM_MAX_STEPS, DIFFSIM_SAMPLER, DIFFSIM_CONFIG, RUST_LOG.

use diffsim_core::config::{self, SamplerKind, SimulationConfig};
use diffsim_core::constants::DEFAULT_DIFF_ADJ_DIVISOR;
use diffsim_core::driver::{Histogram, MonteCarlo, Summary, DEFAULT_BINS};
use diffsim_core::rng::seeded_rng;
use diffsim_core::run_simulation;
use log::info;
use std::env;
use std::error::Error;

const DEFAULT_RUNS: usize = 100;

/// Settings read from the environment
struct Settings {
    seed: u64,
    workers: usize,
    max_steps: Option<u64>,
    sampler: SamplerKind,
    config_path: Option<String>,
}

impl Settings {
    fn from_env() -> Result<Self, Box<dyn Error>> {
        let seed = match env::var("DIFFSIM_SEED") {
            Ok(value) => value.parse()?,
            Err(_) => rand::random(),
        };
        let workers = match env::var("DIFFSIM_WORKERS") {
            Ok(value) => value.parse()?,
            Err(_) => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        };
        let max_steps = match env::var("DIFFSIM_MAX_STEPS") {
            Ok(value) => Some(value.parse()?),
            Err(_) => None,
        };
        let sampler = match env::var("DIFFSIM_SAMPLER") {
            Ok(value) => value.parse()?,
            Err(_) => SamplerKind::default(),
        };

        Ok(Self {
            seed,
            workers,
            max_steps,
            sampler,
            config_path: env::var("DIFFSIM_CONFIG").ok(),
        })
    }

    /// Config file if one is set, otherwise the preset for `alg`
    fn simulation_config(&self, alg: &str, divisor: u64) -> Result<SimulationConfig, Box<dyn Error>> {
        match &self.config_path {
            Some(path) => {
                info!("using config file {}", path);
                Ok(SimulationConfig::from_json_file(path)?)
            }
            None => Ok(config::for_alg(alg, divisor, self.sampler)?),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenvy::dotenv();
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let settings = Settings::from_env()?;

    if args.first().map(String::as_str) == Some("trace") {
        let json = args.iter().any(|arg| arg == "--json");
        let divisor = match args.get(1).filter(|arg| *arg != "--json") {
            Some(value) => value.parse()?,
            None => DEFAULT_DIFF_ADJ_DIVISOR,
        };
        return trace(&settings, divisor, json);
    }

    let divisor = match args.first() {
        Some(value) => value.parse()?,
        None => DEFAULT_DIFF_ADJ_DIVISOR,
    };
    let alg = args.get(1).map(String::as_str).unwrap_or("grow_to_diff");
    let runs = match args.get(2) {
        Some(value) => value.parse()?,
        None => DEFAULT_RUNS,
    };

    experiment(&settings, divisor, alg, runs)
}

fn experiment(settings: &Settings, divisor: u64, alg: &str, runs: usize) -> Result<(), Box<dyn Error>> {
    let config = settings.simulation_config(alg, divisor)?;
    println!(
        "Simulating {} runs: {}, adjustment factor 1/{}, {} sampler, seed {}",
        runs,
        config.goal().alg(),
        (1.0 / config.difficulty_adjustment_factor()).round(),
        config.sampler_kind(),
        settings.seed
    );

    let experiment = MonteCarlo::new(config, runs)
        .with_seed(settings.seed)
        .with_workers(settings.workers)
        .with_max_steps(settings.max_steps)
        .run()?;

    for run in &experiment.runs {
        println!(
            "Finish {} simulation, diff adj times: {}",
            run.index,
            run.adjustments + 1
        );
    }

    if experiment.goal.is_difficulty_target() {
        println!("Completion time stats (hours)");
        print_summary(experiment.completion_stats());

        if let Some(histogram) = Histogram::new(&experiment.final_times_hours(), DEFAULT_BINS) {
            println!();
            println!("Distribution of final times (hours)");
            print!("{}", histogram.render(60));
        }
    } else {
        println!("Block time stats (seconds)");
        print_summary(experiment.block_time_stats());
    }

    Ok(())
}

fn trace(settings: &Settings, divisor: u64, json: bool) -> Result<(), Box<dyn Error>> {
    let config = settings.simulation_config("grow_to_diff", divisor)?;
    let mut rng = seeded_rng(settings.seed);
    let result = run_simulation(&config, &mut rng)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "adjustment times is {}, increase times is {}, decrease times is {}",
        result.adjustments() + 1,
        result.increase_count(),
        result.decrease_count()
    );
    println!("{:>12} {:>24}", "hours", "difficulty");
    for (hours, difficulty) in result.trace_points() {
        println!("{:>12.3} {:>24.1}", hours, difficulty);
    }

    Ok(())
}

fn print_summary(summary: Option<Summary>) {
    match summary {
        Some(summary) => {
            println!("Mean value: {}", summary.mean);
            println!("Variance value: {}", summary.variance);
            println!("Standard deviation: {}", summary.std_dev);
            match summary.coefficient_of_variation {
                Some(cv) => println!("Coefficient of variation: {}", cv),
                None => println!("Coefficient of variation: undefined (zero mean)"),
            }
        }
        None => println!("Not enough samples for statistics"),
    }
}
