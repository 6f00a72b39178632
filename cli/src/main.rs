//! Delivery pipeline simulator command line interface
//!
//! Loads a JSON configuration, then either runs one simulation and prints a
//! report, or grid-searches staffing levels for the cheapest cost per item.
//! See binary --help for more information.

use std::fs::File;
use std::io::BufReader;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use delivery_simulator_core_rs::{
    weeks_to_hours, GridSearch, OptimisationResult, RunReport, RunSummary, SimulationConfig, Simulator,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// delivery-sim: simulate a software delivery pipeline under staffing and WIP constraints
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Logging verbosity level (`trace`, `debug`, `info`, `warn`, `error`).
    #[arg(short, long, default_value = "info", global = true)]
    verbosity: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a single simulation and print its report
    Run {
        /// Path to the JSON configuration file.
        #[arg(short, long)]
        config: PathBuf,

        /// Override the configured RNG seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the full metrics as JSON instead of the text report.
        #[arg(long)]
        json: bool,
    },

    /// Grid-search developers, testers and WIP limit for the lowest cost per item
    Optimise {
        /// Path to the JSON configuration file used as the base of every run.
        #[arg(short, long)]
        config: PathBuf,

        /// Developer headcounts to try, as `min..max` (inclusive).
        #[arg(long, default_value = "1..8", value_parser = parse_range)]
        developers: RangeInclusive<usize>,

        /// Tester headcounts to try, as `min..max` (inclusive).
        #[arg(long, default_value = "1..8", value_parser = parse_range)]
        testers: RangeInclusive<usize>,

        /// WIP limits to try, as `min..max` (inclusive).
        #[arg(long, default_value = "1..20", value_parser = parse_range)]
        wip: RangeInclusive<usize>,

        /// Discard configurations that take longer than this many working weeks.
        #[arg(long, value_parser = parse_weeks)]
        deadline_weeks: Option<f64>,

        /// Print the full search result as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Parse `a..b` (or a single number) into an inclusive range
fn parse_range(s: &str) -> Result<RangeInclusive<usize>, String> {
    let (lo, hi) = match s.split_once("..") {
        Some((lo, hi)) => (lo, hi.trim_start_matches('=')),
        None => (s, s),
    };
    let lo: usize = lo.trim().parse().map_err(|_| format!("'{lo}' isn't a valid count"))?;
    let hi: usize = hi.trim().parse().map_err(|_| format!("'{hi}' isn't a valid count"))?;
    if lo > hi {
        return Err(format!("range start {lo} is greater than end {hi}"));
    }
    Ok(lo..=hi)
}

fn parse_weeks(s: &str) -> Result<f64, String> {
    let val: f64 = s.parse().map_err(|_| format!("'{s}' isn't a valid number of weeks"))?;
    if val.is_finite() && val > 0.0 {
        Ok(val)
    } else {
        Err(format!("deadline must be a positive number of weeks, got: {val}"))
    }
}

fn setup_logging(verbosity: &str) {
    let filter = EnvFilter::try_new(verbosity).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<SimulationConfig> {
    let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    SimulationConfig::from_json_reader(BufReader::new(file))
        .with_context(|| format!("parsing config {}", path.display()))
}

fn run(config_path: &Path, seed: Option<u64>, as_json: bool) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(seed) = seed {
        config.rng_seed = seed;
    }

    let outcome = Simulator::new(config.clone())
        .and_then(Simulator::run)
        .context("running simulation")?;
    if as_json {
        let report = RunReport::new(&outcome, &config).with_config(config);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", RunSummary::from_outcome(&outcome, &config));
    }
    Ok(())
}

fn print_search(result: &OptimisationResult, deadline_weeks: Option<f64>) {
    println!(
        "{:>10} {:>8} {:>5} {:>12} {:>10} {:>14} {:>10}",
        "Developers", "Testers", "WIP", "Total cost", "Completed", "Cost per item", "Time (h)"
    );
    for c in &result.candidates {
        println!(
            "{:>10} {:>8} {:>5} {:>12.0} {:>10} {:>14.2} {:>10.0}",
            c.developers, c.testers, c.wip_limit, c.total_cost, c.completed_items, c.cost_per_item, c.elapsed_time
        );
    }
    println!();

    if let Some(weeks) = deadline_weeks {
        if result.skipped > 0 {
            println!(
                "{} configurations skipped for exceeding the delivery deadline of {} weeks ({} hours)",
                result.skipped,
                weeks,
                weeks_to_hours(weeks)
            );
        }
    }
    match &result.best {
        Some(best) => println!(
            "Best: {} developers, {} testers, WIP limit {} at ${:.2} per item ({:.0} hours)",
            best.developers, best.testers, best.wip_limit, best.cost_per_item, best.elapsed_time
        ),
        None => println!("No configuration met the delivery deadline."),
    }
}

fn optimise(
    config_path: &Path,
    search: GridSearch,
    deadline_weeks: Option<f64>,
    as_json: bool,
) -> Result<()> {
    let base = load_config(config_path)?;
    let result = search.run(&base).context("running grid search")?;

    if result.best.is_none() {
        warn!("No configuration met the delivery deadline");
    }
    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_search(&result, deadline_weeks);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.verbosity);

    match cli.command {
        Command::Run { config, seed, json } => {
            info!(config = %config.display(), "Running simulation");
            run(&config, seed, json)
        },
        Command::Optimise {
            config,
            developers,
            testers,
            wip,
            deadline_weeks,
            json,
        } => {
            info!(config = %config.display(), ?developers, ?testers, ?wip, "Running grid search");
            let mut search = GridSearch::new(developers, testers, wip);
            if let Some(weeks) = deadline_weeks {
                search = search.with_deadline(weeks_to_hours(weeks));
            }
            optimise(&config, search, deadline_weeks, json)
        },
    }
}
