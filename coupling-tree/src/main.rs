//! coupling-tree: run the three-role workload against a lock-coupled tree.
//!
//! ```bash
//! coupling-tree -n 1000 -s 42
//! coupling-tree --serial -q --json
//! ```
//!
//! Prints the seed, the final tree (when small enough) and the run counters.

use std::process;

use clap::Parser;
use rand::Rng;
use tracing_subscriber::EnvFilter;

use coupling_tree::{
    CouplingTree, DEFAULT_VALUE_RANGE, SerialTree, Value, WorkloadConfig, render, run_serial,
    run_workload,
};

#[derive(Parser, Debug)]
#[command(name = "coupling-tree")]
#[command(about = "Concurrent insert/delete/rebalance workload on a lock-coupled binary search tree")]
struct Cli {
    /// Number of random inserts the Inserter performs.
    #[arg(short = 'n', long = "inserts", default_value_t = 1000)]
    inserts: usize,

    /// Seed for every random stream (random if not set).
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// Only log warnings; suppresses the per-operation lines.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Random values are drawn from 0..max-value.
    #[arg(long, default_value_t = DEFAULT_VALUE_RANGE)]
    max_value: Value,

    /// Run the single-threaded workload (insert, then rebalance, per round).
    #[arg(long)]
    serial: bool,

    /// Print the run summary as JSON instead of the text report.
    #[arg(long)]
    json: bool,
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let config = WorkloadConfig {
        insert_quota: cli.inserts,
        value_range: cli.max_value,
        ..WorkloadConfig::default()
    };
    if let Err(err) = config.validate() {
        eprintln!("error: {err}");
        process::exit(1);
    }

    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    println!("Seed is {seed}");

    let (summary, drawing) = if cli.serial {
        let mut tree = SerialTree::with_value_range(config.value_range);
        let summary = run_serial(&mut tree, &config, seed);
        (summary, render(&tree.shape(), tree.value_width()))
    } else {
        let tree = CouplingTree::with_value_range(config.value_range);
        let summary = run_workload(&tree, &config, seed);
        (summary, render(&tree.shape(), tree.value_width()))
    };

    print!("{drawing}");
    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: failed to serialize summary: {err}");
                process::exit(1);
            }
        }
    } else {
        println!("\n\n{summary}");
    }
}
