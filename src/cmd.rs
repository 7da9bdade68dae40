//! Command line interface for the `diagnose` binary
//!
//! Two subcommands, in the style of the teacher's own `cmd.rs`: [`ShowArgs`] loads a model
//! and reports its port/gate counts, and [`ReplayArgs`] streams a `.scn` scenario file
//! through a [`SingleFaultDiagnoser`], printing one `(detected, candidates)` line per
//! `sensors` record.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use kdam::tqdm;

use combfault::diagnose::{Diagnoser, SingleFaultDiagnoser};
use combfault::model::Model;
use combfault::scenario::{read_records, ScenarioRecord};

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug-level) tracing; same effect as `RUST_LOG=debug`
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Install a `tracing_subscriber::fmt` subscriber, honoring `RUST_LOG` and `-v`
    pub fn init_tracing(&self) {
        let default_level = if self.verbose { "debug" } else { "warn" };
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Show statistics about a loaded model
    ///
    /// Prints the number of inputs, outputs, gates, and any dropped (unrecognized-type)
    /// components found while loading.
    #[clap()]
    Show(ShowArgs),

    /// Replay a `.scn` scenario file against a model
    ///
    /// For every `sensors` record found in the scenario file, runs the single-fault
    /// diagnoser and prints whether the observation was detected as faulty and, if so,
    /// which gates could explain it.
    #[clap()]
    Replay(ReplayArgs),
}

/// Command arguments for model information
#[derive(Args)]
pub struct ShowArgs {
    /// Structural model file, in this crate's JSON schema
    model: PathBuf,
}

impl ShowArgs {
    /// Load the model and print its shape
    pub fn run(&self) {
        let model = Model::load_path(&self.model)
            .unwrap_or_else(|e| panic!("failed to load model {}: {e}", self.model.display()));
        println!("{model}");
    }
}

/// Command arguments for scenario replay
#[derive(Args)]
pub struct ReplayArgs {
    /// Structural model file, in this crate's JSON schema
    model: PathBuf,

    /// Line-oriented `.scn` scenario file
    scenario: PathBuf,

    /// Soft wall-clock budget, in milliseconds, for the fault-enumeration loop
    #[arg(long)]
    budget_ms: Option<u64>,
}

impl ReplayArgs {
    /// Load the model, replay the scenario, and print one result line per observation
    pub fn run(&self) {
        let model = Model::load_path(&self.model)
            .unwrap_or_else(|e| panic!("failed to load model {}: {e}", self.model.display()));

        let file = File::open(&self.scenario)
            .unwrap_or_else(|e| panic!("failed to open scenario {}: {e}", self.scenario.display()));
        let records = read_records(BufReader::new(file))
            .unwrap_or_else(|e| panic!("failed to parse scenario {}: {e}", self.scenario.display()));

        let mut diagnoser = match self.budget_ms {
            Some(ms) => SingleFaultDiagnoser::with_budget(Duration::from_millis(ms)),
            None => SingleFaultDiagnoser::new(),
        };
        diagnoser.load_model(model);
        diagnoser.initialize();

        for record in tqdm!(records.iter()) {
            let ScenarioRecord::Sensors { timestamp, values } = record else {
                continue;
            };
            let (detected, candidates) = diagnoser.process(values);
            if detected {
                let names: Vec<String> = candidates
                    .iter()
                    .flat_map(|group| group.iter().cloned())
                    .collect();
                println!("@{timestamp}: detected, candidates = [{}]", names.join(", "));
            } else {
                println!("@{timestamp}: nominal");
            }
        }
    }
}
