//! Parallel simulation execution using rayon.

use fleet_core::config::{CostWeights, EngineConfig};
use fleet_core::metrics::FleetMetrics;
use fleet_core::policy::PolicyKind;
use fleet_core::scenario::{build_scenario, ScenarioParams, ScenarioPreset};
use fleet_core::telemetry::OrderOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One (preset, seed, policy) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    pub experiment_id: String,
    pub run_id: usize,
    pub preset: ScenarioPreset,
    pub policy: PolicyKind,
    pub seed: u64,
    pub duration_min: u64,
    pub weights: CostWeights,
}

impl RunSpec {
    pub fn scenario_params(&self) -> ScenarioParams {
        self.preset.params().with_seed(self.seed)
    }
}

/// Metrics and order table of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub experiment_id: String,
    pub run_id: usize,
    pub scenario: ScenarioPreset,
    pub policy: PolicyKind,
    pub seed: u64,
    pub metrics: FleetMetrics,
    pub orders: Vec<OrderOutcome>,
}

/// Build the scenario, run the policy to the horizon and collect results.
/// The trace is not recorded.
pub fn run_single_simulation(spec: &RunSpec) -> Result<RunResult, String> {
    let config = EngineConfig {
        record_trace: false,
        ..EngineConfig::default()
    };
    let mut sim = build_scenario(&spec.scenario_params())
        .and_then(|scenario| scenario.into_simulation(spec.weights, config))
        .map_err(|error| format!("run {}: {error}", spec.run_id))?;

    sim.run(spec.duration_min, &spec.policy.build());
    debug!(
        "run {} ({} / {} / seed {}) done",
        spec.run_id,
        spec.preset.as_str(),
        spec.policy.as_str(),
        spec.seed
    );

    Ok(RunResult {
        experiment_id: spec.experiment_id.clone(),
        run_id: spec.run_id,
        scenario: spec.preset,
        policy: spec.policy,
        seed: spec.seed,
        metrics: sim.metrics(),
        orders: sim.order_outcomes(),
    })
}

fn progress_bar(total: usize) -> Result<ProgressBar, String> {
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .map_err(|error| format!("invalid progress template: {error}"))?
        .progress_chars("#>-");
    let bar = ProgressBar::new(total as u64);
    bar.set_style(style);
    Ok(bar)
}

/// Run every spec on a rayon pool. Results keep the order of `specs`; the
/// first failing run aborts the batch.
pub fn run_parallel_experiments(
    specs: Vec<RunSpec>,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<RunResult>, String> {
    let total = specs.len();
    let pb = if show_progress && total > 0 {
        Some(progress_bar(total)?)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder
        .build()
        .map_err(|error| format!("failed to create thread pool: {error}"))?;

    info!("running {total} simulations");
    let results = pool.install(|| {
        specs
            .par_iter()
            .map(|spec| {
                let result = run_single_simulation(spec);
                if let Some(ref progress_bar) = pb {
                    progress_bar.inc(1);
                }
                result
            })
            .collect::<Result<Vec<_>, String>>()
    });

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    results
}
