//! Parallel policy comparison for the e-bike delivery fleet simulation.
//!
//! Each run pairs a scenario preset, a seed and a dispatch policy; runs are
//! independent engines executed on a rayon pool. Results can be summarized
//! per (scenario, policy) and exported to CSV or JSON.
//!
//! ```no_run
//! use fleet_experiments::{run_parallel_experiments, summarize, ExperimentConfig};
//! use fleet_core::policy::PolicyKind;
//!
//! let config = ExperimentConfig::default()
//!     .with_policies(vec![PolicyKind::Baseline, PolicyKind::Global])
//!     .with_seeds(vec![1, 2, 3]);
//! let results = run_parallel_experiments(config.specs(), config.threads, true).unwrap();
//! for row in summarize(&results) {
//!     println!("{} / {}: {:?}", row.scenario.as_str(), row.policy.as_str(), row.orders_delivered_avg);
//! }
//! ```

pub mod config;
pub mod export;
pub mod runner;
pub mod summary;

pub use config::ExperimentConfig;
pub use export::{
    append_runs_csv, export_order_table_csv, export_summary_csv, export_to_json,
    order_table_file_name,
};
pub use runner::{run_parallel_experiments, run_single_simulation, RunResult, RunSpec};
pub use summary::{summarize, SummaryRow};
