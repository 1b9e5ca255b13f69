//! Example: compare the three dispatch policies on every scenario preset.
//!
//! Usage: `cargo run -p fleet_experiments --example policy_comparison [config.json] [out_dir]`
//!
//! Without a config file the default grid runs (all presets and policies,
//! seed 42, 600 minutes). Tables land in `out_dir` (default `results/tables`).

use std::fs;
use std::path::PathBuf;

use fleet_experiments::{
    append_runs_csv, export_order_table_csv, export_summary_csv, export_to_json,
    order_table_file_name, run_parallel_experiments, summarize, ExperimentConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => ExperimentConfig::from_json_file(path)?,
        None => ExperimentConfig::default(),
    };
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "results/tables".to_string()));
    fs::create_dir_all(&out_dir)?;

    let specs = config.specs();
    println!("Running {} simulations...", specs.len());
    let results = run_parallel_experiments(specs, config.threads, true)?;

    append_runs_csv(&results, out_dir.join("runs.csv"))?;
    for result in &results {
        export_order_table_csv(result, out_dir.join(order_table_file_name(result)))?;
    }
    export_to_json(&results, out_dir.join("results.json"))?;

    let summary = summarize(&results);
    export_summary_csv(&summary, out_dir.join("summary.csv"))?;

    println!("\n=== Summary ===");
    println!(
        "{:<8} {:<10} {:>10} {:>6} {:>12} {:>10} {:>6}",
        "scenario", "policy", "delivered", "late", "completion", "downtime", "soc"
    );
    for row in &summary {
        let fmt = |v: Option<f64>| v.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:<10} {:>10} {:>6} {:>12} {:>10} {:>6}",
            row.scenario.as_str(),
            row.policy.as_str(),
            fmt(row.orders_delivered_avg),
            fmt(row.late_deliveries_avg),
            fmt(row.avg_completion_time_min_avg),
            fmt(row.avg_bike_downtime_min_avg),
            row.avg_soc_avg.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string()),
        );
    }
    println!("\nTables written to {}", out_dir.display());
    Ok(())
}
