//! Result export: CSV run, summary and order tables plus JSON results.

use std::path::Path;

use crate::runner::RunResult;
use crate::summary::SummaryRow;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Append one row per run to `path`. The header is written only when the
/// file is new or empty, so repeated batches accumulate in one table.
///
/// # Errors
///
/// Returns an error if `results` is empty or the file cannot be written.
pub fn append_runs_csv(
    results: &[RunResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(results)?;
    let (file, is_empty) = writer_utils::open_for_append(path)?;
    csv::append_runs_impl(results, file, is_empty)
}

/// Write the per-(scenario, policy) summary table, replacing `path`.
pub fn export_summary_csv(
    rows: &[SummaryRow],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(rows)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_summary_impl(rows, file)
}

/// Write the order table of one run, replacing `path`.
pub fn export_order_table_csv(
    result: &RunResult,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    csv::export_orders_impl(result, file)
}

/// `orders_<policy>_<scenario>_seed<seed>.csv`
pub fn order_table_file_name(result: &RunResult) -> String {
    format!(
        "orders_{}_{}_seed{}.csv",
        result.policy.as_str(),
        result.scenario.as_str(),
        result.seed
    )
}

/// Write all results (metrics and order tables) as a pretty JSON array.
pub fn export_to_json(
    results: &[RunResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(results, file)
}
