use crate::runner::RunResult;
use crate::summary::SummaryRow;

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

pub(crate) fn append_runs_impl(
    results: &[RunResult],
    file: std::fs::File,
    write_header: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    if write_header {
        wtr.write_record([
            "experiment_id",
            "run_id",
            "scenario",
            "policy",
            "seed",
            "time_min",
            "orders_total",
            "orders_delivered",
            "late_deliveries",
            "avg_completion_time_min",
            "avg_bike_downtime_min",
            "avg_soc",
        ])?;
    }

    for result in results {
        let m = &result.metrics;
        wtr.write_record([
            result.experiment_id.as_str(),
            &result.run_id.to_string(),
            result.scenario.as_str(),
            result.policy.as_str(),
            &result.seed.to_string(),
            &m.time_min.to_string(),
            &m.orders_total.to_string(),
            &m.orders_delivered.to_string(),
            &m.late_deliveries.to_string(),
            &opt(m.avg_completion_time_min),
            &m.avg_bike_downtime_min.to_string(),
            &m.avg_soc.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_summary_impl(
    rows: &[SummaryRow],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "scenario",
        "policy",
        "runs",
        "orders_delivered_avg",
        "late_deliveries_avg",
        "avg_completion_time_min_avg",
        "avg_bike_downtime_min_avg",
        "avg_soc_avg",
    ])?;

    for row in rows {
        wtr.write_record([
            row.scenario.as_str(),
            row.policy.as_str(),
            &row.runs.to_string(),
            &opt(row.orders_delivered_avg),
            &opt(row.late_deliveries_avg),
            &opt(row.avg_completion_time_min_avg),
            &opt(row.avg_bike_downtime_min_avg),
            &opt(row.avg_soc_avg),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_orders_impl(
    result: &RunResult,
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "order_id",
        "delivered",
        "delivered_by",
        "release_time",
        "deadline",
        "completion_time",
        "is_late",
        "x",
        "y",
    ])?;

    for order in &result.orders {
        wtr.write_record([
            order.id.to_string().as_str(),
            flag(order.delivered),
            &opt(order.delivered_by),
            &order.release_time.to_string(),
            &order.deadline.to_string(),
            &opt(order.completion_time),
            flag(order.is_late),
            &order.x.to_string(),
            &order.y.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
