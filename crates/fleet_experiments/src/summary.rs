//! Per-(scenario, policy) averages over finished runs.

use fleet_core::metrics::FleetMetrics;
use fleet_core::policy::PolicyKind;
use fleet_core::scenario::ScenarioPreset;
use serde::Serialize;

use crate::runner::RunResult;

/// Mean metrics of one (scenario, policy) group. A field is `None` only when
/// no run in the group had a value for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub scenario: ScenarioPreset,
    pub policy: PolicyKind,
    pub runs: usize,
    pub orders_delivered_avg: Option<f64>,
    pub late_deliveries_avg: Option<f64>,
    pub avg_completion_time_min_avg: Option<f64>,
    pub avg_bike_downtime_min_avg: Option<f64>,
    pub avg_soc_avg: Option<f64>,
}

fn mean(metrics: &[&FleetMetrics], field: impl Fn(&FleetMetrics) -> Option<f64>) -> Option<f64> {
    let values: Vec<f64> = metrics.iter().filter_map(|&m| field(m)).collect();
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Groups appear in the order they are first seen in `results`.
pub fn summarize(results: &[RunResult]) -> Vec<SummaryRow> {
    let mut groups: Vec<((ScenarioPreset, PolicyKind), Vec<&FleetMetrics>)> = Vec::new();
    for result in results {
        let key = (result.scenario, result.policy);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(&result.metrics),
            None => groups.push((key, vec![&result.metrics])),
        }
    }

    groups
        .into_iter()
        .map(|((scenario, policy), members)| SummaryRow {
            scenario,
            policy,
            runs: members.len(),
            orders_delivered_avg: mean(&members, |m| Some(m.orders_delivered as f64)),
            late_deliveries_avg: mean(&members, |m| Some(m.late_deliveries as f64)),
            avg_completion_time_min_avg: mean(&members, |m| m.avg_completion_time_min),
            avg_bike_downtime_min_avg: mean(&members, |m| Some(m.avg_bike_downtime_min)),
            avg_soc_avg: mean(&members, |m| Some(m.avg_soc)),
        })
        .collect()
}
