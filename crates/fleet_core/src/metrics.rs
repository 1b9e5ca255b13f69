use serde::{Deserialize, Serialize};

use crate::fleet::Fleet;

/// Run-level KPIs, derived on demand from fleet state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FleetMetrics {
    pub time_min: u64,
    pub orders_total: usize,
    pub orders_delivered: usize,
    pub late_deliveries: usize,
    /// Mean completion time over delivered orders; `None` when nothing was delivered.
    pub avg_completion_time_min: Option<f64>,
    pub avg_bike_downtime_min: f64,
    pub avg_soc: f64,
}

impl FleetMetrics {
    pub fn derive(time_min: u64, fleet: &Fleet) -> Self {
        let orders = fleet.orders();
        let mut delivered = 0usize;
        let mut late = 0usize;
        let mut completion_sum = 0.0;
        for order in orders.values().filter(|order| order.delivered) {
            delivered += 1;
            if order.is_late() {
                late += 1;
            }
            completion_sum += order.completion_time.unwrap_or_default() as f64;
        }

        let bikes = fleet.bikes();
        let (avg_bike_downtime_min, avg_soc) = if bikes.is_empty() {
            (0.0, 0.0)
        } else {
            let n = bikes.len() as f64;
            (
                bikes.values().map(|b| b.downtime_min as f64).sum::<f64>() / n,
                bikes.values().map(|b| b.soc).sum::<f64>() / n,
            )
        };

        Self {
            time_min,
            orders_total: orders.len(),
            orders_delivered: delivered,
            late_deliveries: late,
            avg_completion_time_min: (delivered > 0).then(|| completion_sum / delivered as f64),
            avg_bike_downtime_min,
            avg_soc,
        }
    }

    /// Delivered share of all orders, 0 when there are none.
    pub fn delivery_rate(&self) -> f64 {
        if self.orders_total == 0 {
            0.0
        } else {
            self.orders_delivered as f64 / self.orders_total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Bike, Order};
    use crate::spatial::Point;

    #[test]
    fn empty_delivered_set_has_no_average() {
        let fleet = Fleet::new(
            vec![Bike::new(1, Point::default(), 0.5, 450.0, 18.0, 18.0)],
            vec![Order::new(1, Point::new(1.0, 1.0), 0, 10)],
            vec![],
        )
        .expect("valid fleet");
        let metrics = FleetMetrics::derive(0, &fleet);
        assert_eq!(metrics.orders_total, 1);
        assert_eq!(metrics.orders_delivered, 0);
        assert_eq!(metrics.avg_completion_time_min, None);
        assert_eq!(metrics.avg_soc, 0.5);
        assert_eq!(metrics.delivery_rate(), 0.0);
    }

    #[test]
    fn serializes_with_expected_keys() {
        let fleet = Fleet::new(vec![], vec![], vec![]).expect("empty fleet");
        let value = serde_json::to_value(FleetMetrics::derive(7, &fleet)).expect("serialize");
        let keys: Vec<&str> = value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        for key in [
            "time_min",
            "orders_total",
            "orders_delivered",
            "late_deliveries",
            "avg_completion_time_min",
            "avg_bike_downtime_min",
            "avg_soc",
        ] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert!(value["avg_completion_time_min"].is_null());
    }
}
