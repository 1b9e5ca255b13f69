//! Per-bike multi-criteria dispatch over pruned candidate sets.
//!
//! Each idle bike scores its `candidate_orders` nearest active orders and its
//! `candidate_stations` nearest stations and takes the cheapest action. Orders
//! the bike cannot reach with enough charge left to get to a station are
//! dropped before scoring.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::arena::{BikeIdx, OrderIdx, StationIdx};

use super::scoring::{charge_estimate, deliver_estimate, is_feasible, min_required_soc};
use super::{BikePolicy, DispatchContext};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub candidate_orders: usize,
    pub candidate_stations: usize,
    /// With no active orders, bikes at or above this SOC stay idle.
    pub comfort_soc: f64,
    /// Charge minutes assumed per queued bike in the wait estimate.
    pub avg_charge_min: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            candidate_orders: 20,
            candidate_stations: 5,
            comfort_soc: 0.60,
            avg_charge_min: 15.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeuristicPolicy {
    config: HeuristicConfig,
}

#[derive(Debug, Clone, Copy)]
enum Choice {
    Deliver(OrderIdx),
    Charge(StationIdx),
}

impl HeuristicPolicy {
    pub fn new(config: HeuristicConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    fn top_up_if_low(&self, ctx: &mut DispatchContext<'_>, bike: BikeIdx) {
        if ctx.bike(bike).soc >= self.config.comfort_soc {
            return;
        }
        if let Some(station) = ctx.nearest_station(bike) {
            ctx.start_travel_to_station(bike, station);
        }
    }
}

impl BikePolicy for HeuristicPolicy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn decide(&self, ctx: &mut DispatchContext<'_>, bike: BikeIdx) {
        if ctx.active_orders().is_empty() {
            self.top_up_if_low(ctx, bike);
            return;
        }

        let orders = ctx.k_nearest_orders(bike, self.config.candidate_orders);
        let stations = ctx.k_nearest_stations(bike, self.config.candidate_stations);

        let mut best: Option<(Choice, f64)> = None;
        let mut any_feasible = false;

        // Deliveries first so they win ties.
        for &order in &orders {
            if !is_feasible(ctx, bike, order) {
                continue;
            }
            any_feasible = true;
            let cost = deliver_estimate(ctx, bike, order).cost;
            if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                best = Some((Choice::Deliver(order), cost));
            }
        }
        for &station in &stations {
            let cost = charge_estimate(ctx, bike, station, self.config.avg_charge_min).cost;
            if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                best = Some((Choice::Charge(station), cost));
            }
        }

        match best {
            None => {}
            Some((Choice::Deliver(order), cost)) => {
                debug!("heuristic: bike {} delivers (cost {cost:.2})", ctx.bike(bike).id);
                ctx.start_travel_to_order(bike, order);
            }
            Some((Choice::Charge(station), cost)) => {
                if !any_feasible {
                    if let Some(target) = min_required_soc(ctx, bike, &orders) {
                        ctx.set_charge_target(bike, target);
                    }
                }
                debug!(
                    "heuristic: bike {} charges (cost {cost:.2}, feasible orders: {any_feasible})",
                    ctx.bike(bike).id
                );
                ctx.start_travel_to_station(bike, station);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CostWeights, EngineConfig};
    use crate::entities::{Activity, Bike, Order, Station};
    use crate::fleet::Fleet;
    use crate::spatial::Point;

    fn decide_once(fleet: &mut Fleet) {
        let weights = CostWeights::default();
        let config = EngineConfig::default();
        let bike = fleet.bikes().lookup(1).expect("bike");
        let mut ctx = DispatchContext::new(fleet, 0, &weights, &config);
        HeuristicPolicy::default().decide(&mut ctx, bike);
    }

    fn only_bike(fleet: &Fleet) -> &Bike {
        fleet.bikes().values().next().expect("one bike")
    }

    #[test]
    fn prefers_cheap_feasible_delivery() {
        let mut fleet = Fleet::new(
            vec![Bike::new(1, Point::new(2.5, 2.5), 0.9, 450.0, 18.0, 18.0)],
            vec![
                Order::new(1, Point::new(2.5, 3.0), 0, 60),
                Order::new(2, Point::new(4.5, 4.5), 0, 60),
            ],
            vec![Station::new(1, Point::new(0.5, 0.5), 2, 250.0)],
        )
        .expect("valid fleet");
        decide_once(&mut fleet);
        let bike = only_bike(&fleet);
        let order = bike.activity.target_order().expect("delivering");
        assert_eq!(fleet.order(order).id, 1);
    }

    #[test]
    fn delivery_wins_a_tie_with_charging() {
        // Order 0.9 km out: 3 travel minutes. Station underfoot: 1 + 2 × 1 = 3.
        let mut fleet = Fleet::new(
            vec![Bike::new(1, Point::new(2.0, 2.0), 1.0, 450.0, 18.0, 18.0)],
            vec![Order::new(1, Point::new(2.0, 2.9), 0, 600)],
            vec![Station::new(1, Point::new(2.0, 2.0), 1, 250.0)],
        )
        .expect("valid fleet");
        decide_once(&mut fleet);
        let bike = only_bike(&fleet);
        assert!(matches!(
            bike.activity,
            Activity::TravelingToOrder { remaining_min: 3, .. }
        ));
    }

    #[test]
    fn infeasible_orders_force_charge_with_minimum_requirement_as_target() {
        // 0.5 km away: travel costs 2 min, far cheaper than charging, but the
        // bike lacks the 0.02 + 0.02 + 0.05 it would need.
        let mut fleet = Fleet::new(
            vec![Bike::new(1, Point::new(2.0, 2.0), 0.08, 450.0, 18.0, 18.0)],
            vec![Order::new(1, Point::new(2.5, 2.0), 0, 60)],
            vec![Station::new(1, Point::new(3.0, 2.0), 1, 250.0)],
        )
        .expect("valid fleet");
        decide_once(&mut fleet);
        let bike = only_bike(&fleet);
        assert!(matches!(bike.activity, Activity::TravelingToStation { .. }));
        let target = bike.charge_target.expect("charge target set");
        assert!((target - 0.09).abs() < 1e-9);
    }

    #[test]
    fn comfortable_bike_idles_without_orders() {
        let mut fleet = Fleet::new(
            vec![Bike::new(1, Point::new(2.0, 2.0), 0.6, 450.0, 18.0, 18.0)],
            vec![Order::new(1, Point::new(2.5, 2.0), 30, 60)],
            vec![Station::new(1, Point::new(3.0, 2.0), 1, 250.0)],
        )
        .expect("valid fleet");
        decide_once(&mut fleet);
        assert!(only_bike(&fleet).is_idle());
    }

    #[test]
    fn low_bike_tops_up_toward_default_without_orders() {
        let mut fleet = Fleet::new(
            vec![Bike::new(1, Point::new(2.0, 2.0), 0.59, 450.0, 18.0, 18.0)],
            vec![],
            vec![Station::new(1, Point::new(3.0, 2.0), 1, 250.0)],
        )
        .expect("valid fleet");
        decide_once(&mut fleet);
        let bike = only_bike(&fleet);
        assert!(matches!(bike.activity, Activity::TravelingToStation { .. }));
        assert_eq!(bike.charge_target, None);
    }
}
