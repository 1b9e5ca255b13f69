use log::warn;
use serde::{Deserialize, Serialize};

use crate::arena::BikeIdx;

use super::{BikePolicy, DispatchContext};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Below this SOC the bike heads for the nearest station instead of an order.
    pub min_soc: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self { min_soc: 0.20 }
    }
}

/// Greedy nearest-order dispatch with a fixed SOC floor and no energy lookahead.
/// A bike may be sent on a trip it cannot finish; its SOC then bottoms out at 0.
#[derive(Debug, Clone, Default)]
pub struct BaselinePolicy {
    config: BaselineConfig,
}

impl BaselinePolicy {
    pub fn new(config: BaselineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BaselineConfig {
        &self.config
    }
}

impl BikePolicy for BaselinePolicy {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn decide(&self, ctx: &mut DispatchContext<'_>, bike: BikeIdx) {
        let active = ctx.active_orders();
        if active.is_empty() {
            return;
        }

        if ctx.bike(bike).soc < self.config.min_soc {
            match ctx.nearest_station(bike) {
                Some(station) => ctx.start_travel_to_station(bike, station),
                None => warn!("bike {} is low on charge but there are no stations", ctx.bike(bike).id),
            }
            return;
        }

        let origin = ctx.bike(bike).position;
        let mut nearest = None;
        for order in active {
            let distance_sq = origin.distance_sq(ctx.order(order).position);
            match nearest {
                Some((_, best)) if distance_sq >= best => {}
                _ => nearest = Some((order, distance_sq)),
            }
        }
        if let Some((order, _)) = nearest {
            ctx.start_travel_to_order(bike, order);
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

    fn decide_once(fleet: &mut Fleet, now: u64) {
        let weights = CostWeights::default();
        let config = EngineConfig::default();
        let bike = fleet.bikes().lookup(1).expect("bike");
        let mut ctx = DispatchContext::new(fleet, now, &weights, &config);
        BaselinePolicy::default().decide(&mut ctx, bike);
    }

    fn order_target(fleet: &Fleet) -> Option<u32> {
        let bike = fleet.bikes().lookup(1).expect("bike");
        fleet
            .bike(bike)
            .activity
            .target_order()
            .map(|order| fleet.order(order).id)
    }

    #[test]
    fn picks_nearest_order_and_breaks_ties_by_id() {
        let mut fleet = Fleet::new(
            vec![Bike::new(1, Point::new(2.0, 2.0), 1.0, 450.0, 18.0, 18.0)],
            vec![
                Order::new(9, Point::new(4.0, 4.0), 0, 60),
                Order::new(5, Point::new(3.0, 2.0), 0, 60),
                Order::new(3, Point::new(1.0, 2.0), 0, 60),
            ],
            vec![Station::new(1, Point::new(0.0, 0.0), 1, 250.0)],
        )
        .expect("valid fleet");
        decide_once(&mut fleet, 0);
        assert_eq!(order_target(&fleet), Some(3));
    }

    #[test]
    fn low_battery_goes_to_nearest_station_with_default_target() {
        let mut fleet = Fleet::new(
            vec![Bike::new(1, Point::new(2.0, 2.0), 0.19, 450.0, 18.0, 18.0)],
            vec![Order::new(1, Point::new(2.0, 3.0), 0, 60)],
            vec![
                Station::new(1, Point::new(0.0, 0.0), 1, 250.0),
                Station::new(2, Point::new(2.5, 2.0), 1, 250.0),
            ],
        )
        .expect("valid fleet");
        decide_once(&mut fleet, 0);
        let bike = fleet.bike(fleet.bikes().lookup(1).expect("bike"));
        let Activity::TravelingToStation { station, .. } = bike.activity else {
            panic!("expected station trip, got {:?}", bike.activity);
        };
        assert_eq!(fleet.station(station).id, 2);
        assert_eq!(bike.charge_target, None);
    }

    #[test]
    fn stays_put_without_released_orders() {
        let mut fleet = Fleet::new(
            vec![Bike::new(1, Point::new(2.0, 2.0), 0.05, 450.0, 18.0, 18.0)],
            vec![Order::new(1, Point::new(2.0, 3.0), 10, 60)],
            vec![Station::new(1, Point::new(0.0, 0.0), 1, 250.0)],
        )
        .expect("valid fleet");
        decide_once(&mut fleet, 9);
        assert_eq!(fleet.idle_bikes().len(), 1);
    }

    #[test]
    fn ignores_feasibility_and_drains_to_zero() {
        let mut fleet = Fleet::new(
            vec![Bike::new(1, Point::new(0.0, 0.0), 0.25, 450.0, 18.0, 18.0)],
            vec![Order::new(1, Point::new(10.0, 0.0), 0, 60)],
            vec![Station::new(1, Point::new(0.0, 0.0), 1, 250.0)],
        )
        .expect("valid fleet");
        decide_once(&mut fleet, 0);
        assert_eq!(order_target(&fleet), Some(1));
        assert_eq!(fleet.bikes().values().next().map(|b| b.soc), Some(0.0));
    }
}
