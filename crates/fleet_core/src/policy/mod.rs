//! Dispatch policies.
//!
//! A policy decides, once per tick, what idle bikes should do. Policies come in
//! two shapes: a [`FleetPolicy`] sees the whole fleet in one call, a
//! [`BikePolicy`] is asked about one idle bike at a time. [`DispatchStrategy`]
//! wraps either, so the engine never needs to know which one it holds.

pub mod baseline;
pub mod global;
pub mod heuristic;
pub mod scoring;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arena::{ArenaIndex, BikeIdx, OrderIdx, StationIdx};
use crate::config::{CostWeights, EngineConfig};
use crate::entities::{Bike, Order, Station};
use crate::fleet::Fleet;

pub use baseline::{BaselineConfig, BaselinePolicy};
pub use global::{GlobalConfig, GlobalPolicy};
pub use heuristic::{HeuristicConfig, HeuristicPolicy};

/// Decides for every idle bike in a single call per tick.
pub trait FleetPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn dispatch(&self, ctx: &mut DispatchContext<'_>);
}

/// Decides for one idle bike at a time.
pub trait BikePolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Called only while `bike` is idle.
    fn decide(&self, ctx: &mut DispatchContext<'_>, bike: BikeIdx);
}

/// The policy the engine invokes between the pre- and post-dispatch schedules.
pub enum DispatchStrategy {
    WholeFleet(Box<dyn FleetPolicy>),
    /// Invoked once per bike, in identity order, for bikes still idle at that point.
    PerBike(Box<dyn BikePolicy>),
}

impl DispatchStrategy {
    pub fn whole_fleet(policy: impl FleetPolicy + 'static) -> Self {
        Self::WholeFleet(Box::new(policy))
    }

    pub fn per_bike(policy: impl BikePolicy + 'static) -> Self {
        Self::PerBike(Box::new(policy))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::WholeFleet(policy) => policy.name(),
            Self::PerBike(policy) => policy.name(),
        }
    }

    pub fn dispatch(&self, ctx: &mut DispatchContext<'_>) {
        match self {
            Self::WholeFleet(policy) => policy.dispatch(ctx),
            Self::PerBike(policy) => {
                for idx in 0..ctx.fleet().bikes().len() {
                    let bike = BikeIdx::from_index(idx);
                    if ctx.bike(bike).is_idle() {
                        policy.decide(ctx, bike);
                    }
                }
            }
        }
    }
}

impl fmt::Debug for DispatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self {
            Self::WholeFleet(_) => "WholeFleet",
            Self::PerBike(_) => "PerBike",
        };
        f.debug_tuple(shape).field(&self.name()).finish()
    }
}

impl From<BaselinePolicy> for DispatchStrategy {
    fn from(policy: BaselinePolicy) -> Self {
        Self::per_bike(policy)
    }
}

impl From<HeuristicPolicy> for DispatchStrategy {
    fn from(policy: HeuristicPolicy) -> Self {
        Self::per_bike(policy)
    }
}

impl From<GlobalPolicy> for DispatchStrategy {
    fn from(policy: GlobalPolicy) -> Self {
        Self::whole_fleet(policy)
    }
}

/// Named policy with default tuning, used by experiment configs and CLIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Baseline,
    Heuristic,
    Global,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Baseline, PolicyKind::Heuristic, PolicyKind::Global];

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Baseline => "baseline",
            PolicyKind::Heuristic => "heuristic",
            PolicyKind::Global => "global",
        }
    }

    pub fn build(self) -> DispatchStrategy {
        match self {
            PolicyKind::Baseline => BaselinePolicy::default().into(),
            PolicyKind::Heuristic => HeuristicPolicy::default().into(),
            PolicyKind::Global => GlobalPolicy::default().into(),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baseline" => Ok(PolicyKind::Baseline),
            "heuristic" => Ok(PolicyKind::Heuristic),
            "global" => Ok(PolicyKind::Global),
            other => Err(format!("unknown policy: {other}")),
        }
    }
}

/// A policy's view of the engine for one tick: read-only queries plus the
/// travel commands.
pub struct DispatchContext<'a> {
    fleet: &'a mut Fleet,
    now: u64,
    weights: &'a CostWeights,
    config: &'a EngineConfig,
}

impl<'a> DispatchContext<'a> {
    pub fn new(
        fleet: &'a mut Fleet,
        now: u64,
        weights: &'a CostWeights,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            fleet,
            now,
            weights,
            config,
        }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn weights(&self) -> &CostWeights {
        self.weights
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    pub fn fleet(&self) -> &Fleet {
        self.fleet
    }

    pub fn bike(&self, idx: BikeIdx) -> &Bike {
        self.fleet.bike(idx)
    }

    pub fn order(&self, idx: OrderIdx) -> &Order {
        self.fleet.order(idx)
    }

    pub fn station(&self, idx: StationIdx) -> &Station {
        self.fleet.station(idx)
    }

    pub fn idle_bikes(&self) -> Vec<BikeIdx> {
        self.fleet.idle_bikes()
    }

    pub fn active_orders(&self) -> Vec<OrderIdx> {
        self.fleet.active_orders(self.now)
    }

    pub fn nearest_station(&self, bike: BikeIdx) -> Option<StationIdx> {
        self.fleet.nearest_station(bike)
    }

    pub fn nearest_station_to_order(&self, order: OrderIdx) -> Option<StationIdx> {
        self.fleet.nearest_station_to(self.fleet.order(order).position)
    }

    pub fn k_nearest_orders(&self, bike: BikeIdx, k: usize) -> Vec<OrderIdx> {
        self.fleet.k_nearest_orders(bike, k, self.now)
    }

    pub fn k_nearest_stations(&self, bike: BikeIdx, k: usize) -> Vec<StationIdx> {
        self.fleet.k_nearest_stations(bike, k)
    }

    pub fn best_station_for_bike(&self, bike: BikeIdx, alpha: f64) -> Option<StationIdx> {
        self.fleet
            .best_station_for_bike(bike, alpha, self.config.queue_chunk_min)
    }

    pub fn start_travel_to_order(&mut self, bike: BikeIdx, order: OrderIdx) {
        self.fleet.start_travel_to_order(bike, order);
    }

    pub fn start_travel_to_station(&mut self, bike: BikeIdx, station: StationIdx) {
        self.fleet.start_travel_to_station(bike, station);
    }

    pub fn set_charge_target(&mut self, bike: BikeIdx, target_soc: f64) {
        self.fleet.set_charge_target(bike, target_soc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Activity, Bike, Order, Station};
    use crate::spatial::Point;

    struct SendEveryoneToFirstOrder;

    impl FleetPolicy for SendEveryoneToFirstOrder {
        fn name(&self) -> &'static str {
            "first-order"
        }

        fn dispatch(&self, ctx: &mut DispatchContext<'_>) {
            for bike in ctx.idle_bikes() {
                if let Some(&order) = ctx.active_orders().first() {
                    ctx.start_travel_to_order(bike, order);
                }
            }
        }
    }

    struct CountingBikePolicy(std::sync::atomic::AtomicUsize);

    impl BikePolicy for CountingBikePolicy {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn decide(&self, ctx: &mut DispatchContext<'_>, bike: BikeIdx) {
            self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            if let Some(&order) = ctx.active_orders().first() {
                ctx.start_travel_to_order(bike, order);
            }
        }
    }

    fn two_bikes_one_order() -> Fleet {
        let bike = |id| Bike::new(id, Point::new(0.0, 0.0), 1.0, 450.0, 18.0, 18.0);
        Fleet::new(
            vec![bike(2), bike(1)],
            vec![Order::new(7, Point::new(1.0, 0.0), 0, 60)],
            vec![Station::new(1, Point::new(0.0, 0.0), 1, 250.0)],
        )
        .expect("valid fleet")
    }

    #[test]
    fn per_bike_strategy_skips_bikes_busied_earlier_in_the_tick() {
        let mut fleet = two_bikes_one_order();
        let weights = CostWeights::default();
        let config = EngineConfig::default();
        let policy = CountingBikePolicy(Default::default());
        let strategy = DispatchStrategy::per_bike(policy);

        let mut ctx = DispatchContext::new(&mut fleet, 0, &weights, &config);
        strategy.dispatch(&mut ctx);

        // Lowest id claims the only order; the other bike is asked and finds nothing.
        let first = fleet.bikes().lookup(1).expect("bike 1");
        let second = fleet.bikes().lookup(2).expect("bike 2");
        assert!(matches!(fleet.bike(first).activity, Activity::TravelingToOrder { .. }));
        assert!(fleet.bike(second).is_idle());
    }

    #[test]
    fn whole_fleet_strategy_is_called_once() {
        let mut fleet = two_bikes_one_order();
        let weights = CostWeights::default();
        let config = EngineConfig::default();
        let strategy = DispatchStrategy::whole_fleet(SendEveryoneToFirstOrder);
        assert_eq!(strategy.name(), "first-order");

        let mut ctx = DispatchContext::new(&mut fleet, 0, &weights, &config);
        strategy.dispatch(&mut ctx);
        assert_eq!(fleet.idle_bikes().len(), 1);
    }

    #[test]
    fn policy_kind_parses_and_builds() {
        for kind in PolicyKind::ALL {
            let parsed: PolicyKind = kind.as_str().parse().expect("round trip");
            assert_eq!(parsed, kind);
            assert_eq!(kind.build().name(), kind.as_str());
        }
        assert!("greedy".parse::<PolicyKind>().is_err());
        assert!(matches!(PolicyKind::Global.build(), DispatchStrategy::WholeFleet(_)));
        assert!(matches!(PolicyKind::Baseline.build(), DispatchStrategy::PerBike(_)));
    }
}
