//! Simulation runner: owns the ECS world and drives the fixed-step tick.
//!
//! One tick is: advance activities, promote queued bikes (pre-dispatch
//! schedule), invoke the dispatch strategy on the [`Fleet`] resource outside
//! any system, then advance the clock and record a trace frame
//! (post-dispatch schedule).

use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::{ExecutorKind, IntoSystemConfigs};
use log::{info, trace};

use crate::clock::SimulationClock;
use crate::config::{CostWeights, EngineConfig};
use crate::entities::{Bike, Order, Station};
use crate::error::ValidationError;
use crate::fleet::Fleet;
use crate::metrics::FleetMetrics;
use crate::policy::{DispatchContext, DispatchStrategy};
use crate::systems::{
    advance_activities::advance_activities_system,
    advance_clock::advance_clock_system,
    station_queue::promote_queued_system,
    telemetry_snapshot::{capture_snapshot_system, should_capture_snapshot},
};
use crate::telemetry::{order_outcomes, OrderOutcome, SimTrace};

/// Activity advancement followed by queue promotion.
pub fn pre_dispatch_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems((advance_activities_system, promote_queued_system).chain());
    schedule
}

/// Clock advancement followed by the (optional) trace snapshot.
pub fn post_dispatch_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            advance_clock_system,
            capture_snapshot_system.run_if(should_capture_snapshot),
        )
            .chain(),
    );
    schedule
}

/// Invoke `strategy` against the fleet at the current clock time.
pub fn run_dispatch(world: &mut World, strategy: &DispatchStrategy) {
    let now = world.resource::<SimulationClock>().now();
    let weights = *world.resource::<CostWeights>();
    let config = *world.resource::<EngineConfig>();
    let mut fleet = world.resource_mut::<Fleet>();
    let mut ctx = DispatchContext::new(&mut fleet, now, &weights, &config);
    strategy.dispatch(&mut ctx);
}

/// One isolated simulation run.
pub struct Simulation {
    world: World,
    pre_dispatch: Schedule,
    post_dispatch: Schedule,
}

impl Simulation {
    pub fn new(
        bikes: Vec<Bike>,
        orders: Vec<Order>,
        stations: Vec<Station>,
        weights: CostWeights,
        config: EngineConfig,
    ) -> Result<Self, ValidationError> {
        weights.validate()?;
        config.validate()?;
        let fleet = Fleet::new(bikes, orders, stations)?;

        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(weights);
        world.insert_resource(config);
        world.insert_resource(fleet);
        world.insert_resource(SimTrace::default());

        Ok(Self {
            world,
            pre_dispatch: pre_dispatch_schedule(),
            post_dispatch: post_dispatch_schedule(),
        })
    }

    /// Advance exactly one tick.
    pub fn step(&mut self, strategy: &DispatchStrategy) {
        self.pre_dispatch.run(&mut self.world);
        run_dispatch(&mut self.world, strategy);
        self.post_dispatch.run(&mut self.world);

        debug_assert!(
            self.fleet().invariant_violations().is_empty(),
            "fleet invariants broken at t={}: {:?}",
            self.now(),
            self.fleet().invariant_violations()
        );
        trace!(
            "t={} idle={} active_orders={}",
            self.now(),
            self.fleet().idle_bikes().len(),
            self.active_orders_count()
        );
    }

    /// Step until the clock reaches `duration_min`.
    pub fn run(&mut self, duration_min: u64, strategy: &DispatchStrategy) {
        info!(
            "running {} for {duration_min} min ({} bikes, {} orders, {} stations)",
            strategy.name(),
            self.fleet().bikes().len(),
            self.fleet().orders().len(),
            self.fleet().stations().len()
        );
        while self.now() < duration_min {
            self.step(strategy);
        }
        let metrics = self.metrics();
        info!(
            "{} finished at t={}: {}/{} delivered, {} late",
            strategy.name(),
            metrics.time_min,
            metrics.orders_delivered,
            metrics.orders_total,
            metrics.late_deliveries
        );
    }

    pub fn now(&self) -> u64 {
        self.world.resource::<SimulationClock>().now()
    }

    pub fn fleet(&self) -> &Fleet {
        self.world.resource::<Fleet>()
    }

    pub fn weights(&self) -> &CostWeights {
        self.world.resource::<CostWeights>()
    }

    pub fn config(&self) -> &EngineConfig {
        self.world.resource::<EngineConfig>()
    }

    pub fn metrics(&self) -> FleetMetrics {
        FleetMetrics::derive(self.now(), self.fleet())
    }

    pub fn trace(&self) -> &SimTrace {
        self.world.resource::<SimTrace>()
    }

    pub fn order_outcomes(&self) -> Vec<OrderOutcome> {
        order_outcomes(self.fleet())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    fn active_orders_count(&self) -> usize {
        self.fleet().active_orders(self.now()).len()
    }
}
