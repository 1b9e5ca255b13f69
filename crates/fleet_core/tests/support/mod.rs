#![allow(dead_code)]

use fleet_core::config::{CostWeights, EngineConfig};
use fleet_core::entities::{Bike, BikeStatus, Order};
use fleet_core::policy::{DispatchContext, DispatchStrategy, FleetPolicy};
use fleet_core::runner::Simulation;
use fleet_core::scenario::{build_scenario, ScenarioParams};

pub use fleet_core::test_helpers::{test_bike, test_order, test_simulation, test_station};

pub fn bike<'a>(sim: &'a Simulation, id: u32) -> &'a Bike {
    sim.fleet().bikes().get(id).expect("bike id should exist")
}

pub fn order<'a>(sim: &'a Simulation, id: u32) -> &'a Order {
    sim.fleet().orders().get(id).expect("order id should exist")
}

/// Step once and fail the test if any structural invariant broke.
pub fn step_checked(sim: &mut Simulation, strategy: &DispatchStrategy) {
    sim.step(strategy);
    let violations = sim.fleet().invariant_violations();
    assert!(
        violations.is_empty(),
        "invariants broken at t={}: {violations:?}",
        sim.now()
    );
}

/// Status of `bike_id` in every recorded trace frame.
pub fn status_history(sim: &Simulation, bike_id: u32) -> Vec<BikeStatus> {
    sim.trace()
        .frames
        .iter()
        .map(|frame| {
            frame
                .bikes
                .iter()
                .find(|b| b.id == bike_id)
                .map(|b| b.status)
                .expect("bike should be in every frame")
        })
        .collect()
}

/// Collapse consecutive repeats.
pub fn transitions(history: &[BikeStatus]) -> Vec<BikeStatus> {
    let mut out: Vec<BikeStatus> = Vec::new();
    for &status in history {
        if out.last() != Some(&status) {
            out.push(status);
        }
    }
    out
}

/// Simulation over a seeded synthetic scenario.
pub fn seeded_simulation(params: &ScenarioParams) -> Simulation {
    build_scenario(params)
        .expect("scenario params should be valid")
        .into_simulation(CostWeights::default(), EngineConfig::default())
        .expect("generated scenario should be valid")
}

/// Sends every idle bike to the station with id `station_id` at t = 0, then idles.
pub struct ChargeAllAtStart {
    pub station_id: u32,
    pub target_soc: Option<f64>,
}

impl FleetPolicy for ChargeAllAtStart {
    fn name(&self) -> &'static str {
        "charge-all-at-start"
    }

    fn dispatch(&self, ctx: &mut DispatchContext<'_>) {
        if ctx.now() != 0 {
            return;
        }
        let station = ctx
            .fleet()
            .stations()
            .lookup(self.station_id)
            .expect("station id should exist");
        for bike in ctx.idle_bikes() {
            if let Some(target) = self.target_soc {
                ctx.set_charge_target(bike, target);
            }
            ctx.start_travel_to_station(bike, station);
        }
    }
}
