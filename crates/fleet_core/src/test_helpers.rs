//! Test helpers for common fleet setup.
//!
//! Entities built here use the standard e-bike physics (450 Wh battery,
//! 18 Wh/km, 18 km/h) so travel and energy numbers are easy to compute by hand:
//! one kilometre takes four minutes and 4 % SOC.

use crate::config::{CostWeights, EngineConfig};
use crate::entities::{Bike, Order, Station};
use crate::runner::Simulation;
use crate::spatial::Point;

pub const TEST_BATTERY_WH: f64 = 450.0;
pub const TEST_WH_PER_KM: f64 = 18.0;
pub const TEST_SPEED_KMPH: f64 = 18.0;
pub const TEST_CHARGE_RATE_W: f64 = 250.0;

/// A bike with standard physics at `(x, y)`.
pub fn test_bike(id: u32, x: f64, y: f64, soc: f64) -> Bike {
    Bike::new(
        id,
        Point::new(x, y),
        soc,
        TEST_BATTERY_WH,
        TEST_WH_PER_KM,
        TEST_SPEED_KMPH,
    )
}

/// An order at `(x, y)` with the default two-minute service time.
pub fn test_order(id: u32, x: f64, y: f64, release_time: u64, deadline: u64) -> Order {
    Order::new(id, Point::new(x, y), release_time, deadline)
}

pub fn test_station(id: u32, x: f64, y: f64, ports: usize) -> Station {
    Station::new(id, Point::new(x, y), ports, TEST_CHARGE_RATE_W)
}

/// A simulation with default weights and engine config.
///
/// # Panics
///
/// Panics if the entity sets contain duplicate ids.
pub fn test_simulation(bikes: Vec<Bike>, orders: Vec<Order>, stations: Vec<Station>) -> Simulation {
    Simulation::new(
        bikes,
        orders,
        stations,
        CostWeights::default(),
        EngineConfig::default(),
    )
    .expect("test entities should have unique ids")
}
