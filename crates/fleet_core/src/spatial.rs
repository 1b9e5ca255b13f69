//! Planar geometry for the city model.
//!
//! Positions are kilometres on a flat plane and every leg is a straight line,
//! so distance, travel time and energy use are pure functions of two points
//! and a bike's physical parameters.

use serde::{Deserialize, Serialize};

/// Travel time reported when a bike cannot move (non-positive speed).
pub const UNREACHABLE_TRAVEL_MIN: u32 = 1_000_000_000;

/// Floor applied to divisors (battery capacity, charge rate).
pub const DIVISOR_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_km(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Squared distance; cheaper when only the ordering matters.
    pub fn distance_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// One straight-line trip of a specific bike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub distance_km: f64,
    pub travel_min: u32,
    /// SOC consumed by the trip.
    pub soc_cost: f64,
}

/// Whole minutes needed to cover `distance_km` at `speed_kmph`, never less than one.
pub fn travel_time_min(distance_km: f64, speed_kmph: f64) -> u32 {
    if speed_kmph <= 0.0 {
        return UNREACHABLE_TRAVEL_MIN;
    }
    let minutes = (distance_km / speed_kmph * 60.0).ceil();
    if minutes >= UNREACHABLE_TRAVEL_MIN as f64 {
        return UNREACHABLE_TRAVEL_MIN;
    }
    (minutes as u32).max(1)
}

/// Fraction of a full battery spent driving `distance_km`.
pub fn energy_fraction(distance_km: f64, wh_per_km: f64, battery_wh: f64) -> f64 {
    distance_km * wh_per_km / battery_wh.max(DIVISOR_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_km_at_eighteen_kmph_takes_four_minutes() {
        let a = Point::new(2.5, 2.5);
        let b = Point::new(2.5, 3.5);
        assert_eq!(travel_time_min(a.distance_km(b), 18.0), 4);
    }

    #[test]
    fn zero_distance_still_costs_a_minute() {
        assert_eq!(travel_time_min(0.0, 18.0), 1);
    }

    #[test]
    fn stalled_bike_gets_sentinel_travel_time() {
        assert_eq!(travel_time_min(1.0, 0.0), UNREACHABLE_TRAVEL_MIN);
        assert_eq!(travel_time_min(1.0, -5.0), UNREACHABLE_TRAVEL_MIN);
    }

    #[test]
    fn energy_fraction_floors_empty_battery() {
        let fraction = energy_fraction(1.0, 18.0, 450.0);
        assert!((fraction - 0.04).abs() < 1e-12);
        assert!(energy_fraction(1.0, 18.0, 0.0).is_finite());
    }
}
