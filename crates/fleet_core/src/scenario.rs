//! Scenario setup: seeded synthetic bikes, orders and stations in a square city.
//!
//! Bikes start fully charged at the depot in the city centre. Orders are
//! spread uniformly over the city and over the release window; each deadline
//! is the release time plus a depot travel-time proxy plus a random slack tier.
//! Stations sit on a fixed set of spread-out points.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{CostWeights, EngineConfig};
use crate::entities::{Bike, Order, Station, DEFAULT_SERVICE_MIN};
use crate::error::ValidationError;
use crate::runner::Simulation;
use crate::spatial::{travel_time_min, Point};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_DURATION_MIN: u64 = 600;

/// Station sites as fractions of the city side, used cyclically.
const STATION_SITES: [(f64, f64); 5] = [(0.2, 0.8), (0.8, 0.2), (0.5, 0.5), (0.1, 0.1), (0.9, 0.9)];

/// (cumulative probability, min slack, max slack) in minutes.
const SLACK_TIERS: [(f64, u64, u64); 3] = [(0.35, 5, 12), (0.80, 13, 25), (1.0, 26, 45)];

/// Named fleet sizes used in policy comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioPreset {
    Low,
    Medium,
    High,
}

impl ScenarioPreset {
    pub const ALL: [ScenarioPreset; 3] = [ScenarioPreset::Low, ScenarioPreset::Medium, ScenarioPreset::High];

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioPreset::Low => "low",
            ScenarioPreset::Medium => "medium",
            ScenarioPreset::High => "high",
        }
    }

    /// (bikes, orders, stations)
    pub fn sizes(self) -> (usize, usize, usize) {
        match self {
            ScenarioPreset::Low => (10, 60, 2),
            ScenarioPreset::Medium => (15, 120, 3),
            ScenarioPreset::High => (20, 200, 5),
        }
    }

    pub fn params(self) -> ScenarioParams {
        let (bikes, orders, stations) = self.sizes();
        ScenarioParams::default()
            .with_bikes(bikes)
            .with_orders(orders)
            .with_stations(stations)
    }
}

impl std::str::FromStr for ScenarioPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(ScenarioPreset::Low),
            "medium" => Ok(ScenarioPreset::Medium),
            "high" => Ok(ScenarioPreset::High),
            other => Err(format!("unknown scenario preset: {other}")),
        }
    }
}

/// Parameters for building a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    pub seed: u64,
    pub num_bikes: usize,
    pub num_orders: usize,
    pub num_stations: usize,
    /// Side of the square city (km).
    pub city_size_km: f64,
    /// Orders are released uniformly in [0, release_window_min].
    pub release_window_min: u64,
    pub battery_wh: f64,
    pub wh_per_km: f64,
    pub speed_kmph: f64,
    pub station_charge_rate_w: f64,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            num_bikes: 15,
            num_orders: 120,
            num_stations: 3,
            city_size_km: 5.0,
            release_window_min: 120,
            battery_wh: 450.0,
            wh_per_km: 18.0,
            speed_kmph: 18.0,
            station_charge_rate_w: 250.0,
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_bikes(mut self, n: usize) -> Self {
        self.num_bikes = n;
        self
    }

    pub fn with_orders(mut self, n: usize) -> Self {
        self.num_orders = n;
        self
    }

    pub fn with_stations(mut self, n: usize) -> Self {
        self.num_stations = n;
        self
    }

    pub fn with_city_size_km(mut self, km: f64) -> Self {
        self.city_size_km = km;
        self
    }

    pub fn with_release_window_min(mut self, minutes: u64) -> Self {
        self.release_window_min = minutes;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.city_size_km.is_finite() || self.city_size_km <= 0.0 {
            return Err(ValidationError::new(format!(
                "city_size_km must be positive, got {}",
                self.city_size_km
            )));
        }
        for (name, value) in [
            ("battery_wh", self.battery_wh),
            ("wh_per_km", self.wh_per_km),
            ("speed_kmph", self.speed_kmph),
            ("station_charge_rate_w", self.station_charge_rate_w),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::new(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    fn depot(&self) -> Point {
        Point::new(self.city_size_km / 2.0, self.city_size_km / 2.0)
    }
}

/// Entity sets for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub bikes: Vec<Bike>,
    pub orders: Vec<Order>,
    pub stations: Vec<Station>,
}

impl Scenario {
    pub fn into_simulation(
        self,
        weights: CostWeights,
        config: EngineConfig,
    ) -> Result<Simulation, ValidationError> {
        Simulation::new(self.bikes, self.orders, self.stations, weights, config)
    }
}

pub fn build_scenario(params: &ScenarioParams) -> Result<Scenario, ValidationError> {
    params.validate()?;
    let mut rng = StdRng::seed_from_u64(params.seed);
    Ok(Scenario {
        bikes: generate_bikes(params),
        orders: generate_orders(&mut rng, params),
        stations: generate_stations(params),
    })
}

fn generate_bikes(params: &ScenarioParams) -> Vec<Bike> {
    let depot = params.depot();
    (0..params.num_bikes as u32)
        .map(|id| {
            Bike::new(
                id,
                depot,
                1.0,
                params.battery_wh,
                params.wh_per_km,
                params.speed_kmph,
            )
        })
        .collect()
}

fn generate_orders<R: Rng>(rng: &mut R, params: &ScenarioParams) -> Vec<Order> {
    let depot = params.depot();
    let side = params.city_size_km;
    (0..params.num_orders as u32)
        .map(|id| {
            let position = Point::new(rng.gen_range(0.0..=side), rng.gen_range(0.0..=side));
            let release = rng.gen_range(0..=params.release_window_min);
            let proxy = u64::from(travel_time_min(depot.distance_km(position), params.speed_kmph));
            let deadline = release + proxy + random_slack(rng);
            Order::new(id, position, release, deadline).with_service_min(DEFAULT_SERVICE_MIN)
        })
        .collect()
}

fn random_slack<R: Rng>(rng: &mut R) -> u64 {
    let draw: f64 = rng.gen();
    let (_, lo, hi) = SLACK_TIERS
        .iter()
        .copied()
        .find(|(upper, _, _)| draw < *upper)
        .unwrap_or(SLACK_TIERS[SLACK_TIERS.len() - 1]);
    rng.gen_range(lo..=hi)
}

fn generate_stations(params: &ScenarioParams) -> Vec<Station> {
    let n = params.num_stations;
    let ports = if n <= 2 { 1 } else { 2 };
    (0..n)
        .map(|i| {
            let (fx, fy) = STATION_SITES[i % STATION_SITES.len()];
            let position = Point::new(fx * params.city_size_km, fy * params.city_size_km);
            Station::new(i as u32, position, ports, params.station_charge_rate_w)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_scenario() {
        let params = ScenarioPreset::Medium.params().with_seed(7);
        let a = build_scenario(&params).expect("scenario");
        let b = build_scenario(&params).expect("scenario");
        assert_eq!(a, b);
        let c = build_scenario(&params.clone().with_seed(8)).expect("scenario");
        assert_ne!(a.orders, c.orders);
    }

    #[test]
    fn presets_size_the_fleet() {
        let scenario = build_scenario(&ScenarioPreset::Low.params()).expect("scenario");
        assert_eq!(scenario.bikes.len(), 10);
        assert_eq!(scenario.orders.len(), 60);
        assert_eq!(scenario.stations.len(), 2);
        assert!(scenario.stations.iter().all(|s| s.ports == 1));

        let high = build_scenario(&ScenarioPreset::High.params()).expect("scenario");
        assert!(high.stations.iter().all(|s| s.ports == 2));
        assert_eq!(high.stations[2].position, Point::new(2.5, 2.5));
    }

    #[test]
    fn orders_stay_in_city_and_window() {
        let params = ScenarioParams::default();
        let scenario = build_scenario(&params).expect("scenario");
        for order in &scenario.orders {
            assert!((0.0..=5.0).contains(&order.position.x));
            assert!((0.0..=5.0).contains(&order.position.y));
            assert!(order.release_time <= 120);
            // At least one minute of travel proxy plus five of slack.
            assert!(order.deadline >= order.release_time + 6);
            assert!(order.deadline <= order.release_time + 45 + 12);
            assert_eq!(order.service_min, 2);
        }
        for bike in &scenario.bikes {
            assert_eq!(bike.position, Point::new(2.5, 2.5));
            assert_eq!(bike.soc, 1.0);
        }
    }

    #[test]
    fn rejects_degenerate_city() {
        let params = ScenarioParams::default().with_city_size_km(0.0);
        assert!(build_scenario(&params).is_err());
    }

    #[test]
    fn preset_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<ScenarioPreset>(), Ok(ScenarioPreset::High));
        assert!("extreme".parse::<ScenarioPreset>().is_err());
    }
}
