//! Fleet state and its mechanics.
//!
//! [`Fleet`] owns every bike, order and station for one run. Systems call the
//! tick mechanics (`advance_activities`, `promote_queued`); policies go through
//! [`crate::policy::DispatchContext`], which exposes the queries and the two
//! travel commands defined here.

use bevy_ecs::prelude::Resource;
use log::{debug, trace};

use crate::arena::{Arena, ArenaIndex, BikeIdx, OrderIdx, StationIdx};
use crate::clock::DT_MIN;
use crate::config::EngineConfig;
use crate::entities::{Activity, Bike, Order, Station};
use crate::error::ValidationError;
use crate::spatial::{Point, DIVISOR_EPSILON, UNREACHABLE_TRAVEL_MIN};

const TICK_MIN: u32 = DT_MIN as u32;

#[derive(Debug, Clone, Resource)]
pub struct Fleet {
    bikes: Arena<Bike, BikeIdx>,
    orders: Arena<Order, OrderIdx>,
    stations: Arena<Station, StationIdx>,
}

impl Fleet {
    pub fn new(
        bikes: Vec<Bike>,
        orders: Vec<Order>,
        stations: Vec<Station>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            bikes: Arena::new("bike", bikes)?,
            orders: Arena::new("order", orders)?,
            stations: Arena::new("station", stations)?,
        })
    }

    pub fn bikes(&self) -> &Arena<Bike, BikeIdx> {
        &self.bikes
    }

    pub fn orders(&self) -> &Arena<Order, OrderIdx> {
        &self.orders
    }

    pub fn stations(&self) -> &Arena<Station, StationIdx> {
        &self.stations
    }

    pub fn bike(&self, idx: BikeIdx) -> &Bike {
        &self.bikes[idx]
    }

    pub fn order(&self, idx: OrderIdx) -> &Order {
        &self.orders[idx]
    }

    pub fn station(&self, idx: StationIdx) -> &Station {
        &self.stations[idx]
    }

    // ----- tick mechanics -----

    /// Advance every bike by one tick. Returns the number of orders delivered.
    pub fn advance_activities(&mut self, now: u64, config: &EngineConfig) -> usize {
        let mut delivered = 0;
        for idx in 0..self.bikes.len() {
            let idx = BikeIdx::from_index(idx);
            if self.advance_bike(idx, now, config) {
                delivered += 1;
            }
        }
        delivered
    }

    fn advance_bike(&mut self, idx: BikeIdx, now: u64, config: &EngineConfig) -> bool {
        let activity = self.bikes[idx].activity;
        match activity {
            Activity::Idle => false,
            Activity::TravelingToOrder {
                order,
                remaining_min,
            } => {
                let remaining_min = remaining_min.saturating_sub(TICK_MIN);
                let bike = &mut self.bikes[idx];
                if remaining_min == 0 {
                    let target = &self.orders[order];
                    bike.position = target.position;
                    bike.activity = Activity::Delivering {
                        order,
                        remaining_min: target.service_min,
                    };
                } else {
                    bike.activity = Activity::TravelingToOrder {
                        order,
                        remaining_min,
                    };
                }
                false
            }
            Activity::Delivering {
                order,
                remaining_min,
            } => {
                let remaining_min = remaining_min.saturating_sub(TICK_MIN);
                let bike = &mut self.bikes[idx];
                if remaining_min > 0 {
                    bike.activity = Activity::Delivering {
                        order,
                        remaining_min,
                    };
                    return false;
                }
                bike.activity = Activity::Idle;
                bike.delivered_count += 1;
                let target = &mut self.orders[order];
                target.delivered = true;
                target.completion_time = Some(now);
                target.delivered_by = Some(idx);
                target.assigned_to = None;
                debug!(
                    "t={now} bike {} delivered order {} (deadline {})",
                    bike.id, target.id, target.deadline
                );
                true
            }
            Activity::TravelingToStation {
                station,
                remaining_min,
            } => {
                let remaining_min = remaining_min.saturating_sub(TICK_MIN);
                if remaining_min == 0 {
                    self.bikes[idx].position = self.stations[station].position;
                    self.arrive_at_station(idx, station, config);
                } else {
                    self.bikes[idx].activity = Activity::TravelingToStation {
                        station,
                        remaining_min,
                    };
                }
                false
            }
            Activity::Charging {
                station,
                remaining_min,
                target_soc,
            } => {
                let rate_w = self.stations[station].charge_rate_w.max(DIVISOR_EPSILON);
                let bike = &mut self.bikes[idx];
                bike.downtime_min += DT_MIN;
                let soc_per_min = rate_w / bike.battery_wh.max(DIVISOR_EPSILON) / 60.0;
                bike.soc = (bike.soc + soc_per_min * DT_MIN as f64).clamp(0.0, 1.0);
                let remaining_min = remaining_min.saturating_sub(TICK_MIN);
                if bike.soc >= target_soc || remaining_min == 0 {
                    bike.activity = Activity::Idle;
                    bike.charge_target = None;
                    trace!("t={now} bike {} left charging at soc {:.3}", bike.id, bike.soc);
                    self.release_port(idx, station);
                } else {
                    bike.activity = Activity::Charging {
                        station,
                        remaining_min,
                        target_soc,
                    };
                }
                false
            }
            Activity::WaitingCharge { .. } => {
                self.bikes[idx].downtime_min += DT_MIN;
                false
            }
        }
    }

    fn release_port(&mut self, bike: BikeIdx, station: StationIdx) {
        let slot = self.stations[station]
            .charging
            .iter()
            .position(|&b| b == bike);
        let Some(slot) = slot else {
            panic!(
                "bike {} finished charging at station {} without holding a port",
                self.bikes[bike].id, self.stations[station].id
            );
        };
        self.stations[station].charging.remove(slot);
    }

    /// Move queued bikes onto ports freed during this tick.
    pub fn promote_queued(&mut self, config: &EngineConfig) {
        for s in 0..self.stations.len() {
            let station = StationIdx::from_index(s);
            while self.stations[station].has_free_port() {
                let Some(bike) = self.stations[station].queue.pop_front() else {
                    break;
                };
                self.stations[station].charging.push(bike);
                self.begin_charging(bike, station, config);
            }
        }
    }

    fn arrive_at_station(&mut self, bike: BikeIdx, station: StationIdx, config: &EngineConfig) {
        let stop = &mut self.stations[station];
        if stop.has_free_port() {
            stop.charging.push(bike);
            self.begin_charging(bike, station, config);
        } else {
            stop.queue.push_back(bike);
            self.bikes[bike].activity = Activity::WaitingCharge { station };
        }
    }

    fn begin_charging(&mut self, idx: BikeIdx, station: StationIdx, config: &EngineConfig) {
        let rate_w = self.stations[station].charge_rate_w.max(DIVISOR_EPSILON);
        let bike = &mut self.bikes[idx];
        let requested = bike
            .charge_target
            .filter(|target| *target > 0.0)
            .unwrap_or(config.default_charge_target_soc);
        let target_soc = requested.min(1.0).max(bike.soc);
        let needed_wh = (target_soc - bike.soc) * bike.battery_wh;
        let minutes = (needed_wh / rate_w * 60.0).ceil();
        let remaining_min = if minutes >= UNREACHABLE_TRAVEL_MIN as f64 {
            UNREACHABLE_TRAVEL_MIN
        } else {
            (minutes as u32).max(1)
        };
        bike.activity = Activity::Charging {
            station,
            remaining_min,
            target_soc,
        };
    }

    // ----- commands -----

    /// Send an idle bike to `order`. SOC is debited up front, clamped at zero.
    ///
    /// # Panics
    ///
    /// Panics if the bike is not idle or the order is delivered or already claimed.
    pub fn start_travel_to_order(&mut self, idx: BikeIdx, order: OrderIdx) {
        let target = &mut self.orders[order];
        assert!(
            !target.delivered && target.assigned_to.is_none(),
            "order {} is not available for assignment",
            target.id
        );
        let bike = &mut self.bikes[idx];
        assert!(bike.is_idle(), "bike {} dispatched while {:?}", bike.id, bike.status());
        let leg = bike.leg_to(target.position);
        bike.soc = (bike.soc - leg.soc_cost).max(0.0);
        bike.activity = Activity::TravelingToOrder {
            order,
            remaining_min: leg.travel_min,
        };
        target.assigned_to = Some(idx);
        debug!(
            "bike {} -> order {} ({:.2} km, {} min, soc {:.3})",
            bike.id, target.id, leg.distance_km, leg.travel_min, bike.soc
        );
    }

    /// Send an idle bike to charge at `station`.
    ///
    /// # Panics
    ///
    /// Panics if the bike is not idle.
    pub fn start_travel_to_station(&mut self, idx: BikeIdx, station: StationIdx) {
        let stop = &self.stations[station];
        let bike = &mut self.bikes[idx];
        assert!(bike.is_idle(), "bike {} dispatched while {:?}", bike.id, bike.status());
        let leg = bike.leg_to(stop.position);
        bike.soc = (bike.soc - leg.soc_cost).max(0.0);
        bike.activity = Activity::TravelingToStation {
            station,
            remaining_min: leg.travel_min,
        };
        debug!(
            "bike {} -> station {} ({:.2} km, {} min, soc {:.3}, target {:?})",
            bike.id, stop.id, leg.distance_km, leg.travel_min, bike.soc, bike.charge_target
        );
    }

    /// Request the SOC the bike's next charging session should reach.
    pub fn set_charge_target(&mut self, idx: BikeIdx, target_soc: f64) {
        self.bikes[idx].charge_target = Some(target_soc.clamp(0.0, 1.0));
    }

    // ----- queries -----

    pub fn idle_bikes(&self) -> Vec<BikeIdx> {
        self.bikes
            .iter()
            .filter(|(_, bike)| bike.is_idle())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Orders that are released, undelivered and unclaimed at `now`.
    pub fn active_orders(&self, now: u64) -> Vec<OrderIdx> {
        self.orders
            .iter()
            .filter(|(_, order)| order.is_active(now))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn nearest_station_to(&self, point: Point) -> Option<StationIdx> {
        let mut best: Option<(StationIdx, f64)> = None;
        for (idx, station) in self.stations.iter() {
            let distance = point.distance_km(station.position);
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((idx, distance));
            }
        }
        best.map(|(idx, _)| idx)
    }

    pub fn nearest_station(&self, bike: BikeIdx) -> Option<StationIdx> {
        self.nearest_station_to(self.bikes[bike].position)
    }

    /// The `k` active orders closest to the bike; ties keep identity order.
    pub fn k_nearest_orders(&self, bike: BikeIdx, k: usize, now: u64) -> Vec<OrderIdx> {
        let origin = self.bikes[bike].position;
        let mut ranked: Vec<(OrderIdx, f64)> = self
            .active_orders(now)
            .into_iter()
            .map(|idx| (idx, origin.distance_km(self.orders[idx].position)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.into_iter().take(k).map(|(idx, _)| idx).collect()
    }

    /// The `k` stations closest to the bike; ties keep identity order.
    pub fn k_nearest_stations(&self, bike: BikeIdx, k: usize) -> Vec<StationIdx> {
        let origin = self.bikes[bike].position;
        let mut ranked: Vec<(StationIdx, f64)> = self
            .stations
            .iter()
            .map(|(idx, station)| (idx, origin.distance_km(station.position)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.into_iter().take(k).map(|(idx, _)| idx).collect()
    }

    /// Minutes a newly arriving bike would wait for a port, counting only the
    /// queue beyond one full round of ports.
    pub fn estimated_queue_wait(&self, station: StationIdx, chunk_min: f64) -> f64 {
        let stop = &self.stations[station];
        let ports = stop.effective_ports();
        let beyond = stop.queue.len().saturating_sub(stop.ports);
        (beyond as f64 / ports as f64 * chunk_min).ceil()
    }

    /// Station minimising `travel_min + alpha * estimated_queue_wait`.
    pub fn best_station_for_bike(
        &self,
        bike: BikeIdx,
        alpha: f64,
        chunk_min: f64,
    ) -> Option<StationIdx> {
        let courier = &self.bikes[bike];
        let mut best: Option<(StationIdx, f64)> = None;
        for (idx, station) in self.stations.iter() {
            let travel = courier.leg_to(station.position).travel_min as f64;
            let score = travel + alpha * self.estimated_queue_wait(idx, chunk_min);
            if best.map_or(true, |(_, best_score)| score < best_score) {
                best = Some((idx, score));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Describe every broken structural invariant; empty when the state is consistent.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let mut claimed = vec![0usize; self.orders.len()];
        let mut seats = vec![0usize; self.bikes.len()];

        for (idx, bike) in self.bikes.iter() {
            if !(0.0..=1.0).contains(&bike.soc) {
                violations.push(format!("bike {} soc {} outside [0, 1]", bike.id, bike.soc));
            }
            if let Some(order) = bike.activity.target_order() {
                claimed[order.index()] += 1;
                if self.orders[order].assigned_to != Some(idx) {
                    violations.push(format!(
                        "bike {} targets order {} assigned to {:?}",
                        bike.id, self.orders[order].id, self.orders[order].assigned_to
                    ));
                }
            }
        }
        for (idx, order) in self.orders.iter() {
            let count = claimed[idx.index()];
            if order.assigned_to.is_some() != (count == 1) || count > 1 {
                violations.push(format!(
                    "order {} assigned_to {:?} but targeted by {count} bikes",
                    order.id, order.assigned_to
                ));
            }
            if order.delivered && order.completion_time.is_none() {
                violations.push(format!("order {} delivered without completion time", order.id));
            }
        }
        for (idx, station) in self.stations.iter() {
            if station.charging.len() > station.ports {
                violations.push(format!(
                    "station {} charging {} bikes on {} ports",
                    station.id,
                    station.charging.len(),
                    station.ports
                ));
            }
            for &bike in &station.charging {
                seats[bike.index()] += 1;
                if !matches!(self.bikes[bike].activity, Activity::Charging { station: s, .. } if s == idx)
                {
                    violations.push(format!(
                        "bike {} holds a port at station {} while {:?}",
                        self.bikes[bike].id,
                        station.id,
                        self.bikes[bike].status()
                    ));
                }
            }
            for &bike in &station.queue {
                seats[bike.index()] += 1;
                if !matches!(self.bikes[bike].activity, Activity::WaitingCharge { station: s } if s == idx)
                {
                    violations.push(format!(
                        "bike {} queued at station {} while {:?}",
                        self.bikes[bike].id,
                        station.id,
                        self.bikes[bike].status()
                    ));
                }
            }
        }
        for (idx, bike) in self.bikes.iter() {
            if seats[idx.index()] > 1 {
                violations.push(format!("bike {} appears at several stations", bike.id));
            }
        }
        violations
    }
}
