//! Fleet entities: bikes, orders and charging stations.
//!
//! A bike's engagement is a single [`Activity`] value carrying its target and
//! countdown inline, so "status requires a target" cannot drift out of sync.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::arena::{BikeIdx, Identified, OrderIdx, StationIdx};
use crate::spatial::{energy_fraction, travel_time_min, Leg, Point};

/// Default service time at the customer's door (minutes).
pub const DEFAULT_SERVICE_MIN: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BikeStatus {
    Idle,
    TravelingToOrder,
    Delivering,
    TravelingToStation,
    Charging,
    WaitingCharge,
}

impl BikeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BikeStatus::Idle => "idle",
            BikeStatus::TravelingToOrder => "traveling_to_order",
            BikeStatus::Delivering => "delivering",
            BikeStatus::TravelingToStation => "traveling_to_station",
            BikeStatus::Charging => "charging",
            BikeStatus::WaitingCharge => "waiting_charge",
        }
    }
}

/// What a bike is doing right now, with the entity it is engaged with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity {
    Idle,
    TravelingToOrder {
        order: OrderIdx,
        remaining_min: u32,
    },
    Delivering {
        order: OrderIdx,
        remaining_min: u32,
    },
    TravelingToStation {
        station: StationIdx,
        remaining_min: u32,
    },
    Charging {
        station: StationIdx,
        remaining_min: u32,
        target_soc: f64,
    },
    WaitingCharge {
        station: StationIdx,
    },
}

impl Activity {
    pub fn status(&self) -> BikeStatus {
        match self {
            Activity::Idle => BikeStatus::Idle,
            Activity::TravelingToOrder { .. } => BikeStatus::TravelingToOrder,
            Activity::Delivering { .. } => BikeStatus::Delivering,
            Activity::TravelingToStation { .. } => BikeStatus::TravelingToStation,
            Activity::Charging { .. } => BikeStatus::Charging,
            Activity::WaitingCharge { .. } => BikeStatus::WaitingCharge,
        }
    }

    pub fn target_order(&self) -> Option<OrderIdx> {
        match *self {
            Activity::TravelingToOrder { order, .. } | Activity::Delivering { order, .. } => {
                Some(order)
            }
            _ => None,
        }
    }

    pub fn target_station(&self) -> Option<StationIdx> {
        match *self {
            Activity::TravelingToStation { station, .. }
            | Activity::Charging { station, .. }
            | Activity::WaitingCharge { station } => Some(station),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bike {
    pub id: u32,
    pub position: Point,
    /// State of charge, always within [0, 1].
    pub soc: f64,
    pub battery_wh: f64,
    pub wh_per_km: f64,
    pub speed_kmph: f64,
    /// Target requested by a policy for the next charging session.
    pub charge_target: Option<f64>,
    pub activity: Activity,
    pub downtime_min: u64,
    pub delivered_count: u32,
}

impl Bike {
    pub fn new(
        id: u32,
        position: Point,
        soc: f64,
        battery_wh: f64,
        wh_per_km: f64,
        speed_kmph: f64,
    ) -> Self {
        Self {
            id,
            position,
            soc: soc.clamp(0.0, 1.0),
            battery_wh,
            wh_per_km,
            speed_kmph,
            charge_target: None,
            activity: Activity::Idle,
            downtime_min: 0,
            delivered_count: 0,
        }
    }

    pub fn status(&self) -> BikeStatus {
        self.activity.status()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.activity, Activity::Idle)
    }

    /// Travel time and energy for this bike to reach `to` from where it stands.
    pub fn leg_to(&self, to: Point) -> Leg {
        self.leg_between(self.position, to)
    }

    /// Travel time and energy for this bike on an arbitrary segment.
    pub fn leg_between(&self, from: Point, to: Point) -> Leg {
        let distance_km = from.distance_km(to);
        Leg {
            distance_km,
            travel_min: travel_time_min(distance_km, self.speed_kmph),
            soc_cost: energy_fraction(distance_km, self.wh_per_km, self.battery_wh),
        }
    }
}

impl Identified for Bike {
    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u32,
    pub position: Point,
    pub release_time: u64,
    pub deadline: u64,
    pub service_min: u32,
    pub delivered: bool,
    pub completion_time: Option<u64>,
    pub assigned_to: Option<BikeIdx>,
    pub delivered_by: Option<BikeIdx>,
}

impl Order {
    pub fn new(id: u32, position: Point, release_time: u64, deadline: u64) -> Self {
        Self {
            id,
            position,
            release_time,
            deadline,
            service_min: DEFAULT_SERVICE_MIN,
            delivered: false,
            completion_time: None,
            assigned_to: None,
            delivered_by: None,
        }
    }

    pub fn with_service_min(mut self, service_min: u32) -> Self {
        self.service_min = service_min;
        self
    }

    /// Released, undelivered and not claimed by any bike at time `now`.
    pub fn is_active(&self, now: u64) -> bool {
        !self.delivered && self.assigned_to.is_none() && self.release_time <= now
    }

    pub fn is_late(&self) -> bool {
        self.completion_time
            .is_some_and(|completed| completed > self.deadline)
    }
}

impl Identified for Order {
    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: u32,
    pub position: Point,
    pub ports: usize,
    pub charge_rate_w: f64,
    pub charging: Vec<BikeIdx>,
    pub queue: VecDeque<BikeIdx>,
}

impl Station {
    pub fn new(id: u32, position: Point, ports: usize, charge_rate_w: f64) -> Self {
        Self {
            id,
            position,
            ports,
            charge_rate_w,
            charging: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn has_free_port(&self) -> bool {
        self.charging.len() < self.ports
    }

    /// Port count used as a divisor in wait estimates.
    pub fn effective_ports(&self) -> usize {
        self.ports.max(1)
    }
}

impl Identified for Station {
    fn id(&self) -> u32 {
        self.id
    }
}
