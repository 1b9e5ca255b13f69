//! Trace and order outcomes: read-only views over fleet state for export and
//! visualization.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::entities::BikeStatus;
use crate::fleet::Fleet;

/// Snapshot of one bike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BikeSnapshot {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub soc: f64,
    pub status: BikeStatus,
    pub target_order_id: Option<u32>,
    pub target_station_id: Option<u32>,
}

/// Snapshot of one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub delivered: bool,
    pub assigned_to: Option<u32>,
    pub deadline: u64,
}

/// Snapshot of one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSnapshot {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub queue_len: usize,
    pub charging_count: usize,
    pub ports: usize,
}

/// Fleet state at the end of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub time_min: u64,
    pub bikes: Vec<BikeSnapshot>,
    pub orders: Vec<OrderSnapshot>,
    pub stations: Vec<StationSnapshot>,
}

impl TraceFrame {
    pub fn capture(time_min: u64, fleet: &Fleet) -> Self {
        let bikes = fleet
            .bikes()
            .values()
            .map(|bike| BikeSnapshot {
                id: bike.id,
                x: bike.position.x,
                y: bike.position.y,
                soc: bike.soc,
                status: bike.status(),
                target_order_id: bike.activity.target_order().map(|o| fleet.order(o).id),
                target_station_id: bike.activity.target_station().map(|s| fleet.station(s).id),
            })
            .collect();
        let orders = fleet
            .orders()
            .values()
            .map(|order| OrderSnapshot {
                id: order.id,
                x: order.position.x,
                y: order.position.y,
                delivered: order.delivered,
                assigned_to: order.assigned_to.map(|b| fleet.bike(b).id),
                deadline: order.deadline,
            })
            .collect();
        let stations = fleet
            .stations()
            .values()
            .map(|station| StationSnapshot {
                id: station.id,
                x: station.position.x,
                y: station.position.y,
                queue_len: station.queue.len(),
                charging_count: station.charging.len(),
                ports: station.ports,
            })
            .collect();
        Self {
            time_min,
            bikes,
            orders,
            stations,
        }
    }
}

/// Per-tick trace of a run.
#[derive(Debug, Clone, Default, Resource)]
pub struct SimTrace {
    pub frames: Vec<TraceFrame>,
}

impl SimTrace {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last(&self) -> Option<&TraceFrame> {
        self.frames.last()
    }
}

/// One row of the order table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderOutcome {
    pub id: u32,
    pub delivered: bool,
    pub delivered_by: Option<u32>,
    pub release_time: u64,
    pub deadline: u64,
    pub completion_time: Option<u64>,
    pub is_late: bool,
    pub x: f64,
    pub y: f64,
}

pub fn order_outcomes(fleet: &Fleet) -> Vec<OrderOutcome> {
    fleet
        .orders()
        .values()
        .map(|order| OrderOutcome {
            id: order.id,
            delivered: order.delivered,
            delivered_by: order.delivered_by.map(|b| fleet.bike(b).id),
            release_time: order.release_time,
            deadline: order.deadline,
            completion_time: order.completion_time,
            is_late: order.is_late(),
            x: order.position.x,
            y: order.position.y,
        })
        .collect()
}
