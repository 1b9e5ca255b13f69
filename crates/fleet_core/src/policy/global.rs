//! Whole-fleet dispatch via minimum-cost bike/order matching.
//!
//! Every tick the idle bikes and active orders form a square cost matrix
//! (padded with an infeasibility sentinel) that the Hungarian solver matches
//! optimally. Bikes left over are sent to charge when they cannot serve any
//! remaining order, and a tick where nothing can be matched tops up the
//! weakest part of the idle fleet so it cannot stall.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::arena::{BikeIdx, OrderIdx};
use crate::matching::{min_cost_assignment, CostMatrix};

use super::scoring::{deliver_estimate, is_feasible, min_required_soc};
use super::{DispatchContext, FleetPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Cost of padding cells and infeasible pairs; matches at or above half of
    /// it are discarded.
    pub infeasible_cost: f64,
    /// Weight of the queue wait when picking a station.
    pub station_alpha: f64,
    /// Share of idle bikes (lowest SOC first, at least one) sent to top up.
    pub top_up_fraction: f64,
    /// SOC gained by a top-up session.
    pub top_up_delta: f64,
    /// With no active orders, bikes at or above this SOC are not topped up.
    pub comfort_soc: f64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            infeasible_cost: 1e9,
            station_alpha: 3.0,
            top_up_fraction: 0.30,
            top_up_delta: 0.20,
            comfort_soc: 0.60,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GlobalPolicy {
    config: GlobalConfig,
}

/// Square cost matrix over `bikes` × `orders`, sized to the larger of the two.
/// Real feasible pairs carry the deliver cost; everything else is `infeasible_cost`.
pub fn build_cost_matrix(
    ctx: &DispatchContext<'_>,
    bikes: &[BikeIdx],
    orders: &[OrderIdx],
    infeasible_cost: f64,
) -> CostMatrix {
    let size = bikes.len().max(orders.len());
    let mut matrix = CostMatrix::filled(size, infeasible_cost);
    for (row, &bike) in bikes.iter().enumerate() {
        for (col, &order) in orders.iter().enumerate() {
            if is_feasible(ctx, bike, order) {
                matrix.set(row, col, deliver_estimate(ctx, bike, order).cost);
            }
        }
    }
    matrix
}

impl GlobalPolicy {
    pub fn new(config: GlobalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Send the lowest-SOC share of `idle` to their best station, aiming for
    /// `soc + top_up_delta`. Bikes at or above `skip_from` are left alone.
    fn top_up_lowest(&self, ctx: &mut DispatchContext<'_>, idle: &[BikeIdx], skip_from: Option<f64>) {
        let mut ranked = idle.to_vec();
        ranked.sort_by(|a, b| ctx.bike(*a).soc.total_cmp(&ctx.bike(*b).soc));
        let count = ((self.config.top_up_fraction * idle.len() as f64).floor() as usize).max(1);

        for bike in ranked.into_iter().take(count) {
            let soc = ctx.bike(bike).soc;
            if skip_from.is_some_and(|comfort| soc >= comfort) {
                continue;
            }
            let Some(station) = ctx.best_station_for_bike(bike, self.config.station_alpha) else {
                return;
            };
            ctx.set_charge_target(bike, (soc + self.config.top_up_delta).min(1.0));
            ctx.start_travel_to_station(bike, station);
        }
    }
}

impl FleetPolicy for GlobalPolicy {
    fn name(&self) -> &'static str {
        "global"
    }

    fn dispatch(&self, ctx: &mut DispatchContext<'_>) {
        let idle = ctx.idle_bikes();
        if idle.is_empty() {
            return;
        }
        let orders = ctx.active_orders();
        if orders.is_empty() {
            self.top_up_lowest(ctx, &idle, Some(self.config.comfort_soc));
            return;
        }

        let matrix = build_cost_matrix(ctx, &idle, &orders, self.config.infeasible_cost);
        let assignment = min_cost_assignment(&matrix);
        let accept_below = self.config.infeasible_cost / 2.0;

        let mut matched = vec![false; idle.len()];
        for (row, &bike) in idle.iter().enumerate() {
            let col = assignment[row];
            if col < orders.len() && matrix.at(row, col) < accept_below {
                ctx.start_travel_to_order(bike, orders[col]);
                matched[row] = true;
            }
        }
        let accepted = matched.iter().filter(|m| **m).count();
        debug!(
            "global: {} idle bikes, {} orders, {accepted} matched",
            idle.len(),
            orders.len()
        );

        if accepted == 0 {
            self.top_up_lowest(ctx, &idle, None);
            return;
        }

        let remaining: Vec<OrderIdx> = orders
            .into_iter()
            .filter(|&order| ctx.order(order).assigned_to.is_none())
            .collect();
        for (row, &bike) in idle.iter().enumerate() {
            if matched[row] {
                continue;
            }
            let Some(required) = min_required_soc(ctx, bike, &remaining) else {
                break;
            };
            if ctx.bike(bike).soc >= required {
                continue;
            }
            if let Some(station) = ctx.best_station_for_bike(bike, self.config.station_alpha) {
                ctx.set_charge_target(bike, required);
                ctx.start_travel_to_station(bike, station);
            }
        }
    }
}
