//! Cost terms shared by the heuristic and global policies.

use crate::arena::{BikeIdx, OrderIdx, StationIdx};

use super::DispatchContext;

/// Convex penalty for arriving with a nearly flat battery.
///
/// Zero at or above `critical_soc`, `(critical_soc - soc_after)² × 100` below it.
pub fn battery_risk_penalty(soc_after: f64, critical_soc: f64) -> f64 {
    if soc_after >= critical_soc {
        0.0
    } else {
        let gap = critical_soc - soc_after;
        gap * gap * 100.0
    }
}

/// SOC a bike needs to reach `order` and then the station nearest the order,
/// plus the configured safety margin. Capped at 1.0.
pub fn required_soc(ctx: &DispatchContext<'_>, bike: BikeIdx, order: OrderIdx) -> f64 {
    let courier = ctx.bike(bike);
    let drop_off = ctx.order(order).position;
    let outbound = courier.leg_to(drop_off).soc_cost;
    let onward = ctx
        .nearest_station_to_order(order)
        .map(|station| courier.leg_between(drop_off, ctx.station(station).position).soc_cost)
        .unwrap_or(0.0);
    (outbound + onward + ctx.config().safety_margin_soc).min(1.0)
}

pub fn is_feasible(ctx: &DispatchContext<'_>, bike: BikeIdx, order: OrderIdx) -> bool {
    ctx.bike(bike).soc >= required_soc(ctx, bike, order)
}

/// Smallest [`required_soc`] over `orders`, if any.
pub fn min_required_soc(
    ctx: &DispatchContext<'_>,
    bike: BikeIdx,
    orders: &[OrderIdx],
) -> Option<f64> {
    orders
        .iter()
        .map(|&order| required_soc(ctx, bike, order))
        .min_by(f64::total_cmp)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliverEstimate {
    pub travel_min: u32,
    pub soc_after: f64,
    pub est_completion: u64,
    pub lateness_min: u64,
    pub cost: f64,
}

/// `w_travel·travel + w_late·lateness + w_battery_risk·risk(soc_after)` where
/// lateness is measured at `now + travel + service`.
pub fn deliver_estimate(ctx: &DispatchContext<'_>, bike: BikeIdx, order: OrderIdx) -> DeliverEstimate {
    let courier = ctx.bike(bike);
    let target = ctx.order(order);
    let leg = courier.leg_to(target.position);
    let soc_after = courier.soc - leg.soc_cost;
    let est_completion = ctx.now() + u64::from(leg.travel_min) + u64::from(target.service_min);
    let lateness_min = est_completion.saturating_sub(target.deadline);

    let w = ctx.weights();
    let cost = w.w_travel * f64::from(leg.travel_min)
        + w.w_late * lateness_min as f64
        + w.w_battery_risk * battery_risk_penalty(soc_after, ctx.config().battery_critical_soc);

    DeliverEstimate {
        travel_min: leg.travel_min,
        soc_after,
        est_completion,
        lateness_min,
        cost,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeEstimate {
    pub travel_min: u32,
    pub wait_min: f64,
    pub soc_after: f64,
    pub cost: f64,
}

/// Minutes a bike would wait at `station`: every queued bike ahead shares the
/// ports and takes `avg_charge_min`.
pub fn queue_wait_estimate(ctx: &DispatchContext<'_>, station: StationIdx, avg_charge_min: f64) -> f64 {
    let stop = ctx.station(station);
    (stop.queue.len() as f64 / stop.effective_ports() as f64 * avg_charge_min).ceil()
}

/// `w_travel·travel + w_queue·wait + w_downtime·(travel + wait) + w_battery_risk·risk(soc_after)`.
pub fn charge_estimate(
    ctx: &DispatchContext<'_>,
    bike: BikeIdx,
    station: StationIdx,
    avg_charge_min: f64,
) -> ChargeEstimate {
    let courier = ctx.bike(bike);
    let leg = courier.leg_to(ctx.station(station).position);
    let soc_after = courier.soc - leg.soc_cost;
    let wait_min = queue_wait_estimate(ctx, station, avg_charge_min);
    let travel = f64::from(leg.travel_min);

    let w = ctx.weights();
    let cost = w.w_travel * travel
        + w.w_queue * wait_min
        + w.w_downtime * (travel + wait_min)
        + w.w_battery_risk * battery_risk_penalty(soc_after, ctx.config().battery_critical_soc);

    ChargeEstimate {
        travel_min: leg.travel_min,
        wait_min,
        soc_after,
        cost,
    }
}
