mod support;

use fleet_core::entities::{Activity, BikeStatus};
use fleet_core::policy::{
    BaselineConfig, BaselinePolicy, DispatchStrategy, GlobalPolicy, HeuristicPolicy, PolicyKind,
};
use fleet_core::scenario::ScenarioPreset;

use support::{
    bike, seeded_simulation, step_checked, test_bike, test_order, test_simulation, test_station,
};

#[test]
fn heuristic_charges_when_every_order_is_out_of_reach() {
    // The order is half a kilometre away and cheap to serve, but the bike would
    // arrive with nothing left to reach a station afterwards.
    let mut sim = test_simulation(
        vec![test_bike(1, 2.0, 2.0, 0.08)],
        vec![test_order(1, 2.5, 2.0, 0, 60)],
        vec![test_station(1, 3.5, 2.0, 1)],
    );
    let heuristic = DispatchStrategy::from(HeuristicPolicy::default());
    step_checked(&mut sim, &heuristic);

    let courier = bike(&sim, 1);
    assert_eq!(courier.status(), BikeStatus::TravelingToStation);
    let target = courier.charge_target.expect("charge target");
    // 0.5 km out, 1 km on to the station, plus the 0.05 margin.
    assert!((target - (0.02 + 0.04 + 0.05)).abs() < 1e-9);
    assert!(support::order(&sim, 1).assigned_to.is_none());
}

#[test]
fn heuristic_bike_recharges_then_serves_the_order() {
    let mut sim = test_simulation(
        vec![test_bike(1, 2.0, 2.0, 0.08)],
        vec![test_order(1, 2.5, 2.0, 0, 600)],
        vec![test_station(1, 3.0, 2.0, 1)],
    );
    sim.run(200, &PolicyKind::Heuristic.build());
    assert!(support::order(&sim, 1).delivered);
    assert!(bike(&sim, 1).downtime_min > 0);
}

#[test]
fn baseline_floor_is_configurable() {
    let mut sim = test_simulation(
        vec![test_bike(1, 0.0, 0.0, 0.3)],
        vec![test_order(1, 1.0, 0.0, 0, 60)],
        vec![test_station(1, 0.0, 1.0, 1)],
    );
    let cautious = DispatchStrategy::from(BaselinePolicy::new(BaselineConfig { min_soc: 0.5 }));
    step_checked(&mut sim, &cautious);
    assert!(matches!(
        bike(&sim, 1).activity,
        Activity::TravelingToStation { .. }
    ));
}

#[test]
fn global_assigns_each_order_to_at_most_one_bike() {
    let mut sim = test_simulation(
        (1..=5).map(|id| test_bike(id, 2.5, 2.5, 1.0)).collect(),
        vec![test_order(1, 2.0, 2.0, 0, 60), test_order(2, 3.0, 3.0, 0, 60)],
        vec![test_station(1, 2.5, 2.5, 2)],
    );
    step_checked(&mut sim, &GlobalPolicy::default().into());

    let busy: Vec<_> = sim
        .fleet()
        .bikes()
        .values()
        .filter_map(|b| b.activity.target_order())
        .collect();
    assert_eq!(busy.len(), 2);
    assert_ne!(busy[0], busy[1]);
    // Remaining bikes are fully charged and nothing else is open: they stay put.
    assert_eq!(sim.fleet().idle_bikes().len(), 3);
}

#[test]
fn every_policy_keeps_invariants_on_a_busy_scenario() {
    for kind in PolicyKind::ALL {
        let mut sim = seeded_simulation(&ScenarioPreset::High.params().with_seed(3));
        let strategy = kind.build();
        for _ in 0..240 {
            step_checked(&mut sim, &strategy);
            for station in sim.fleet().stations().values() {
                assert!(station.charging.len() <= station.ports);
            }
            for courier in sim.fleet().bikes().values() {
                assert!((0.0..=1.0).contains(&courier.soc), "{kind}: soc {}", courier.soc);
            }
        }
        let metrics = sim.metrics();
        assert!(metrics.orders_delivered > 0, "{kind} delivered nothing");
        for row in sim.order_outcomes() {
            assert_eq!(fleet_core::telemetry_export::validate_order_outcome(&row), None);
        }
    }
}

#[test]
fn global_policy_runs_the_full_horizon_on_the_low_preset() {
    let mut sim = seeded_simulation(&ScenarioPreset::Low.params().with_seed(11));
    sim.run(600, &PolicyKind::Global.build());
    let metrics = sim.metrics();
    assert_eq!(metrics.time_min, 600);
    assert!(metrics.orders_delivered <= metrics.orders_total);
    assert!(metrics.avg_completion_time_min.is_some());
}
