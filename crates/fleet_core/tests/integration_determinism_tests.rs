mod support;

use fleet_core::policy::PolicyKind;
use fleet_core::scenario::{ScenarioParams, ScenarioPreset};

use support::seeded_simulation;

fn run_trace(params: &ScenarioParams, kind: PolicyKind) -> Vec<fleet_core::telemetry::TraceFrame> {
    let mut sim = seeded_simulation(params);
    sim.run(180, &kind.build());
    sim.trace().frames.clone()
}

#[test]
fn identical_inputs_give_identical_traces() {
    let params = ScenarioPreset::Medium.params().with_seed(42);
    for kind in PolicyKind::ALL {
        let a = run_trace(&params, kind);
        let b = run_trace(&params, kind);
        assert_eq!(a.len(), 180);
        assert_eq!(a, b, "{kind} diverged between identical runs");
    }
}

#[test]
fn different_seeds_change_the_run() {
    let a = run_trace(&ScenarioPreset::Low.params().with_seed(1), PolicyKind::Heuristic);
    let b = run_trace(&ScenarioPreset::Low.params().with_seed(2), PolicyKind::Heuristic);
    assert_ne!(a, b);
}

#[test]
fn input_order_of_entities_does_not_matter() {
    let scenario = fleet_core::scenario::build_scenario(&ScenarioPreset::Low.params())
        .expect("scenario");
    let mut reversed = scenario.clone();
    reversed.bikes.reverse();
    reversed.orders.reverse();
    reversed.stations.reverse();

    let run = |s: fleet_core::scenario::Scenario| {
        let mut sim = s
            .into_simulation(Default::default(), Default::default())
            .expect("simulation");
        sim.run(120, &PolicyKind::Global.build());
        (sim.metrics(), sim.order_outcomes())
    };
    assert_eq!(run(scenario), run(reversed));
}
