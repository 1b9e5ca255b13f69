use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::SimulationClock;
use crate::config::EngineConfig;
use crate::fleet::Fleet;
use crate::telemetry::{SimTrace, TraceFrame};

/// Run condition: trace recording is switched on.
pub fn should_capture_snapshot(config: Res<EngineConfig>) -> bool {
    config.record_trace
}

pub fn capture_snapshot_system(
    clock: Res<SimulationClock>,
    fleet: Res<Fleet>,
    mut trace: ResMut<SimTrace>,
) {
    trace.frames.push(TraceFrame::capture(clock.now(), &fleet));
}
