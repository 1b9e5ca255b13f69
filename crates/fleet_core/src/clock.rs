use bevy_ecs::prelude::Resource;

/// Length of one simulation tick in minutes.
pub const DT_MIN: u64 = 1;

/// Fixed-step simulation clock, in whole minutes since the start of the run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Resource)]
pub struct SimulationClock {
    now: u64,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn advance(&mut self) {
        self.now += DT_MIN;
    }
}
