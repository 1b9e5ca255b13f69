use bevy_ecs::prelude::{Res, ResMut};

use crate::config::EngineConfig;
use crate::fleet::Fleet;

/// Step 2 of the tick: hand ports freed this minute to the head of each queue.
pub fn promote_queued_system(config: Res<EngineConfig>, mut fleet: ResMut<Fleet>) {
    fleet.promote_queued(&config);
}
