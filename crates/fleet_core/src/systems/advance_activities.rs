use bevy_ecs::prelude::{Res, ResMut};
use log::trace;

use crate::clock::SimulationClock;
use crate::config::EngineConfig;
use crate::fleet::Fleet;

/// Step 1 of the tick: count down every bike's activity and apply the
/// transitions that expire this minute.
pub fn advance_activities_system(
    clock: Res<SimulationClock>,
    config: Res<EngineConfig>,
    mut fleet: ResMut<Fleet>,
) {
    let delivered = fleet.advance_activities(clock.now(), &config);
    if delivered > 0 {
        trace!("t={} delivered {delivered} orders", clock.now());
    }
}

#[cfg(test)]
mod tests {
    use bevy_ecs::prelude::{Schedule, World};

    use super::*;
    use crate::entities::{Activity, Bike, Order};
    use crate::spatial::Point;

    #[test]
    fn travel_countdown_runs_through_the_system() {
        let bike = Bike::new(1, Point::new(0.0, 0.0), 1.0, 450.0, 18.0, 18.0);
        let order = Order::new(1, Point::new(0.1, 0.0), 0, 30);
        let mut fleet = Fleet::new(vec![bike], vec![order], vec![]).expect("valid fleet");
        let b = fleet.bikes().lookup(1).expect("bike");
        let o = fleet.orders().lookup(1).expect("order");
        fleet.start_travel_to_order(b, o);

        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(EngineConfig::default());
        world.insert_resource(fleet);
        let mut schedule = Schedule::default();
        schedule.add_systems(advance_activities_system);
        schedule.run(&mut world);

        let fleet = world.resource::<Fleet>();
        assert!(matches!(
            fleet.bike(b).activity,
            Activity::Delivering { remaining_min: 2, .. }
        ));
        assert_eq!(fleet.bike(b).position, Point::new(0.1, 0.0));
    }
}
