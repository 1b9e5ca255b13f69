pub mod advance_activities;
pub mod advance_clock;
pub mod station_queue;
pub mod telemetry_snapshot;
