pub mod arena;
pub mod clock;
pub mod config;
pub mod entities;
pub mod error;
pub mod fleet;
pub mod matching;
pub mod metrics;
pub mod policy;
pub mod runner;
pub mod scenario;
pub mod spatial;
pub mod systems;
pub mod telemetry;
pub mod telemetry_export;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
