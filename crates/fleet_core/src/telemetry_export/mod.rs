//! Parquet export of run results.

mod orders;
mod trace;
mod utils;
mod validate;

pub use orders::write_order_outcomes_parquet;
pub use trace::{write_bike_trace_parquet, write_station_trace_parquet};
pub use utils::bike_status_code;
pub use validate::validate_order_outcome;
