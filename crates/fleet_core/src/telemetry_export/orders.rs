use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, UInt32Array, UInt64Array};
use arrow::datatypes::{DataType, Schema};

use crate::telemetry::OrderOutcome;

use super::utils::{optional, required, write_table};

/// One row per order: id, delivered, delivered_by, release_time, deadline,
/// completion_time, is_late, x, y.
pub fn write_order_outcomes_parquet<P: AsRef<Path>>(
    path: P,
    outcomes: &[OrderOutcome],
) -> Result<(), Box<dyn Error>> {
    let schema = Schema::new(vec![
        required("id", DataType::UInt32),
        required("delivered", DataType::Boolean),
        optional("delivered_by", DataType::UInt32),
        required("release_time", DataType::UInt64),
        required("deadline", DataType::UInt64),
        optional("completion_time", DataType::UInt64),
        required("is_late", DataType::Boolean),
        required("x", DataType::Float64),
        required("y", DataType::Float64),
    ]);

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt32Array::from_iter_values(outcomes.iter().map(|o| o.id))),
        Arc::new(BooleanArray::from(
            outcomes.iter().map(|o| o.delivered).collect::<Vec<_>>(),
        )),
        Arc::new(UInt32Array::from(
            outcomes.iter().map(|o| o.delivered_by).collect::<Vec<_>>(),
        )),
        Arc::new(UInt64Array::from_iter_values(outcomes.iter().map(|o| o.release_time))),
        Arc::new(UInt64Array::from_iter_values(outcomes.iter().map(|o| o.deadline))),
        Arc::new(UInt64Array::from(
            outcomes.iter().map(|o| o.completion_time).collect::<Vec<_>>(),
        )),
        Arc::new(BooleanArray::from(
            outcomes.iter().map(|o| o.is_late).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from_iter_values(outcomes.iter().map(|o| o.x))),
        Arc::new(Float64Array::from_iter_values(outcomes.iter().map(|o| o.y))),
    ];

    write_table(path.as_ref(), schema, arrays)
}
