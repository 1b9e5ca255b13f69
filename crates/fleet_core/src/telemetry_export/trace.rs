use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, UInt32Array, UInt64Array, UInt8Array};
use arrow::datatypes::{DataType, Schema};

use crate::telemetry::SimTrace;

use super::utils::{bike_status_code, optional, required, write_table};

/// One row per (frame, bike).
pub fn write_bike_trace_parquet<P: AsRef<Path>>(
    path: P,
    trace: &SimTrace,
) -> Result<(), Box<dyn Error>> {
    let rows: usize = trace.frames.iter().map(|frame| frame.bikes.len()).sum();
    let mut time_min = Vec::with_capacity(rows);
    let mut bike_id = Vec::with_capacity(rows);
    let mut x = Vec::with_capacity(rows);
    let mut y = Vec::with_capacity(rows);
    let mut soc = Vec::with_capacity(rows);
    let mut status = Vec::with_capacity(rows);
    let mut target_order_id = Vec::with_capacity(rows);
    let mut target_station_id = Vec::with_capacity(rows);

    for frame in &trace.frames {
        for bike in &frame.bikes {
            time_min.push(frame.time_min);
            bike_id.push(bike.id);
            x.push(bike.x);
            y.push(bike.y);
            soc.push(bike.soc);
            status.push(bike_status_code(bike.status));
            target_order_id.push(bike.target_order_id);
            target_station_id.push(bike.target_station_id);
        }
    }

    let schema = Schema::new(vec![
        required("time_min", DataType::UInt64),
        required("bike_id", DataType::UInt32),
        required("x", DataType::Float64),
        required("y", DataType::Float64),
        required("soc", DataType::Float64),
        required("status", DataType::UInt8),
        optional("target_order_id", DataType::UInt32),
        optional("target_station_id", DataType::UInt32),
    ]);

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from(time_min)),
        Arc::new(UInt32Array::from(bike_id)),
        Arc::new(Float64Array::from(x)),
        Arc::new(Float64Array::from(y)),
        Arc::new(Float64Array::from(soc)),
        Arc::new(UInt8Array::from(status)),
        Arc::new(UInt32Array::from(target_order_id)),
        Arc::new(UInt32Array::from(target_station_id)),
    ];

    write_table(path.as_ref(), schema, arrays)
}

/// One row per (frame, station): queue length and ports in use.
pub fn write_station_trace_parquet<P: AsRef<Path>>(
    path: P,
    trace: &SimTrace,
) -> Result<(), Box<dyn Error>> {
    let rows: usize = trace.frames.iter().map(|frame| frame.stations.len()).sum();
    let mut time_min = Vec::with_capacity(rows);
    let mut station_id = Vec::with_capacity(rows);
    let mut queue_len = Vec::with_capacity(rows);
    let mut charging_count = Vec::with_capacity(rows);
    let mut ports = Vec::with_capacity(rows);

    for frame in &trace.frames {
        for station in &frame.stations {
            time_min.push(frame.time_min);
            station_id.push(station.id);
            queue_len.push(station.queue_len as u64);
            charging_count.push(station.charging_count as u64);
            ports.push(station.ports as u64);
        }
    }

    let schema = Schema::new(vec![
        required("time_min", DataType::UInt64),
        required("station_id", DataType::UInt32),
        required("queue_len", DataType::UInt64),
        required("charging_count", DataType::UInt64),
        required("ports", DataType::UInt64),
    ]);

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from(time_min)),
        Arc::new(UInt32Array::from(station_id)),
        Arc::new(UInt64Array::from(queue_len)),
        Arc::new(UInt64Array::from(charging_count)),
        Arc::new(UInt64Array::from(ports)),
    ];

    write_table(path.as_ref(), schema, arrays)
}
