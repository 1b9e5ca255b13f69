use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::entities::BikeStatus;

/// Column that is set on every row.
pub(super) fn required(name: &'static str, data_type: DataType) -> Field {
    Field::new(name, data_type, false)
}

/// Column that is null where the value does not apply (e.g. undelivered orders).
pub(super) fn optional(name: &'static str, data_type: DataType) -> Field {
    Field::new(name, data_type, true)
}

fn table_properties() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_created_by(format!("fleet_core {}", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Write `columns` as a single-row-group table at `path`, replacing any existing file.
pub(super) fn write_table(
    path: &Path,
    schema: Schema,
    columns: Vec<ArrayRef>,
) -> Result<(), Box<dyn Error>> {
    let table = path.display();
    let schema = Arc::new(schema);
    let batch = RecordBatch::try_new(Arc::clone(&schema), columns)
        .map_err(|e| format!("{table}: columns do not match schema: {e}"))?;
    let file = File::create(path).map_err(|e| format!("{table}: cannot create file: {e}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, Some(table_properties()))?;
    writer
        .write(&batch)
        .map_err(|e| format!("{table}: writing {} rows failed: {e}", batch.num_rows()))?;
    writer.close()?;
    Ok(())
}

/// Stable numeric code of a bike status in exported tables.
pub fn bike_status_code(status: BikeStatus) -> u8 {
    match status {
        BikeStatus::Idle => 0,
        BikeStatus::TravelingToOrder => 1,
        BikeStatus::Delivering => 2,
        BikeStatus::TravelingToStation => 3,
        BikeStatus::Charging => 4,
        BikeStatus::WaitingCharge => 5,
    }
}
