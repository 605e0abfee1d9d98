//! Parquet output with full-replace semantics.
//!
//! The table is converted to a single Arrow [`RecordBatch`] and written to a
//! hidden temporary file beside the target, which is then renamed over the
//! target. A failed write removes the temporary file and leaves any existing
//! output untouched.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, anyhow};
use arrow_array::{ArrayRef, Date32Array, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema as ArrowSchema};
use chrono::Datelike;
use log::{debug, info};
use parquet::{
    arrow::ArrowWriter,
    basic::{Compression, GzipLevel, ZstdLevel},
    file::properties::WriterProperties,
    format::KeyValue,
};
use uuid::Uuid;

use crate::{
    cli::ParquetCompression,
    data::Value,
    dataset::Table,
    schema::{ColumnMeta, ColumnType},
};

pub const JOB_NAME_METADATA_KEY: &str = "job_name";

// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Clone)]
pub struct SinkOptions {
    pub job_name: String,
    pub compression: ParquetCompression,
}

fn codec(compression: ParquetCompression) -> Compression {
    match compression {
        ParquetCompression::Snappy => Compression::SNAPPY,
        ParquetCompression::Zstd => Compression::ZSTD(ZstdLevel::default()),
        ParquetCompression::Gzip => Compression::GZIP(GzipLevel::default()),
        ParquetCompression::Uncompressed => Compression::UNCOMPRESSED,
    }
}

fn arrow_type(datatype: ColumnType) -> DataType {
    match datatype {
        ColumnType::String => DataType::Utf8,
        ColumnType::Integer => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::Date => DataType::Date32,
    }
}

fn type_error(meta: &ColumnMeta, row: usize, value: &Value) -> anyhow::Error {
    anyhow!(
        "Column '{}' is declared {} but row {} holds '{}'",
        meta.name,
        meta.datatype,
        row,
        value
    )
}

fn build_array(table: &Table, idx: usize) -> Result<ArrayRef> {
    let meta = &table.columns()[idx];
    let cells = table.column_cells(idx).enumerate();
    let array: ArrayRef = match meta.datatype {
        ColumnType::String => {
            let values = cells
                .map(|(row, cell)| match cell {
                    Some(Value::String(s)) => Ok(Some(s.clone())),
                    Some(other) => Err(type_error(meta, row, other)),
                    None => Ok(None),
                })
                .collect::<Result<Vec<_>>>()?;
            Arc::new(StringArray::from(values))
        }
        ColumnType::Integer => {
            let values = cells
                .map(|(row, cell)| match cell {
                    Some(Value::Integer(i)) => Ok(Some(*i)),
                    Some(other) => Err(type_error(meta, row, other)),
                    None => Ok(None),
                })
                .collect::<Result<Vec<_>>>()?;
            Arc::new(Int64Array::from(values))
        }
        ColumnType::Float => {
            let values = cells
                .map(|(row, cell)| match cell {
                    Some(Value::Float(f)) => Ok(Some(*f)),
                    Some(other) => Err(type_error(meta, row, other)),
                    None => Ok(None),
                })
                .collect::<Result<Vec<_>>>()?;
            Arc::new(Float64Array::from(values))
        }
        ColumnType::Date => {
            let values = cells
                .map(|(row, cell)| match cell {
                    Some(Value::Date(d)) => Ok(Some(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)),
                    Some(other) => Err(type_error(meta, row, other)),
                    None => Ok(None),
                })
                .collect::<Result<Vec<_>>>()?;
            Arc::new(Date32Array::from(values))
        }
    };
    Ok(array)
}

pub fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let fields = table
        .columns()
        .iter()
        .map(|meta| Field::new(meta.name.as_str(), arrow_type(meta.datatype), true))
        .collect::<Vec<_>>();
    let arrays = (0..table.column_count())
        .map(|idx| build_array(table, idx))
        .collect::<Result<Vec<_>>>()?;
    RecordBatch::try_new(Arc::new(ArrowSchema::new(fields)), arrays)
        .context("Assembling Arrow record batch")
}

fn temp_path_for(target: &Path) -> PathBuf {
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    target.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()))
}

fn write_batch(batch: &RecordBatch, path: &Path, options: &SinkOptions) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(codec(options.compression))
        .set_key_value_metadata(Some(vec![KeyValue::new(
            JOB_NAME_METADATA_KEY.to_string(),
            options.job_name.clone(),
        )]))
        .build();
    let file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("Opening Parquet writer")?;
    writer.write(batch).context("Writing Parquet row group")?;
    let file = writer.into_inner().context("Finalizing Parquet file")?;
    file.sync_all()
        .with_context(|| format!("Syncing output file {path:?}"))
}

/// Writes `table` to `target`, replacing any existing file only once the new
/// one is completely written.
pub fn write_parquet(table: &Table, target: &Path, options: &SinkOptions) -> Result<()> {
    let batch = to_record_batch(table)?;
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Creating output directory {parent:?}"))?;
    }
    let temp = temp_path_for(target);
    debug!("Staging Parquet output at {:?}", temp);
    if let Err(err) = write_batch(&batch, &temp, options) {
        let _ = fs::remove_file(&temp);
        return Err(err);
    }
    if let Err(err) = fs::rename(&temp, target) {
        let _ = fs::remove_file(&temp);
        return Err(err).with_context(|| format!("Replacing output file {target:?}"));
    }
    info!(
        "Wrote {} row(s) across {} column(s) to {:?}",
        batch.num_rows(),
        batch.num_columns(),
        target
    );
    Ok(())
}
