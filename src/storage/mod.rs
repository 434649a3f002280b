//! Usage record storage (Arrow/Parquet)
//!
//! Each pipeline task leaves one Parquet file with a `memory` column (bytes)
//! and a `run_time` column (seconds). Columns are read whole; the files are
//! small (one row per quantum) so there is no paging.
//!
//! Cells are surfaced as [`Sample`]s rather than `f64` because the producing
//! pipeline does not guarantee a clean schema: nulls, NaN markers, integer
//! columns and stray strings all occur, and the statistics layer decides
//! which of them count.

use crate::{Error, Result};
use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray, UInt32Array, UInt64Array,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column holding peak memory per quantum, in bytes
pub const MEMORY_COLUMN: &str = "memory";

/// Column holding run time per quantum, in seconds
pub const RUN_TIME_COLUMN: &str = "run_time";

/// One cell of a usage column
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// Floating-point value
    Float(f64),
    /// Integer value
    Int(i64),
    /// Non-numeric text
    Text(String),
    /// Null or unsupported cell
    Missing,
}

impl Sample {
    /// Value usable as a statistics sample
    ///
    /// Only finite floating-point cells qualify; NaN is a missing marker.
    #[must_use]
    pub fn as_valid_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for Sample {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Option<f64>> for Sample {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Float)
    }
}

impl From<&str> for Sample {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Usage records of a single task
#[derive(Debug)]
pub struct UsageTable {
    source: Option<PathBuf>,
    batches: Vec<RecordBatch>,
}

impl UsageTable {
    /// Create a table from existing batches
    ///
    /// Useful for testing
    #[must_use]
    pub fn new(batches: Vec<RecordBatch>) -> Self {
        Self {
            source: None,
            batches,
        }
    }

    /// Load a usage table from a Parquet file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
        use std::fs::File;

        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::StorageError(format!("Failed to open {}: {e}", path.display()))
        })?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
            Error::StorageError(format!("Failed to parse {}: {e}", path.display()))
        })?;

        let reader = builder.build().map_err(|e| {
            Error::StorageError(format!("Failed to create Parquet reader: {e}"))
        })?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| {
                Error::StorageError(format!("Failed to read record batch: {e}"))
            })?;
            batches.push(batch);
        }

        debug!(
            "Loaded {} ({} batches)",
            path.display(),
            batches.len()
        );

        Ok(Self {
            source: Some(path.to_path_buf()),
            batches,
        })
    }

    /// Get all record batches
    #[must_use]
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Total number of rows across batches
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Read one column as samples, concatenated across batches
    ///
    /// An empty table (no batches) yields no samples.
    ///
    /// # Errors
    /// Returns [`Error::MissingColumn`] if any batch lacks the column
    pub fn column_samples(&self, name: &str) -> Result<Vec<Sample>> {
        let mut samples = Vec::with_capacity(self.num_rows());

        for batch in &self.batches {
            let column = batch
                .column_by_name(name)
                .ok_or_else(|| Error::MissingColumn {
                    path: self.source_label(),
                    column: name.to_string(),
                })?;
            append_samples(column, &mut samples);
        }

        Ok(samples)
    }

    fn source_label(&self) -> String {
        self.source
            .as_ref()
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string())
    }
}

macro_rules! push_cells {
    ($column:expr, $array:ty, $out:expr, $variant:expr) => {
        if let Some(array) = $column.as_any().downcast_ref::<$array>() {
            for i in 0..array.len() {
                $out.push(if array.is_null(i) {
                    Sample::Missing
                } else {
                    $variant(array.value(i))
                });
            }
        }
    };
}

fn append_samples(column: &ArrayRef, out: &mut Vec<Sample>) {
    match column.data_type() {
        DataType::Float64 => push_cells!(column, Float64Array, out, Sample::Float),
        DataType::Float32 => {
            push_cells!(column, Float32Array, out, |v: f32| Sample::Float(f64::from(v)));
        }
        DataType::Int64 => push_cells!(column, Int64Array, out, Sample::Int),
        DataType::Int32 => push_cells!(column, Int32Array, out, |v: i32| Sample::Int(i64::from(v))),
        DataType::UInt32 => {
            push_cells!(column, UInt32Array, out, |v: u32| Sample::Int(i64::from(v)));
        }
        DataType::UInt64 => push_cells!(column, UInt64Array, out, |v: u64| {
            i64::try_from(v).map_or(Sample::Missing, Sample::Int)
        }),
        DataType::Utf8 => {
            push_cells!(column, StringArray, out, |v: &str| Sample::Text(v.to_string()));
        }
        DataType::LargeUtf8 => {
            push_cells!(column, LargeStringArray, out, |v: &str| Sample::Text(v.to_string()));
        }
        other => {
            debug!("Column type {other:?} has no numeric samples");
            out.extend(std::iter::repeat(Sample::Missing).take(column.len()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn usage_batch(memory: Vec<Option<f64>>, run_time: Vec<Option<f64>>) -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new(MEMORY_COLUMN, DataType::Float64, true),
            Field::new(RUN_TIME_COLUMN, DataType::Float64, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Float64Array::from(memory)),
                Arc::new(Float64Array::from(run_time)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_column_samples_preserve_nulls() {
        let table = UsageTable::new(vec![usage_batch(
            vec![Some(1.0), None, Some(3.0)],
            vec![Some(0.5), Some(0.7), None],
        )]);

        let memory = table.column_samples(MEMORY_COLUMN).unwrap();
        assert_eq!(
            memory,
            vec![Sample::Float(1.0), Sample::Missing, Sample::Float(3.0)]
        );
        assert_eq!(table.num_rows(), 3);
    }

    #[test]
    fn test_column_samples_concatenate_batches() {
        let table = UsageTable::new(vec![
            usage_batch(vec![Some(1.0)], vec![Some(1.0)]),
            usage_batch(vec![Some(2.0), Some(4.0)], vec![None, None]),
        ]);

        let memory = table.column_samples(MEMORY_COLUMN).unwrap();
        assert_eq!(memory.len(), 3);
        assert_eq!(memory[2], Sample::Float(4.0));
    }

    #[test]
    fn test_missing_column_is_error() {
        let schema = Schema::new(vec![Field::new(MEMORY_COLUMN, DataType::Float64, false)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Float64Array::from(vec![1.0]))],
        )
        .unwrap();
        let table = UsageTable::new(vec![batch]);

        let err = table.column_samples(RUN_TIME_COLUMN).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref column, .. } if column == "run_time"));
    }

    #[test]
    fn test_integer_and_text_columns_map_to_samples() {
        let schema = Schema::new(vec![
            Field::new("ints", DataType::Int64, true),
            Field::new("text", DataType::Utf8, true),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(vec![Some(7), None])),
                Arc::new(StringArray::from(vec![Some("oom"), None])),
            ],
        )
        .unwrap();
        let table = UsageTable::new(vec![batch]);

        assert_eq!(
            table.column_samples("ints").unwrap(),
            vec![Sample::Int(7), Sample::Missing]
        );
        assert_eq!(
            table.column_samples("text").unwrap(),
            vec![Sample::Text("oom".to_string()), Sample::Missing]
        );
    }

    #[test]
    fn test_only_finite_floats_are_valid() {
        assert_eq!(Sample::Float(2.5).as_valid_float(), Some(2.5));
        assert_eq!(Sample::Float(f64::NAN).as_valid_float(), None);
        assert_eq!(Sample::Int(3).as_valid_float(), None);
        assert_eq!(Sample::from("x").as_valid_float(), None);
        assert_eq!(Sample::Missing.as_valid_float(), None);
    }

    #[test]
    fn test_load_parquet_missing_file() {
        let err = UsageTable::load_parquet("/nonexistent/isr_1.parq").unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
