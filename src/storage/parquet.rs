//! Parquet I/O for edge list arrays
//!
//! # Format
//!
//! One file per edge list with columns `src`, `dst` and optionally `weight`,
//! `edge_id`, `edge_type`. Arrow `Int32`, `Int64`, `Float32`, `Float64` and
//! `UInt64` columns map 1:1 to `INT32`, `INT64`, `FLOAT32`, `FLOAT64` and
//! `SIZE_T` arrays.

use crate::array::TypeErasedDeviceArray;
use crate::resource::ResourceHandle;
use crate::types::DataType;
use anyhow::{anyhow, bail, Context};
use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, UInt64Array,
};
use arrow::datatypes::{DataType as ArrowType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Edge list held in type-erased arrays
#[derive(Debug)]
pub struct EdgeListArrays {
    /// Edge sources
    pub src: TypeErasedDeviceArray,
    /// Edge destinations
    pub dst: TypeErasedDeviceArray,
    /// Optional edge weights
    pub weights: Option<TypeErasedDeviceArray>,
    /// Optional edge ids
    pub edge_ids: Option<TypeErasedDeviceArray>,
    /// Optional edge types
    pub edge_types: Option<TypeErasedDeviceArray>,
}

impl EdgeListArrays {
    /// Number of edges
    #[must_use]
    pub const fn len(&self) -> usize {
        self.src.size()
    }

    /// `true` if there are no edges
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.src.size() == 0
    }

    fn columns(&self) -> Vec<(&'static str, &TypeErasedDeviceArray)> {
        let mut columns = vec![("src", &self.src), ("dst", &self.dst)];
        let optional = [
            ("weight", &self.weights),
            ("edge_id", &self.edge_ids),
            ("edge_type", &self.edge_types),
        ];
        for (name, array) in optional {
            if let Some(array) = array {
                columns.push((name, array));
            }
        }
        columns
    }
}

/// Write an edge list to a Parquet file
///
/// # Errors
///
/// Returns error if file I/O fails or Arrow conversion fails
#[allow(clippy::unused_async)] // Async API for future I/O operations
pub async fn write_edgelist_parquet<P: AsRef<Path>>(path: P, edges: &EdgeListArrays) -> crate::Result<()> {
    write_file(path.as_ref(), edges)?;
    Ok(())
}

/// Read an edge list written by [`write_edgelist_parquet`]
///
/// # Errors
///
/// Returns error if the file does not exist or a column has an unsupported type
#[allow(clippy::unused_async)] // Async API for future I/O operations
pub async fn read_edgelist_parquet<P: AsRef<Path>>(
    handle: &ResourceHandle,
    path: P,
) -> crate::Result<EdgeListArrays> {
    Ok(read_file(handle, path.as_ref())?)
}

fn write_file(path: &Path, edges: &EdgeListArrays) -> anyhow::Result<()> {
    let mut fields = Vec::new();
    let mut arrays = Vec::new();
    for (name, array) in edges.columns() {
        let column = to_arrow(array).with_context(|| format!("Failed to convert column {name}"))?;
        fields.push(Field::new(name, column.data_type().clone(), false));
        arrays.push(column);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("Failed to create RecordBatch")?;

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::ZSTD(
            parquet::basic::ZstdLevel::try_new(3)?,
        ))
        .build();

    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    tracing::debug!(path = %path.display(), edges = edges.len(), "edge list written");
    Ok(())
}

fn to_arrow(array: &TypeErasedDeviceArray) -> anyhow::Result<ArrayRef> {
    Ok(match array.dtype() {
        DataType::Int32 => Arc::new(Int32Array::from(array.to_vec::<i32>()?)),
        DataType::Int64 => Arc::new(Int64Array::from(array.to_vec::<i64>()?)),
        DataType::Float32 => Arc::new(Float32Array::from(array.to_vec::<f32>()?)),
        DataType::Float64 => Arc::new(Float64Array::from(array.to_vec::<f64>()?)),
        DataType::SizeT => Arc::new(UInt64Array::from(
            array
                .to_vec::<usize>()?
                .into_iter()
                .map(|v| v as u64)
                .collect::<Vec<u64>>(),
        )),
    })
}

/// Column values accumulated across record batches
enum Column {
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    U64(Vec<u64>),
}

impl Column {
    fn for_type(data_type: &ArrowType) -> anyhow::Result<Self> {
        Ok(match data_type {
            ArrowType::Int32 => Self::I32(Vec::new()),
            ArrowType::Int64 => Self::I64(Vec::new()),
            ArrowType::Float32 => Self::F32(Vec::new()),
            ArrowType::Float64 => Self::F64(Vec::new()),
            ArrowType::UInt64 => Self::U64(Vec::new()),
            other => bail!("Unsupported column type {other}"),
        })
    }

    fn extend(&mut self, array: &dyn Array) -> anyhow::Result<()> {
        let any = array.as_any();
        match self {
            Self::I32(values) => values.extend(downcast::<Int32Array>(any)?.values().iter()),
            Self::I64(values) => values.extend(downcast::<Int64Array>(any)?.values().iter()),
            Self::F32(values) => values.extend(downcast::<Float32Array>(any)?.values().iter()),
            Self::F64(values) => values.extend(downcast::<Float64Array>(any)?.values().iter()),
            Self::U64(values) => values.extend(downcast::<UInt64Array>(any)?.values().iter()),
        }
        Ok(())
    }

    fn into_array(self, handle: &ResourceHandle) -> crate::Result<TypeErasedDeviceArray> {
        match self {
            Self::I32(values) => TypeErasedDeviceArray::from_slice(handle, &values),
            Self::I64(values) => TypeErasedDeviceArray::from_slice(handle, &values),
            Self::F32(values) => TypeErasedDeviceArray::from_slice(handle, &values),
            Self::F64(values) => TypeErasedDeviceArray::from_slice(handle, &values),
            Self::U64(values) => {
                let values = values
                    .into_iter()
                    .map(|v| {
                        usize::try_from(v).map_err(|_| crate::Error::invalid_value(format!("{v} exceeds size_t")))
                    })
                    .collect::<crate::Result<Vec<usize>>>()?;
                TypeErasedDeviceArray::from_slice(handle, &values)
            }
        }
    }
}

fn downcast<T: 'static>(any: &dyn std::any::Any) -> anyhow::Result<&T> {
    any.downcast_ref::<T>()
        .ok_or_else(|| anyhow!("Column type changed between record batches"))
}

fn read_file(handle: &ResourceHandle, path: &Path) -> anyhow::Result<EdgeListArrays> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let mut columns: Vec<(String, Column)> = schema
        .fields()
        .iter()
        .map(|field| Ok((field.name().clone(), Column::for_type(field.data_type())?)))
        .collect::<anyhow::Result<_>>()?;

    for batch_result in reader {
        let batch: RecordBatch = batch_result?;
        for (i, (_, column)) in columns.iter_mut().enumerate() {
            column.extend(batch.column(i).as_ref())?;
        }
    }

    let mut take = |name: &str| -> anyhow::Result<Option<TypeErasedDeviceArray>> {
        match columns.iter().position(|(n, _)| n == name) {
            Some(i) => Ok(Some(columns.swap_remove(i).1.into_array(handle)?)),
            None => Ok(None),
        }
    };

    let src = take("src")?.context("Missing src column")?;
    let dst = take("dst")?.context("Missing dst column")?;
    let weights = take("weight")?;
    let edge_ids = take("edge_id")?;
    let edge_types = take("edge_type")?;

    tracing::debug!(path = %path.display(), edges = src.size(), "edge list read");
    Ok(EdgeListArrays {
        src,
        dst,
        weights,
        edge_ids,
        edge_types,
    })
}
