//! Widening reads and checked narrowing writes between views and kernels
//!
//! Kernels work on `i64` labels and `f64` weights regardless of the element
//! types a caller chose. These helpers widen on the way in and narrow (with
//! range checks) on the way out.

use super::{TypeErasedDeviceArray, TypeErasedDeviceArrayView};
use crate::error::{Error, Result};
use crate::resource::ResourceHandle;
use crate::types::DataType;

/// Read vertex labels (`INT32` or `INT64`) widened to `i64`
///
/// # Errors
///
/// `TypeMismatch` for any other element type
pub fn read_vertices(view: &TypeErasedDeviceArrayView) -> Result<Vec<i64>> {
    match view.dtype() {
        DataType::Int32 => Ok(view.to_vec::<i32>()?.into_iter().map(i64::from).collect()),
        DataType::Int64 => view.to_vec::<i64>(),
        other => Err(Error::type_mismatch(format!(
            "vertex array must be int32 or int64, got {other}"
        ))),
    }
}

/// Read weights (`FLOAT32` or `FLOAT64`) widened to `f64`
///
/// # Errors
///
/// `TypeMismatch` for any other element type
pub fn read_weights(view: &TypeErasedDeviceArrayView) -> Result<Vec<f64>> {
    match view.dtype() {
        DataType::Float32 => Ok(view.to_vec::<f32>()?.into_iter().map(f64::from).collect()),
        DataType::Float64 => view.to_vec::<f64>(),
        other => Err(Error::type_mismatch(format!(
            "weight array must be float32 or float64, got {other}"
        ))),
    }
}

/// Read an `INT32` array (fan-out lists, edge types)
///
/// # Errors
///
/// `TypeMismatch` for any other element type
pub fn read_i32(view: &TypeErasedDeviceArrayView) -> Result<Vec<i32>> {
    view.to_vec::<i32>()
}

/// Read an integral array (`INT32`, `INT64` or `SIZE_T`) as `usize`
///
/// # Errors
///
/// `TypeMismatch` for floating point arrays, `InvalidValue` for negative entries
pub fn read_offsets(view: &TypeErasedDeviceArrayView) -> Result<Vec<usize>> {
    let widened: Vec<i64> = match view.dtype() {
        DataType::SizeT => return view.to_vec::<usize>(),
        DataType::Int32 | DataType::Int64 => read_vertices(view)?,
        other => {
            return Err(Error::type_mismatch(format!(
                "offset array must be integral, got {other}"
            )))
        }
    };
    widened
        .into_iter()
        .map(|v| usize::try_from(v).map_err(|_| Error::invalid_value(format!("negative offset {v}"))))
        .collect()
}

/// Build a vertex array of `dtype` from `i64` labels
///
/// # Errors
///
/// `InvalidValue` if a label does not fit in `INT32`, `TypeMismatch` if
/// `dtype` is not a vertex type
pub fn vertex_array(handle: &ResourceHandle, dtype: DataType, values: &[i64]) -> Result<TypeErasedDeviceArray> {
    match dtype {
        DataType::Int64 => TypeErasedDeviceArray::from_slice(handle, values),
        DataType::Int32 => {
            let narrowed = values
                .iter()
                .map(|&v| {
                    i32::try_from(v).map_err(|_| Error::invalid_value(format!("label {v} does not fit in int32")))
                })
                .collect::<Result<Vec<i32>>>()?;
            TypeErasedDeviceArray::from_slice(handle, &narrowed)
        }
        other => Err(Error::type_mismatch(format!("{other} is not a vertex type"))),
    }
}

/// Build a weight array of `dtype` from `f64` values
///
/// # Errors
///
/// `TypeMismatch` if `dtype` is not floating point
pub fn weight_array(handle: &ResourceHandle, dtype: DataType, values: &[f64]) -> Result<TypeErasedDeviceArray> {
    match dtype {
        DataType::Float64 => TypeErasedDeviceArray::from_slice(handle, values),
        #[allow(clippy::cast_possible_truncation)] // FLOAT32 results are rounded by contract
        DataType::Float32 => {
            let narrowed: Vec<f32> = values.iter().map(|&v| v as f32).collect();
            TypeErasedDeviceArray::from_slice(handle, &narrowed)
        }
        other => Err(Error::type_mismatch(format!("{other} is not a weight type"))),
    }
}

/// Build an edge-id array of `dtype` (`INT32` or `INT64`)
///
/// # Errors
///
/// Same as [`vertex_array`]
pub fn edge_id_array(handle: &ResourceHandle, dtype: DataType, values: &[i64]) -> Result<TypeErasedDeviceArray> {
    vertex_array(handle, dtype, values)
}

/// Build a `SIZE_T` array
///
/// # Errors
///
/// Returns `MemoryError` if the allocation fails
pub fn size_array(handle: &ResourceHandle, values: &[usize]) -> Result<TypeErasedDeviceArray> {
    TypeErasedDeviceArray::from_slice(handle, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatusCode;

    #[test]
    fn test_read_vertices_widens() {
        let handle = ResourceHandle::new();
        let array = TypeErasedDeviceArray::from_slice(&handle, &[3_i32, -1]).unwrap();
        assert_eq!(read_vertices(&array.view()).unwrap(), vec![3, -1]);

        let weights = TypeErasedDeviceArray::from_slice(&handle, &[1.0_f32]).unwrap();
        assert_eq!(
            read_vertices(&weights.view()).unwrap_err().code(),
            StatusCode::TypeMismatch
        );
    }

    #[test]
    fn test_read_weights_widens() {
        let handle = ResourceHandle::new();
        let array = TypeErasedDeviceArray::from_slice(&handle, &[0.5_f32, 2.0]).unwrap();
        assert_eq!(read_weights(&array.view()).unwrap(), vec![0.5, 2.0]);
    }

    #[test]
    fn test_vertex_array_narrowing() {
        let handle = ResourceHandle::new();
        let array = vertex_array(&handle, DataType::Int32, &[1, 2]).unwrap();
        assert_eq!(array.dtype(), DataType::Int32);

        let err = vertex_array(&handle, DataType::Int32, &[i64::MAX]).unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidValue);
    }

    #[test]
    fn test_read_offsets() {
        let handle = ResourceHandle::new();
        let array = TypeErasedDeviceArray::from_slice(&handle, &[0_i32, 2, 5]).unwrap();
        assert_eq!(read_offsets(&array.view()).unwrap(), vec![0, 2, 5]);

        let bad = TypeErasedDeviceArray::from_slice(&handle, &[0_i64, -1]).unwrap();
        assert_eq!(
            read_offsets(&bad.view()).unwrap_err().code(),
            StatusCode::InvalidValue
        );
    }
}
