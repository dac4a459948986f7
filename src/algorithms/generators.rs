//! Synthetic edge lists and edge attributes
//!
//! Generators do not need a graph. On multi-partition handles every rank
//! draws its own share from its own [`RngState`].

use crate::array::convert::{edge_id_array, vertex_array, weight_array};
use crate::array::TypeErasedDeviceArray;
use crate::engine::{DefaultEngine, GeneratorEngine};
use crate::error::{Error, Result};
use crate::options::{GeneratorDistribution, RmatListOptions, RmatOptions};
use crate::resource::{ResourceHandle, RngState};
use crate::results::{CooListResult, CooResult};
use crate::types::DataType;
use rand::distributions::{Distribution, WeightedIndex};

/// Narrowest vertex type holding ids below `2^scale`
const fn vertex_type_for_scale(scale: u32) -> DataType {
    if scale <= 31 {
        DataType::Int32
    } else {
        DataType::Int64
    }
}

fn rmat_coo(handle: &ResourceHandle, rng: &RngState, options: &RmatOptions) -> Result<CooResult> {
    let (src, dst) = rng.with_rng(|r| DefaultEngine::rmat(options, r));
    let dtype = vertex_type_for_scale(options.scale);
    Ok(CooResult {
        sources: vertex_array(handle, dtype, &src)?,
        destinations: vertex_array(handle, dtype, &dst)?,
        weights: None,
        edge_ids: None,
        edge_types: None,
    })
}

/// R-MAT edge list over `2^scale` vertices
///
/// Vertex ids are `INT32` up to scale 31 and `INT64` beyond.
///
/// # Errors
///
/// `InvalidValue` for a scale above 62 or invalid quadrant probabilities
///
/// # Example
///
/// ```
/// use trueno_graph_api::algorithms::generate_rmat_edgelist;
/// use trueno_graph_api::{ResourceHandle, RmatOptions, RngState};
///
/// let handle = ResourceHandle::new();
/// let rng = RngState::new(&handle, 7);
/// let options = RmatOptions { scale: 4, num_edges: 32, ..RmatOptions::default() };
/// let coo = generate_rmat_edgelist(&handle, &rng, &options).unwrap();
/// assert_eq!(coo.len(), 32);
/// ```
pub fn generate_rmat_edgelist(handle: &ResourceHandle, rng: &RngState, options: &RmatOptions) -> Result<CooResult> {
    options.validate()?;
    tracing::debug!(scale = options.scale, edges = options.num_edges, "rmat");
    rmat_coo(handle, rng, options)
}

/// Several R-MAT edge lists with scales drawn from a range
///
/// `PowerLaw` size distribution halves the odds of every next larger scale.
///
/// # Errors
///
/// `InvalidValue` for an inverted scale range or a scale above 62
pub fn generate_rmat_edgelists(
    handle: &ResourceHandle,
    rng: &RngState,
    options: &RmatListOptions,
) -> Result<CooListResult> {
    options.validate()?;
    let scales: Vec<u32> = (options.min_scale..=options.max_scale).collect();
    let weights: Vec<f64> = match options.size_distribution {
        GeneratorDistribution::Uniform => vec![1.0; scales.len()],
        GeneratorDistribution::PowerLaw => {
            let mut weight = 1.0;
            scales
                .iter()
                .map(|_| {
                    let w = weight;
                    weight *= 0.5;
                    w
                })
                .collect()
        }
    };
    let picker = WeightedIndex::new(&weights).map_err(|e| Error::invalid_value(format!("scale weights: {e}")))?;

    let coos = (0..options.n_edgelists)
        .map(|_| {
            let scale = scales[rng.with_rng(|r| picker.sample(r))];
            rmat_coo(handle, rng, &options.list_options(scale))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CooListResult { coos })
}

/// Attach uniform weights in `[min, max)` to a generated edge list
///
/// # Errors
///
/// `TypeMismatch` if `dtype` is not `FLOAT32` or `FLOAT64`
pub fn generate_edge_weights(
    handle: &ResourceHandle,
    rng: &RngState,
    coo: &mut CooResult,
    dtype: DataType,
    min: f64,
    max: f64,
) -> Result<()> {
    if !dtype.is_floating() {
        return Err(Error::type_mismatch(format!("edge weights must be floating point, got {dtype}")));
    }
    let values = rng.with_rng(|r| DefaultEngine::uniform_values(coo.len(), min, max, r));
    coo.weights = Some(weight_array(handle, dtype, &values)?);
    Ok(())
}

/// Attach consecutive edge ids
///
/// Ids continue across ranks: rank `r` starts after every edge of ranks
/// `0..r`. Collective on multi-partition handles.
///
/// # Errors
///
/// `InvalidValue` if the ids do not fit in the vertex type of the list
pub fn generate_edge_ids(handle: &ResourceHandle, coo: &mut CooResult) -> Result<()> {
    let counts = handle.all_gather("generate_edge_ids.counts", coo.len())?;
    let start: usize = counts[..handle.rank()].iter().sum();
    let ids = (start..start + coo.len())
        .map(|id| i64::try_from(id).map_err(|_| Error::invalid_value(format!("edge id {id} overflows int64"))))
        .collect::<Result<Vec<i64>>>()?;
    coo.edge_ids = Some(edge_id_array(handle, coo.sources.dtype(), &ids)?);
    Ok(())
}

/// Attach uniform `INT32` edge types in `[min, max]`
///
/// # Errors
///
/// `InvalidValue` for `min > max`
pub fn generate_edge_types(
    handle: &ResourceHandle,
    rng: &RngState,
    coo: &mut CooResult,
    min: i32,
    max: i32,
) -> Result<()> {
    if min > max {
        return Err(Error::invalid_value(format!("edge type range {min}..={max} is empty")));
    }
    let values = rng.with_rng(|r| DefaultEngine::uniform_integers(coo.len(), min, max, r));
    coo.edge_types = Some(TypeErasedDeviceArray::from_slice(handle, &values)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatusCode;

    #[test]
    fn test_rmat_vertex_types() {
        let handle = ResourceHandle::new();
        let rng = RngState::new(&handle, 11);
        let options = RmatOptions {
            scale: 6,
            num_edges: 100,
            ..RmatOptions::default()
        };
        let coo = generate_rmat_edgelist(&handle, &rng, &options).unwrap();
        assert_eq!(coo.sources().dtype(), DataType::Int32);
        let src = coo.sources().to_vec::<i32>().unwrap();
        assert!(src.iter().all(|&v| (0..64).contains(&v)));
        assert!(coo.weights().is_none());

        assert_eq!(vertex_type_for_scale(32), DataType::Int64);
    }

    #[test]
    fn test_rmat_lists_stay_in_scale_range() {
        let handle = ResourceHandle::new();
        let rng = RngState::new(&handle, 3);
        let options = RmatListOptions {
            n_edgelists: 5,
            min_scale: 2,
            max_scale: 4,
            edge_factor: 2,
            ..RmatListOptions::default()
        };
        let list = generate_rmat_edgelists(&handle, &rng, &options).unwrap();
        assert_eq!(list.size(), 5);
        for coo in list.iter() {
            assert!([8, 16, 32].contains(&coo.len()));
        }
    }

    #[test]
    fn test_edge_attributes() {
        let handle = ResourceHandle::new();
        let rng = RngState::new(&handle, 9);
        let options = RmatOptions {
            scale: 3,
            num_edges: 20,
            ..RmatOptions::default()
        };
        let mut coo = generate_rmat_edgelist(&handle, &rng, &options).unwrap();

        generate_edge_weights(&handle, &rng, &mut coo, DataType::Float64, 1.0, 2.0).unwrap();
        let weights = coo.weights().unwrap().to_vec::<f64>().unwrap();
        assert!(weights.iter().all(|w| (1.0..2.0).contains(w)));
        let err = generate_edge_weights(&handle, &rng, &mut coo, DataType::Int32, 1.0, 2.0).unwrap_err();
        assert_eq!(err.code(), StatusCode::TypeMismatch);

        generate_edge_ids(&handle, &mut coo).unwrap();
        let ids = coo.edge_ids().unwrap().to_vec::<i32>().unwrap();
        assert_eq!(ids, (0..20).collect::<Vec<_>>());

        generate_edge_types(&handle, &rng, &mut coo, 0, 3).unwrap();
        let types = coo.edge_types().unwrap().to_vec::<i32>().unwrap();
        assert!(types.iter().all(|t| (0..=3).contains(t)));
        let err = generate_edge_types(&handle, &rng, &mut coo, 3, 0).unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidValue);
    }
}
