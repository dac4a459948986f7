//! Graph storage layer
//!
//! Provides the CSR topology used by the kernels and Parquet persistence for
//! edge list arrays.

pub mod csr;
#[cfg(feature = "storage")]
pub mod parquet;

pub use csr::{CsrGraph, EdgeList};
#[cfg(feature = "storage")]
pub use parquet::{read_edgelist_parquet, write_edgelist_parquet, EdgeListArrays};
