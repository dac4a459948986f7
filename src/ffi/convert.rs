//! Raw enum ids crossing the C ABI
//!
//! C callers pass enums as plain integers. Every id is matched explicitly; an
//! id outside the closed set is `InvalidValue`. The reverse direction matches
//! every Rust variant without a wildcard, so a new variant fails to compile
//! until it gets an id.

use crate::error::{Error, Result};
use crate::options::{CompressionType, GeneratorDistribution, PriorSourcesBehavior};
use crate::types::{DataType, DegreeType};
use std::os::raw::c_int;

/// Number of element types; never a valid element type id
pub const NTYPES: c_int = 5;

/// Element type for a raw id
///
/// # Errors
///
/// `InvalidValue` for `NTYPES` and any unknown id
pub fn data_type(raw: c_int) -> Result<DataType> {
    match raw {
        0 => Ok(DataType::Int32),
        1 => Ok(DataType::Int64),
        2 => Ok(DataType::Float32),
        3 => Ok(DataType::Float64),
        4 => Ok(DataType::SizeT),
        NTYPES => Err(Error::invalid_value("NTYPES is not an element type")),
        other => Err(Error::invalid_value(format!("unknown element type id {other}"))),
    }
}

/// Raw id of an element type
#[must_use]
pub const fn data_type_id(dtype: DataType) -> c_int {
    match dtype {
        DataType::Int32 => 0,
        DataType::Int64 => 1,
        DataType::Float32 => 2,
        DataType::Float64 => 3,
        DataType::SizeT => 4,
    }
}

/// Degree direction for a raw id
///
/// # Errors
///
/// `InvalidValue` for an unknown id
pub fn degree_type(raw: c_int) -> Result<DegreeType> {
    match raw {
        0 => Ok(DegreeType::In),
        1 => Ok(DegreeType::Out),
        2 => Ok(DegreeType::InOut),
        other => Err(Error::invalid_value(format!("unknown degree type id {other}"))),
    }
}

/// Raw id of a degree direction
#[must_use]
pub const fn degree_type_id(degree: DegreeType) -> c_int {
    match degree {
        DegreeType::In => 0,
        DegreeType::Out => 1,
        DegreeType::InOut => 2,
    }
}

/// Sample layout for a raw id
///
/// # Errors
///
/// `InvalidValue` for an unknown id
pub fn compression_type(raw: c_int) -> Result<CompressionType> {
    match raw {
        0 => Ok(CompressionType::Coo),
        1 => Ok(CompressionType::Csr),
        2 => Ok(CompressionType::Csc),
        3 => Ok(CompressionType::Dcsr),
        4 => Ok(CompressionType::Dcsc),
        other => Err(Error::invalid_value(format!("unknown compression type id {other}"))),
    }
}

/// Raw id of a sample layout
#[must_use]
pub const fn compression_type_id(compression: CompressionType) -> c_int {
    match compression {
        CompressionType::Coo => 0,
        CompressionType::Csr => 1,
        CompressionType::Csc => 2,
        CompressionType::Dcsr => 3,
        CompressionType::Dcsc => 4,
    }
}

/// Prior-sources policy for a raw id
///
/// # Errors
///
/// `InvalidValue` for an unknown id
pub fn prior_sources_behavior(raw: c_int) -> Result<PriorSourcesBehavior> {
    match raw {
        0 => Ok(PriorSourcesBehavior::Default),
        1 => Ok(PriorSourcesBehavior::CarryOver),
        2 => Ok(PriorSourcesBehavior::Exclude),
        other => Err(Error::invalid_value(format!("unknown prior sources behavior id {other}"))),
    }
}

/// Raw id of a prior-sources policy
#[must_use]
pub const fn prior_sources_behavior_id(behavior: PriorSourcesBehavior) -> c_int {
    match behavior {
        PriorSourcesBehavior::Default => 0,
        PriorSourcesBehavior::CarryOver => 1,
        PriorSourcesBehavior::Exclude => 2,
    }
}

/// Generator distribution for a raw id
///
/// # Errors
///
/// `InvalidValue` for an unknown id
pub fn generator_distribution(raw: c_int) -> Result<GeneratorDistribution> {
    match raw {
        0 => Ok(GeneratorDistribution::PowerLaw),
        1 => Ok(GeneratorDistribution::Uniform),
        other => Err(Error::invalid_value(format!("unknown generator distribution id {other}"))),
    }
}
