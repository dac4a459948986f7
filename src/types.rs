//! Runtime element types and plain value records
//!
//! Arrays carry a [`DataType`] tag instead of a compile-time element type. The
//! [`Element`] trait ties the five supported Rust primitives to their tags so
//! typed accessors can check the tag before touching any bytes.

use std::fmt;

/// Element type tag carried by every array and view
///
/// Discriminants match the C ABI ids (`NTYPES` = 5 is the sentinel count).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    /// 32-bit signed integer
    Int32 = 0,
    /// 64-bit signed integer
    Int64 = 1,
    /// 32-bit float
    Float32 = 2,
    /// 64-bit float
    Float64 = 3,
    /// Platform `size_t` (`usize`)
    SizeT = 4,
}

impl DataType {
    /// All recognized element types in id order
    pub const ALL: [Self; 5] = [
        Self::Int32,
        Self::Int64,
        Self::Float32,
        Self::Float64,
        Self::SizeT,
    ];

    /// Width of one element in bytes
    #[must_use]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Int32 | Self::Float32 => 4,
            Self::Int64 | Self::Float64 => 8,
            Self::SizeT => std::mem::size_of::<usize>(),
        }
    }

    /// Integer element type (signed or `size_t`)
    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(self, Self::Int32 | Self::Int64 | Self::SizeT)
    }

    /// Floating point element type
    #[must_use]
    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Valid vertex identifier type
    #[must_use]
    pub const fn is_vertex_type(self) -> bool {
        matches!(self, Self::Int32 | Self::Int64)
    }

    /// Lower-case name used in diagnostics
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::SizeT => "size_t",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust primitive with a runtime [`DataType`] tag
pub trait Element: bytemuck::Pod + Send + Sync + fmt::Debug + 'static {
    /// Tag for this primitive
    const DTYPE: DataType;
}

impl Element for i32 {
    const DTYPE: DataType = DataType::Int32;
}

impl Element for i64 {
    const DTYPE: DataType = DataType::Int64;
}

impl Element for f32 {
    const DTYPE: DataType = DataType::Float32;
}

impl Element for f64 {
    const DTYPE: DataType = DataType::Float64;
}

impl Element for usize {
    const DTYPE: DataType = DataType::SizeT;
}

/// Structural properties declared by the caller at graph construction
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GraphProperties {
    /// Every edge (u, v) has a matching (v, u) with equal weight
    pub is_symmetric: bool,
    /// Parallel edges between the same ordered pair are permitted
    pub is_multigraph: bool,
}

impl GraphProperties {
    /// Properties of a directed graph without parallel edges
    #[must_use]
    pub const fn directed() -> Self {
        Self {
            is_symmetric: false,
            is_multigraph: false,
        }
    }

    /// Properties of an undirected (symmetric) graph without parallel edges
    #[must_use]
    pub const fn symmetric() -> Self {
        Self {
            is_symmetric: true,
            is_multigraph: false,
        }
    }
}

/// Degree direction used by core decomposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DegreeType {
    /// Count incoming edges
    In,
    /// Count outgoing edges
    #[default]
    Out,
    /// Count both directions
    InOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        assert_eq!(DataType::Int32.size_in_bytes(), 4);
        assert_eq!(DataType::Float32.size_in_bytes(), 4);
        assert_eq!(DataType::Int64.size_in_bytes(), 8);
        assert_eq!(DataType::Float64.size_in_bytes(), 8);
        assert_eq!(
            DataType::SizeT.size_in_bytes(),
            std::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_element_tags() {
        assert_eq!(<i32 as Element>::DTYPE, DataType::Int32);
        assert_eq!(<f64 as Element>::DTYPE, DataType::Float64);
        assert_eq!(<usize as Element>::DTYPE, DataType::SizeT);
    }

    #[test]
    fn test_classification() {
        assert!(DataType::Int64.is_vertex_type());
        assert!(!DataType::SizeT.is_vertex_type());
        assert!(DataType::SizeT.is_integral());
        assert!(DataType::Float32.is_floating());
        assert_eq!(DataType::ALL.len(), 5);
        assert_eq!(DataType::Float64.to_string(), "float64");
    }
}
