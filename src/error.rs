//! Status codes and the crate error type
//!
//! Every fallible call in the crate returns [`Result`]. Each [`Error`] variant
//! maps to exactly one non-success [`StatusCode`], which is what the C ABI
//! reports alongside the error message.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Closed enumeration of call outcomes
///
/// The discriminants are part of the C ABI and must never be reordered.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Call completed
    Success = 0,
    /// Failure without a more specific classification
    UnknownError = 1,
    /// A handle (resource handle, array slot) is missing or stale
    InvalidHandle = 2,
    /// Input data violates a structural or algorithmic precondition
    InvalidInput = 3,
    /// A scalar or array length is out of range
    InvalidValue = 4,
    /// A required pointer was null
    InvalidPointer = 5,
    /// A buffer size does not match the expected size
    InvalidSize = 6,
    /// Allocation failed
    MemoryError = 7,
    /// Operation exists in the API but not in this binding
    NotImplemented = 8,
    /// Object used before initialization
    NotInitialized = 9,
    /// Operation needs sorted adjacency storage
    RequiresSortedStorage = 10,
    /// Backend built for a different architecture
    ArchMismatch = 11,
    /// A panic was caught at the ABI boundary
    ThrownException = 12,
    /// Element type does not match the expected type
    TypeMismatch = 13,
    /// Pair of element types cannot be combined
    UnsupportedTypeCombination = 14,
    /// Partial progress, caller should call again
    Continue = 15,
}

impl StatusCode {
    /// Returns `true` for [`StatusCode::Success`]
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Stable name used in log lines and C error messages
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::InvalidHandle => "INVALID_HANDLE",
            Self::InvalidInput => "INVALID_INPUT",
            Self::InvalidValue => "INVALID_VALUE",
            Self::InvalidPointer => "INVALID_POINTER",
            Self::InvalidSize => "INVALID_SIZE",
            Self::MemoryError => "MEMORY_ERROR",
            Self::NotImplemented => "NOT_IMPLEMENTED",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::RequiresSortedStorage => "REQUIRES_SORTED_STORAGE",
            Self::ArchMismatch => "ARCH_MISMATCH",
            Self::ThrownException => "THROWN_EXCEPTION",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::UnsupportedTypeCombination => "UNSUPPORTED_TYPE_COMBINATION",
            Self::Continue => "CONTINUE",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned by every fallible operation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Unclassified failure
    #[error("unknown error: {0}")]
    Unknown(String),

    /// Stale or foreign handle (freed array, wrong resource handle)
    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    /// Input data violates a precondition
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Out-of-range scalar or inconsistent lengths
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Null pointer where one is required
    #[error("invalid pointer: {0}")]
    InvalidPointer(String),

    /// Buffer size mismatch
    #[error("invalid size: {0}")]
    InvalidSize(String),

    /// Allocation failure
    #[error("memory error: {0}")]
    Memory(String),

    /// Unsupported operation in this binding
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Object not initialized
    #[error("not initialized: {0}")]
    NotInitialized(String),

    /// Sorted storage required
    #[error("requires sorted storage: {0}")]
    RequiresSortedStorage(String),

    /// Architecture mismatch
    #[error("architecture mismatch: {0}")]
    ArchMismatch(String),

    /// Panic caught at the ABI boundary
    #[error("exception thrown: {0}")]
    ThrownException(String),

    /// Element type mismatch
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Element types that cannot be combined
    #[error("unsupported type combination: {0}")]
    UnsupportedTypeCombination(String),

    /// Failure bubbled up from internal plumbing (Parquet, GPU readback)
    #[error(transparent)]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Status code reported for this error
    #[must_use]
    pub fn code(&self) -> StatusCode {
        match self {
            Self::Unknown(_) | Self::External(_) => StatusCode::UnknownError,
            Self::InvalidHandle(_) => StatusCode::InvalidHandle,
            Self::InvalidInput(_) => StatusCode::InvalidInput,
            Self::InvalidValue(_) => StatusCode::InvalidValue,
            Self::InvalidPointer(_) => StatusCode::InvalidPointer,
            Self::InvalidSize(_) => StatusCode::InvalidSize,
            Self::Memory(_) => StatusCode::MemoryError,
            Self::NotImplemented(_) => StatusCode::NotImplemented,
            Self::NotInitialized(_) => StatusCode::NotInitialized,
            Self::RequiresSortedStorage(_) => StatusCode::RequiresSortedStorage,
            Self::ArchMismatch(_) => StatusCode::ArchMismatch,
            Self::ThrownException(_) => StatusCode::ThrownException,
            Self::TypeMismatch(_) => StatusCode::TypeMismatch,
            Self::UnsupportedTypeCombination(_) => StatusCode::UnsupportedTypeCombination,
        }
    }

    /// Create an `InvalidInput` error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an `InvalidValue` error
    pub fn invalid_value<S: Into<String>>(msg: S) -> Self {
        Self::InvalidValue(msg.into())
    }

    /// Create an `InvalidHandle` error
    pub fn invalid_handle<S: Into<String>>(msg: S) -> Self {
        Self::InvalidHandle(msg.into())
    }

    /// Create a `TypeMismatch` error
    pub fn type_mismatch<S: Into<String>>(msg: S) -> Self {
        Self::TypeMismatch(msg.into())
    }

    /// Create a `NotImplemented` error
    pub fn not_implemented<S: Into<String>>(msg: S) -> Self {
        Self::NotImplemented(msg.into())
    }

    /// Create an `InvalidSize` error
    pub fn invalid_size<S: Into<String>>(msg: S) -> Self {
        Self::InvalidSize(msg.into())
    }

    /// Create a `Memory` error
    pub fn memory<S: Into<String>>(msg: S) -> Self {
        Self::Memory(msg.into())
    }
}
