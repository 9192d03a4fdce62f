//! Error types for idxr

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using idxr's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in idxr operations
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Shapes cannot be broadcast together
    #[error("Cannot broadcast shape {lhs:?} to {rhs:?}")]
    BroadcastError {
        /// Shape being broadcast
        lhs: Vec<usize>,
        /// Target shape
        rhs: Vec<usize>,
    },

    /// Invalid dimension index
    #[error("Invalid dimension {dim} for tensor with {ndim} dimensions")]
    InvalidDimension {
        /// The invalid dimension
        dim: isize,
        /// Number of dimensions
        ndim: usize,
    },

    /// Operand rank exceeds the engine's supported ceiling
    #[error("Tensor rank {ndim} exceeds the supported maximum of {max} dimensions")]
    RankTooHigh {
        /// Rank of the offending operand
        ndim: usize,
        /// Supported maximum rank
        max: usize,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// DType mismatch between operands
    #[error("DType mismatch: {lhs:?} vs {rhs:?}")]
    DTypeMismatch {
        /// Left-hand side dtype
        lhs: DType,
        /// Right-hand side dtype
        rhs: DType,
    },

    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Index value out of bounds for the addressed axis
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index value
        index: i64,
        /// Size of the dimension
        size: usize,
    },

    /// Scalar value not representable in the destination dtype
    #[error("Value {value} cannot be represented in dtype {dtype:?}")]
    ValueConversion {
        /// The offending value
        value: f64,
        /// The destination dtype
        dtype: DType,
    },

    /// Tensor is not contiguous when contiguous memory is required
    #[error("Operation requires contiguous tensor")]
    NotContiguous,

    /// DType requires a crate feature that is not enabled
    #[error("DType {dtype:?} requires the '{feature}' feature")]
    FeatureRequired {
        /// The dtype needing the feature
        dtype: DType,
        /// The required cargo feature
        feature: &'static str,
    },

    /// Feature not yet implemented
    #[error("Not implemented: {feature}")]
    NotImplemented {
        /// Description of the unimplemented feature
        feature: &'static str,
    },
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }
}
