//! # idxr
//!
//! **Indexed bulk data movement over N-dimensional strided tensors.**
//!
//! idxr implements the gather/scatter family - `gather`, `scatter`,
//! `scatter_add`, `scatter_fill` - along an arbitrary axis, over views with
//! arbitrary element strides (transposed, sliced, flipped, broadcast).
//!
//! ## What's inside
//!
//! - **Strided views**: shape + signed per-axis strides + offset over
//!   reference-counted storage; no materialization needed to operate on a
//!   transposed or flipped view
//! - **Aliasing guard**: destinations whose layout maps distinct logical
//!   coordinates onto one element (e.g. broadcast views) are staged through
//!   a contiguous scratch copy and committed back after the sweep
//! - **Offset-width specialization**: 32-bit linear-offset arithmetic when
//!   every operand permits it, 64-bit otherwise - identical results either
//!   way
//! - **Rank specialization**: coordinate decomposition unrolled for index
//!   ranks 1-3, generic loop beyond
//! - **Runtime dtype dispatch**: one monomorphic kernel instantiation per
//!   element kind, selected from a `DType` tag at the call boundary
//!
//! ## Quick Start
//!
//! ```
//! use idxr::prelude::*;
//!
//! let device = CpuDevice::new();
//! let client = CpuRuntime::default_client(&device);
//!
//! let src = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2], &device);
//! let index = Tensor::<CpuRuntime>::from_slice(&[2i64, 0], &[1, 2], &device);
//!
//! let out = client.gather(&src, 0, &index).unwrap();
//! assert_eq!(out.shape(), &[1, 2]);
//! let data: Vec<f32> = out.to_vec();
//! assert_eq!(data, [5.0, 2.0]);
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): multi-threaded gather sweeps
//! - `f16`: half-precision element kinds (F16, BF16)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dtype;
pub mod error;
pub mod ops;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::ops::IndexingOps;
    pub use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
    pub use crate::runtime::{Device, Runtime, RuntimeClient};
    pub use crate::tensor::{Layout, Tensor};
}
