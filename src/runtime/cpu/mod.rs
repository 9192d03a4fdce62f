//! CPU runtime implementation
//!
//! The CPU runtime uses standard heap allocation and provides the reference
//! implementation for the indexed data-movement operations.
//!
//! # Non-contiguous Tensors
//!
//! Operations handle non-contiguous tensors via strided memory access. The
//! kernels walk arbitrary per-axis strides for every operand, including
//! negative strides produced by flipped views and zero strides produced by
//! broadcast views (the latter route in-place writes through the staging
//! guard).

mod client;
mod device;
pub(crate) mod helpers;
pub(crate) mod kernels;
mod runtime;

pub use crate::tensor::Tensor;
pub use client::CpuClient;
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
