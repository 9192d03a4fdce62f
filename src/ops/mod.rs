//! Tensor operations
//!
//! This module defines the operation traits and their backend
//! implementations.
//!
//! # Design
//!
//! Operations are defined as traits implemented by a runtime's `Client`
//! type. This gives operations access to the device for allocating output
//! and staging tensors.
//!
//! ```text
//! RuntimeClient<R>
//!   └── implements IndexingOps<R>
//!         ├── gather, gather_out        (axis-wise indexed reads)
//!         └── scatter, scatter_add,
//!             scatter_fill              (axis-wise indexed writes, in place)
//! ```
//!
//! # Implementing Operations for a New Backend
//!
//! Implement `IndexingOps<YourRuntime>` for your `Client` type. The trait's
//! default method bodies return `NotImplemented`, so a backend can be
//! brought up operation by operation. Validation contracts to uphold are
//! spelled out in the trait docs; the CPU implementation in
//! `runtime::cpu::helpers` is the reference.

mod cpu;
mod dispatch;
mod traits;

pub use traits::IndexingOps;
