//! DType dispatch utilities
//!
//! This module provides the `dispatch_dtype!` macro for runtime type
//! dispatch: it converts a `DType` value into a concrete generic type
//! instantiation, keeping the kernels monomorphic while the public surface
//! stays non-generic.
//!
//! # Usage
//!
//! ```ignore
//! fn my_operation(dtype: DType) -> Result<()> {
//!     dispatch_dtype!(dtype, T => {
//!         // T is now a concrete type (f32, f64, i32, etc.)
//!         run_kernel::<T>()?;
//!     });
//!     Ok(())
//! }
//! ```
//!
//! # Macro Details
//!
//! The macro must be used inside a function returning `crate::error::Result`:
//! feature-gated types produce an early `return Err(FeatureRequired)` when
//! the backing crate feature is disabled.
//!
//! ## Supported Types
//!
//! - `F64` -> `f64`
//! - `F32` -> `f32`
//! - `F16` -> `half::f16` (requires "f16" feature)
//! - `BF16` -> `half::bf16` (requires "f16" feature)
//! - `I64` / `I32` / `I16` / `I8` -> the matching signed integer
//! - `U64` / `U32` / `U16` / `U8` -> the matching unsigned integer
//! - `Bool` -> `u8` (boolean tensors store one byte per element, 0 or 1)

/// Internal helper macro to dispatch types requiring the "f16" feature.
/// Parameterized by type to avoid duplicating macro for F16 vs BF16.
#[macro_export]
#[doc(hidden)]
macro_rules! dispatch_f16_type {
    ($T:ident, $body:block, $dtype:expr, $type:ty) => {{
        #[cfg(feature = "f16")]
        {
            type $T = $type;
            $body
        }
        #[cfg(not(feature = "f16"))]
        {
            return Err($crate::error::Error::FeatureRequired {
                dtype: $dtype,
                feature: "f16",
            });
        }
    }};
}

/// Macro for runtime dtype dispatch to typed operations.
///
/// This macro takes a `DType` value and executes a code block with `T` bound
/// to the corresponding Rust type. `Bool` dispatches as `u8`: the copy and
/// fill sweeps are representation-agnostic, and boolean storage is one byte
/// per element. Operations that are NOT representation-agnostic (e.g.
/// accumulation) gate on `DTypeSet` membership before dispatching.
#[macro_export]
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:block) => {
        match $dtype {
            $crate::dtype::DType::F64 => {
                type $T = f64;
                $body
            }
            $crate::dtype::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::dtype::DType::F16 => {
                $crate::dispatch_f16_type!($T, $body, $dtype, half::f16)
            }
            $crate::dtype::DType::BF16 => {
                $crate::dispatch_f16_type!($T, $body, $dtype, half::bf16)
            }
            $crate::dtype::DType::I64 => {
                type $T = i64;
                $body
            }
            $crate::dtype::DType::I32 => {
                type $T = i32;
                $body
            }
            $crate::dtype::DType::I16 => {
                type $T = i16;
                $body
            }
            $crate::dtype::DType::I8 => {
                type $T = i8;
                $body
            }
            $crate::dtype::DType::U64 => {
                type $T = u64;
                $body
            }
            $crate::dtype::DType::U32 => {
                type $T = u32;
                $body
            }
            $crate::dtype::DType::U16 => {
                type $T = u16;
                $body
            }
            $crate::dtype::DType::U8 => {
                type $T = u8;
                $body
            }
            $crate::dtype::DType::Bool => {
                type $T = u8;
                $body
            }
        }
    };
}
