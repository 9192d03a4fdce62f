//! Indexed data-movement drivers for CPU tensors
//!
//! Each public operation runs the same pipeline:
//!
//! 1. shape/axis/dtype validation (pure checks, zero mutation on failure);
//! 2. empty-index short-circuit;
//! 3. aliasing guard: a destination whose layout could map distinct logical
//!    coordinates onto one element is substituted by a contiguous staging
//!    copy, committed back after the sweep;
//! 4. offset-width selection (i32 when every operand's reachable offsets
//!    fit, i64 otherwise);
//! 5. dimensionality-specialized sweep over the index coordinate space.
//!
//! A failed per-element bounds check aborts the sweep. With staging engaged
//! the original destination is untouched (commit never runs); without it the
//! destination is left partially written. That asymmetry is part of the
//! documented contract, see `ops::IndexingOps`.

use super::super::kernels;
use super::super::{CpuClient, CpuRuntime};
use crate::dispatch_dtype;
use crate::dtype::{DType, DTypeSet, Element};
use crate::error::{Error, Result};
use crate::tensor::Tensor;

pub(crate) use kernels::MAX_DIMS;

/// Dispatch the index tensor's rank to a const-specialized kernel
/// instantiation (1, 2, 3 unrolled; -1 generic).
macro_rules! dispatch_index_dims {
    ($ndim:expr, $D:ident => $body:expr) => {
        match $ndim {
            1 => {
                const $D: i32 = 1;
                $body
            }
            2 => {
                const $D: i32 = 2;
                $body
            }
            3 => {
                const $D: i32 = 3;
                $body
            }
            _ => {
                const $D: i32 = -1;
                $body
            }
        }
    };
}

/// Gather elements along a dimension using an index tensor.
///
/// Allocates the (contiguous) result with the index tensor's shape, then
/// runs the shared gather driver on it.
pub fn gather_impl(
    client: &CpuClient,
    src: &Tensor<CpuRuntime>,
    dim: usize,
    index: &Tensor<CpuRuntime>,
) -> Result<Tensor<CpuRuntime>> {
    let mut out = Tensor::try_zeros(index.shape(), src.dtype(), &client.device)?;
    gather_out_impl(client, &mut out, src, dim, index)?;
    Ok(out)
}

/// Gather elements along a dimension into a caller-provided destination.
pub fn gather_out_impl(
    _client: &CpuClient,
    out: &mut Tensor<CpuRuntime>,
    src: &Tensor<CpuRuntime>,
    dim: usize,
    index: &Tensor<CpuRuntime>,
) -> Result<()> {
    let dtype = src.dtype();
    let ndim = src.ndim();

    // Validate dimension
    if dim >= ndim {
        return Err(Error::InvalidDimension {
            dim: dim as isize,
            ndim,
        });
    }

    // Validate dtypes
    if index.dtype() != DType::I64 {
        return Err(Error::DTypeMismatch {
            lhs: DType::I64,
            rhs: index.dtype(),
        });
    }
    if out.dtype() != dtype {
        return Err(Error::DTypeMismatch {
            lhs: dtype,
            rhs: out.dtype(),
        });
    }

    // Index, source, and destination must agree in rank; the destination
    // takes the index tensor's shape exactly
    if index.ndim() != ndim {
        return Err(Error::shape_mismatch(src.shape(), index.shape()));
    }
    if out.shape() != index.shape() {
        return Err(Error::shape_mismatch(index.shape(), out.shape()));
    }

    // Every non-axis dimension must match between destination and source
    for d in 0..ndim {
        if d != dim && out.shape()[d] != src.shape()[d] {
            return Err(Error::shape_mismatch(src.shape(), out.shape()));
        }
    }

    check_rank_ceiling(&[src, index])?;

    let total = index.numel();
    if total == 0 {
        return Ok(());
    }

    // Aliasing guard: never gather directly into an overlapping layout
    let staged = if out.layout().maybe_overlapping() {
        Some(out.contiguous())
    } else {
        None
    };
    let target = staged.as_ref().unwrap_or(&*out);

    let narrow =
        can_use_32bit_index(target) && can_use_32bit_index(src) && can_use_32bit_index(index);

    dispatch_dtype!(dtype, T => {
        gather_typed::<T>(target, src, index, dim, total, narrow)?;
    });

    if let Some(stage) = staged {
        commit_staging(out, &stage);
    }

    Ok(())
}

fn gather_typed<T: Element>(
    out: &Tensor<CpuRuntime>,
    src: &Tensor<CpuRuntime>,
    index: &Tensor<CpuRuntime>,
    dim: usize,
    total: usize,
    narrow: bool,
) -> Result<()> {
    if narrow {
        gather_with_width::<T, i32>(out, src, index, dim, total)
    } else {
        gather_with_width::<T, i64>(out, src, index, dim, total)
    }
}

fn gather_with_width<T: Element, I: kernels::OffsetMath>(
    out: &Tensor<CpuRuntime>,
    src: &Tensor<CpuRuntime>,
    index: &Tensor<CpuRuntime>,
    dim: usize,
    total: usize,
) -> Result<()> {
    let src_desc = tensor_desc::<T, I>(src);
    let idx_desc = tensor_desc::<i64, I>(index);

    let swept = if out.is_contiguous() {
        let out_ptr = data_ptr::<T>(out);
        dispatch_index_dims!(index.ndim(), D => unsafe {
            kernels::gather_contig_kernel::<T, I, { D }>(out_ptr, &src_desc, &idx_desc, dim, total)
        })
    } else {
        let out_desc = tensor_desc::<T, I>(out);
        dispatch_index_dims!(index.ndim(), D => unsafe {
            kernels::gather_kernel::<T, I, { D }>(&out_desc, &src_desc, &idx_desc, dim, total)
        })
    };

    swept.map_err(bad_index_err)
}

/// Scatter values into a tensor at positions specified by an index tensor.
pub fn scatter_impl(
    _client: &CpuClient,
    dst: &mut Tensor<CpuRuntime>,
    dim: usize,
    index: &Tensor<CpuRuntime>,
    src: &Tensor<CpuRuntime>,
) -> Result<()> {
    let dtype = dst.dtype();

    validate_scatter_shapes(dst, dim, index, Some(src))?;
    if index_is_empty(index) {
        return Ok(());
    }
    check_rank_ceiling(&[&*dst, index, src])?;

    let total = index.numel();
    let staged = stage_if_overlapping(dst);
    let target = staged.as_ref().unwrap_or(&*dst);

    let narrow =
        can_use_32bit_index(target) && can_use_32bit_index(src) && can_use_32bit_index(index);

    dispatch_dtype!(dtype, T => {
        scatter_typed::<T>(target, index, src, dim, total, narrow, ScatterMode::Copy)?;
    });

    if let Some(stage) = staged {
        commit_staging(dst, &stage);
    }

    Ok(())
}

/// Scatter-accumulate values into a tensor at positions specified by an
/// index tensor.
pub fn scatter_add_impl(
    _client: &CpuClient,
    dst: &mut Tensor<CpuRuntime>,
    dim: usize,
    index: &Tensor<CpuRuntime>,
    src: &Tensor<CpuRuntime>,
) -> Result<()> {
    let dtype = dst.dtype();

    // Dispatch-time gate: accumulation is defined for numeric kinds only.
    // Checked before any other work so an unsupported kind never mutates.
    if !DTypeSet::NUMERIC.contains(dtype) {
        return Err(Error::unsupported_dtype(dtype, "scatter_add"));
    }

    validate_scatter_shapes(dst, dim, index, Some(src))?;
    if index_is_empty(index) {
        return Ok(());
    }
    check_rank_ceiling(&[&*dst, index, src])?;

    let total = index.numel();
    let staged = stage_if_overlapping(dst);
    let target = staged.as_ref().unwrap_or(&*dst);

    let narrow =
        can_use_32bit_index(target) && can_use_32bit_index(src) && can_use_32bit_index(index);

    dispatch_dtype!(dtype, T => {
        scatter_typed::<T>(target, index, src, dim, total, narrow, ScatterMode::Add)?;
    });

    if let Some(stage) = staged {
        commit_staging(dst, &stage);
    }

    Ok(())
}

/// Scatter a scalar fill value at positions specified by an index tensor.
pub fn scatter_fill_impl(
    _client: &CpuClient,
    dst: &mut Tensor<CpuRuntime>,
    dim: usize,
    index: &Tensor<CpuRuntime>,
    value: f64,
) -> Result<()> {
    let dtype = dst.dtype();

    validate_scatter_shapes(dst, dim, index, None)?;

    // The fill value must be representable before anything runs, even when
    // the index is empty
    checked_fill_value(value, dtype)?;

    if index_is_empty(index) {
        return Ok(());
    }
    check_rank_ceiling(&[&*dst, index])?;

    // Boolean destinations store any non-zero fill as 1
    let value = if dtype.is_bool() && value != 0.0 {
        1.0
    } else {
        value
    };

    let total = index.numel();
    let staged = stage_if_overlapping(dst);
    let target = staged.as_ref().unwrap_or(&*dst);

    let narrow = can_use_32bit_index(target) && can_use_32bit_index(index);

    dispatch_dtype!(dtype, T => {
        scatter_fill_typed::<T>(target, index, T::from_f64(value), dim, total, narrow)?;
    });

    if let Some(stage) = staged {
        commit_staging(dst, &stage);
    }

    Ok(())
}

/// Element semantics of a scatter sweep
#[derive(Clone, Copy, PartialEq, Eq)]
enum ScatterMode {
    /// Overwrite the destination element
    Copy,
    /// Accumulate into the destination element
    Add,
}

fn scatter_typed<T: Element>(
    dst: &Tensor<CpuRuntime>,
    index: &Tensor<CpuRuntime>,
    src: &Tensor<CpuRuntime>,
    dim: usize,
    total: usize,
    narrow: bool,
    mode: ScatterMode,
) -> Result<()> {
    if narrow {
        scatter_with_width::<T, i32>(dst, index, src, dim, total, mode)
    } else {
        scatter_with_width::<T, i64>(dst, index, src, dim, total, mode)
    }
}

fn scatter_with_width<T: Element, I: kernels::OffsetMath>(
    dst: &Tensor<CpuRuntime>,
    index: &Tensor<CpuRuntime>,
    src: &Tensor<CpuRuntime>,
    dim: usize,
    total: usize,
    mode: ScatterMode,
) -> Result<()> {
    let dst_desc = tensor_desc::<T, I>(dst);
    let src_desc = tensor_desc::<T, I>(src);
    let idx_desc = tensor_desc::<i64, I>(index);

    let swept = match mode {
        ScatterMode::Copy => dispatch_index_dims!(index.ndim(), D => unsafe {
            kernels::scatter_kernel::<T, I, { D }>(&dst_desc, &src_desc, &idx_desc, dim, total)
        }),
        ScatterMode::Add => dispatch_index_dims!(index.ndim(), D => unsafe {
            kernels::scatter_add_kernel::<T, I, { D }>(&dst_desc, &src_desc, &idx_desc, dim, total)
        }),
    };

    swept.map_err(bad_index_err)
}

fn scatter_fill_typed<T: Element>(
    dst: &Tensor<CpuRuntime>,
    index: &Tensor<CpuRuntime>,
    fill: T,
    dim: usize,
    total: usize,
    narrow: bool,
) -> Result<()> {
    if narrow {
        scatter_fill_with_width::<T, i32>(dst, index, fill, dim, total)
    } else {
        scatter_fill_with_width::<T, i64>(dst, index, fill, dim, total)
    }
}

fn scatter_fill_with_width<T: Element, I: kernels::OffsetMath>(
    dst: &Tensor<CpuRuntime>,
    index: &Tensor<CpuRuntime>,
    fill: T,
    dim: usize,
    total: usize,
) -> Result<()> {
    let dst_desc = tensor_desc::<T, I>(dst);
    let idx_desc = tensor_desc::<i64, I>(index);

    dispatch_index_dims!(index.ndim(), D => unsafe {
        kernels::scatter_fill_kernel::<T, I, { D }>(&dst_desc, &idx_desc, fill, dim, total)
    })
    .map_err(bad_index_err)
}

// ============================================================================
// Shared validation and plumbing
// ============================================================================

/// Common shape/axis/dtype checks for the scatter family.
///
/// `src` is `None` for scatter-fill. An empty index bypasses the rank
/// agreement and per-dimension extent checks (the call is a no-op).
fn validate_scatter_shapes(
    dst: &Tensor<CpuRuntime>,
    dim: usize,
    index: &Tensor<CpuRuntime>,
    src: Option<&Tensor<CpuRuntime>>,
) -> Result<()> {
    let ndim = dst.ndim();

    if dim >= ndim {
        return Err(Error::InvalidDimension {
            dim: dim as isize,
            ndim,
        });
    }

    if index.dtype() != DType::I64 {
        return Err(Error::DTypeMismatch {
            lhs: DType::I64,
            rhs: index.dtype(),
        });
    }

    if let Some(src) = src {
        if src.dtype() != dst.dtype() {
            return Err(Error::DTypeMismatch {
                lhs: dst.dtype(),
                rhs: src.dtype(),
            });
        }
        if src.ndim() != ndim {
            return Err(Error::shape_mismatch(dst.shape(), src.shape()));
        }
    }

    let empty = index_is_empty(index);

    match src {
        Some(src) => {
            if !empty && index.ndim() != src.ndim() {
                return Err(Error::shape_mismatch(src.shape(), index.shape()));
            }
        }
        None => {
            if !empty && index.ndim() != ndim {
                return Err(Error::shape_mismatch(dst.shape(), index.shape()));
            }
        }
    }

    if empty {
        return Ok(());
    }

    // The index extent must not exceed the source anywhere, nor the
    // destination outside the scatter axis
    for d in 0..ndim {
        let index_size = index.shape()[d];
        if d != dim && index_size > dst.shape()[d] {
            return Err(Error::shape_mismatch(dst.shape(), index.shape()));
        }
        if let Some(src) = src {
            if index_size > src.shape()[d] {
                return Err(Error::shape_mismatch(src.shape(), index.shape()));
            }
        }
    }

    Ok(())
}

/// A rank-0 or zero-element index short-circuits the scatter family
#[inline]
fn index_is_empty(index: &Tensor<CpuRuntime>) -> bool {
    index.ndim() == 0 || index.numel() == 0
}

fn check_rank_ceiling(operands: &[&Tensor<CpuRuntime>]) -> Result<()> {
    for t in operands {
        if t.ndim() > MAX_DIMS {
            return Err(Error::RankTooHigh {
                ndim: t.ndim(),
                max: MAX_DIMS,
            });
        }
    }
    Ok(())
}

/// Substitute an overlapping destination with a contiguous staging copy
#[inline]
fn stage_if_overlapping(dst: &Tensor<CpuRuntime>) -> Option<Tensor<CpuRuntime>> {
    if dst.layout().maybe_overlapping() {
        Some(dst.contiguous())
    } else {
        None
    }
}

/// Whether every offset reachable through this view fits 32-bit arithmetic
fn can_use_32bit_index(t: &Tensor<CpuRuntime>) -> bool {
    if t.numel() > i32::MAX as usize {
        return false;
    }

    let mut max_offset: i64 = 0;
    let mut min_offset: i64 = 0;
    for (&size, &stride) in t.shape().iter().zip(t.strides().iter()) {
        if size == 0 {
            continue;
        }
        let span = (size as i64 - 1) * stride as i64;
        if span >= 0 {
            max_offset += span;
        } else {
            min_offset += span;
        }
    }

    min_offset >= i32::MIN as i64 && max_offset <= i32::MAX as i64
}

/// Element pointer of a view (storage pointer advanced by the view offset)
#[inline]
fn data_ptr<T>(t: &Tensor<CpuRuntime>) -> *mut T {
    (t.storage().ptr() as usize + t.layout().offset() * std::mem::size_of::<T>()) as *mut T
}

fn tensor_desc<T, I: kernels::OffsetMath>(t: &Tensor<CpuRuntime>) -> kernels::TensorDesc<T, I> {
    kernels::TensorDesc::new(data_ptr::<T>(t), t.shape(), t.strides())
}

fn bad_index_err(bad: kernels::BadIndex) -> Error {
    Error::IndexOutOfBounds {
        index: bad.value,
        size: bad.bound,
    }
}

/// Check a fill scalar against the destination kind's representable range.
///
/// Integer kinds reject non-finite values and anything outside
/// `[min_value, max_value]`; in-range fractional values truncate like a
/// numeric cast. Float and boolean kinds accept any value.
fn checked_fill_value(value: f64, dtype: DType) -> Result<()> {
    if dtype.is_int()
        && (!value.is_finite() || value < dtype.min_value() || value > dtype.max_value())
    {
        return Err(Error::ValueConversion { value, dtype });
    }
    Ok(())
}

/// Copy a contiguous staging tensor back into the (possibly overlapping)
/// destination view, honoring the destination's strides.
///
/// Inverse of `CpuRuntime::copy_strided`. When several logical coordinates
/// alias one element, later coordinates in row-major order win; this is a
/// best-effort reconciliation, not a merge policy.
fn commit_staging(dst: &Tensor<CpuRuntime>, stage: &Tensor<CpuRuntime>) {
    let numel = dst.numel();
    if numel == 0 {
        return;
    }

    let elem_size = dst.dtype().size_in_bytes();
    let shape = dst.shape();
    let strides = dst.strides();
    let src_base = stage.storage().ptr() as *const u8;
    let dst_base =
        (dst.storage().ptr() as usize + dst.layout().offset() * elem_size) as *mut u8;

    let mut indices = vec![0usize; shape.len()];

    for src_offset in 0..numel {
        let mut dst_elem_offset: isize = 0;
        for (i, &idx) in indices.iter().enumerate() {
            dst_elem_offset += idx as isize * strides[i];
        }

        unsafe {
            std::ptr::copy_nonoverlapping(
                src_base.add(src_offset * elem_size),
                dst_base.offset(dst_elem_offset * elem_size as isize),
                elem_size,
            );
        }

        for dim in (0..shape.len()).rev() {
            indices[dim] += 1;
            if indices[dim] < shape[dim] {
                break;
            }
            indices[dim] = 0;
        }
    }
}
